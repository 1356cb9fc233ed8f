//! A terminal browser for a directory of Jupyter notebooks.
//!
//! The left pane lists the notebooks; the right pane renders the selected
//! one cell by cell, with code cells collapsed until expanded.

mod app;
mod config;
mod core;
mod ui;

use std::io::{self, stderr, Stderr};
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame, Terminal,
};

use crate::app::{
    event::{spawn_event_reader, AppEvent},
    handler,
    state::{ActiveView, AppState, PaneFocus},
};
use crate::config::{Action, AppConfig};
use crate::core::notebook::Notebook;
use crate::ui::{
    landing,
    layout::AppLayout,
    notebook_list::NotebookList,
    notebook_view::NotebookView,
    popup,
    theme::Theme,
};

// ───────────────────────────────────────── CLI ───────────────

#[derive(Parser, Debug)]
#[command(name = env!("CARGO_PKG_NAME"), about = "Browse a directory of Jupyter notebooks")]
struct Cli {
    /// Directory holding the notebooks.
    #[arg(default_value = "notebooks")]
    dir: PathBuf,

    /// Title shown on the landing page.
    #[arg(long)]
    title: Option<String>,

    /// List hidden (dot) notebooks.
    #[arg(long)]
    hidden: bool,

    /// Hide code cell outputs.
    #[arg(long = "no-outputs")]
    no_outputs: bool,
}

// ───────────────────────────────────────── drawing ───────────

fn pane_block(title: String, focused: bool) -> Block<'static> {
    Block::default()
        .title(title)
        .title_style(Theme::title_style())
        .borders(Borders::ALL)
        .border_style(if focused {
            Theme::focused_border_style()
        } else {
            Theme::border_style()
        })
}

/// `" trees · python · 4 md / 6 code "` style pane title.
fn notebook_title(nb: &Notebook) -> String {
    let (markdown, code, raw) = nb.kind_counts();
    let mut parts = vec![nb.name.clone()];
    if let Some(ref lang) = nb.language {
        parts.push(lang.clone());
    }
    let mut counts = format!("{markdown} md / {code} code");
    if raw > 0 {
        counts.push_str(&format!(" / {raw} raw"));
    }
    parts.push(counts);
    format!(" {} ", parts.join(" · "))
}

fn draw(frame: &mut Frame, state: &mut AppState) {
    let layout = AppLayout::from_area(frame.area());
    state.list_area = layout.list_area;
    state.notebook_area = layout.notebook_area;

    // ── list pane ──────────────────────────────────────────────
    let list_focused = state.pane_focus == PaneFocus::List;
    let list = NotebookList::new(&state.entries)
        .open(state.open_entry())
        .block(pane_block(format!(" {} ", state.dir.display()), list_focused));
    frame.render_stateful_widget(list, layout.list_area, &mut state.list_state);

    // ── notebook pane ──────────────────────────────────────────
    let notebook_focused = state.pane_focus == PaneFocus::Notebook;
    match (&state.error, &state.loaded) {
        (Some(err), _) => {
            let rescan_key = state.config.short_binding(Action::Rescan);
            let notice = Paragraph::new(landing::notice_lines(err, &rescan_key))
                .wrap(Wrap { trim: false })
                .block(pane_block(" Notebook ".into(), notebook_focused));
            frame.render_widget(notice, layout.notebook_area);
        }
        (None, Some(loaded)) => {
            let view = NotebookView::new(&loaded.blocks)
                .focused(notebook_focused)
                .block(pane_block(notebook_title(&loaded.notebook), notebook_focused));
            frame.render_stateful_widget(view, layout.notebook_area, &mut state.view_state);
        }
        (None, None) => {
            let open_key = state.config.short_binding(Action::Open);
            let page = Paragraph::new(landing::landing_lines(
                &state.config.title,
                &state.entries,
                &open_key,
            ))
            .wrap(Wrap { trim: false })
            .block(pane_block(" Welcome ".into(), notebook_focused));
            frame.render_widget(page, layout.notebook_area);
        }
    }

    // ── status bar ─────────────────────────────────────────────
    let status_text = match state.active_view {
        ActiveView::Browser => state
            .status_message
            .clone()
            .unwrap_or_else(|| state.config.status_bar_hint()),
        ActiveView::SettingsMenu | ActiveView::ControlsList => String::new(),
    };
    let status_style = if state.error.is_some() {
        Theme::status_bar_style().patch(Theme::notice_style())
    } else {
        Theme::status_bar_style()
    };
    frame.render_widget(Paragraph::new(status_text).style(status_style), layout.status_area);

    // ── overlays ───────────────────────────────────────────────
    match state.active_view {
        ActiveView::SettingsMenu => {
            let selected = state.settings_selected;
            frame.render_widget(
                popup::SettingsPopup {
                    state: &*state,
                    selected,
                },
                frame.area(),
            );
        }
        ActiveView::ControlsList => {
            frame.render_widget(
                popup::ControlsPopup {
                    config: &state.config,
                    selected: state.controls_selected,
                },
                frame.area(),
            );
        }
        ActiveView::Browser => {}
    }
}

// ───────────────────────────────────────── main ─────────────

async fn run(
    terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    state: &mut AppState,
) -> Result<()> {
    let mut events = spawn_event_reader();

    loop {
        terminal.draw(|frame| draw(frame, state))?;

        // Reader gone means the terminal is gone.
        let Some(event) = events.recv().await else {
            break;
        };
        match event {
            AppEvent::Key(k) => handler::handle_key(state, k),
            AppEvent::Mouse(m) => handler::handle_mouse(state, m),
            AppEvent::Resize(_, _) => {}
        }

        if state.should_quit {
            break;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Silent unless RUST_LOG is set.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr) // never pollute stdout
        .init();

    let cli = Cli::parse();

    // ── config + CLI overrides ────────────────────────────────
    let mut user_config = AppConfig::load();
    if let Some(title) = cli.title {
        user_config.title = title;
    }
    if cli.hidden {
        user_config.show_hidden = true;
    }
    if cli.no_outputs {
        user_config.show_outputs = false;
    }
    tracing::info!("browsing {}", cli.dir.display());

    let mut state = AppState::new(cli.dir, user_config);
    state.config_file = Some(config::config_path());
    handler::rescan(&mut state);

    // ── terminal setup ────────────────────────────────────────
    enable_raw_mode()?;
    let mut stderr_handle = stderr();
    execute!(stderr_handle, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stderr());
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, &mut state).await;

    // ── teardown ──────────────────────────────────────────────
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}
