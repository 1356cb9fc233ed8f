//! Maps key and mouse events to state changes.
//!
//! Loading and listing happen synchronously here: a selection reads and
//! parses the file before the next frame is drawn. Failures become
//! `state.error` and never end the session.

use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::layout::Rect;

use crate::config::Action;
use crate::core::{discovery, error::BrowseError, notebook};
use crate::ui::notebook_list::ROWS_PER_ENTRY;

use super::settings::{SettingsItem, SETTINGS_ITEMS};
use super::state::{ActiveView, AppState, LoadedNotebook, PaneFocus};

/// Rows moved per mouse-wheel notch in the notebook pane.
const WHEEL_STEP: isize = 3;

/// Process a key event, dispatching based on the active view.
pub fn handle_key(state: &mut AppState, key: KeyEvent) {
    if key.kind == KeyEventKind::Release {
        return;
    }
    // Ctrl+c always quits, regardless of view.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        state.should_quit = true;
        return;
    }

    match state.active_view {
        ActiveView::Browser => handle_browser_key(state, key),
        ActiveView::SettingsMenu => handle_settings_key(state, key),
        ActiveView::ControlsList => handle_controls_key(state, key),
    }
}

// ── Browser view (configurable bindings) ────────────────────────

fn handle_browser_key(state: &mut AppState, key: KeyEvent) {
    // Paging keys are fixed; they are not part of the binding table.
    let page = state.notebook_area.height.saturating_sub(2).max(1) as usize;
    match (key.code, state.pane_focus) {
        (KeyCode::Esc, PaneFocus::Notebook) => {
            state.pane_focus = PaneFocus::List;
            return;
        }
        (KeyCode::Home, PaneFocus::List) => {
            state.list_state.selected = 0;
            return;
        }
        (KeyCode::End, PaneFocus::List) => {
            state.list_state.selected = state.entries.len().saturating_sub(1);
            return;
        }
        (KeyCode::Home, PaneFocus::Notebook) => {
            state.view_state.cursor = 0;
            state.view_state.follow_cursor = true;
            return;
        }
        (KeyCode::End, PaneFocus::Notebook) => {
            state.view_state.cursor = cell_count(state).saturating_sub(1);
            state.view_state.follow_cursor = true;
            return;
        }
        (KeyCode::PageUp, PaneFocus::Notebook) => {
            state.view_state.scroll_by(-(page as isize));
            return;
        }
        (KeyCode::PageDown, PaneFocus::Notebook) => {
            state.view_state.scroll_by(page as isize);
            return;
        }
        _ => {}
    }

    let Some(action) = state.config.match_key(key) else {
        return;
    };

    match action {
        Action::Quit => state.should_quit = true,
        Action::OpenSettings => {
            state.active_view = ActiveView::SettingsMenu;
            state.settings_selected = 0;
        }
        Action::MoveUp => match state.pane_focus {
            PaneFocus::List => state.list_state.select_prev(),
            PaneFocus::Notebook => state.view_state.select_prev(),
        },
        Action::MoveDown => match state.pane_focus {
            PaneFocus::List => state.list_state.select_next(state.entries.len()),
            PaneFocus::Notebook => {
                let count = cell_count(state);
                state.view_state.select_next(count);
            }
        },
        Action::Open => match state.pane_focus {
            PaneFocus::List => open_selected(state),
            PaneFocus::Notebook => toggle_cursor_cell(state),
        },
        Action::SwitchPane => switch_pane(state),
        Action::ToggleCell => {
            if state.pane_focus == PaneFocus::Notebook {
                toggle_cursor_cell(state);
            }
        }
        Action::ExpandAll => {
            if let Some(loaded) = state.loaded.as_mut() {
                loaded.expand_all();
                state.rerender();
            }
        }
        Action::CollapseAll => {
            if let Some(loaded) = state.loaded.as_mut() {
                loaded.collapse_all();
                state.rerender();
                state.view_state.follow_cursor = true;
            }
        }
        Action::Rescan => rescan(state),
    }
}

fn cell_count(state: &AppState) -> usize {
    state.loaded.as_ref().map_or(0, |l| l.blocks.len())
}

fn switch_pane(state: &mut AppState) {
    state.pane_focus = match state.pane_focus {
        PaneFocus::List if state.loaded.is_some() => PaneFocus::Notebook,
        PaneFocus::List => PaneFocus::List,
        PaneFocus::Notebook => PaneFocus::List,
    };
}

fn toggle_cursor_cell(state: &mut AppState) {
    let cursor = state.view_state.cursor;
    let toggled = state
        .loaded
        .as_mut()
        .is_some_and(|loaded| loaded.toggle(cursor));
    if toggled {
        state.rerender();
        state.view_state.follow_cursor = true;
    }
}

// ── Loading ─────────────────────────────────────────────────────

/// Load the notebook under the list cursor into the notebook pane.
pub fn open_selected(state: &mut AppState) {
    let index = state.list_state.selected;
    let Some(entry) = state.entries.get(index) else {
        return;
    };
    let path = entry.path.clone();
    let stem = entry.stem.clone();

    match notebook::load_notebook(&path) {
        Ok(nb) => {
            let cells = nb.cells.len();
            let options = state.render_options();
            state.loaded = Some(LoadedNotebook::new(index, path, nb, &options));
            state.error = None;
            state.view_state.reset();
            state.pane_focus = PaneFocus::Notebook;
            state.status_message = Some(format!("Opened {stem} ({cells} cells)"));
        }
        Err(err) => {
            state.status_message = Some(format!("{}: {stem}", err.kind_label()));
            state.loaded = None;
            state.error = Some(err);
            state.pane_focus = PaneFocus::List;
        }
    }
}

/// Re-list the directory, keeping the selection and open notebook when
/// their files are still present.
pub fn rescan(state: &mut AppState) {
    match discovery::list_notebooks(&state.dir, &state.config.discovery_options()) {
        Ok(entries) => {
            let selected_path = state
                .entries
                .get(state.list_state.selected)
                .map(|e| e.path.clone());
            state.entries = entries;

            state.list_state.selected = selected_path
                .and_then(|p| state.entries.iter().position(|e| e.path == p))
                .unwrap_or(0);
            state.list_state.offset = state.list_state.offset.min(state.list_state.selected);

            let open_position = state
                .loaded
                .as_ref()
                .map(|l| state.entries.iter().position(|e| e.path == l.path));
            match open_position {
                Some(Some(i)) => {
                    if let Some(loaded) = state.loaded.as_mut() {
                        loaded.entry_index = i;
                    }
                }
                Some(None) => {
                    state.loaded = None;
                    state.pane_focus = PaneFocus::List;
                }
                None => {}
            }

            if matches!(
                state.error,
                Some(BrowseError::NoNotebooks { .. } | BrowseError::ReadDir { .. })
            ) {
                state.error = None;
            }
            state.status_message = Some(format!("{} notebooks", state.entries.len()));
        }
        Err(err) => {
            state.entries.clear();
            state.list_state = Default::default();
            state.loaded = None;
            state.pane_focus = PaneFocus::List;
            state.status_message = Some(err.kind_label().to_string());
            state.error = Some(err);
        }
    }
}

/// Save the config if the session has a config file.
pub fn persist_config(state: &mut AppState) {
    let Some(path) = state.config_file.clone() else {
        return;
    };
    if let Err(err) = state.config.save_to(&path) {
        tracing::warn!("failed to save config to {}: {err:#}", path.display());
        state.status_message = Some(format!("Could not save settings: {err}"));
    }
}

// ── Settings menu (hardcoded keys) ──────────────────────────────

fn handle_settings_key(state: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => {
            state.active_view = ActiveView::Browser;
        }
        KeyCode::Up | KeyCode::Char('k') => {
            state.settings_selected = state.settings_selected.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if state.settings_selected + 1 < SETTINGS_ITEMS.len() {
                state.settings_selected += 1;
            }
        }
        KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') | KeyCode::Char(' ') => {
            match SETTINGS_ITEMS.get(state.settings_selected) {
                Some(SettingsItem::Submenu { view, .. }) => {
                    state.active_view = *view;
                    state.controls_selected = 0;
                }
                Some(SettingsItem::Toggle { get, set, .. }) => {
                    let current = get(state);
                    set(state, !current);
                }
                None => {}
            }
        }
        _ => {}
    }
}

// ── Controls list (read-only) ───────────────────────────────────

fn handle_controls_key(state: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => {
            state.active_view = ActiveView::Browser;
        }
        KeyCode::Left | KeyCode::Char('h') | KeyCode::Backspace => {
            state.active_view = ActiveView::SettingsMenu;
        }
        KeyCode::Up | KeyCode::Char('k') => {
            state.controls_selected = state.controls_selected.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if state.controls_selected + 1 < Action::ALL.len() {
                state.controls_selected += 1;
            }
        }
        _ => {}
    }
}

// ── Mouse ───────────────────────────────────────────────────────

/// Wheel scrolls the pane under the pointer; a left click selects a list
/// entry, and a second click on the selected entry opens it.
pub fn handle_mouse(state: &mut AppState, mouse: MouseEvent) {
    if state.active_view != ActiveView::Browser {
        return;
    }
    let (col, row) = (mouse.column, mouse.row);
    let in_list = point_in_rect(state.list_area, col, row);
    let in_notebook = point_in_rect(state.notebook_area, col, row);

    match mouse.kind {
        MouseEventKind::ScrollDown if in_notebook => state.view_state.scroll_by(WHEEL_STEP),
        MouseEventKind::ScrollUp if in_notebook => state.view_state.scroll_by(-WHEEL_STEP),
        MouseEventKind::ScrollDown if in_list => state.list_state.select_next(state.entries.len()),
        MouseEventKind::ScrollUp if in_list => state.list_state.select_prev(),
        MouseEventKind::Down(MouseButton::Left) if in_list => {
            state.pane_focus = PaneFocus::List;
            // One border row above the first entry.
            let first_row = state.list_area.y.saturating_add(1);
            if row < first_row {
                return;
            }
            let idx = state.list_state.offset + (row - first_row) as usize / ROWS_PER_ENTRY;
            if idx >= state.entries.len() {
                return;
            }
            if idx == state.list_state.selected {
                open_selected(state);
            } else {
                state.list_state.selected = idx;
            }
        }
        MouseEventKind::Down(MouseButton::Left) if in_notebook && state.loaded.is_some() => {
            state.pane_focus = PaneFocus::Notebook;
        }
        _ => {}
    }
}

fn point_in_rect(area: Rect, col: u16, row: u16) -> bool {
    col >= area.x
        && col < area.x.saturating_add(area.width)
        && row >= area.y
        && row < area.y.saturating_add(area.height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crossterm::event::KeyEventState;
    use std::path::Path;

    const VALID: &str = r##"{"nbformat": 4, "nbformat_minor": 5, "metadata": {}, "cells": [
        {"cell_type": "markdown", "metadata": {}, "source": "# Decision Trees"},
        {"cell_type": "code", "metadata": {}, "execution_count": 1, "source": "tree.fit(X, y)",
         "outputs": [{"output_type": "stream", "name": "stdout", "text": "done\n"}]},
        {"cell_type": "raw", "metadata": {}, "source": "raw"},
        {"cell_type": "code", "metadata": {}, "execution_count": 2, "source": "tree.score(X, y)", "outputs": []}
    ]}"##;

    fn write(dir: &Path, name: &str, body: &str) {
        std::fs::write(dir.join(name), body).unwrap();
    }

    fn press(state: &mut AppState, code: KeyCode) {
        handle_key(state, KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn browser(dir: &Path) -> AppState {
        let mut state = AppState::new(dir.to_path_buf(), AppConfig::default());
        state.notebook_area = Rect::new(30, 0, 80, 30);
        state.list_area = Rect::new(0, 0, 30, 30);
        rescan(&mut state);
        state
    }

    #[test]
    fn empty_directory_reports_no_files_found() {
        let tmp = tempfile::tempdir().unwrap();
        let mut state = browser(tmp.path());

        assert!(matches!(state.error, Some(BrowseError::NoNotebooks { .. })));
        assert!(state.entries.is_empty());
        assert_eq!(state.status_message.as_deref(), Some("no files found"));

        press(&mut state, KeyCode::Enter);
        press(&mut state, KeyCode::Down);
        assert!(state.loaded.is_none());
        assert!(!state.should_quit);
    }

    #[test]
    fn opening_a_notebook_renders_every_cell() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "trees.ipynb", VALID);
        let mut state = browser(tmp.path());

        press(&mut state, KeyCode::Enter);
        let loaded = state.loaded.as_ref().unwrap();
        assert_eq!(loaded.notebook.name, "trees");
        assert_eq!(loaded.blocks.len(), 4);
        assert!(state.error.is_none());
        assert_eq!(state.pane_focus, PaneFocus::Notebook);
        assert_eq!(state.status_message.as_deref(), Some("Opened trees (4 cells)"));
    }

    #[test]
    fn corrupt_notebook_is_reported_and_browser_recovers() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "a-broken.ipynb", "{\"nbformat\": 4, \"cells\": [");
        write(tmp.path(), "b-good.ipynb", VALID);
        let mut state = browser(tmp.path());
        assert_eq!(state.entries.len(), 2);

        press(&mut state, KeyCode::Enter);
        assert!(matches!(state.error, Some(BrowseError::Parse { .. })));
        assert!(state.loaded.is_none());
        assert!(!state.should_quit);
        assert_eq!(state.pane_focus, PaneFocus::List);

        press(&mut state, KeyCode::Down);
        press(&mut state, KeyCode::Enter);
        assert!(state.error.is_none());
        assert_eq!(state.loaded.as_ref().unwrap().notebook.name, "b-good");
    }

    #[test]
    fn code_cells_toggle_from_the_keyboard() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "trees.ipynb", VALID);
        let mut state = browser(tmp.path());
        press(&mut state, KeyCode::Enter);

        // Cursor starts on the markdown cell, which does not collapse.
        press(&mut state, KeyCode::Char(' '));
        assert!(state.loaded.as_ref().unwrap().expanded.is_empty());

        press(&mut state, KeyCode::Down);
        press(&mut state, KeyCode::Char(' '));
        let loaded = state.loaded.as_ref().unwrap();
        assert!(loaded.expanded.contains(&1));
        assert!(!loaded.blocks[1].collapsed);
        assert!(loaded.blocks[3].collapsed);

        press(&mut state, KeyCode::Enter);
        assert!(state.loaded.as_ref().unwrap().blocks[1].collapsed);

        press(&mut state, KeyCode::Char('e'));
        let loaded = state.loaded.as_ref().unwrap();
        assert_eq!(loaded.expanded.len(), 2);
        assert!(loaded.blocks.iter().all(|b| !b.collapsed));

        press(&mut state, KeyCode::Char('c'));
        assert!(state.loaded.as_ref().unwrap().expanded.is_empty());
    }

    #[test]
    fn focus_moves_between_panes() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "trees.ipynb", VALID);
        let mut state = browser(tmp.path());

        press(&mut state, KeyCode::Tab);
        assert_eq!(state.pane_focus, PaneFocus::List, "nothing loaded yet");

        press(&mut state, KeyCode::Enter);
        press(&mut state, KeyCode::Tab);
        assert_eq!(state.pane_focus, PaneFocus::List);
        press(&mut state, KeyCode::Tab);
        assert_eq!(state.pane_focus, PaneFocus::Notebook);
        press(&mut state, KeyCode::Esc);
        assert_eq!(state.pane_focus, PaneFocus::List);
    }

    #[test]
    fn settings_toggle_rerenders_outputs() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "trees.ipynb", VALID);
        let mut state = browser(tmp.path());
        press(&mut state, KeyCode::Enter);
        press(&mut state, KeyCode::Char('e'));
        let before = state.loaded.as_ref().unwrap().blocks[1].lines.len();

        press(&mut state, KeyCode::Char('?'));
        assert_eq!(state.active_view, ActiveView::SettingsMenu);
        press(&mut state, KeyCode::Down);
        assert_eq!(SETTINGS_ITEMS[state.settings_selected].label(), "Show Outputs");
        press(&mut state, KeyCode::Enter);

        assert!(!state.config.show_outputs);
        let after = state.loaded.as_ref().unwrap().blocks[1].lines.len();
        assert_eq!(before - after, 2, "`Out:` header and one stream line");

        press(&mut state, KeyCode::Esc);
        assert_eq!(state.active_view, ActiveView::Browser);
    }

    #[test]
    fn hidden_toggle_rescans() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), ".draft.ipynb", VALID);
        write(tmp.path(), "trees.ipynb", VALID);
        let mut state = browser(tmp.path());
        assert_eq!(state.entries.len(), 1);

        state.active_view = ActiveView::SettingsMenu;
        state.settings_selected = 3;
        press(&mut state, KeyCode::Enter);
        assert!(state.config.show_hidden);
        assert_eq!(state.entries.len(), 2);
    }

    #[test]
    fn rescan_keeps_selection_and_open_notebook() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "b.ipynb", VALID);
        write(tmp.path(), "c.ipynb", VALID);
        let mut state = browser(tmp.path());
        press(&mut state, KeyCode::Down);
        press(&mut state, KeyCode::Enter);
        assert_eq!(state.open_entry(), Some(1));

        write(tmp.path(), "a.ipynb", VALID);
        press(&mut state, KeyCode::Esc);
        press(&mut state, KeyCode::Char('r'));
        assert_eq!(state.entries.len(), 3);
        assert_eq!(state.entries[state.list_state.selected].name, "c.ipynb");
        assert_eq!(state.open_entry(), Some(2));

        std::fs::remove_file(tmp.path().join("c.ipynb")).unwrap();
        press(&mut state, KeyCode::Char('r'));
        assert!(state.loaded.is_none());
        assert_eq!(state.list_state.selected, 0);
    }

    #[test]
    fn emptied_directory_reports_on_rescan() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "only.ipynb", VALID);
        let mut state = browser(tmp.path());
        press(&mut state, KeyCode::Enter);

        std::fs::remove_file(tmp.path().join("only.ipynb")).unwrap();
        rescan(&mut state);
        assert!(matches!(state.error, Some(BrowseError::NoNotebooks { .. })));
        assert!(state.loaded.is_none());

        write(tmp.path(), "back.ipynb", VALID);
        rescan(&mut state);
        assert!(state.error.is_none());
        assert_eq!(state.entries.len(), 1);
    }

    #[test]
    fn quit_keys() {
        let tmp = tempfile::tempdir().unwrap();
        let mut state = browser(tmp.path());
        handle_key(
            &mut state,
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        );
        assert!(state.should_quit);

        let mut state = browser(tmp.path());
        let mut release = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        release.kind = KeyEventKind::Release;
        release.state = KeyEventState::NONE;
        handle_key(&mut state, release);
        assert!(!state.should_quit);
        press(&mut state, KeyCode::Char('q'));
        assert!(state.should_quit);
    }

    #[test]
    fn clicks_select_then_open() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "a.ipynb", VALID);
        write(tmp.path(), "b.ipynb", VALID);
        let mut state = browser(tmp.path());

        let click = |row| MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 5,
            row,
            modifiers: KeyModifiers::NONE,
        };
        // Second entry's name row: border + two rows for the first entry.
        handle_mouse(&mut state, click(3));
        assert_eq!(state.list_state.selected, 1);
        assert!(state.loaded.is_none());

        handle_mouse(&mut state, click(4));
        assert_eq!(state.open_entry(), Some(1));
    }

    #[test]
    fn wheel_scrolls_the_notebook_pane() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "a.ipynb", VALID);
        let mut state = browser(tmp.path());
        press(&mut state, KeyCode::Enter);

        handle_mouse(
            &mut state,
            MouseEvent {
                kind: MouseEventKind::ScrollDown,
                column: 40,
                row: 5,
                modifiers: KeyModifiers::NONE,
            },
        );
        assert_eq!(state.view_state.offset, WHEEL_STEP as usize);
        assert!(!state.view_state.follow_cursor);
    }
}
