//! Colour palette and text styles used across the UI.

use ratatui::style::{Color, Modifier, Style};

/// Every colour and text style the UI uses.
pub struct Theme;

impl Theme {
    // ── notebook list ──────────────────────────────────────────
    pub fn entry_style() -> Style {
        Style::default().fg(Color::White)
    }

    pub fn open_entry_style() -> Style {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    }

    pub fn selected_style() -> Style {
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD)
    }

    pub fn meta_style() -> Style {
        Style::default().fg(Color::DarkGray)
    }

    // ── markdown ───────────────────────────────────────────────
    pub fn heading_style(level: usize) -> Style {
        let base = Style::default().add_modifier(Modifier::BOLD);
        match level {
            1 => base.fg(Color::Magenta).add_modifier(Modifier::UNDERLINED),
            2 => base.fg(Color::Cyan),
            3 => base.fg(Color::Blue),
            _ => base,
        }
    }

    pub fn emphasis_style() -> Style {
        Style::default().add_modifier(Modifier::ITALIC)
    }

    pub fn strong_style() -> Style {
        Style::default().add_modifier(Modifier::BOLD)
    }

    pub fn strikethrough_style() -> Style {
        Style::default().add_modifier(Modifier::CROSSED_OUT)
    }

    pub fn inline_code_style() -> Style {
        Style::default().fg(Color::Yellow)
    }

    pub fn link_style() -> Style {
        Style::default()
            .fg(Color::Blue)
            .add_modifier(Modifier::UNDERLINED)
    }

    pub fn quote_style() -> Style {
        Style::default().fg(Color::Gray)
    }

    // ── cells ──────────────────────────────────────────────────
    pub fn code_header_style() -> Style {
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD)
    }

    pub fn code_style() -> Style {
        Style::default().fg(Color::LightYellow)
    }

    pub fn line_number_style() -> Style {
        Style::default().fg(Color::DarkGray)
    }

    pub fn output_style() -> Style {
        Style::default().fg(Color::Gray)
    }

    pub fn stderr_style() -> Style {
        Style::default().fg(Color::LightRed)
    }

    pub fn error_style() -> Style {
        Style::default()
            .fg(Color::Red)
            .add_modifier(Modifier::BOLD)
    }

    pub fn raw_style() -> Style {
        Style::default()
    }

    pub fn cursor_style() -> Style {
        Style::default().fg(Color::Cyan)
    }

    // ── chrome ─────────────────────────────────────────────────
    pub fn border_style() -> Style {
        Style::default().fg(Color::Gray)
    }

    pub fn focused_border_style() -> Style {
        Style::default().fg(Color::Cyan)
    }

    pub fn title_style() -> Style {
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD)
    }

    pub fn notice_style() -> Style {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    }

    pub fn status_bar_style() -> Style {
        Style::default().bg(Color::DarkGray).fg(Color::White)
    }
}
