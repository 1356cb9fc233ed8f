//! Ratatui widget that renders the notebook listing as a selectable column.

use std::time::SystemTime;

use chrono::{DateTime, Local};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, StatefulWidget, Widget},
};

use crate::core::discovery::NotebookEntry;

use super::theme::Theme;

/// Each entry takes a name row and a details row.
pub const ROWS_PER_ENTRY: usize = 2;

// ───────────────────────────────────────── state ─────────────

/// Persistent state for the list widget (selected index, scroll offset).
#[derive(Debug, Default)]
pub struct NotebookListState {
    /// Index into the entry list that is currently highlighted.
    pub selected: usize,
    /// Vertical scroll offset (first visible entry).
    pub offset: usize,
}

impl NotebookListState {
    pub fn select_next(&mut self, max: usize) {
        if max > 0 && self.selected < max - 1 {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Ensure the selected entry is visible within `height` rows, where each
    /// entry takes `rows_per_entry` rows.
    pub fn clamp_scroll(&mut self, height: usize, rows_per_entry: usize) {
        let visible = height / rows_per_entry.max(1);
        if visible == 0 {
            return;
        }
        if self.selected < self.offset {
            self.offset = self.selected;
        } else if self.selected >= self.offset + visible {
            self.offset = self.selected - visible + 1;
        }
    }
}

// ───────────────────────────────────────── widget ────────────

/// The list widget, created fresh each frame.
pub struct NotebookList<'a> {
    entries: &'a [NotebookEntry],
    block: Option<Block<'a>>,
    /// Index of the notebook currently shown in the notebook pane.
    open: Option<usize>,
}

impl<'a> NotebookList<'a> {
    pub fn new(entries: &'a [NotebookEntry]) -> Self {
        Self {
            entries,
            block: None,
            open: None,
        }
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    pub fn open(mut self, open: Option<usize>) -> Self {
        self.open = open;
        self
    }
}

impl<'a> StatefulWidget for NotebookList<'a> {
    type State = NotebookListState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let inner = if let Some(ref block) = self.block {
            let inner = block.inner(area);
            block.clone().render(area, buf);
            inner
        } else {
            area
        };

        state.clamp_scroll(inner.height as usize, ROWS_PER_ENTRY);

        let mut y = inner.y;
        let bottom = inner.y + inner.height;
        for (idx, entry) in self.entries.iter().enumerate().skip(state.offset) {
            if y >= bottom {
                break;
            }
            let is_selected = idx == state.selected;
            let is_open = self.open == Some(idx);

            let marker = if is_open { "● " } else { "  " };
            let style = if is_selected {
                Theme::selected_style()
            } else if is_open {
                Theme::open_entry_style()
            } else {
                Theme::entry_style()
            };
            let line = Line::from(vec![
                Span::styled(marker, Theme::open_entry_style()),
                Span::styled(entry.stem.clone(), style),
            ]);
            if is_selected {
                buf.set_style(Rect::new(inner.x, y, inner.width, 1), Theme::selected_style());
            }
            buf.set_line(inner.x, y, &line, inner.width);
            y += 1;

            if y < bottom {
                let detail = Line::from(Span::styled(
                    format!("  {}", entry_details(entry)),
                    Theme::meta_style(),
                ));
                buf.set_line(inner.x, y, &detail, inner.width);
                y += 1;
            }
        }
    }
}

/// `"12.4 KB · 2025-03-01 14:02"` style summary for an entry.
pub fn entry_details(entry: &NotebookEntry) -> String {
    match entry.modified {
        Some(t) => format!("{} · {}", human_size(entry.size), format_time(t)),
        None => human_size(entry.size),
    }
}

fn format_time(t: SystemTime) -> String {
    let local: DateTime<Local> = t.into();
    local.format("%Y-%m-%d %H:%M").to_string()
}

/// Format a byte count as a short human-readable string.
pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn entry(stem: &str, size: u64) -> NotebookEntry {
        NotebookEntry {
            name: format!("{stem}.ipynb"),
            stem: stem.to_string(),
            path: PathBuf::from(format!("{stem}.ipynb")),
            size,
            modified: None,
        }
    }

    #[test]
    fn human_sizes() {
        assert_eq!(human_size(0), "0 B");
        assert_eq!(human_size(1023), "1023 B");
        assert_eq!(human_size(1536), "1.5 KB");
        assert_eq!(human_size(3 * 1024 * 1024), "3.0 MB");
    }

    #[test]
    fn selection_stays_in_bounds() {
        let mut state = NotebookListState::default();
        state.select_prev();
        assert_eq!(state.selected, 0);
        state.select_next(2);
        state.select_next(2);
        assert_eq!(state.selected, 1);
    }

    #[test]
    fn scroll_follows_selection() {
        let mut state = NotebookListState {
            selected: 5,
            offset: 0,
        };
        state.clamp_scroll(6, 2);
        assert_eq!(state.offset, 3);
        state.selected = 1;
        state.clamp_scroll(6, 2);
        assert_eq!(state.offset, 1);
    }

    #[test]
    fn renders_stems_and_open_marker() {
        let entries = vec![entry("knn", 2048), entry("svm", 10)];
        let area = Rect::new(0, 0, 20, 4);
        let mut buf = Buffer::empty(area);
        let mut state = NotebookListState::default();
        NotebookList::new(&entries)
            .open(Some(1))
            .render(area, &mut buf, &mut state);

        let row = |y: u16| -> String {
            (0..area.width)
                .map(|x| buf[(x, y)].symbol().to_string())
                .collect::<String>()
                .trim_end()
                .to_string()
        };
        assert_eq!(row(0), "  knn");
        assert_eq!(row(1), "  2.0 KB");
        assert_eq!(row(2), "● svm");
        assert_eq!(row(3), "  10 B");
    }
}
