//! Cell rendering and the scrolling notebook widget.
//!
//! [`render_cells`] turns a [`Notebook`] into one [`CellBlock`] per cell, in
//! cell order. [`NotebookView`] stacks those blocks vertically, wraps them to
//! the pane width and keeps the cell under the cursor in view.

use std::collections::HashSet;

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, StatefulWidget, Widget},
};

use crate::core::notebook::{Cell, CellKind, Notebook, Output};

use super::{
    markdown::markdown_lines,
    sanitize::{expand_tabs, terminal_lines},
    theme::Theme,
    wrap::wrap_lines,
};

// ───────────────────────────────────────── cell blocks ───────

/// Rendering switches taken from the user config.
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub show_outputs: bool,
    pub line_numbers: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            show_outputs: true,
            line_numbers: false,
        }
    }
}

/// The rendered form of one cell.
#[derive(Debug, Clone)]
pub struct CellBlock {
    pub index: usize,
    pub kind: CellKind,
    /// Only code cells collapse; always `false` for the other kinds.
    pub collapsed: bool,
    /// Unwrapped lines. Never empty.
    pub lines: Vec<Line<'static>>,
}

/// Render every cell of `notebook`. Code cells whose index is in `expanded`
/// show their source and outputs; the rest show a one-line summary.
pub fn render_cells(
    notebook: &Notebook,
    expanded: &HashSet<usize>,
    options: &RenderOptions,
) -> Vec<CellBlock> {
    notebook
        .cells
        .iter()
        .enumerate()
        .map(|(index, cell)| render_cell(index, cell, expanded.contains(&index), options))
        .collect()
}

fn render_cell(index: usize, cell: &Cell, expanded: bool, options: &RenderOptions) -> CellBlock {
    let (collapsed, mut lines) = match cell {
        Cell::Markdown { source } => (false, markdown_lines(source)),
        Cell::Raw { source } => (
            false,
            source
                .lines()
                .map(|l| Line::styled(expand_tabs(l), Theme::raw_style()))
                .collect(),
        ),
        Cell::Code {
            source,
            execution_count,
            outputs,
        } => {
            if expanded {
                (false, code_lines(source, *execution_count, outputs, options))
            } else {
                (true, vec![code_summary(source, *execution_count)])
            }
        }
    };
    if lines.is_empty() {
        lines.push(Line::default());
    }
    CellBlock {
        index,
        kind: cell.kind(),
        collapsed,
        lines,
    }
}

fn prompt(execution_count: Option<u32>) -> String {
    match execution_count {
        Some(n) => format!("In [{n}]:"),
        None => "In [ ]:".to_string(),
    }
}

/// Collapsed form: `▶ In [3]: first line (12 lines)`.
fn code_summary(source: &str, execution_count: Option<u32>) -> Line<'static> {
    let first = source
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("");
    let count = source.lines().count();
    let noun = if count == 1 { "line" } else { "lines" };
    Line::from(vec![
        Span::styled(format!("▶ {} ", prompt(execution_count)), Theme::code_header_style()),
        Span::styled(expand_tabs(first), Theme::code_style()),
        Span::styled(format!(" ({count} {noun})"), Theme::meta_style()),
    ])
}

fn code_lines(
    source: &str,
    execution_count: Option<u32>,
    outputs: &[Output],
    options: &RenderOptions,
) -> Vec<Line<'static>> {
    let mut lines = vec![Line::styled(
        format!("▼ {}", prompt(execution_count)),
        Theme::code_header_style(),
    )];

    let digits = source.lines().count().max(1).to_string().len();
    for (n, text) in source.lines().enumerate() {
        let gutter = if options.line_numbers {
            Span::styled(format!("  {:>digits$} │ ", n + 1), Theme::line_number_style())
        } else {
            Span::raw("  ")
        };
        lines.push(Line::from(vec![
            gutter,
            Span::styled(expand_tabs(text), Theme::code_style()),
        ]));
    }

    if options.show_outputs && !outputs.is_empty() {
        lines.push(Line::styled("  Out:", Theme::meta_style()));
        for output in outputs {
            output_lines(output, &mut lines);
        }
    }
    lines
}

fn output_lines(output: &Output, lines: &mut Vec<Line<'static>>) {
    match output {
        Output::Stream { name, text } => {
            let style = if name == "stderr" {
                Theme::stderr_style()
            } else {
                Theme::output_style()
            };
            lines.extend(
                terminal_lines(text)
                    .into_iter()
                    .map(|l| Line::styled(format!("  {l}"), style)),
            );
        }
        Output::Data { text, mime_types } => {
            for mime in mime_types.iter().filter(|m| !m.starts_with("text/")) {
                lines.push(Line::styled(format!("  [{mime} output]"), Theme::meta_style()));
            }
            if let Some(text) = text {
                lines.extend(
                    terminal_lines(text)
                        .into_iter()
                        .map(|l| Line::styled(format!("  {l}"), Theme::output_style())),
                );
            }
        }
        Output::Error { ename, evalue } => {
            let evalue = terminal_lines(evalue).join(" ");
            lines.push(Line::styled(format!("  {ename}: {evalue}"), Theme::error_style()));
        }
    }
}

// ───────────────────────────────────────── widget state ──────

/// Persistent state for the notebook widget.
#[derive(Debug, Default)]
pub struct NotebookViewState {
    /// Index of the highlighted cell.
    pub cursor: usize,
    /// First visible row.
    pub offset: usize,
    /// When set, the next render scrolls so the cursor cell is visible.
    /// Manual scrolling clears it.
    pub follow_cursor: bool,
}

impl NotebookViewState {
    pub fn select_next(&mut self, cell_count: usize) {
        if cell_count > 0 && self.cursor < cell_count - 1 {
            self.cursor += 1;
        }
        self.follow_cursor = true;
    }

    pub fn select_prev(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
        self.follow_cursor = true;
    }

    pub fn scroll_by(&mut self, delta: isize) {
        self.offset = self.offset.saturating_add_signed(delta);
        self.follow_cursor = false;
    }

    pub fn reset(&mut self) {
        *self = Self {
            follow_cursor: true,
            ..Self::default()
        };
    }

    /// Adjust `offset` for a viewport of `height` rows over `total` rows,
    /// where the cursor cell spans `cursor_rows` (start, end-exclusive).
    fn clamp_scroll(&mut self, height: usize, total: usize, cursor_rows: (usize, usize)) {
        if height == 0 {
            return;
        }
        if self.follow_cursor {
            let (start, end) = cursor_rows;
            if start < self.offset {
                self.offset = start;
            } else if end > self.offset + height {
                self.offset = start.min(end.saturating_sub(height));
            }
            self.follow_cursor = false;
        }
        self.offset = self.offset.min(total.saturating_sub(height));
    }
}

// ───────────────────────────────────────── widget ────────────

/// The notebook pane, created fresh each frame.
pub struct NotebookView<'a> {
    blocks: &'a [CellBlock],
    block: Option<Block<'a>>,
    focused: bool,
}

/// Columns taken by the cursor gutter on the left of each row.
const GUTTER: usize = 2;

impl<'a> NotebookView<'a> {
    pub fn new(blocks: &'a [CellBlock]) -> Self {
        Self {
            blocks,
            block: None,
            focused: false,
        }
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    /// Wrap all blocks to `width` and lay them out with one blank row between
    /// cells. Returns the rows (tagged with their cell index) and each
    /// cell's `(start, end)` row span.
    fn layout_rows(&self, width: usize) -> (Vec<(usize, Line<'static>)>, Vec<(usize, usize)>) {
        let mut rows = Vec::new();
        let mut spans = Vec::with_capacity(self.blocks.len());
        for (i, block) in self.blocks.iter().enumerate() {
            if i > 0 {
                rows.push((usize::MAX, Line::default()));
            }
            let start = rows.len();
            rows.extend(
                wrap_lines(&block.lines, width)
                    .into_iter()
                    .map(|line| (block.index, line)),
            );
            spans.push((start, rows.len()));
        }
        (rows, spans)
    }
}

impl<'a> StatefulWidget for NotebookView<'a> {
    type State = NotebookViewState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let inner = if let Some(ref block) = self.block {
            let inner = block.inner(area);
            block.clone().render(area, buf);
            inner
        } else {
            area
        };
        if inner.width as usize <= GUTTER || inner.height == 0 || self.blocks.is_empty() {
            return;
        }

        state.cursor = state.cursor.min(self.blocks.len() - 1);
        let (rows, spans) = self.layout_rows(inner.width as usize - GUTTER);
        state.clamp_scroll(inner.height as usize, rows.len(), spans[state.cursor]);

        let cursor_cell = self.blocks[state.cursor].index;
        for (i, (cell, line)) in rows
            .iter()
            .skip(state.offset)
            .take(inner.height as usize)
            .enumerate()
        {
            let y = inner.y + i as u16;
            if *cell == cursor_cell {
                let marker = if self.focused { "▌" } else { "│" };
                buf.set_string(inner.x, y, marker, Theme::cursor_style());
            }
            buf.set_line(inner.x + GUTTER as u16, y, line, inner.width - GUTTER as u16);
        }
    }
}
