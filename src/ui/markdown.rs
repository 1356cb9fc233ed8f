//! Markdown → styled terminal lines.
//!
//! Walks the pulldown-cmark event stream and emits one [`Line`] per output
//! row. Block structure (headings, lists, quotes, fenced code, tables) maps
//! to prefixes and blank separators; inline markup maps to span styles.
//! Lines are not wrapped here; see [`super::wrap`].

use pulldown_cmark::{Event, Options, Parser, Tag};
use ratatui::{
    style::Style,
    text::{Line, Span},
};

use super::{sanitize::expand_tabs, theme::Theme};

/// Render markdown source into unwrapped, styled lines.
pub fn markdown_lines(source: &str) -> Vec<Line<'static>> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut renderer = Renderer::default();
    for event in Parser::new_ext(source, options) {
        renderer.event(event);
    }
    renderer.finish()
}

/// What a `Start` event opened, so the matching `End` knows what to undo.
enum Open {
    Paragraph,
    Heading,
    Quote,
    CodeBlock,
    HtmlBlock,
    List,
    Item,
    Styled,
    Link(String),
    Image,
    TableRow,
    TableCell,
    Other,
}

#[derive(Default)]
struct Renderer {
    lines: Vec<Line<'static>>,
    current: Vec<Span<'static>>,
    open: Vec<Open>,
    styles: Vec<Style>,
    /// Next number per open list; `None` for bullet lists.
    lists: Vec<Option<u64>>,
    quote_depth: usize,
    in_code_block: bool,
    /// The current line already starts with a list bullet.
    has_bullet: bool,
}

impl Renderer {
    fn style(&self) -> Style {
        self.styles
            .iter()
            .fold(Style::default(), |acc, s| acc.patch(*s))
    }

    fn push_text(&mut self, text: impl Into<String>, style: Style) {
        self.current.push(Span::styled(text.into(), style));
    }

    fn prefix(&self) -> Vec<Span<'static>> {
        let mut spans = Vec::new();
        if self.quote_depth > 0 {
            spans.push(Span::styled("│ ".repeat(self.quote_depth), Theme::quote_style()));
        }
        if !self.has_bullet && !self.lists.is_empty() {
            spans.push(Span::raw("  ".repeat(self.lists.len())));
        }
        spans
    }

    /// Finish the line being built, if any.
    fn flush(&mut self) {
        if self.current.is_empty() {
            return;
        }
        let mut spans = self.prefix();
        spans.append(&mut self.current);
        self.lines.push(Line::from(spans));
        self.has_bullet = false;
    }

    fn blank(&mut self) {
        if self.lines.last().is_some_and(|l| !l.spans.is_empty()) {
            self.lines.push(Line::default());
        }
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(_) => self.end(),
            Event::Text(text) if self.in_code_block => {
                let prefix = self.prefix();
                for line in text.lines() {
                    let mut spans = prefix.clone();
                    spans.push(Span::styled(
                        format!("  {}", expand_tabs(line)),
                        Theme::code_style(),
                    ));
                    self.lines.push(Line::from(spans));
                }
            }
            Event::Text(text) => {
                let style = self.style();
                self.push_text(text.into_string(), style);
            }
            Event::Code(code) => {
                let style = self.style().patch(Theme::inline_code_style());
                self.push_text(code.into_string(), style);
            }
            // Block HTML arrives one source line per event.
            Event::Html(html) => {
                let style = Theme::meta_style();
                for part in html.split_inclusive('\n') {
                    let text = part.trim_end_matches(['\n', '\r']);
                    if !text.is_empty() {
                        self.push_text(expand_tabs(text), style);
                    }
                    if part.ends_with('\n') {
                        self.flush();
                    }
                }
            }
            Event::InlineHtml(html) => {
                let style = Theme::meta_style();
                for (i, part) in html.lines().enumerate() {
                    if i > 0 {
                        self.flush();
                    }
                    self.push_text(part.to_string(), style);
                }
            }
            Event::SoftBreak => {
                let style = self.style();
                self.push_text(" ", style);
            }
            Event::HardBreak => self.flush(),
            Event::Rule => {
                self.flush();
                self.lines
                    .push(Line::from(Span::styled("─".repeat(40), Theme::meta_style())));
                self.lines.push(Line::default());
            }
            Event::TaskListMarker(done) => {
                self.push_text(if done { "[x] " } else { "[ ] " }, Style::default());
            }
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        let open = match tag {
            Tag::Paragraph => Open::Paragraph,
            Tag::Heading { level, .. } => {
                self.flush();
                self.styles.push(Theme::heading_style(level as usize));
                Open::Heading
            }
            Tag::BlockQuote(..) => {
                self.flush();
                self.quote_depth += 1;
                Open::Quote
            }
            Tag::CodeBlock(_) => {
                self.flush();
                self.in_code_block = true;
                Open::CodeBlock
            }
            Tag::HtmlBlock => {
                self.flush();
                Open::HtmlBlock
            }
            Tag::List(first) => {
                self.flush();
                self.lists.push(first);
                Open::List
            }
            Tag::Item => {
                self.flush();
                let depth = self.lists.len();
                let bullet = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let label = format!("{n}. ");
                        *n += 1;
                        label
                    }
                    _ => "• ".to_string(),
                };
                if depth > 1 {
                    self.push_text("  ".repeat(depth - 1), Style::default());
                }
                self.push_text(bullet, Theme::meta_style());
                self.has_bullet = true;
                Open::Item
            }
            Tag::Emphasis => {
                self.styles.push(Theme::emphasis_style());
                Open::Styled
            }
            Tag::Strong => {
                self.styles.push(Theme::strong_style());
                Open::Styled
            }
            Tag::Strikethrough => {
                self.styles.push(Theme::strikethrough_style());
                Open::Styled
            }
            Tag::Link { dest_url, .. } => {
                self.styles.push(Theme::link_style());
                Open::Link(dest_url.into_string())
            }
            Tag::Image { dest_url, .. } => {
                self.push_text(format!("[image: {dest_url}] "), Theme::meta_style());
                Open::Image
            }
            Tag::TableHead | Tag::TableRow => Open::TableRow,
            Tag::TableCell => Open::TableCell,
            _ => Open::Other,
        };
        self.open.push(open);
    }

    fn end(&mut self) {
        let Some(open) = self.open.pop() else {
            return;
        };
        match open {
            Open::Paragraph => {
                self.flush();
                if self.lists.is_empty() {
                    self.blank();
                }
            }
            Open::Heading => {
                self.styles.pop();
                self.flush();
                self.blank();
            }
            Open::HtmlBlock => {
                self.flush();
                self.blank();
            }
            Open::Quote => {
                self.flush();
                self.quote_depth = self.quote_depth.saturating_sub(1);
                self.blank();
            }
            Open::CodeBlock => {
                self.in_code_block = false;
                self.blank();
            }
            Open::List => {
                self.flush();
                self.lists.pop();
                if self.lists.is_empty() {
                    self.blank();
                }
            }
            Open::Item | Open::TableRow => self.flush(),
            Open::Styled => {
                self.styles.pop();
            }
            Open::Link(url) => {
                self.styles.pop();
                if !url.is_empty() {
                    self.push_text(format!(" ({url})"), Theme::meta_style());
                }
            }
            Open::TableCell => self.push_text(" │ ", Theme::meta_style()),
            Open::Image | Open::Other => {}
        }
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        self.flush();
        while self.lines.last().is_some_and(|l| l.spans.is_empty()) {
            self.lines.pop();
        }
        self.lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Modifier;

    fn text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn texts(lines: &[Line<'_>]) -> Vec<String> {
        lines.iter().map(text).collect()
    }

    #[test]
    fn block_structure_maps_to_rows() {
        let src = "# Title\n\nSome *em* and **bold** `code`.\n\n- a\n- b\n\n1. x\n2. y\n\n```py\nprint(1)\n```\n\n> quote\n";
        assert_eq!(
            texts(&markdown_lines(src)),
            vec![
                "Title",
                "",
                "Some em and bold code.",
                "",
                "• a",
                "• b",
                "",
                "1. x",
                "2. y",
                "",
                "  print(1)",
                "",
                "│ quote",
            ]
        );
    }

    #[test]
    fn inline_markup_is_styled() {
        let lines = markdown_lines("plain *em* **strong** `x`");
        let spans = &lines[0].spans;
        let find = |s: &str| spans.iter().find(|sp| sp.content == s).unwrap().style;
        assert!(find("em").add_modifier.contains(Modifier::ITALIC));
        assert!(find("strong").add_modifier.contains(Modifier::BOLD));
        assert_eq!(find("x").fg, Theme::inline_code_style().fg);
    }

    #[test]
    fn headings_use_heading_style() {
        let lines = markdown_lines("## Results");
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].spans[0].style.fg, Theme::heading_style(2).fg);
    }

    #[test]
    fn links_show_their_target() {
        let lines = markdown_lines("All code is on [GitHub](https://github.com/x/y).");
        assert_eq!(text(&lines[0]), "All code is on GitHub (https://github.com/x/y).");
    }

    #[test]
    fn nested_lists_indent() {
        let lines = markdown_lines("- outer\n  - inner\n- next\n");
        assert_eq!(texts(&lines), vec!["• outer", "  • inner", "• next"]);
    }

    #[test]
    fn html_blocks_keep_their_lines() {
        let lines = markdown_lines("<div>\n<b>hi</b>\n</div>\n\ntext");
        assert_eq!(texts(&lines), vec!["<div>", "<b>hi</b>", "</div>", "", "text"]);
        assert_eq!(lines[0].spans[0].style, Theme::meta_style());

        let lines = markdown_lines("<center><img src=\"plot.png\"></center>\n\n## Results");
        assert_eq!(
            texts(&lines),
            vec!["<center><img src=\"plot.png\"></center>", "", "Results"]
        );
    }

    #[test]
    fn fenced_code_expands_tabs() {
        let lines = markdown_lines("```\nif x:\n\ty()\n```\n");
        assert_eq!(texts(&lines), vec!["  if x:", "      y()"]);
    }

    #[test]
    fn empty_source_renders_nothing() {
        assert!(markdown_lines("").is_empty());
        assert!(markdown_lines("\n\n").is_empty());
    }
}
