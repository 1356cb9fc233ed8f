//! Word wrapping for styled lines, measured in display columns.

use ratatui::{
    style::Style,
    text::{Line, Span},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Wrap every line to `width` columns. A width of zero leaves lines as-is.
pub fn wrap_lines(lines: &[Line<'static>], width: usize) -> Vec<Line<'static>> {
    lines.iter().flat_map(|l| wrap_line(l, width)).collect()
}

/// Wrap one line at spaces; words wider than `width` are split by character.
/// Span styles carry over to the continuation rows.
pub fn wrap_line(line: &Line<'static>, width: usize) -> Vec<Line<'static>> {
    if width == 0 {
        return vec![line.clone()];
    }

    let mut rows = Wrapper {
        width,
        rows: Vec::new(),
        current: Vec::new(),
        used: 0,
    };
    for span in &line.spans {
        for token in span.content.split_inclusive(' ') {
            rows.token(token, span.style);
        }
    }
    rows.finish()
        .into_iter()
        .map(|spans| Line::from(spans).style(line.style))
        .collect()
}

struct Wrapper {
    width: usize,
    rows: Vec<Vec<Span<'static>>>,
    current: Vec<Span<'static>>,
    used: usize,
}

impl Wrapper {
    fn break_row(&mut self) {
        self.rows.push(std::mem::take(&mut self.current));
        self.used = 0;
    }

    fn push(&mut self, text: &str, style: Style) {
        match self.current.last_mut() {
            Some(last) if last.style == style => last.content.to_mut().push_str(text),
            _ => self.current.push(Span::styled(text.to_string(), style)),
        }
    }

    fn token(&mut self, token: &str, style: Style) {
        let w = UnicodeWidthStr::width(token);
        if self.used > 0 && self.used + w > self.width {
            self.break_row();
            // A space that caused the break is not carried to the next row.
            if token.trim().is_empty() {
                return;
            }
        }
        if w <= self.width {
            self.push(token, style);
            self.used += w;
            return;
        }
        for ch in token.chars() {
            let cw = UnicodeWidthChar::width(ch).unwrap_or(0);
            if self.used > 0 && self.used + cw > self.width {
                self.break_row();
            }
            let mut buf = [0u8; 4];
            self.push(ch.encode_utf8(&mut buf), style);
            self.used += cw;
        }
    }

    fn finish(mut self) -> Vec<Vec<Span<'static>>> {
        if !self.current.is_empty() || self.rows.is_empty() {
            self.rows.push(self.current);
        }
        self.rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Color;

    fn text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn wraps_at_word_boundaries() {
        let rows = wrap_line(&Line::raw("hello world foo"), 11);
        let texts: Vec<String> = rows.iter().map(|l| text(l).trim_end().to_string()).collect();
        assert_eq!(texts, vec!["hello", "world foo"]);
    }

    #[test]
    fn long_words_split_by_character() {
        let rows = wrap_line(&Line::raw("abcdefghij"), 4);
        let texts: Vec<String> = rows.iter().map(text).collect();
        assert_eq!(texts, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn wide_characters_count_double() {
        let rows = wrap_line(&Line::raw("🤖🤖🤖"), 4);
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn styles_survive_the_break() {
        let red = Style::default().fg(Color::Red);
        let line = Line::from(vec![Span::raw("aa "), Span::styled("bbbb cc", red)]);
        let rows = wrap_line(&line, 8);
        assert_eq!(rows.len(), 2);
        assert_eq!(text(&rows[1]), "cc");
        assert_eq!(rows[1].spans[0].style, red);
    }

    #[test]
    fn blank_lines_are_kept() {
        let rows = wrap_lines(&[Line::default(), Line::raw("x")], 10);
        assert_eq!(rows.len(), 2);
        assert!(rows[0].spans.is_empty());
    }
}
