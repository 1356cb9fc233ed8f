//! Clean up text that was written for a real terminal.
//!
//! Ratatui drops control characters, so tabs vanish and escape sequences
//! leave their printable tail behind. Everything shown in a cell goes
//! through here first.

use unicode_width::UnicodeWidthChar;

/// Columns between tab stops.
pub const TAB_WIDTH: usize = 4;

/// Replace each tab with spaces up to the next tab stop.
pub fn expand_tabs(line: &str) -> String {
    if !line.contains('\t') {
        return line.to_string();
    }
    let mut out = String::with_capacity(line.len() + TAB_WIDTH);
    let mut col = 0;
    for ch in line.chars() {
        if ch == '\t' {
            let pad = TAB_WIDTH - col % TAB_WIDTH;
            out.extend(std::iter::repeat(' ').take(pad));
            col += pad;
        } else {
            out.push(ch);
            col += ch.width().unwrap_or(0);
        }
    }
    out
}

/// Split captured output into the rows a terminal would have left on
/// screen: escape sequences removed, each row reduced to what follows its
/// last carriage return, tabs expanded.
pub fn terminal_lines(text: &str) -> Vec<String> {
    strip_escapes(text)
        .lines()
        .map(|line| {
            let visible = line.rsplit('\r').next().unwrap_or(line);
            expand_tabs(visible)
        })
        .collect()
}

/// Remove CSI (`ESC [ ... final`), OSC (`ESC ] ... BEL` or `ESC \`) and
/// two-byte `ESC x` sequences.
fn strip_escapes(text: &str) -> String {
    if !text.contains('\u{1b}') {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '\u{1b}' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('[') => {
                // Parameters and intermediates run until a byte in @..~.
                for c in chars.by_ref() {
                    if ('@'..='~').contains(&c) {
                        break;
                    }
                }
            }
            Some(']') => {
                while let Some(c) = chars.next() {
                    if c == '\u{7}' {
                        break;
                    }
                    if c == '\u{1b}' && chars.peek() == Some(&'\\') {
                        chars.next();
                        break;
                    }
                }
            }
            _ => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tabs_pad_to_the_next_stop() {
        assert_eq!(expand_tabs("\treturn 1"), "    return 1");
        assert_eq!(expand_tabs("ab\tc"), "ab  c");
        assert_eq!(expand_tabs("\t\tx"), "        x");
        assert_eq!(expand_tabs("plain"), "plain");
    }

    #[test]
    fn colour_codes_are_removed() {
        assert_eq!(terminal_lines("\u{1b}[31mwarn\u{1b}[0m\n"), vec!["warn"]);
        assert_eq!(
            terminal_lines("\u{1b}[1;32mok\u{1b}[0m done\n\u{1b}]0;title\u{7}next"),
            vec!["ok done", "next"]
        );
    }

    #[test]
    fn carriage_returns_keep_the_last_redraw() {
        assert_eq!(terminal_lines("Epoch 1\r 10%\r 50%\r100%\n"), vec!["100%"]);
        assert_eq!(
            terminal_lines("Epoch 1/2\n\r 5/5 [===]\nEpoch 2/2\r\n"),
            vec!["Epoch 1/2", " 5/5 [===]", "Epoch 2/2"]
        );
    }
}
