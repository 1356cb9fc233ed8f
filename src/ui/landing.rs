//! Text shown in the notebook pane when no notebook is open.

use ratatui::text::{Line, Span};

use crate::core::{discovery::NotebookEntry, error::BrowseError};

use super::theme::Theme;

/// Welcome page: title, a short introduction, and the notebook names.
pub fn landing_lines(title: &str, entries: &[NotebookEntry], open_key: &str) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::styled(title.to_string(), Theme::heading_style(1)),
        Line::default(),
        Line::raw("Each notebook below is one project: its write-up, its code, and"),
        Line::raw("the results it produced."),
        Line::raw(format!(
            "Select one on the left and press {open_key} to read it. Code cells start"
        )),
        Line::raw("collapsed; expand them to see the source and outputs."),
        Line::default(),
        Line::styled(format!("Notebooks ({})", entries.len()), Theme::heading_style(2)),
    ];
    lines.extend(entries.iter().map(|entry| {
        Line::from(vec![
            Span::styled("• ", Theme::meta_style()),
            Span::styled(entry.stem.clone(), Theme::entry_style()),
        ])
    }));
    lines
}

/// Inline notice for a recoverable error.
pub fn notice_lines(err: &BrowseError, rescan_key: &str) -> Vec<Line<'static>> {
    let hint = match err {
        BrowseError::Parse { .. } => "Pick another notebook from the list.".to_string(),
        BrowseError::NoNotebooks { .. } | BrowseError::ReadDir { .. } => {
            format!("Add notebooks to the directory and press {rescan_key} to rescan.")
        }
    };
    vec![
        Line::styled(capitalise(err.kind_label()), Theme::notice_style()),
        Line::default(),
        Line::styled(err.to_string(), Theme::error_style()),
        Line::default(),
        Line::styled(hint, Theme::meta_style()),
    ]
}

fn capitalise(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn plain(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn landing_lists_every_notebook() {
        let entries: Vec<NotebookEntry> = ["knn", "svm"]
            .iter()
            .map(|stem| NotebookEntry {
                name: format!("{stem}.ipynb"),
                stem: stem.to_string(),
                path: PathBuf::from(format!("{stem}.ipynb")),
                size: 0,
                modified: None,
            })
            .collect();
        let lines = landing_lines("Portfolio", &entries, "Enter");
        assert_eq!(plain(&lines[0]), "Portfolio");
        assert!(lines.iter().any(|l| plain(l).contains("press Enter")));
        let tail: Vec<String> = lines[lines.len() - 3..].iter().map(plain).collect();
        assert_eq!(tail, ["Notebooks (2)", "• knn", "• svm"]);
    }

    #[test]
    fn empty_directory_notice() {
        let err = BrowseError::NoNotebooks {
            dir: PathBuf::from("notebooks"),
        };
        let lines = notice_lines(&err, "r");
        assert_eq!(plain(&lines[0]), "No files found");
        assert!(plain(&lines[4]).contains("press r"));
    }
}
