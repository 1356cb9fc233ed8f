//! Lists the notebook files inside one directory.
//!
//! The listing is flat (no recursion) and uses the [`ignore`] walker only for
//! its hidden-file filter and name-sorted iteration. Ignore files are not
//! consulted: a notebook is listed even if a `.gitignore` mentions it.
//! Symlinks are followed, so a link to a notebook is listed like the file
//! itself; a dangling link is skipped.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use ignore::WalkBuilder;

use super::error::{BrowseError, Result};

/// Extension used when the config does not name one.
pub const DEFAULT_EXTENSION: &str = "ipynb";

/// Configuration knobs for the listing.
#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    /// File extension without the dot, compared case-insensitively.
    pub extension: String,
    /// Include dot-prefixed files.
    pub show_hidden: bool,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            extension: DEFAULT_EXTENSION.to_string(),
            show_hidden: false,
        }
    }
}

/// One row of the notebook listing.
#[derive(Debug, Clone)]
pub struct NotebookEntry {
    /// Full file name, e.g. `"01-linear-regression.ipynb"`.
    pub name: String,
    /// File name without extension; identifies the notebook in the UI.
    pub stem: String,
    pub path: PathBuf,
    pub size: u64,
    pub modified: Option<SystemTime>,
}

impl NotebookEntry {
    fn from_path(path: &Path) -> std::io::Result<Self> {
        let meta = std::fs::metadata(path)?;
        Ok(Self {
            name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            stem: path
                .file_stem()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            path: path.to_path_buf(),
            size: meta.len(),
            modified: meta.modified().ok(),
        })
    }
}

/// List the notebooks directly inside `dir`, sorted by file name.
///
/// Returns [`BrowseError::NoNotebooks`] when nothing matches and
/// [`BrowseError::ReadDir`] when `dir` cannot be listed at all.
pub fn list_notebooks(dir: &Path, options: &DiscoveryOptions) -> Result<Vec<NotebookEntry>> {
    // Probe first so an unreadable directory is reported distinctly from an
    // empty one; the walker would otherwise swallow the error.
    std::fs::read_dir(dir).map_err(|source| BrowseError::ReadDir {
        dir: dir.to_path_buf(),
        source,
    })?;

    let walker = WalkBuilder::new(dir)
        .max_depth(Some(1))
        .follow_links(true)
        .standard_filters(false)
        .hidden(!options.show_hidden)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    let mut entries = Vec::new();
    for entry in walker.flatten() {
        let path = entry.path();
        if path == dir || !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }
        if !has_extension(path, &options.extension) {
            continue;
        }
        match NotebookEntry::from_path(path) {
            Ok(meta) => entries.push(meta),
            Err(err) => tracing::warn!("skipping {}: {err}", path.display()),
        }
    }

    if entries.is_empty() {
        return Err(BrowseError::NoNotebooks {
            dir: dir.to_path_buf(),
        });
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    tracing::debug!("found {} notebooks in {}", entries.len(), dir.display());
    Ok(entries)
}

fn has_extension(path: &Path, wanted: &str) -> bool {
    let wanted = wanted.trim_start_matches('.');
    path.extension()
        .map(|e| e.to_string_lossy().eq_ignore_ascii_case(wanted))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), "{}").unwrap();
    }

    fn names(entries: &[NotebookEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn empty_directory_reports_no_files_found() {
        let tmp = tempfile::tempdir().unwrap();
        let err = list_notebooks(tmp.path(), &DiscoveryOptions::default()).unwrap_err();
        assert!(matches!(err, BrowseError::NoNotebooks { .. }));
        assert_eq!(err.kind_label(), "no files found");
    }

    #[test]
    fn directory_without_notebooks_reports_no_files_found() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "readme.md");
        touch(tmp.path(), "data.csv");
        let err = list_notebooks(tmp.path(), &DiscoveryOptions::default()).unwrap_err();
        assert!(matches!(err, BrowseError::NoNotebooks { .. }));
    }

    #[test]
    fn missing_directory_is_a_read_error() {
        let tmp = tempfile::tempdir().unwrap();
        let gone = tmp.path().join("nope");
        let err = list_notebooks(&gone, &DiscoveryOptions::default()).unwrap_err();
        assert!(matches!(err, BrowseError::ReadDir { .. }));
    }

    #[test]
    fn lists_only_notebooks_sorted_by_name() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "k-means.ipynb");
        touch(tmp.path(), "decision-trees.ipynb");
        touch(tmp.path(), "notes.txt");
        touch(tmp.path(), "NLP.IPYNB");
        fs::create_dir(tmp.path().join("folder.ipynb")).unwrap();
        fs::create_dir(tmp.path().join("nested")).unwrap();
        touch(&tmp.path().join("nested"), "inner.ipynb");

        let entries = list_notebooks(tmp.path(), &DiscoveryOptions::default()).unwrap();
        // Byte order: uppercase sorts before lowercase.
        assert_eq!(
            names(&entries),
            vec!["NLP.IPYNB", "decision-trees.ipynb", "k-means.ipynb"]
        );
        assert_eq!(entries[1].stem, "decision-trees");
        assert_eq!(entries[1].size, 2);
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_notebooks_are_listed() {
        use std::os::unix::fs::symlink;

        let tmp = tempfile::tempdir().unwrap();
        let shared = tempfile::tempdir().unwrap();
        touch(shared.path(), "cnn.ipynb");
        symlink(shared.path().join("cnn.ipynb"), tmp.path().join("cnn.ipynb")).unwrap();
        symlink(tmp.path().join("gone.ipynb"), tmp.path().join("dangling.ipynb")).unwrap();
        touch(tmp.path(), "rnn.ipynb");

        let entries = list_notebooks(tmp.path(), &DiscoveryOptions::default()).unwrap();
        assert_eq!(names(&entries), vec!["cnn.ipynb", "rnn.ipynb"]);
        assert_eq!(entries[0].size, 2);
    }

    #[test]
    fn hidden_notebooks_follow_the_option() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), ".scratch.ipynb");
        touch(tmp.path(), "svm.ipynb");

        let default = list_notebooks(tmp.path(), &DiscoveryOptions::default()).unwrap();
        assert_eq!(names(&default), vec!["svm.ipynb"]);

        let opts = DiscoveryOptions {
            show_hidden: true,
            ..DiscoveryOptions::default()
        };
        let all = list_notebooks(tmp.path(), &opts).unwrap();
        assert_eq!(names(&all), vec![".scratch.ipynb", "svm.ipynb"]);
    }

    #[test]
    fn custom_extension_accepts_leading_dot() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "a.json");
        touch(tmp.path(), "b.ipynb");
        let opts = DiscoveryOptions {
            extension: ".json".into(),
            show_hidden: false,
        };
        let entries = list_notebooks(tmp.path(), &opts).unwrap();
        assert_eq!(names(&entries), vec!["a.json"]);
    }
}
