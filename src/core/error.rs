//! Recoverable error kinds surfaced to the user as inline messages.
//!
//! None of these end the session: the handler turns them into a notice in
//! the notebook pane and keeps accepting input.

use std::path::PathBuf;

use thiserror::Error;

/// Why a notebook file could not be turned into a [`Notebook`].
///
/// [`Notebook`]: super::notebook::Notebook
#[derive(Error, Debug)]
pub enum ParseFailure {
    #[error("cannot read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed notebook JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported nbformat version {major} (expected 4)")]
    UnsupportedFormat { major: u32 },
}

/// Errors produced while browsing a notebook directory.
#[derive(Error, Debug)]
pub enum BrowseError {
    /// The directory holds no file with the notebook extension.
    #[error("no notebook files found in {}", dir.display())]
    NoNotebooks { dir: PathBuf },

    /// The directory itself could not be listed.
    #[error("cannot read directory {}: {source}", dir.display())]
    ReadDir {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A selected notebook is unreadable or malformed.
    #[error("parse error in {}: {reason}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        reason: ParseFailure,
    },
}

impl BrowseError {
    /// Short label used in the status bar.
    pub fn kind_label(&self) -> &'static str {
        match self {
            BrowseError::NoNotebooks { .. } => "no files found",
            BrowseError::ReadDir { .. } => "directory unreadable",
            BrowseError::Parse { .. } => "parse error",
        }
    }
}

/// Result alias for browser operations.
pub type Result<T> = std::result::Result<T, BrowseError>;
