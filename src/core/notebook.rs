//! Notebook model and nbformat 4 parsing.
//!
//! The on-disk JSON is deserialised into private `Raw*` mirrors and then
//! folded into the public [`Notebook`] / [`Cell`] types, which keep only
//! what the browser renders. Cell order is preserved from the file.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use super::error::{BrowseError, ParseFailure, Result};

/// The only nbformat major version we understand.
pub const SUPPORTED_NBFORMAT: u32 = 4;

// ───────────────────────────────────────── model ─────────────

/// A parsed notebook.
#[derive(Debug, Clone)]
pub struct Notebook {
    /// Filename stem; the notebook's identity in the UI.
    pub name: String,
    pub nbformat: u32,
    pub nbformat_minor: u32,
    /// Kernel language, when the metadata records one.
    pub language: Option<String>,
    pub cells: Vec<Cell>,
}

impl Notebook {
    /// Number of cells of each kind, as `(markdown, code, raw)`.
    pub fn kind_counts(&self) -> (usize, usize, usize) {
        self.cells
            .iter()
            .fold((0, 0, 0), |(m, c, r), cell| match cell.kind() {
                CellKind::Markdown => (m + 1, c, r),
                CellKind::Code => (m, c + 1, r),
                CellKind::Raw => (m, c, r + 1),
            })
    }
}

/// Discriminant of a [`Cell`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellKind {
    Markdown,
    Code,
    Raw,
}

/// One unit of notebook content.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Markdown {
        source: String,
    },
    Code {
        source: String,
        execution_count: Option<u32>,
        outputs: Vec<Output>,
    },
    Raw {
        source: String,
    },
}

impl Cell {
    pub fn kind(&self) -> CellKind {
        match self {
            Cell::Markdown { .. } => CellKind::Markdown,
            Cell::Code { .. } => CellKind::Code,
            Cell::Raw { .. } => CellKind::Raw,
        }
    }

    pub fn source(&self) -> &str {
        match self {
            Cell::Markdown { source } | Cell::Code { source, .. } | Cell::Raw { source } => source,
        }
    }
}

/// A precomputed result attached to a code cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    /// `stdout` / `stderr` text.
    Stream { name: String, text: String },
    /// `execute_result` or `display_data`. `text` is the `text/plain`
    /// representation when one exists.
    Data {
        text: Option<String>,
        mime_types: Vec<String>,
    },
    /// A raised exception. The traceback is dropped (it is ANSI-coloured).
    Error { ename: String, evalue: String },
}

// ───────────────────────────────────────── raw json ──────────

/// nbformat stores multi-line strings either whole or as a list of lines.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MultilineText {
    One(String),
    Many(Vec<String>),
}

impl MultilineText {
    fn into_string(self) -> String {
        match self {
            MultilineText::One(s) => s,
            MultilineText::Many(parts) => parts.concat(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawNotebook {
    #[allow(dead_code)]
    nbformat: u32,
    #[serde(default)]
    nbformat_minor: u32,
    #[serde(default)]
    metadata: Value,
    cells: Vec<RawCell>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "cell_type", rename_all = "lowercase")]
enum RawCell {
    Markdown {
        source: MultilineText,
    },
    Code {
        source: MultilineText,
        #[serde(default)]
        execution_count: Option<u32>,
        #[serde(default)]
        outputs: Vec<Value>,
    },
    Raw {
        source: MultilineText,
    },
}

#[derive(Debug, Deserialize)]
#[serde(tag = "output_type", rename_all = "snake_case")]
enum RawOutput {
    Stream {
        #[serde(default)]
        name: String,
        text: MultilineText,
    },
    ExecuteResult {
        #[serde(default)]
        data: BTreeMap<String, Value>,
    },
    #[serde(alias = "update_display_data")]
    DisplayData {
        #[serde(default)]
        data: BTreeMap<String, Value>,
    },
    Error {
        #[serde(default)]
        ename: String,
        #[serde(default)]
        evalue: String,
    },
}

impl From<RawOutput> for Output {
    fn from(raw: RawOutput) -> Self {
        match raw {
            RawOutput::Stream { name, text } => Output::Stream {
                name,
                text: text.into_string(),
            },
            RawOutput::ExecuteResult { data } | RawOutput::DisplayData { data } => {
                let text = data
                    .get("text/plain")
                    .cloned()
                    .and_then(|v| serde_json::from_value::<MultilineText>(v).ok())
                    .map(MultilineText::into_string);
                Output::Data {
                    text,
                    mime_types: data.into_keys().collect(),
                }
            }
            RawOutput::Error { ename, evalue } => Output::Error { ename, evalue },
        }
    }
}

fn convert_outputs(raw: Vec<Value>) -> Vec<Output> {
    raw.into_iter()
        .filter_map(|value| match serde_json::from_value::<RawOutput>(value) {
            Ok(out) => Some(out.into()),
            Err(err) => {
                tracing::debug!("skipping unrecognised output: {err}");
                None
            }
        })
        .collect()
}

impl From<RawCell> for Cell {
    fn from(raw: RawCell) -> Self {
        match raw {
            RawCell::Markdown { source } => Cell::Markdown {
                source: source.into_string(),
            },
            RawCell::Code {
                source,
                execution_count,
                outputs,
            } => Cell::Code {
                source: source.into_string(),
                execution_count,
                outputs: convert_outputs(outputs),
            },
            RawCell::Raw { source } => Cell::Raw {
                source: source.into_string(),
            },
        }
    }
}

fn kernel_language(metadata: &Value) -> Option<String> {
    metadata
        .pointer("/language_info/name")
        .or_else(|| metadata.pointer("/kernelspec/language"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

// ───────────────────────────────────────── entry points ──────

/// Parse notebook JSON held in memory.
pub fn parse_notebook(name: &str, text: &str) -> std::result::Result<Notebook, ParseFailure> {
    let value: Value = serde_json::from_str(text)?;

    if let Some(major) = value.get("nbformat").and_then(Value::as_u64) {
        if major != u64::from(SUPPORTED_NBFORMAT) {
            return Err(ParseFailure::UnsupportedFormat {
                major: u32::try_from(major).unwrap_or(u32::MAX),
            });
        }
    }

    let raw: RawNotebook = serde_json::from_value(value)?;
    Ok(Notebook {
        name: name.to_string(),
        nbformat: SUPPORTED_NBFORMAT,
        nbformat_minor: raw.nbformat_minor,
        language: kernel_language(&raw.metadata),
        cells: raw.cells.into_iter().map(Cell::from).collect(),
    })
}

/// Read and parse the notebook at `path`.
pub fn load_notebook(path: &Path) -> Result<Notebook> {
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let parsed = std::fs::read_to_string(path)
        .map_err(ParseFailure::from)
        .and_then(|text| parse_notebook(&name, &text));

    match parsed {
        Ok(notebook) => {
            tracing::info!(
                "loaded {} ({} cells, nbformat {}.{})",
                path.display(),
                notebook.cells.len(),
                notebook.nbformat,
                notebook.nbformat_minor
            );
            Ok(notebook)
        }
        Err(reason) => {
            tracing::warn!("failed to load {}: {reason}", path.display());
            Err(BrowseError::Parse {
                path: path.to_path_buf(),
                reason,
            })
        }
    }
}
