//! Core logic – notebook discovery, parsing, and the error kinds they raise.
//!
//! Nothing in this module depends on any TUI or rendering crate.

pub mod discovery;
pub mod error;
pub mod notebook;
