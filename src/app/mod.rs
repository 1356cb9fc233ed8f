//! Application state, input handling and the event reader.

pub mod event;
pub mod handler;
pub mod settings;
pub mod state;
