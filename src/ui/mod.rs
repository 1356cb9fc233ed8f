//! Rendering layer: everything that touches Ratatui widgets.
//!
//! Turns parsed notebooks and listings into styled lines and widgets.
//! No filesystem I/O happens here.

pub mod landing;
pub mod layout;
pub mod markdown;
pub mod notebook_list;
pub mod notebook_view;
pub mod popup;
pub mod sanitize;
pub mod theme;
pub mod wrap;
