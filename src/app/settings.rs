//! Rows of the settings popup.
//!
//! The handler activates them and the popup draws them; toggles write
//! through to the config file when the session has one.

use super::handler;
use super::state::{ActiveView, AppState};

/// One settings row.
pub enum SettingsItem {
    /// Switches to another overlay.
    Submenu {
        label: &'static str,
        view: ActiveView,
    },
    /// On/off flag stored in [`AppConfig`](crate::config::AppConfig).
    Toggle {
        label: &'static str,
        get: fn(&AppState) -> bool,
        set: fn(&mut AppState, bool),
    },
}

impl SettingsItem {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Submenu { label, .. } | Self::Toggle { label, .. } => label,
        }
    }

    /// Current value for toggles, `None` for submenus.
    pub fn value(&self, state: &AppState) -> Option<bool> {
        match self {
            Self::Toggle { get, .. } => Some(get(state)),
            Self::Submenu { .. } => None,
        }
    }
}

/// Settings rows, top to bottom.
pub static SETTINGS_ITEMS: &[SettingsItem] = &[
    SettingsItem::Submenu {
        label: "Controls",
        view: ActiveView::ControlsList,
    },
    SettingsItem::Toggle {
        label: "Show Outputs",
        get: |s| s.config.show_outputs,
        set: |s, v| {
            s.config.show_outputs = v;
            handler::persist_config(s);
            s.rerender();
        },
    },
    SettingsItem::Toggle {
        label: "Code Line Numbers",
        get: |s| s.config.code_line_numbers,
        set: |s, v| {
            s.config.code_line_numbers = v;
            handler::persist_config(s);
            s.rerender();
        },
    },
    SettingsItem::Toggle {
        label: "Show Hidden Notebooks",
        get: |s| s.config.show_hidden,
        set: |s, v| {
            s.config.show_hidden = v;
            handler::persist_config(s);
            // The listing itself changes.
            handler::rescan(s);
        },
    },
];
