//! User configuration: key bindings plus listing and rendering settings.
//!
//! Stored as a simple key-value text file at
//! `$XDG_CONFIG_HOME/nb-browser/config.toml` (default
//! `~/.config/nb-browser/config.toml`). Unknown keys and unparsable values are
//! ignored so a hand-edited file never stops the browser from starting.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::core::discovery::{DiscoveryOptions, DEFAULT_EXTENSION};

/// Title shown on the landing page when none is configured.
pub const DEFAULT_TITLE: &str = "Machine Learning Projects Portfolio";

// ───────────────────────────────────────── actions ───────────

/// All configurable user actions in the browser view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    MoveUp,
    MoveDown,
    Open,
    SwitchPane,
    ToggleCell,
    ExpandAll,
    CollapseAll,
    Rescan,
    OpenSettings,
    Quit,
}

impl Action {
    /// Ordered list of all actions (used for the controls listing).
    pub const ALL: &[Action] = &[
        Action::MoveUp,
        Action::MoveDown,
        Action::Open,
        Action::SwitchPane,
        Action::ToggleCell,
        Action::ExpandAll,
        Action::CollapseAll,
        Action::Rescan,
        Action::OpenSettings,
        Action::Quit,
    ];

    /// Human-readable label for the UI.
    pub fn label(self) -> &'static str {
        match self {
            Action::MoveUp => "Move Up",
            Action::MoveDown => "Move Down",
            Action::Open => "Open Notebook",
            Action::SwitchPane => "Switch Pane",
            Action::ToggleCell => "Expand / Collapse Code",
            Action::ExpandAll => "Expand All Code",
            Action::CollapseAll => "Collapse All Code",
            Action::Rescan => "Rescan Directory",
            Action::OpenSettings => "Open Settings",
            Action::Quit => "Quit",
        }
    }

    /// Key used in the config file.
    fn config_key(self) -> &'static str {
        match self {
            Action::MoveUp => "move_up",
            Action::MoveDown => "move_down",
            Action::Open => "open",
            Action::SwitchPane => "switch_pane",
            Action::ToggleCell => "toggle_cell",
            Action::ExpandAll => "expand_all",
            Action::CollapseAll => "collapse_all",
            Action::Rescan => "rescan",
            Action::OpenSettings => "open_settings",
            Action::Quit => "quit",
        }
    }

    fn from_config_key(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|a| a.config_key() == s)
    }
}

// ───────────────────────────────────────── key bind ──────────

/// A key code plus the modifiers that must be held.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyBind {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

const MODIFIER_MASK: KeyModifiers = KeyModifiers::CONTROL
    .union(KeyModifiers::ALT)
    .union(KeyModifiers::SHIFT);

impl KeyBind {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    /// Does this binding match a key event?  Only CTRL/ALT/SHIFT are
    /// compared. Shift is ignored for character keys since terminals report
    /// `?` or `E` with or without it.
    pub fn matches(&self, event: KeyEvent) -> bool {
        let mut mask = MODIFIER_MASK;
        if matches!(event.code, KeyCode::Char(_)) {
            mask.remove(KeyModifiers::SHIFT);
        }
        self.code == event.code && (self.modifiers & mask) == (event.modifiers & mask)
    }

    /// User-friendly display string (e.g. `"Alt+↑"`, `"Ctrl+c"`, `"q"`).
    pub fn display(&self) -> String {
        self.render(true)
    }

    /// Serialise to config-file format (e.g. `"Alt+Up"`, `"Ctrl+c"`, `"q"`).
    fn to_config_string(&self) -> String {
        self.render(false)
    }

    fn render(&self, pretty: bool) -> String {
        let mut s = String::new();
        for (flag, prefix) in [
            (KeyModifiers::CONTROL, "Ctrl+"),
            (KeyModifiers::ALT, "Alt+"),
            (KeyModifiers::SHIFT, "Shift+"),
        ] {
            if self.modifiers.contains(flag) {
                s.push_str(prefix);
            }
        }
        let key = match (self.code, pretty) {
            (KeyCode::Char(' '), _) => "Space".to_string(),
            (KeyCode::Char(c), _) => c.to_string(),
            (KeyCode::Up, true) => "↑".into(),
            (KeyCode::Down, true) => "↓".into(),
            (KeyCode::Left, true) => "←".into(),
            (KeyCode::Right, true) => "→".into(),
            (KeyCode::PageUp, true) => "PgUp".into(),
            (KeyCode::PageDown, true) => "PgDn".into(),
            (KeyCode::F(n), _) => format!("F{n}"),
            (other, _) => format!("{other:?}"),
        };
        s.push_str(&key);
        s
    }

    /// Parse a key string like `"Ctrl+c"`, `"Alt+Up"`, `"q"`, `"Enter"`.
    fn parse(s: &str) -> Option<Self> {
        let mut modifiers = KeyModifiers::NONE;
        let (prefix, key_part) = match s.rsplit_once('+') {
            // A bare "+" or "Ctrl++" binds the plus key itself.
            Some((prefix, "")) => (prefix.strip_suffix('+').unwrap_or(prefix), "+"),
            Some((prefix, key)) => (prefix, key),
            None => ("", s),
        };

        for part in prefix.split('+').filter(|p| !p.is_empty()) {
            match part.to_lowercase().as_str() {
                "ctrl" => modifiers |= KeyModifiers::CONTROL,
                "alt" => modifiers |= KeyModifiers::ALT,
                "shift" => modifiers |= KeyModifiers::SHIFT,
                _ => return None,
            }
        }

        let code = match key_part.to_lowercase().as_str() {
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "enter" | "return" => KeyCode::Enter,
            "esc" | "escape" => KeyCode::Esc,
            "tab" => KeyCode::Tab,
            "backspace" | "bksp" => KeyCode::Backspace,
            "delete" | "del" => KeyCode::Delete,
            "home" => KeyCode::Home,
            "end" => KeyCode::End,
            "pageup" | "pgup" => KeyCode::PageUp,
            "pagedown" | "pgdn" => KeyCode::PageDown,
            "space" => KeyCode::Char(' '),
            lower if lower.starts_with('f') && lower.len() > 1 => {
                KeyCode::F(lower[1..].parse().ok()?)
            }
            _ => {
                // Single characters keep their case: `E` and `e` differ.
                let mut chars = key_part.chars();
                let c = chars.next()?;
                if chars.next().is_some() {
                    return None;
                }
                KeyCode::Char(c)
            }
        };

        Some(KeyBind { code, modifiers })
    }
}

// ───────────────────────────────────────── config ────────────

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bindings: HashMap<Action, Vec<KeyBind>>,
    /// Notebook file extension, without the dot.
    pub extension: String,
    /// List dot-prefixed notebooks.
    pub show_hidden: bool,
    /// Render precomputed outputs under expanded code cells.
    pub show_outputs: bool,
    /// Number the source lines of expanded code cells.
    pub code_line_numbers: bool,
    /// Landing-page title.
    pub title: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bindings: Self::default_bindings(),
            extension: DEFAULT_EXTENSION.to_string(),
            show_hidden: false,
            show_outputs: true,
            code_line_numbers: false,
            title: DEFAULT_TITLE.to_string(),
        }
    }
}

impl AppConfig {
    /// Built-in keybindings.
    pub fn default_bindings() -> HashMap<Action, Vec<KeyBind>> {
        use Action::*;
        use KeyCode::*;
        let n = KeyModifiers::NONE;
        let mut m = HashMap::new();

        m.insert(MoveUp, vec![KeyBind::new(Up, n), KeyBind::new(Char('k'), n)]);
        m.insert(MoveDown, vec![KeyBind::new(Down, n), KeyBind::new(Char('j'), n)]);
        m.insert(Open, vec![KeyBind::new(Enter, n), KeyBind::new(Right, n)]);
        m.insert(SwitchPane, vec![KeyBind::new(Tab, n)]);
        m.insert(ToggleCell, vec![KeyBind::new(Char(' '), n)]);
        m.insert(ExpandAll, vec![KeyBind::new(Char('e'), n)]);
        m.insert(CollapseAll, vec![KeyBind::new(Char('c'), n)]);
        m.insert(Rescan, vec![KeyBind::new(Char('r'), n)]);
        m.insert(OpenSettings, vec![KeyBind::new(Char('?'), n)]);
        m.insert(Quit, vec![KeyBind::new(Char('q'), n)]);

        m
    }

    /// Listing options derived from this config.
    pub fn discovery_options(&self) -> DiscoveryOptions {
        DiscoveryOptions {
            extension: self.extension.clone(),
            show_hidden: self.show_hidden,
        }
    }

    /// Find the action that matches a key event.  When multiple bindings
    /// match, the one with the most modifiers wins.
    pub fn match_key(&self, event: KeyEvent) -> Option<Action> {
        self.bindings
            .iter()
            .flat_map(|(&action, binds)| binds.iter().map(move |b| (action, b)))
            .filter(|(_, bind)| bind.matches(event))
            .max_by_key(|(_, bind)| bind.modifiers.bits().count_ones())
            .map(|(action, _)| action)
    }

    /// Add a binding for `action`, removing the key from every other action.
    pub fn add_binding(&mut self, action: Action, bind: KeyBind) {
        for binds in self.bindings.values_mut() {
            binds.retain(|b| b != &bind);
        }
        self.bindings.entry(action).or_default().push(bind);
    }

    /// Format the binding list for a given action (e.g. `"↑/k"`).
    pub fn display_bindings(&self, action: Action) -> String {
        match self.bindings.get(&action) {
            Some(binds) if !binds.is_empty() => {
                binds.iter().map(KeyBind::display).collect::<Vec<_>>().join("/")
            }
            _ => "unbound".into(),
        }
    }

    /// First binding for `action`, for inline hints.
    pub fn short_binding(&self, action: Action) -> String {
        match self.bindings.get(&action).and_then(|b| b.first()) {
            Some(bind) => bind.display(),
            None => "?".into(),
        }
    }

    /// Build the status-bar hint string from current bindings.
    pub fn status_bar_hint(&self) -> String {
        format!(
            "{}: open | {}: pane | {}: code | {}: rescan | {}: settings | {}: quit",
            self.short_binding(Action::Open),
            self.short_binding(Action::SwitchPane),
            self.short_binding(Action::ToggleCell),
            self.short_binding(Action::Rescan),
            self.short_binding(Action::OpenSettings),
            self.short_binding(Action::Quit),
        )
    }

    // ── persistence ─────────────────────────────────────────────

    /// Load config from the default location, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(&config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_config_str(&contents),
            Err(err) => {
                tracing::debug!("using default config ({}: {err})", path.display());
                Self::default()
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.serialise())?;
        Ok(())
    }

    fn from_config_str(s: &str) -> Self {
        let mut config = Self::default();

        for line in s.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('[') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let value = value.trim();

            match key {
                "extension" => {
                    let ext = value.trim_matches('"').trim_start_matches('.');
                    if !ext.is_empty() {
                        config.extension = ext.to_string();
                    }
                    continue;
                }
                "show_hidden" => {
                    config.show_hidden = value == "true";
                    continue;
                }
                "show_outputs" => {
                    config.show_outputs = value == "true";
                    continue;
                }
                "code_line_numbers" => {
                    config.code_line_numbers = value == "true";
                    continue;
                }
                "title" => {
                    let title = value.trim_matches('"');
                    if !title.is_empty() {
                        config.title = title.to_string();
                    }
                    continue;
                }
                _ => {}
            }

            let Some(action) = Action::from_config_key(key) else {
                continue;
            };

            let parsed: Vec<KeyBind> = value
                .split(',')
                .filter_map(|part| KeyBind::parse(part.trim().trim_matches('"')))
                .collect();
            if parsed.is_empty() {
                continue;
            }
            // A key bound in the file moves away from its default action.
            config.bindings.insert(action, Vec::new());
            for bind in parsed {
                config.add_binding(action, bind);
            }
        }

        config
    }

    fn serialise(&self) -> String {
        let mut lines = vec![
            "# nb-browser configuration".to_string(),
            String::new(),
            "# Listing".to_string(),
            format!("extension = \"{}\"", self.extension),
            format!("show_hidden = {}", self.show_hidden),
            String::new(),
            "# Rendering".to_string(),
            format!("show_outputs = {}", self.show_outputs),
            format!("code_line_numbers = {}", self.code_line_numbers),
            format!("title = \"{}\"", self.title),
            String::new(),
            "# Key bindings".to_string(),
            "# Format: action = Key1, Key2, ...".to_string(),
            "# Modifiers: Ctrl+, Alt+, Shift+ (prefix)".to_string(),
            "# Special keys: Up, Down, Left, Right, Enter, Esc, Tab,".to_string(),
            "#   Backspace, Delete, Home, End, PageUp, PageDown, Space, F1-F12".to_string(),
            String::new(),
        ];

        for &action in Action::ALL {
            if let Some(binds) = self.bindings.get(&action) {
                let keys: Vec<String> = binds.iter().map(KeyBind::to_config_string).collect();
                lines.push(format!("{} = {}", action.config_key(), keys.join(", ")));
            }
        }
        lines.push(String::new());
        lines.join("\n")
    }
}

/// Return the config file path (`$XDG_CONFIG_HOME/nb-browser/config.toml`).
pub fn config_path() -> PathBuf {
    let config_dir = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            PathBuf::from(home).join(".config")
        });
    config_dir.join("nb-browser").join("config.toml")
}
