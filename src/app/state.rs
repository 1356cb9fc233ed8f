//! Central application state.
//!
//! All mutable state lives here so that the rest of the app can be pure
//! functions over `&AppState` (rendering) or `&mut AppState` (event handling).

use std::collections::HashSet;
use std::path::PathBuf;

use ratatui::layout::Rect;

use crate::config::AppConfig;
use crate::core::{
    discovery::NotebookEntry,
    error::BrowseError,
    notebook::{CellKind, Notebook},
};
use crate::ui::{
    notebook_list::NotebookListState,
    notebook_view::{render_cells, CellBlock, NotebookViewState, RenderOptions},
};

/// Which view / overlay is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActiveView {
    #[default]
    Browser,
    SettingsMenu,
    ControlsList,
}

/// Which pane receives navigation keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaneFocus {
    #[default]
    List,
    Notebook,
}

/// The notebook currently shown, with its per-session view state.
pub struct LoadedNotebook {
    /// Index into [`AppState::entries`] at load time.
    pub entry_index: usize,
    pub path: PathBuf,
    pub notebook: Notebook,
    /// Indices of code cells the user expanded.
    pub expanded: HashSet<usize>,
    /// Rendered cells; rebuilt whenever `expanded` or the options change.
    pub blocks: Vec<CellBlock>,
}

impl LoadedNotebook {
    pub fn new(
        entry_index: usize,
        path: PathBuf,
        notebook: Notebook,
        options: &RenderOptions,
    ) -> Self {
        let mut loaded = Self {
            entry_index,
            path,
            notebook,
            expanded: HashSet::new(),
            blocks: Vec::new(),
        };
        loaded.rerender(options);
        loaded
    }

    pub fn rerender(&mut self, options: &RenderOptions) {
        self.blocks = render_cells(&self.notebook, &self.expanded, options);
    }

    /// Expand or collapse cell `index` if it is a code cell.
    /// Returns `true` when something changed.
    pub fn toggle(&mut self, index: usize) -> bool {
        match self.notebook.cells.get(index) {
            Some(cell) if cell.kind() == CellKind::Code => {
                if !self.expanded.remove(&index) {
                    self.expanded.insert(index);
                }
                true
            }
            _ => false,
        }
    }

    pub fn expand_all(&mut self) {
        self.expanded = self
            .notebook
            .cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.kind() == CellKind::Code)
            .map(|(i, _)| i)
            .collect();
    }

    pub fn collapse_all(&mut self) {
        self.expanded.clear();
    }
}

/// Top-level application state.
pub struct AppState {
    /// Directory being browsed.
    pub dir: PathBuf,
    /// Current listing, sorted by file name.
    pub entries: Vec<NotebookEntry>,
    /// Widget-level state for the list (selection, scroll).
    pub list_state: NotebookListState,
    /// Widget-level state for the notebook pane (cell cursor, scroll).
    pub view_state: NotebookViewState,
    pub loaded: Option<LoadedNotebook>,
    /// Last recoverable error, shown inline in the notebook pane.
    pub error: Option<BrowseError>,
    pub pane_focus: PaneFocus,
    /// Which view / overlay is currently shown.
    pub active_view: ActiveView,
    pub config: AppConfig,
    /// Where settings changes are saved; `None` keeps them in memory.
    pub config_file: Option<PathBuf>,
    /// Currently highlighted item in the settings menu.
    pub settings_selected: usize,
    /// Currently highlighted row in the controls list.
    pub controls_selected: usize,
    /// An optional status message shown in the bottom bar.
    pub status_message: Option<String>,
    /// Pane rectangles from the last draw, for mouse hit-testing.
    pub list_area: Rect,
    pub notebook_area: Rect,
    /// Controls the main event loop.
    pub should_quit: bool,
}

impl AppState {
    pub fn new(dir: PathBuf, config: AppConfig) -> Self {
        Self {
            dir,
            entries: Vec::new(),
            list_state: NotebookListState::default(),
            view_state: NotebookViewState::default(),
            loaded: None,
            error: None,
            pane_focus: PaneFocus::default(),
            active_view: ActiveView::default(),
            config,
            config_file: None,
            settings_selected: 0,
            controls_selected: 0,
            status_message: None,
            list_area: Rect::default(),
            notebook_area: Rect::default(),
            should_quit: false,
        }
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            show_outputs: self.config.show_outputs,
            line_numbers: self.config.code_line_numbers,
        }
    }

    /// Re-render the loaded notebook after its expansion set or the
    /// rendering options changed.
    pub fn rerender(&mut self) {
        let options = self.render_options();
        if let Some(loaded) = self.loaded.as_mut() {
            loaded.rerender(&options);
        }
    }

    /// Index of the entry shown in the notebook pane, if any.
    pub fn open_entry(&self) -> Option<usize> {
        self.loaded.as_ref().map(|l| l.entry_index)
    }
}
