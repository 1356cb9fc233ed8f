//! Splits the terminal area into panes.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Width of the notebook list pane, in columns.
const LIST_PANE_WIDTH: u16 = 34;

/// Primary screen layout: notebook list on the left, cell view on the
/// right, one-line status bar at the bottom.
pub struct AppLayout {
    pub list_area: Rect,
    pub notebook_area: Rect,
    pub status_area: Rect,
}

impl AppLayout {
    /// Compute the layout from the full terminal area.
    pub fn from_area(area: Rect) -> Self {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(3),    // panes
                Constraint::Length(1), // status bar
            ])
            .split(area);

        // Narrow terminals give the list a third of the width.
        let list_width = LIST_PANE_WIDTH.min(rows[0].width / 3);
        let panes = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(list_width), Constraint::Min(10)])
            .split(rows[0]);

        Self {
            list_area: panes[0],
            notebook_area: panes[1],
            status_area: rows[1],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panes_tile_the_screen() {
        let layout = AppLayout::from_area(Rect::new(0, 0, 120, 40));
        assert_eq!(layout.list_area.width, LIST_PANE_WIDTH);
        assert_eq!(layout.list_area.width + layout.notebook_area.width, 120);
        assert_eq!(layout.status_area.height, 1);
        assert_eq!(layout.status_area.y, 39);
        assert_eq!(layout.notebook_area.height, 39);
    }

    #[test]
    fn narrow_terminal_shrinks_list() {
        let layout = AppLayout::from_area(Rect::new(0, 0, 60, 20));
        assert_eq!(layout.list_area.width, 20);
    }
}
