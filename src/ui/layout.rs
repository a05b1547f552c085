// src/ui/layout.rs
//! Layout computation for the UI panels.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Braille dots per terminal cell, horizontally and vertically.
pub const DOTS_PER_CELL: (u16, u16) = (2, 4);

/// Computed layout areas for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComputedLayout {
    /// Bordered relief panel
    pub relief_block: Rect,
    /// Drawable area inside the border
    pub relief_inner: Rect,
    /// One-line status bar at the bottom
    pub status: Rect,
}

impl ComputedLayout {
    /// Render-target size of the relief in canvas dots.
    pub fn surface_size(&self) -> (u32, u32) {
        let (dx, dy) = DOTS_PER_CELL;
        (
            u32::from(self.relief_inner.width) * u32::from(dx),
            u32::from(self.relief_inner.height) * u32::from(dy),
        )
    }

    /// Whether the terminal cell `(column, row)` lies on the relief.
    pub fn in_relief(&self, column: u16, row: u16) -> bool {
        self.relief_inner.contains((column, row).into())
    }
}

/// Split the terminal into the relief panel and the status line.
pub fn compute_layout(area: Rect) -> ComputedLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);
    let relief_block = chunks[0];
    let relief_inner = Rect {
        x: relief_block.x.saturating_add(1),
        y: relief_block.y.saturating_add(1),
        width: relief_block.width.saturating_sub(2),
        height: relief_block.height.saturating_sub(2),
    };
    ComputedLayout {
        relief_block,
        relief_inner,
        status: chunks[1],
    }
}
