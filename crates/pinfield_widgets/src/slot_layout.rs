//! Slot row layout solver
//!
//! Positions N character cells plus their underlines inside a
//! container. The solve is a pure function of (container size, digit
//! count, spacing): cells prefer to fill the height at a fixed 3:4
//! width:height aspect, fall back to dividing the width when the row
//! would overflow, and the whole row is centered by splitting the
//! leftover horizontal slack.

use pinfield_core::{Rect, Size};

/// Cell width as a fraction of cell height
pub const CELL_ASPECT_RATIO: f32 = 0.75;

/// Label font size as a fraction of cell height
pub const FONT_SCALE: f32 = 0.8;

/// Height of the underline bar beneath each cell
pub const UNDERLINE_HEIGHT: f32 = 4.0;

/// Default gap around and between cells
pub const DEFAULT_SPACING: f32 = 8.0;

/// Solved geometry for a slot row
///
/// Holds everything needed to place cell `i` without re-solving:
/// per-index rects are derived on demand.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SlotGeometry {
    /// Container size the solve ran against
    pub container: Size,
    /// Number of cells
    pub count: usize,
    /// Size of each character cell
    pub cell: Size,
    /// Gap around and between cells
    pub spacing: f32,
    /// Left edge of the first gap (centers the row)
    pub leading: f32,
    /// Font size for slot labels
    pub font_size: f32,
}

impl SlotGeometry {
    /// Solve the row layout for a container
    pub fn solve(container: Size, count: usize, spacing: f32) -> Self {
        if count == 0 || container.is_empty() {
            return Self {
                container,
                count,
                spacing,
                ..Default::default()
            };
        }

        let n = count as f32;
        let gaps = spacing * (n + 1.0);

        // Height-first: fill the vertical budget at the fixed aspect
        let mut cell_h = container.height;
        let mut cell_w = cell_h * CELL_ASPECT_RATIO;

        // Fall back to dividing the width when the row would overflow
        if n * cell_w + gaps > container.width {
            cell_w = ((container.width - gaps) / n).max(0.0);
            cell_h = cell_w / CELL_ASPECT_RATIO;
        }

        let slack = (container.width - (n * cell_w + gaps)).max(0.0);

        Self {
            container,
            count,
            cell: Size::new(cell_w, cell_h),
            spacing,
            leading: slack / 2.0,
            font_size: cell_h * FONT_SCALE,
        }
    }

    /// Whether the row has no visible cells
    pub fn is_empty(&self) -> bool {
        self.count == 0 || self.cell.is_empty()
    }

    /// The character cell rect at `index`, bottom-anchored in the
    /// container above the underline
    pub fn cell_rect(&self, index: usize) -> Rect {
        debug_assert!(index < self.count.max(1));
        let x = self.leading + self.spacing + index as f32 * (self.cell.width + self.spacing);
        let y = self.container.height - self.cell.height;
        Rect::new(x, y, self.cell.width, self.cell.height)
    }

    /// The underline rect at `index`: a fixed-height bar spanning the
    /// cell's width, anchored to the container bottom
    pub fn underline_rect(&self, index: usize) -> Rect {
        let cell = self.cell_rect(index);
        let height = UNDERLINE_HEIGHT.min(self.container.height);
        Rect::new(
            cell.x(),
            self.container.height - height,
            cell.width(),
            height,
        )
    }

    /// Total width occupied by cells and gaps
    pub fn row_width(&self) -> f32 {
        self.count as f32 * self.cell.width + self.spacing * (self.count as f32 + 1.0)
    }
}
