//! Planar positions and the square-grid cell tessellation.
//!
//! Agents live on a flat rectangular area measured in metres from the
//! bottom-left corner.  The grid is row-major:
//!
//! ```text
//! cells_per_row = ceil(width / cell_size)
//! cell          = floor(x / cell_size) + cells_per_row * floor(y / cell_size)
//! ```

use crate::{CellId, MacError, MacResult};

/// A point on the simulated area, in metres.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    #[inline]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance in metres.
    #[inline]
    pub fn distance(self, other: Position) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.1}, {:.1})", self.x, self.y)
    }
}

/// Fixed tessellation of the area into square cells.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellGrid {
    /// Side of one square cell, metres.
    pub cell_size: f32,
    /// Width of the whole area, metres.  Only the row stride depends on it.
    pub width: f32,
}

impl CellGrid {
    pub fn new(cell_size: f32, width: f32) -> MacResult<Self> {
        let grid = Self { cell_size, width };
        grid.validate()?;
        Ok(grid)
    }

    pub fn validate(&self) -> MacResult<()> {
        if !(self.cell_size > 0.0) || !(self.width > 0.0) {
            return Err(MacError::Config(format!(
                "cell grid needs positive cell_size and width, got {} / {}",
                self.cell_size, self.width
            )));
        }
        Ok(())
    }

    /// Number of cells along one row.
    #[inline]
    pub fn cells_per_row(&self) -> u32 {
        (self.width / self.cell_size).ceil().max(1.0) as u32
    }

    /// The cell containing `pos`.  Negative coordinates clamp to the border;
    /// rows far below the area saturate at `CellId(u32::MAX)`.
    pub fn cell_of(&self, pos: Position) -> CellId {
        let per_row = self.cells_per_row();
        let col = (pos.x.max(0.0) / self.cell_size).floor() as u32;
        let row = (pos.y.max(0.0) / self.cell_size).floor() as u32;
        // Points exactly on the right edge belong to the last column.
        let col = col.min(per_row - 1);
        CellId(per_row.saturating_mul(row).saturating_add(col))
    }
}
