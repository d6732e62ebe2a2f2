//! Ready made grid types for the common node index widths.
//!
//! The index type bounds how many cells the grid can address: a `u8` grid
//! tops out at 255 cells, `u16` at 65535 and `u32` at just over 4 billion.
//! Smaller indices keep the passage graph compact.

use crate::errors::Result;
use crate::grid::RectGrid;
use crate::units::{ColumnsCount, RowsCount};

pub type SmallRectGrid = RectGrid<u8>;
pub type MediumRectGrid = RectGrid<u16>;
pub type LargeRectGrid = RectGrid<u32>;

pub fn small_rect_grid(rows: RowsCount, columns: ColumnsCount) -> Result<SmallRectGrid> {
    SmallRectGrid::new(rows, columns)
}

pub fn medium_rect_grid(rows: RowsCount, columns: ColumnsCount) -> Result<MediumRectGrid> {
    MediumRectGrid::new(rows, columns)
}

pub fn large_rect_grid(rows: RowsCount, columns: ColumnsCount) -> Result<LargeRectGrid> {
    LargeRectGrid::new(rows, columns)
}
