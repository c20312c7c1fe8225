//! Playfield module - manages the game grid
//!
//! The grid is `visible_rows + HIDDEN_ROWS` tall and `columns` wide. Cells are
//! stored in a flat row-major vector (`y * columns + x`) sized once at
//! construction; the dimensions never change afterwards.
//!
//! Coordinates: `(x, y)` with x growing to the right and y growing downward.
//! Row 0 is the topmost hidden row.

use crate::pieces::{ShapeMatrix, Tetromino};
use crate::types::{Cell, HIDDEN_ROWS, MAX_COLUMNS, MAX_VISIBLE_ROWS};

#[derive(Debug, Clone, PartialEq)]
pub struct Playfield {
    columns: u16,
    visible_rows: u16,
    /// Flat array of cells, row-major order (y * columns + x)
    cells: Vec<Cell>,
}

impl Playfield {
    /// Create an empty playfield with `visible_rows` plus the hidden buffer
    ///
    /// Dimensions above `MAX_VISIBLE_ROWS` / `MAX_COLUMNS` are lowered to them.
    pub fn new(visible_rows: u16, columns: u16) -> Self {
        let visible_rows = visible_rows.min(MAX_VISIBLE_ROWS);
        let columns = columns.min(MAX_COLUMNS);
        let total = (visible_rows + HIDDEN_ROWS) as usize * columns as usize;
        Self {
            columns,
            visible_rows,
            cells: vec![None; total],
        }
    }

    #[inline(always)]
    fn index(&self, x: i16, y: i16) -> Option<usize> {
        if x < 0 || x >= self.columns as i16 || y < 0 || y >= self.total_rows() as i16 {
            return None;
        }
        Some(y as usize * self.columns as usize + x as usize)
    }

    pub fn columns(&self) -> u16 {
        self.columns
    }

    pub fn visible_rows(&self) -> u16 {
        self.visible_rows
    }

    /// Visible rows plus the hidden buffer
    pub fn total_rows(&self) -> u16 {
        self.visible_rows + HIDDEN_ROWS
    }

    /// Get cell at position (x, y)
    /// Returns None if out of bounds
    pub fn get(&self, x: i16, y: i16) -> Option<Cell> {
        self.index(x, y).map(|idx| self.cells[idx])
    }

    /// Set cell at position (x, y)
    /// Returns false if out of bounds
    pub fn set(&mut self, x: i16, y: i16, cell: Cell) -> bool {
        match self.index(x, y) {
            Some(idx) => {
                self.cells[idx] = cell;
                true
            }
            None => false,
        }
    }

    /// Within bounds and empty
    pub fn is_free(&self, x: i16, y: i16) -> bool {
        matches!(self.get(x, y), Some(None))
    }

    /// Whether `shape` anchored at `(x, y)` fits
    ///
    /// Every occupied matrix cell must land inside the grid on an empty cell.
    /// Empty matrix rows and columns may hang outside the grid.
    pub fn is_valid_location(&self, x: i16, y: i16, shape: &ShapeMatrix) -> bool {
        shape
            .cells()
            .all(|(r, c)| self.is_free(x + c as i16, y + r as i16))
    }

    /// Write the piece into the grid
    ///
    /// Returns true when any written cell lies in the hidden rows (top-out).
    /// Cells outside the grid are skipped.
    pub fn lock(&mut self, piece: &Tetromino) -> bool {
        let mut topped_out = false;
        for (x, y) in piece.cells() {
            if self.set(x, y, Some(piece.kind)) && y < HIDDEN_ROWS as i16 {
                topped_out = true;
            }
        }
        topped_out
    }

    /// Row contents, top to bottom index `y`
    pub fn row(&self, y: usize) -> &[Cell] {
        let width = self.columns as usize;
        &self.cells[y * width..(y + 1) * width]
    }

    /// Check if a row is completely filled
    pub fn is_row_full(&self, y: usize) -> bool {
        if y >= self.total_rows() as usize {
            return false;
        }
        self.row(y).iter().all(|cell| cell.is_some())
    }

    /// Remove row `y`, shifting everything above down and inserting an empty top row
    pub fn remove_row(&mut self, y: usize) {
        if y >= self.total_rows() as usize {
            return;
        }

        let width = self.columns as usize;
        // copy_within handles the overlapping ranges
        self.cells.copy_within(0..y * width, width);
        for cell in &mut self.cells[..width] {
            *cell = None;
        }
    }

    /// Clear completed rows between `top` and `bottom` (inclusive), bottom-up
    ///
    /// After a removal the same row index is examined again, since it now holds
    /// the row that was above it. Rows below `bottom` are never examined.
    /// Returns the number of rows removed.
    pub fn clear_lines(&mut self, top: i16, bottom: i16) -> u32 {
        let last = self.total_rows() as i16 - 1;
        let top = top.max(0);
        let mut row = bottom.min(last);
        let mut cleared = 0;

        while row >= top {
            if self.is_row_full(row as usize) {
                self.remove_row(row as usize);
                cleared += 1;
            } else {
                row -= 1;
            }
        }

        cleared
    }

    /// Copy the visible rows (hidden buffer excluded) into `out`
    pub fn write_visible_into(&self, out: &mut Vec<Cell>) {
        let start = HIDDEN_ROWS as usize * self.columns as usize;
        out.clear();
        out.extend_from_slice(&self.cells[start..]);
    }

    /// Every cell, hidden rows included, row-major
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }
}
