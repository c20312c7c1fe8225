use crate::pieces::ShapeMatrix;
use crate::types::{Cell, PieceKind};

/// Contents of the hold slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HoldSnapshot {
    pub kind: PieceKind,
    pub shape: ShapeMatrix,
}

/// What a caller needs to present one frame of the game
///
/// `grid` holds the visible rows only (row-major), with the falling piece
/// composited on top of the locked cells.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct GameSnapshot {
    pub columns: u16,
    pub rows: u16,
    pub grid: Vec<Cell>,
    pub hold: Option<HoldSnapshot>,
    pub can_hold: bool,
    pub game_over: bool,
    pub lines_cleared: u32,
}

impl GameSnapshot {
    /// Cell at visible coordinates; `None` outside the grid
    pub fn get(&self, x: usize, y: usize) -> Option<Cell> {
        if x >= self.columns as usize || y >= self.rows as usize {
            return None;
        }
        self.grid.get(y * self.columns as usize + x).copied()
    }

    /// Visible rows, top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.grid.chunks(self.columns.max(1) as usize)
    }

    pub fn playable(&self) -> bool {
        !self.game_over
    }
}
