//! Pieces module - tetromino occupancy matrices and piece instances
//!
//! Every kind is described by a dense square matrix (2x2, 3x3 or 4x4) with
//! optional holes. Rotation is a generic quarter-turn of that matrix, so no
//! per-rotation shape tables are needed.

use crate::types::{PieceKind, Rotation, HIDDEN_ROWS, MAX_COLUMNS};

/// Largest matrix side (the bar)
pub const MAX_SHAPE_SIZE: usize = 4;

/// Dense occupancy matrix of a tetromino, row 0 on top
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShapeMatrix {
    size: u8,
    rows: [[bool; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE],
}

impl ShapeMatrix {
    /// Build from a 0/1 grid; only the top-left `size` x `size` block is used
    pub const fn from_bits(size: u8, bits: [[u8; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE]) -> Self {
        let mut rows = [[false; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE];
        let mut r = 0;
        while r < size as usize {
            let mut c = 0;
            while c < size as usize {
                rows[r][c] = bits[r][c] != 0;
                c += 1;
            }
            r += 1;
        }
        Self { size, rows }
    }

    /// Canonical spawn matrix for a kind
    pub fn canonical(kind: PieceKind) -> Self {
        match kind {
            PieceKind::I => BAR,
            PieceKind::J => LEFT_HOOK,
            PieceKind::L => RIGHT_HOOK,
            PieceKind::O => SQUARE,
            PieceKind::S => S_CURVE,
            PieceKind::T => T_SHAPE,
            PieceKind::Z => Z_CURVE,
        }
    }

    /// Side length of the matrix
    pub fn size(&self) -> u8 {
        self.size
    }

    /// Whether cell (row, col) is occupied; out-of-range reads are empty
    pub fn is_filled(&self, row: u8, col: u8) -> bool {
        row < self.size && col < self.size && self.rows[row as usize][col as usize]
    }

    /// Occupied cells as (row, col) pairs, row-major
    pub fn cells(&self) -> impl Iterator<Item = (u8, u8)> + '_ {
        let n = self.size;
        (0..n).flat_map(move |r| (0..n).map(move |c| (r, c))).filter(|&(r, c)| self.is_filled(r, c))
    }

    /// First and last occupied row, if any
    pub fn occupied_rows(&self) -> Option<(u8, u8)> {
        let mut span: Option<(u8, u8)> = None;
        for (r, _) in self.cells() {
            span = Some(match span {
                None => (r, r),
                Some((top, bottom)) => (top.min(r), bottom.max(r)),
            });
        }
        span
    }

    /// Rotate 90° clockwise within the square
    pub fn rotated_cw(&self) -> Self {
        let n = self.size as usize;
        let mut rows = [[false; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE];
        for (r, row) in rows.iter_mut().enumerate().take(n) {
            for (c, cell) in row.iter_mut().enumerate().take(n) {
                *cell = self.rows[n - 1 - c][r];
            }
        }
        Self {
            size: self.size,
            rows,
        }
    }

    /// Rotate by `quarter_turns` clockwise steps (3 is one counter-clockwise step)
    pub fn rotated(&self, quarter_turns: u8) -> Self {
        let mut out = *self;
        for _ in 0..quarter_turns % 4 {
            out = out.rotated_cw();
        }
        out
    }
}

const BAR: ShapeMatrix = ShapeMatrix::from_bits(
    4,
    [[0, 0, 0, 0], [1, 1, 1, 1], [0, 0, 0, 0], [0, 0, 0, 0]],
);

const LEFT_HOOK: ShapeMatrix = ShapeMatrix::from_bits(
    3,
    [[1, 0, 0, 0], [1, 1, 1, 0], [0, 0, 0, 0], [0, 0, 0, 0]],
);

const RIGHT_HOOK: ShapeMatrix = ShapeMatrix::from_bits(
    3,
    [[0, 0, 1, 0], [1, 1, 1, 0], [0, 0, 0, 0], [0, 0, 0, 0]],
);

const SQUARE: ShapeMatrix = ShapeMatrix::from_bits(
    2,
    [[1, 1, 0, 0], [1, 1, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]],
);

const S_CURVE: ShapeMatrix = ShapeMatrix::from_bits(
    3,
    [[0, 1, 1, 0], [1, 1, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]],
);

const T_SHAPE: ShapeMatrix = ShapeMatrix::from_bits(
    3,
    [[0, 1, 0, 0], [1, 1, 1, 0], [0, 0, 0, 0], [0, 0, 0, 0]],
);

const Z_CURVE: ShapeMatrix = ShapeMatrix::from_bits(
    3,
    [[1, 1, 0, 0], [0, 1, 1, 0], [0, 0, 0, 0], [0, 0, 0, 0]],
);

/// A piece instance: kind, current matrix, anchor and rotation
///
/// `(x, y)` is the playfield position of matrix cell (0, 0), hidden rows
/// included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tetromino {
    pub kind: PieceKind,
    pub shape: ShapeMatrix,
    pub rotation: Rotation,
    pub x: i16,
    pub y: i16,
    pub spawn_x: i16,
    pub spawn_y: i16,
}

impl Tetromino {
    /// Create a tetromino at its spawn position for a playfield `columns` wide
    ///
    /// The piece is horizontally centered and its lowest cells sit on the last
    /// hidden row.
    pub fn spawn(kind: PieceKind, columns: u16) -> Self {
        let shape = ShapeMatrix::canonical(kind);
        let width = shape.size() as i16;
        let spawn_x = columns.min(MAX_COLUMNS) as i16 / 2 - (width + 1) / 2;
        let lowest = shape.occupied_rows().map(|(_, bottom)| bottom).unwrap_or(0) as i16;
        let spawn_y = HIDDEN_ROWS as i16 - lowest - 1;

        Self {
            kind,
            shape,
            rotation: Rotation::North,
            x: spawn_x,
            y: spawn_y,
            spawn_x,
            spawn_y,
        }
    }

    /// Put the piece back at its spawn position in spawn orientation
    pub fn reset_to_spawn(&mut self) {
        self.shape = ShapeMatrix::canonical(self.kind);
        self.rotation = Rotation::North;
        self.x = self.spawn_x;
        self.y = self.spawn_y;
    }

    /// Absolute (x, y) of every occupied cell
    pub fn cells(&self) -> impl Iterator<Item = (i16, i16)> + '_ {
        self.shape
            .cells()
            .map(move |(r, c)| (self.x + c as i16, self.y + r as i16))
    }

    /// First and last playfield row the piece occupies
    pub fn row_span(&self) -> (i16, i16) {
        let (top, bottom) = self.shape.occupied_rows().unwrap_or((0, 0));
        (self.y + top as i16, self.y + bottom as i16)
    }
}
