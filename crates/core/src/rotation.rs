//! Rotation module - quarter-turn rotation with wall kicks
//!
//! A rotation first turns the occupancy matrix, then tries an ordered list of
//! five (dx, dy) offsets for the (from, to) transition. The first offset at
//! which the turned matrix fits is committed. Offsets are applied directly to
//! playfield coordinates (y grows downward).

use crate::pieces::{ShapeMatrix, Tetromino};
use crate::types::{PieceKind, Rotation};

/// Kick data: 5 candidates for each of the 8 single-step transitions
/// Order: 0=unkicked rotation, 1-4=wall kicks
pub type KickTable = [[(i8, i8); 5]; 8];

/// Kick table shared by J, L, O, S, T and Z
pub const STANDARD_KICKS: KickTable = [
    // 0->1 (N->E, clockwise)
    [(0, 0), (-1, 0), (-1, 1), (0, -2), (-1, -2)],
    // 0->3 (N->W, counter-clockwise)
    [(0, 0), (1, 0), (1, 1), (0, -2), (1, -2)],
    // 1->0 (E->N, counter-clockwise)
    [(0, 0), (1, 0), (1, -1), (0, 2), (1, 2)],
    // 1->2 (E->S, clockwise)
    [(0, 0), (1, 0), (1, -1), (0, 2), (1, 2)],
    // 2->1 (S->E, counter-clockwise)
    [(0, 0), (-1, 0), (-1, 1), (0, -2), (-1, -2)],
    // 2->3 (S->W, clockwise)
    [(0, 0), (1, 0), (1, 1), (0, -2), (1, -2)],
    // 3->2 (W->S, counter-clockwise)
    [(0, 0), (-1, 0), (-1, -1), (0, 2), (-1, 2)],
    // 3->0 (W->N, clockwise)
    [(0, 0), (-1, 0), (-1, -1), (0, 2), (-1, 2)],
];

/// Kick table for the bar
pub const BAR_KICKS: KickTable = [
    // 0->1 (N->E)
    [(0, 0), (-2, 0), (1, 0), (-2, -1), (1, 2)],
    // 0->3 (N->W)
    [(0, 0), (-1, 0), (2, 0), (-1, 2), (2, -1)],
    // 1->0 (E->N)
    [(0, 0), (2, 0), (-1, 0), (2, 1), (-1, -2)],
    // 1->2 (E->S)
    [(0, 0), (-1, 0), (2, 0), (-1, 2), (2, -1)],
    // 2->1 (S->E)
    [(0, 0), (1, 0), (-2, 0), (1, -2), (-2, 1)],
    // 2->3 (S->W)
    [(0, 0), (2, 0), (-1, 0), (2, 1), (-1, -2)],
    // 3->2 (W->S)
    [(0, 0), (-2, 0), (1, 0), (-2, -1), (1, 2)],
    // 3->0 (W->N)
    [(0, 0), (1, 0), (-2, 0), (1, -2), (-2, 1)],
];

/// Get kick table for a piece kind
pub fn kick_table(kind: PieceKind) -> &'static KickTable {
    if kind.uses_alternate_kicks() {
        &BAR_KICKS
    } else {
        &STANDARD_KICKS
    }
}

/// Row of the kick table for a transition; `None` for anything but a single step
pub fn kick_row(from: Rotation, to: Rotation) -> Option<usize> {
    match (from, to) {
        (Rotation::North, Rotation::East) => Some(0),
        (Rotation::North, Rotation::West) => Some(1),
        (Rotation::East, Rotation::North) => Some(2),
        (Rotation::East, Rotation::South) => Some(3),
        (Rotation::South, Rotation::East) => Some(4),
        (Rotation::South, Rotation::West) => Some(5),
        (Rotation::West, Rotation::South) => Some(6),
        (Rotation::West, Rotation::North) => Some(7),
        _ => None,
    }
}

/// Successful rotation: the new matrix, rotation state and anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationResult {
    pub shape: ShapeMatrix,
    pub rotation: Rotation,
    pub x: i16,
    pub y: i16,
    pub kick: (i8, i8),
}

/// Try to rotate a piece with wall kicks
///
/// `quarter_turns` is 1 for clockwise and 3 for counter-clockwise.
/// `fits(x, y, shape)` decides legality of a candidate placement.
/// Returns `None` if every candidate fails; the piece is never touched.
pub fn try_rotate(
    piece: &Tetromino,
    quarter_turns: u8,
    fits: impl Fn(i16, i16, &ShapeMatrix) -> bool,
) -> Option<RotationResult> {
    let to = piece.rotation.rotate_by(quarter_turns);
    let row = kick_row(piece.rotation, to)?;
    let shape = piece.shape.rotated(quarter_turns);

    kick_table(piece.kind)[row]
        .iter()
        .map(|&(dx, dy)| (piece.x + dx as i16, piece.y + dy as i16, (dx, dy)))
        .find(|&(x, y, _)| fits(x, y, &shape))
        .map(|(x, y, kick)| RotationResult {
            shape,
            rotation: to,
            x,
            y,
            kick,
        })
}

/// Apply a successful rotation to the piece
pub fn commit(piece: &mut Tetromino, result: RotationResult) {
    piece.shape = result.shape;
    piece.rotation = result.rotation;
    piece.x = result.x;
    piece.y = result.y;
}
