//! Rotation tests - matrix turns and kick-table resolution

use chattris::core::rotation::{commit, BAR_KICKS, STANDARD_KICKS};
use chattris::core::{kick_table, try_rotate, Playfield, ShapeMatrix, Tetromino};
use chattris::types::{PieceKind, Rotation};

fn filled(shape: &ShapeMatrix) -> Vec<(u8, u8)> {
    shape.cells().collect()
}

/// Vertical bar whose occupied column is the last playfield column
fn bar_on_right_wall(field: &Playfield) -> Tetromino {
    let mut bar = Tetromino::spawn(PieceKind::I, field.columns());
    let result = try_rotate(&bar, 1, |_, _, _| true).unwrap();
    commit(&mut bar, result);
    bar.x = field.columns() as i16 - 3;
    bar.y = 10;
    assert!(field.is_valid_location(bar.x, bar.y, &bar.shape));
    bar
}

// ============== Shape Tests ==============

#[test]
fn test_bar_orientations() {
    let north = ShapeMatrix::canonical(PieceKind::I);
    assert_eq!(filled(&north), vec![(1, 0), (1, 1), (1, 2), (1, 3)]);
    assert_eq!(filled(&north.rotated(1)), vec![(0, 2), (1, 2), (2, 2), (3, 2)]);
    assert_eq!(filled(&north.rotated(2)), vec![(2, 0), (2, 1), (2, 2), (2, 3)]);
    assert_eq!(filled(&north.rotated(3)), vec![(0, 1), (1, 1), (2, 1), (3, 1)]);
}

#[test]
fn test_square_is_rotation_invariant() {
    let square = ShapeMatrix::canonical(PieceKind::O);
    for turns in 0..4 {
        assert_eq!(square.rotated(turns), square);
    }
}

#[test]
fn test_hook_counter_clockwise() {
    // J:  #..      .#.
    //     ###  ->  .#.
    //     ...      ##.
    let j = ShapeMatrix::canonical(PieceKind::J);
    assert_eq!(filled(&j.rotated(3)), vec![(0, 1), (1, 1), (2, 0), (2, 1)]);
}

#[test]
fn test_cw_then_ccw_is_identity() {
    for kind in PieceKind::ALL {
        let shape = ShapeMatrix::canonical(kind);
        assert_eq!(shape.rotated(1).rotated(3), shape);
    }
}

// ============== Kick Tests ==============

#[test]
fn test_kick_table_selection() {
    assert_eq!(kick_table(PieceKind::I), &BAR_KICKS);
    assert_eq!(kick_table(PieceKind::T), &STANDARD_KICKS);
    assert_eq!(kick_table(PieceKind::O), &STANDARD_KICKS);
}

#[test]
fn test_rotation_in_open_space_keeps_anchor() {
    let field = Playfield::new(19, 10);
    let mut piece = Tetromino::spawn(PieceKind::T, 10);
    piece.y = 10;

    let result = try_rotate(&piece, 1, |x, y, s| field.is_valid_location(x, y, s)).unwrap();
    assert_eq!(result.kick, (0, 0));
    assert_eq!((result.x, result.y), (piece.x, piece.y));
    assert_eq!(result.rotation, Rotation::East);
}

#[test]
fn test_t_kicks_off_left_wall() {
    let field = Playfield::new(19, 10);
    let mut piece = Tetromino::spawn(PieceKind::T, 10);
    piece.y = 10;
    // East-facing T hugging the left wall: matrix column 1 sits on x = 0
    let result = try_rotate(&piece, 1, |_, _, _| true).unwrap();
    commit(&mut piece, result);
    piece.x = -1;
    assert!(field.is_valid_location(piece.x, piece.y, &piece.shape));

    // East -> North would need column -1; first kick shifts right by one
    let result = try_rotate(&piece, 3, |x, y, s| field.is_valid_location(x, y, s)).unwrap();
    assert_eq!(result.rotation, Rotation::North);
    assert_eq!(result.kick, (1, 0));
    assert_eq!((result.x, result.y), (0, piece.y));
}

#[test]
fn test_bar_against_right_wall_uses_bar_table() {
    let field = Playfield::new(19, 10);
    let bar = bar_on_right_wall(&field);

    let result = try_rotate(&bar, 1, |x, y, s| field.is_valid_location(x, y, s)).unwrap();
    assert_eq!(result.rotation, Rotation::South);
    // East -> South, bar table row: (0,0) and the first kick
    assert_eq!(result.kick, BAR_KICKS[3][1]);
    assert_eq!(result.kick, (-1, 0));
    assert_ne!(BAR_KICKS[3][1], STANDARD_KICKS[3][1]);
}

#[test]
fn test_bar_against_right_wall_fails_when_all_candidates_blocked() {
    let mut field = Playfield::new(19, 10);
    let bar = bar_on_right_wall(&field);
    // Horizontal south bar lands on matrix row 2; block both in-bounds candidates
    field.set(6, bar.y + 2, Some(PieceKind::T));
    field.set(6, bar.y + 4, Some(PieceKind::T));

    let before = bar;
    assert!(try_rotate(&bar, 1, |x, y, s| field.is_valid_location(x, y, s)).is_none());
    assert_eq!(bar, before);
}
