//! Game engine module - the single-player rules state machine
//!
//! Ties together the playfield, the piece bag and the rotation system. The
//! engine owns no timers: the caller decides how often [`GameEngine::gravity_tick`]
//! runs. Every command reports success as a boolean and never panics.
//!
//! States: a piece is falling (lock delay inactive or armed), or the game is
//! over. Game over is terminal: queries keep working, commands all fail.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::pieces::Tetromino;
use crate::playfield::Playfield;
use crate::rng::PieceBag;
use crate::rotation;
use crate::snapshot::{GameSnapshot, HoldSnapshot};
use crate::types::{
    Cell, GameAction, Rotation, HIDDEN_ROWS, MAX_COLUMNS, MAX_VISIBLE_ROWS, MIN_COLUMNS,
    MIN_VISIBLE_ROWS,
};

#[derive(Debug, Clone)]
pub struct GameEngine {
    playfield: Playfield,
    bag: PieceBag,
    falling: Tetromino,
    hold: Option<Tetromino>,
    lock_delay: bool,
    can_hold: bool,
    lines_cleared: u32,
    game_over: bool,
}

impl GameEngine {
    /// Create a game seeded from the system clock
    pub fn new(visible_rows: u16, columns: u16) -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.subsec_nanos() ^ d.as_secs() as u32)
            .unwrap_or(1);
        Self::with_seed(visible_rows, columns, seed)
    }

    /// Create a reproducible game
    ///
    /// Dimensions are clamped to `MIN_VISIBLE_ROWS..=MAX_VISIBLE_ROWS` rows and
    /// `MIN_COLUMNS..=MAX_COLUMNS` columns.
    pub fn with_seed(visible_rows: u16, columns: u16, seed: u32) -> Self {
        let visible_rows = visible_rows.clamp(MIN_VISIBLE_ROWS, MAX_VISIBLE_ROWS);
        let columns = columns.clamp(MIN_COLUMNS, MAX_COLUMNS);

        let mut bag = PieceBag::new(columns, seed);
        let falling = bag.next();

        Self {
            playfield: Playfield::new(visible_rows, columns),
            bag,
            falling,
            hold: None,
            lock_delay: false,
            can_hold: true,
            lines_cleared: 0,
            game_over: false,
        }
    }

    pub fn playfield(&self) -> &Playfield {
        &self.playfield
    }

    #[cfg(test)]
    pub(crate) fn playfield_mut(&mut self) -> &mut Playfield {
        &mut self.playfield
    }

    pub fn falling(&self) -> &Tetromino {
        &self.falling
    }

    pub fn rotation(&self) -> Rotation {
        self.falling.rotation
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn can_hold(&self) -> bool {
        self.can_hold
    }

    pub fn lines_cleared(&self) -> u32 {
        self.lines_cleared
    }

    pub fn is_lock_delay_active(&self) -> bool {
        self.lock_delay
    }

    /// Hold slot contents (matrix and kind), if any
    pub fn hold_piece(&self) -> Option<HoldSnapshot> {
        self.hold.map(|piece| HoldSnapshot {
            kind: piece.kind,
            shape: piece.shape,
        })
    }

    /// Visible rows with the falling piece composited on top
    pub fn render_into(&self, out: &mut Vec<Cell>) {
        self.playfield.write_visible_into(out);

        let columns = self.playfield.columns() as i16;
        for (x, y) in self.falling.cells() {
            if y >= HIDDEN_ROWS as i16 && (0..columns).contains(&x) {
                let idx = (y - HIDDEN_ROWS as i16) as usize * columns as usize + x as usize;
                if let Some(cell) = out.get_mut(idx) {
                    *cell = Some(self.falling.kind);
                }
            }
        }
    }

    pub fn render(&self) -> Vec<Cell> {
        let mut out = Vec::new();
        self.render_into(&mut out);
        out
    }

    pub fn snapshot_into(&self, out: &mut GameSnapshot) {
        out.columns = self.playfield.columns();
        out.rows = self.playfield.visible_rows();
        self.render_into(&mut out.grid);
        out.hold = self.hold_piece();
        out.can_hold = self.can_hold;
        out.game_over = self.game_over;
        out.lines_cleared = self.lines_cleared;
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let mut s = GameSnapshot::default();
        self.snapshot_into(&mut s);
        s
    }

    /// Whether the falling piece is resting on the floor or a locked cell
    pub fn is_grounded(&self) -> bool {
        let piece = &self.falling;
        !self
            .playfield
            .is_valid_location(piece.x, piece.y + 1, &piece.shape)
    }

    fn try_shift(&mut self, dx: i16) -> bool {
        if self.game_over {
            return false;
        }

        let piece = &self.falling;
        if !self
            .playfield
            .is_valid_location(piece.x + dx, piece.y, &piece.shape)
        {
            return false;
        }

        // Movement never resets the lock delay.
        self.falling.x += dx;
        true
    }

    pub fn move_left(&mut self) -> bool {
        self.try_shift(-1)
    }

    pub fn move_right(&mut self) -> bool {
        self.try_shift(1)
    }

    fn try_rotate(&mut self, quarter_turns: u8) -> bool {
        if self.game_over {
            return false;
        }

        let field = &self.playfield;
        let result = rotation::try_rotate(&self.falling, quarter_turns, |x, y, shape| {
            field.is_valid_location(x, y, shape)
        });

        match result {
            Some(result) => {
                rotation::commit(&mut self.falling, result);
                true
            }
            None => false,
        }
    }

    pub fn rotate_cw(&mut self) -> bool {
        self.try_rotate(1)
    }

    pub fn rotate_ccw(&mut self) -> bool {
        self.try_rotate(3)
    }

    /// One step of gravity
    ///
    /// A piece that lands arms the lock delay; the next tick locks it unless it
    /// has been moved somewhere it can fall again.
    pub fn gravity_tick(&mut self) -> bool {
        if self.game_over {
            return false;
        }

        let grounded = self.is_grounded();
        self.lock_delay &= grounded;

        if self.lock_delay {
            self.finalize_lock();
            return true;
        }

        if grounded {
            self.lock_delay = true;
            return true;
        }

        self.falling.y += 1;
        if self.is_grounded() {
            self.lock_delay = true;
        }
        true
    }

    /// Drop to the lowest reachable row and lock
    pub fn hard_drop(&mut self) -> bool {
        if self.game_over {
            return false;
        }

        while !self.is_grounded() {
            self.falling.y += 1;
        }

        self.finalize_lock();
        true
    }

    /// Swap the falling piece with the hold slot
    pub fn hold(&mut self) -> bool {
        if !self.can_hold || self.game_over {
            return false;
        }

        let incoming = match self.hold.take() {
            Some(held) => held,
            None => self.bag.next(),
        };

        let mut outgoing = std::mem::replace(&mut self.falling, incoming);
        outgoing.reset_to_spawn();
        self.hold = Some(outgoing);

        self.falling.reset_to_spawn();
        self.lock_delay = false;
        self.can_hold = false;
        true
    }

    pub fn apply_action(&mut self, action: GameAction) -> bool {
        match action {
            GameAction::MoveLeft => self.move_left(),
            GameAction::MoveRight => self.move_right(),
            GameAction::RotateCw => self.rotate_cw(),
            GameAction::RotateCcw => self.rotate_ccw(),
            GameAction::GravityTick => self.gravity_tick(),
            GameAction::HardDrop => self.hard_drop(),
            GameAction::Hold => self.hold(),
        }
    }

    /// Write the falling piece into the grid, clear lines and spawn the next piece
    fn finalize_lock(&mut self) {
        if self.playfield.lock(&self.falling) {
            self.game_over = true;
            return;
        }

        let (top, bottom) = self.falling.row_span();
        self.lines_cleared += self.playfield.clear_lines(top, bottom);

        self.falling = self.bag.next();
        self.lock_delay = false;
        self.can_hold = true;
    }
}

impl Default for GameEngine {
    fn default() -> Self {
        Self::with_seed(
            crate::types::DEFAULT_VISIBLE_ROWS,
            crate::types::DEFAULT_COLUMNS,
            1,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PieceKind;

    fn engine_with(kind: PieceKind) -> GameEngine {
        let mut engine = GameEngine::with_seed(4, 10, 1);
        engine.falling = Tetromino::spawn(kind, 10);
        engine
    }

    #[test]
    fn test_new_engine() {
        let engine = GameEngine::with_seed(20, 10, 12345);
        assert!(!engine.is_game_over());
        assert!(engine.can_hold());
        assert!(!engine.is_lock_delay_active());
        assert_eq!(engine.lines_cleared(), 0);
        assert!(engine.hold_piece().is_none());
        assert_eq!(engine.rotation(), Rotation::North);
        assert_eq!(engine.playfield().total_rows(), 23);
    }

    #[test]
    fn test_dimensions_clamped() {
        let engine = GameEngine::with_seed(0, 2, 1);
        assert_eq!(engine.playfield().visible_rows(), MIN_VISIBLE_ROWS);
        assert_eq!(engine.playfield().columns(), MIN_COLUMNS);
    }

    #[test]
    fn test_oversized_dimensions_clamped() {
        let mut engine = GameEngine::with_seed(u16::MAX, u16::MAX, 1);
        assert_eq!(engine.playfield().visible_rows(), MAX_VISIBLE_ROWS);
        assert_eq!(engine.playfield().columns(), MAX_COLUMNS);
        assert!(engine.playfield().total_rows() as i32 <= i16::MAX as i32);

        assert!(engine.hard_drop());
        let locked = engine.playfield().cells().iter().filter(|c| c.is_some()).count();
        assert_eq!(locked, 4);
        assert_eq!(
            engine.render().len(),
            MAX_VISIBLE_ROWS as usize * MAX_COLUMNS as usize
        );

        let wide = GameEngine::with_seed(10, 40_000, 1);
        assert_eq!(wide.playfield().columns(), MAX_COLUMNS);
        assert!(wide.falling().x > 0);
    }

    #[test]
    fn test_walls_block_lateral_moves() {
        let mut engine = engine_with(PieceKind::T);
        while engine.move_left() {}
        // T occupies matrix columns 0..2
        assert_eq!(engine.falling.x, 0);
        assert!(!engine.move_left());
        assert_eq!(engine.falling.x, 0);

        while engine.move_right() {}
        assert_eq!(engine.falling.x, 7);
        assert!(!engine.move_right());
        assert_eq!(engine.falling.x, 7);
    }

    #[test]
    fn test_locked_cell_blocks_lateral_move() {
        let mut engine = engine_with(PieceKind::O);
        let (x, y) = (engine.falling.x, engine.falling.y);
        // O covers columns x..x+1; block the cells beside both of its rows
        engine.playfield_mut().set(x - 1, y + 1, Some(PieceKind::Z));
        engine.playfield_mut().set(x + 2, y, Some(PieceKind::Z));

        assert!(!engine.move_left());
        assert!(!engine.move_right());
        assert_eq!((engine.falling.x, engine.falling.y), (x, y));

        engine.playfield_mut().set(x - 1, y + 1, None);
        assert!(engine.move_left());
        assert_eq!(engine.falling.x, x - 1);
    }

    #[test]
    fn test_gravity_moves_down_then_arms_lock_delay() {
        let mut engine = engine_with(PieceKind::O);
        let start_y = engine.falling.y;

        assert!(engine.gravity_tick());
        assert_eq!(engine.falling.y, start_y + 1);
        assert!(!engine.is_lock_delay_active());

        // O spans rows y..y+1; floor is row 6 on a 4+3 field
        while !engine.is_lock_delay_active() {
            assert!(engine.gravity_tick());
        }
        assert!(engine.is_grounded());
        assert_eq!(engine.falling.y, 5);

        // The next tick locks
        assert!(engine.gravity_tick());
        assert_eq!(engine.playfield().get(4, 6), Some(Some(PieceKind::O)));
        assert!(!engine.is_lock_delay_active());
        assert!(engine.can_hold());
    }

    #[test]
    fn test_lock_delay_disarmed_when_piece_can_fall_again() {
        let mut engine = engine_with(PieceKind::O);
        // Ledge under columns 4..5 at row 4
        engine.playfield_mut().set(4, 4, Some(PieceKind::Z));
        engine.playfield_mut().set(5, 4, Some(PieceKind::Z));

        engine.gravity_tick();
        assert!(engine.is_lock_delay_active());

        // Slide off the ledge
        assert!(engine.move_right());
        assert!(engine.move_right());
        assert!(engine.is_lock_delay_active());

        let y = engine.falling.y;
        assert!(engine.gravity_tick());
        assert_eq!(engine.falling.y, y + 1);
    }

    #[test]
    fn test_movement_does_not_reset_lock_delay() {
        let mut engine = engine_with(PieceKind::O);
        engine.hard_drop();
        // Put an O on the floor and walk the next piece to the same floor
        engine.falling = Tetromino::spawn(PieceKind::O, 10);
        engine.falling.x = 0;
        while !engine.is_lock_delay_active() {
            engine.gravity_tick();
        }
        assert!(engine.move_right());
        assert!(engine.is_lock_delay_active());
        let locked_before = engine.playfield().cells().iter().filter(|c| c.is_some()).count();
        assert!(engine.gravity_tick());
        let locked_after = engine.playfield().cells().iter().filter(|c| c.is_some()).count();
        assert_eq!(locked_after, locked_before + 4);
    }

    #[test]
    fn test_grounded_unarmed_piece_is_not_pushed_into_stack() {
        let mut engine = engine_with(PieceKind::O);
        let (x, y) = (engine.falling.x, engine.falling.y);
        engine.playfield_mut().set(x, y + 2, Some(PieceKind::T));

        assert!(engine.gravity_tick());
        assert_eq!(engine.falling.y, y);
        assert!(engine.is_lock_delay_active());
    }

    #[test]
    fn test_game_over_rejects_everything() {
        let mut engine = engine_with(PieceKind::O);
        engine.game_over = true;

        assert!(!engine.move_left());
        assert!(!engine.move_right());
        assert!(!engine.rotate_cw());
        assert!(!engine.rotate_ccw());
        assert!(!engine.gravity_tick());
        assert!(!engine.hard_drop());
        assert!(!engine.hold());
    }

    #[test]
    fn test_hold_swaps_with_existing() {
        let mut engine = engine_with(PieceKind::T);
        assert!(engine.hold());
        assert_eq!(engine.hold_piece().map(|h| h.kind), Some(PieceKind::T));

        engine.hard_drop();
        assert!(engine.can_hold());

        let third = engine.falling.kind;
        assert!(engine.hold());
        assert_eq!(engine.falling.kind, PieceKind::T);
        assert_eq!(engine.hold_piece().map(|h| h.kind), Some(third));
    }

    #[test]
    fn test_hold_resets_rotation_and_position() {
        let mut engine = engine_with(PieceKind::J);
        assert!(engine.rotate_cw());
        assert!(engine.move_left());
        assert!(engine.hold());
        engine.hard_drop();

        assert!(engine.hold());
        let piece = engine.falling;
        assert_eq!(piece.kind, PieceKind::J);
        assert_eq!(piece.rotation, Rotation::North);
        assert_eq!((piece.x, piece.y), (piece.spawn_x, piece.spawn_y));
        assert_eq!(piece.shape, Tetromino::spawn(PieceKind::J, 10).shape);
    }

    #[test]
    fn test_render_composites_only_visible_cells() {
        let mut engine = engine_with(PieceKind::O);
        // At spawn the piece is entirely hidden
        assert!(engine.render().iter().all(|c| c.is_none()));

        engine.gravity_tick();
        engine.gravity_tick();
        let grid = engine.render();
        assert_eq!(grid.len(), 40);
        // O now spans rows 3..4, i.e. visible rows 0..1
        assert_eq!(grid[4], Some(PieceKind::O));
        assert_eq!(grid[5], Some(PieceKind::O));
        assert_eq!(grid[14], Some(PieceKind::O));
        assert_eq!(grid.iter().filter(|c| c.is_some()).count(), 4);
    }

    #[test]
    fn test_four_squares_clear_one_line() {
        let mut engine = engine_with(PieceKind::O);
        // Bottom row already holds columns 8..9
        engine.playfield_mut().set(8, 6, Some(PieceKind::Z));
        engine.playfield_mut().set(9, 6, Some(PieceKind::Z));

        for x in [0, 2, 4, 6] {
            engine.falling = Tetromino::spawn(PieceKind::O, 10);
            engine.falling.x = x;
            assert!(engine.hard_drop());
        }

        assert_eq!(engine.lines_cleared(), 1);
        assert!(!engine.is_game_over());
        let field = engine.playfield();
        // Upper halves of the squares shifted onto the bottom row
        for x in 0..8 {
            assert_eq!(field.get(x, 6), Some(Some(PieceKind::O)));
        }
        assert_eq!(field.get(8, 6), Some(None));
        assert_eq!(field.get(9, 6), Some(None));
        for y in 0..6 {
            assert!(field.row(y).iter().all(|c| c.is_none()));
        }
    }

    #[test]
    fn test_failed_rotation_leaves_piece_unchanged() {
        let mut engine = GameEngine::with_seed(19, 10, 1);
        let mut bar = Tetromino::spawn(PieceKind::I, 10);
        bar.shape = bar.shape.rotated(1);
        bar.rotation = Rotation::East;
        // Vertical bar hugging the right wall
        bar.x = 7;
        bar.y = 10;
        engine.falling = bar;
        engine.playfield_mut().set(6, 12, Some(PieceKind::T));
        engine.playfield_mut().set(6, 14, Some(PieceKind::T));

        assert!(!engine.rotate_cw());
        assert_eq!(engine.falling, bar);
        assert!(!engine.is_lock_delay_active());
    }

    #[test]
    fn test_top_out_ends_game() {
        let mut engine = engine_with(PieceKind::O);
        let mut drops = 0;
        while !engine.is_game_over() {
            engine.falling = Tetromino::spawn(PieceKind::O, 10);
            assert!(engine.hard_drop());
            drops += 1;
        }
        // Two squares fill the 4 visible rows; the third lands in the buffer
        assert_eq!(drops, 3);
        assert!(!engine.gravity_tick());
        assert!(!engine.hold());
    }

    #[test]
    fn test_apply_action_dispatch() {
        let mut engine = engine_with(PieceKind::T);
        let x = engine.falling.x;
        assert!(engine.apply_action(GameAction::MoveLeft));
        assert_eq!(engine.falling.x, x - 1);
        assert!(engine.apply_action(GameAction::RotateCcw));
        assert_eq!(engine.rotation(), Rotation::West);
        assert!(engine.apply_action(GameAction::Hold));
        assert!(!engine.apply_action(GameAction::Hold));
    }
}
