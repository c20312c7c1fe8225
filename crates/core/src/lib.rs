//! Core game logic - pure, deterministic, and testable
//!
//! This crate contains all the game rules and state management. It has **no
//! dependencies** on timers, networking, or I/O:
//!
//! - **Deterministic**: the same seed produces identical games
//! - **Caller-driven**: gravity advances only when [`GameEngine::gravity_tick`] is called
//! - **Infallible API**: every command answers `true`/`false`, never panics
//!
//! # Module Structure
//!
//! - [`playfield`]: grid with 3 hidden rows, collision testing, locking, line clearing
//! - [`engine`]: falling piece, hold slot, lock delay, game over
//! - [`pieces`]: occupancy matrices and piece instances
//! - [`rotation`]: quarter-turn rotation with two wall-kick tables
//! - [`rng`]: 7-bag random piece generation
//! - [`snapshot`]: rendered view for callers
//!
//! # Game Rules
//!
//! - **7-Bag Randomizer**: every block of 7 pieces holds each kind once
//! - **Wall kicks**: 5 candidate offsets per rotation, a separate table for the bar
//! - **Lock Delay**: one gravity tick of grace once a piece lands; lateral moves
//!   do not extend it
//! - **Hold**: store one piece, once per locked piece
//! - **Top-out**: locking any cell inside the hidden rows ends the game
//!
//! # Example
//!
//! ```
//! use chattris_core::GameEngine;
//! use chattris_types::GameAction;
//!
//! let mut game = GameEngine::with_seed(20, 10, 12345);
//!
//! game.apply_action(GameAction::MoveRight);
//! game.apply_action(GameAction::RotateCw);
//! assert!(game.apply_action(GameAction::HardDrop));
//!
//! assert!(!game.is_game_over());
//! assert_eq!(game.render().len(), 20 * 10);
//! ```

pub mod engine;
pub mod pieces;
pub mod playfield;
pub mod rng;
pub mod rotation;
pub mod snapshot;

pub use chattris_types as types;

pub use engine::GameEngine;
pub use pieces::{ShapeMatrix, Tetromino};
pub use playfield::Playfield;
pub use rng::{PieceBag, SimpleRng};
pub use rotation::{kick_table, try_rotate, RotationResult};
pub use snapshot::{GameSnapshot, HoldSnapshot};
