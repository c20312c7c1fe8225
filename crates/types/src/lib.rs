//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the workspace.
//! All types are pure data structures with no external dependencies, making them
//! usable in any context (engine rules, session adapter, wire protocol).
//!
//! # Playfield Dimensions
//!
//! The playfield size is chosen by the caller at construction time. The engine
//! always appends [`HIDDEN_ROWS`] buffer rows above the visible area:
//!
//! - **Hidden rows**: 3 rows above the visible area (row 0 is the topmost)
//! - **Default visible rows**: 19 (as the chat bot plays it)
//! - **Default columns**: 10
//!
//! # Examples
//!
//! ```
//! use chattris_types::{PieceKind, Rotation, GameAction, HIDDEN_ROWS};
//!
//! // Parse a piece kind (case-insensitive)
//! let parsed = PieceKind::from_str("t").unwrap();
//! assert_eq!(parsed, PieceKind::T);
//!
//! // Rotation indices advance modulo 4
//! assert_eq!(Rotation::West.rotate_cw(), Rotation::North);
//! assert_eq!(Rotation::North.index(), 0);
//!
//! // Parse a player command
//! let action = GameAction::from_str("hardDrop").unwrap();
//! assert_eq!(action, GameAction::HardDrop);
//!
//! assert_eq!(HIDDEN_ROWS, 3);
//! ```

/// Buffer rows above the visible playfield (spawn area and top-out zone)
pub const HIDDEN_ROWS: u16 = 3;

/// Default number of visible rows
pub const DEFAULT_VISIBLE_ROWS: u16 = 19;

/// Default number of columns
pub const DEFAULT_COLUMNS: u16 = 10;

/// Narrowest playfield on which the bar can spawn horizontally
pub const MIN_COLUMNS: u16 = 4;

/// Smallest visible area accepted by the engine
pub const MIN_VISIBLE_ROWS: u16 = 1;

/// Widest playfield accepted by the engine; column indices stay within `i16`
pub const MAX_COLUMNS: u16 = 1024;

/// Tallest visible area accepted by the engine; row indices, hidden rows
/// included, stay within `i16`
pub const MAX_VISIBLE_ROWS: u16 = 1024;

/// Default gravity cadence driven by the caller (1 row per second)
pub const DEFAULT_GRAVITY_MS: u64 = 1000;

/// The seven tetromino piece kinds
///
/// Each kind doubles as the color tag written into locked cells:
/// - **I**: cyan bar
/// - **J**: blue left-hook
/// - **L**: orange right-hook
/// - **O**: yellow square
/// - **S**: green s-curve
/// - **T**: magenta t-shape
/// - **Z**: red z-curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

impl PieceKind {
    /// All kinds, in declaration order. A bag is one permutation of this list.
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
    ];

    /// Parse piece kind from string (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use chattris_types::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_str("i"), Some(PieceKind::I));
    /// assert_eq!(PieceKind::from_str("O"), Some(PieceKind::O));
    /// assert_eq!(PieceKind::from_str("unknown"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "i" => Some(PieceKind::I),
            "o" => Some(PieceKind::O),
            "t" => Some(PieceKind::T),
            "s" => Some(PieceKind::S),
            "z" => Some(PieceKind::Z),
            "j" => Some(PieceKind::J),
            "l" => Some(PieceKind::L),
            _ => None,
        }
    }

    /// Convert to lowercase string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PieceKind::I => "i",
            PieceKind::O => "o",
            PieceKind::T => "t",
            PieceKind::S => "s",
            PieceKind::Z => "z",
            PieceKind::J => "j",
            PieceKind::L => "l",
        }
    }

    /// Color name associated with the kind, for front-ends that map tags to glyphs
    pub fn color_name(&self) -> &'static str {
        match self {
            PieceKind::I => "cyan",
            PieceKind::O => "yellow",
            PieceKind::T => "magenta",
            PieceKind::S => "green",
            PieceKind::Z => "red",
            PieceKind::J => "blue",
            PieceKind::L => "orange",
        }
    }

    /// Whether the kind resolves rotations with the bar kick table
    pub fn uses_alternate_kicks(&self) -> bool {
        matches!(self, PieceKind::I)
    }
}

/// Rotation states
///
/// - **North**: spawn orientation (index 0)
/// - **East**: rotated 90° clockwise (index 1)
/// - **South**: rotated 180° (index 2)
/// - **West**: rotated 90° counter-clockwise (index 3)
///
/// The rotation cycle goes: North → East → South → West → North
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rotation {
    North,
    East,
    South,
    West,
}

impl Rotation {
    /// Rotation index in `0..4`
    pub fn index(&self) -> u8 {
        match self {
            Rotation::North => 0,
            Rotation::East => 1,
            Rotation::South => 2,
            Rotation::West => 3,
        }
    }

    /// Build from an index, wrapping modulo 4
    pub fn from_index(index: u8) -> Self {
        match index % 4 {
            0 => Rotation::North,
            1 => Rotation::East,
            2 => Rotation::South,
            _ => Rotation::West,
        }
    }

    /// Advance by `quarter_turns` clockwise steps (3 is one counter-clockwise step)
    ///
    /// # Examples
    ///
    /// ```
    /// use chattris_types::Rotation;
    ///
    /// assert_eq!(Rotation::North.rotate_by(1), Rotation::East);
    /// assert_eq!(Rotation::North.rotate_by(3), Rotation::West);
    /// ```
    pub fn rotate_by(&self, quarter_turns: u8) -> Self {
        Self::from_index(self.index() + quarter_turns % 4)
    }

    /// Rotate clockwise (90°)
    pub fn rotate_cw(&self) -> Self {
        self.rotate_by(1)
    }

    /// Rotate counter-clockwise (-90° or 270°)
    pub fn rotate_ccw(&self) -> Self {
        self.rotate_by(3)
    }
}

/// Player commands accepted by the engine
///
/// Each command maps to exactly one engine operation and reports success or
/// failure as a boolean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameAction {
    /// Move piece one cell left
    MoveLeft,
    /// Move piece one cell right
    MoveRight,
    /// Rotate piece 90° clockwise
    RotateCw,
    /// Rotate piece 90° counter-clockwise
    RotateCcw,
    /// Apply one step of gravity (normally driven by the caller's timer)
    GravityTick,
    /// Drop to the lowest valid position and lock immediately
    HardDrop,
    /// Swap the falling piece with the hold slot
    Hold,
}

impl GameAction {
    /// Parse action from its wire name (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use chattris_types::GameAction;
    ///
    /// assert_eq!(GameAction::from_str("moveLeft"), Some(GameAction::MoveLeft));
    /// assert_eq!(GameAction::from_str("rotate"), Some(GameAction::RotateCw));
    /// assert_eq!(GameAction::from_str("unknown"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "moveleft" => Some(GameAction::MoveLeft),
            "moveright" => Some(GameAction::MoveRight),
            "rotatecw" | "rotate" => Some(GameAction::RotateCw),
            "rotateccw" => Some(GameAction::RotateCcw),
            "gravitytick" | "drop" => Some(GameAction::GravityTick),
            "harddrop" => Some(GameAction::HardDrop),
            "hold" => Some(GameAction::Hold),
            _ => None,
        }
    }

    /// Convert to camelCase wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            GameAction::MoveLeft => "moveLeft",
            GameAction::MoveRight => "moveRight",
            GameAction::RotateCw => "rotateCw",
            GameAction::RotateCcw => "rotateCcw",
            GameAction::GravityTick => "gravityTick",
            GameAction::HardDrop => "hardDrop",
            GameAction::Hold => "hold",
        }
    }
}

/// A cell on the playfield
///
/// - `None`: Empty cell
/// - `Some(PieceKind)`: Cell filled with the specified piece kind
pub type Cell = Option<PieceKind>;
