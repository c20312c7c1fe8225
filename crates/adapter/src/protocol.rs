//! Protocol module - JSON message types for the session adapter
//!
//! Line-delimited JSON. Every message carries a `type` tag; client messages
//! carry a strictly increasing `seq`.

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use crate::core::{GameSnapshot, HoldSnapshot};
use crate::types::GameAction;

/// Largest number of actions accepted in one command
pub const MAX_ACTIONS_PER_COMMAND: usize = 32;

/// Parsed action batch
pub type ActionBatch = ArrayVec<GameAction, MAX_ACTIONS_PER_COMMAND>;

// ============== Client -> Server Messages ==============

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Start a game for `user`, or re-attach to the one already running
    Hello { seq: u64, user: String },
    /// Apply actions in order to the attached game
    Command {
        seq: u64,
        #[serde(default)]
        actions: Vec<String>,
    },
}

impl ClientMessage {
    pub fn seq(&self) -> u64 {
        match self {
            ClientMessage::Hello { seq, .. } | ClientMessage::Command { seq, .. } => *seq,
        }
    }
}

/// Request-level failures reported back to the client
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error("invalid message: {0}")]
    InvalidJson(String),
    #[error("send hello before commands")]
    HandshakeRequired,
    #[error("user id must not be empty")]
    InvalidUser,
    #[error("unknown action: {0}")]
    UnknownAction(String),
    #[error("too many actions in one command: {0}")]
    TooManyActions(usize),
    #[error("no running game for this user; send hello to start one")]
    NoSession,
    #[error("seq {seq} is not greater than previous seq {previous}")]
    SequenceRegression { seq: u64, previous: u64 },
    #[error("session limit of {0} reached")]
    SessionLimit(usize),
}

impl ProtocolError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            ProtocolError::InvalidJson(_) => "invalid_json",
            ProtocolError::HandshakeRequired => "handshake_required",
            ProtocolError::InvalidUser => "invalid_user",
            ProtocolError::UnknownAction(_) => "unknown_action",
            ProtocolError::TooManyActions(_) => "too_many_actions",
            ProtocolError::NoSession => "no_session",
            ProtocolError::SequenceRegression { .. } => "sequence_regression",
            ProtocolError::SessionLimit(_) => "session_limit",
        }
    }
}

/// Parse one line into a client message
pub fn parse_client_line(line: &str) -> Result<ClientMessage, ProtocolError> {
    serde_json::from_str(line).map_err(|e| ProtocolError::InvalidJson(e.to_string()))
}

/// Resolve wire action names, rejecting the whole batch on the first bad name
pub fn parse_actions(names: &[String]) -> Result<ActionBatch, ProtocolError> {
    if names.len() > MAX_ACTIONS_PER_COMMAND {
        return Err(ProtocolError::TooManyActions(names.len()));
    }

    let mut out = ActionBatch::new();
    for name in names {
        let action =
            GameAction::from_str(name).ok_or_else(|| ProtocolError::UnknownAction(name.clone()))?;
        out.push(action);
    }
    Ok(out)
}

// ============== Server -> Client Messages ==============

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Welcome(WelcomeMessage),
    Frame(FrameMessage),
    Ack(AckMessage),
    GameOver(GameOverMessage),
    Error(ErrorMessage),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WelcomeMessage {
    pub seq: u64,
    pub user: String,
    pub rows: u16,
    pub columns: u16,
    /// True when an already running game was re-attached
    pub resumed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HoldView {
    pub kind: &'static str,
    pub shape: Vec<Vec<bool>>,
}

impl From<HoldSnapshot> for HoldView {
    fn from(value: HoldSnapshot) -> Self {
        let n = value.shape.size();
        Self {
            kind: value.kind.as_str(),
            shape: (0..n)
                .map(|r| (0..n).map(|c| value.shape.is_filled(r, c)).collect())
                .collect(),
        }
    }
}

/// One rendered frame; `grid` rows hold lowercase kind tags or null
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameMessage {
    /// Per-session frame counter
    pub frame: u64,
    pub rows: u16,
    pub columns: u16,
    pub grid: Vec<Vec<Option<&'static str>>>,
    pub hold: Option<HoldView>,
    pub can_hold: bool,
    pub lines_cleared: u32,
    pub game_over: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AckMessage {
    pub seq: u64,
    /// One entry per requested action, in order
    pub applied: Vec<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameOverMessage {
    pub user: String,
    pub lines_cleared: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorMessage {
    pub seq: u64,
    pub code: &'static str,
    pub message: String,
}

pub fn create_welcome(seq: u64, user: &str, rows: u16, columns: u16, resumed: bool) -> ServerMessage {
    ServerMessage::Welcome(WelcomeMessage {
        seq,
        user: user.to_string(),
        rows,
        columns,
        resumed,
    })
}

pub fn create_frame(frame: u64, snap: &GameSnapshot) -> ServerMessage {
    ServerMessage::Frame(FrameMessage {
        frame,
        rows: snap.rows,
        columns: snap.columns,
        grid: snap
            .rows()
            .map(|row| row.iter().map(|cell| cell.map(|k| k.as_str())).collect())
            .collect(),
        hold: snap.hold.map(HoldView::from),
        can_hold: snap.can_hold,
        lines_cleared: snap.lines_cleared,
        game_over: snap.game_over,
    })
}

pub fn create_ack(seq: u64, applied: &[bool]) -> ServerMessage {
    ServerMessage::Ack(AckMessage {
        seq,
        applied: applied.to_vec(),
    })
}

pub fn create_game_over(user: &str, lines_cleared: u32) -> ServerMessage {
    ServerMessage::GameOver(GameOverMessage {
        user: user.to_string(),
        lines_cleared,
    })
}

pub fn create_error(seq: u64, err: &ProtocolError) -> ServerMessage {
    ServerMessage::Error(ErrorMessage {
        seq,
        code: err.code(),
        message: err.to_string(),
    })
}
