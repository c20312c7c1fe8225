//! Adapter module - play games over a TCP socket with a JSON protocol
//!
//! Each user id owns at most one running game. The game lives in a session
//! registry, independent of the connection that started it: a client can drop
//! and reconnect, and the next `hello` for the same user re-attaches to the
//! same game while gravity keeps ticking in the background.
//!
//! # Protocol Overview
//!
//! The adapter implements a **line-delimited JSON protocol** over TCP:
//!
//! 1. **Connection**: Client connects to TCP socket (default: 127.0.0.1:7878)
//! 2. **Handshake**: Client sends `hello` with a user id, server responds with
//!    `welcome` and a first `frame`
//! 3. **Commanding**: Client sends `command` with a list of actions, server
//!    answers with `ack` (one boolean per action) and a fresh `frame`
//! 4. **Gravity**: Server pushes a `frame` after every gravity tick
//! 5. **Game over**: Server sends `game_over` once and forgets the game
//!
//! # Message Types
//!
//! ## Client → Server
//!
//! - **hello**: `{"type":"hello","seq":1,"user":"alice"}`
//! - **command**: `{"type":"command","seq":2,"actions":["moveLeft","hardDrop"]}`
//!
//! ## Server → Client
//!
//! - **welcome**: handshake reply with board dimensions and `resumed` flag
//! - **frame**: visible grid, hold slot, lines cleared, game-over flag
//! - **ack**: per-action results of a command
//! - **game_over**: final line count
//! - **error**: `code` + human-readable `message`
//!
//! # Environment Variables
//!
//! - `CHATTRIS_HOST`: Bind address (default: "127.0.0.1")
//! - `CHATTRIS_PORT`: Port number (default: 7878)
//! - `CHATTRIS_ROWS` / `CHATTRIS_COLUMNS`: Board size (default: 19 x 10)
//! - `CHATTRIS_GRAVITY_MS`: Gravity period in milliseconds (default: 1000)
//! - `CHATTRIS_MAX_SESSIONS`: Concurrent games (default: 64)
//! - `CHATTRIS_SEED`: Fixed bag seed for new games
//!
//! # Testing
//!
//! ```bash
//! nc 127.0.0.1 7878
//! {"type":"hello","seq":1,"user":"alice"}
//! {"type":"command","seq":2,"actions":["rotateCw","hardDrop"]}
//! ```

pub mod protocol;
pub mod server;
pub mod session;

pub use chattris_core as core;
pub use chattris_types as types;

pub use protocol::*;
pub use server::{run_server, Outbound, ServerConfig, ServerState, MIN_GRAVITY_MS};
pub use session::{Attached, LiveGame, SessionLimitReached, SessionRegistry, SharedGame};
