//! Session registry - one running game per user
//!
//! Maps a user id to its game and to the transport handle currently attached
//! to it. The game outlives the transport: a disconnect only clears the handle,
//! and the next hello from the same user re-attaches to the same game.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::core::GameEngine;
use crate::protocol::{create_frame, ServerMessage};

/// A game plus its outgoing frame counter
#[derive(Debug)]
pub struct LiveGame {
    pub engine: GameEngine,
    frames: u64,
}

impl LiveGame {
    pub fn new(engine: GameEngine) -> Self {
        Self { engine, frames: 0 }
    }

    /// Render the current state as the next frame
    pub fn next_frame(&mut self) -> ServerMessage {
        self.frames += 1;
        create_frame(self.frames, &self.engine.snapshot())
    }
}

pub type SharedGame = Arc<Mutex<LiveGame>>;

struct Session<H> {
    /// Generation id; a new game for the same user gets a new id
    id: u64,
    game: SharedGame,
    handle: Option<H>,
    /// Connection that owns `handle`
    owner: Option<usize>,
}

/// Result of attaching a connection to a user's game
#[derive(Debug, Clone)]
pub struct Attached {
    pub session_id: u64,
    pub game: SharedGame,
    pub resumed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("session limit of {0} reached")]
pub struct SessionLimitReached(pub usize);

struct Inner<H> {
    sessions: HashMap<String, Session<H>>,
    next_id: u64,
}

/// User id → (game, transport handle)
pub struct SessionRegistry<H> {
    inner: Mutex<Inner<H>>,
    max_sessions: usize,
}

impl<H: Clone> SessionRegistry<H> {
    pub fn new(max_sessions: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                sessions: HashMap::new(),
                next_id: 0,
            }),
            max_sessions: max_sessions.max(1),
        }
    }

    /// Attach `handle` to the user's game, creating the game with `make` if none runs
    pub async fn attach(
        &self,
        user: &str,
        owner: usize,
        handle: H,
        make: impl FnOnce() -> GameEngine,
    ) -> Result<Attached, SessionLimitReached> {
        let mut inner = self.inner.lock().await;

        if let Some(session) = inner.sessions.get_mut(user) {
            session.handle = Some(handle);
            session.owner = Some(owner);
            return Ok(Attached {
                session_id: session.id,
                game: Arc::clone(&session.game),
                resumed: true,
            });
        }

        if inner.sessions.len() >= self.max_sessions {
            return Err(SessionLimitReached(self.max_sessions));
        }

        inner.next_id += 1;
        let id = inner.next_id;
        let game = Arc::new(Mutex::new(LiveGame::new(make())));
        inner.sessions.insert(
            user.to_string(),
            Session {
                id,
                game: Arc::clone(&game),
                handle: Some(handle),
                owner: Some(owner),
            },
        );

        Ok(Attached {
            session_id: id,
            game,
            resumed: false,
        })
    }

    /// Current game of the user, with its generation id
    pub async fn game(&self, user: &str) -> Option<(u64, SharedGame)> {
        let inner = self.inner.lock().await;
        inner
            .sessions
            .get(user)
            .map(|s| (s.id, Arc::clone(&s.game)))
    }

    /// Transport handle attached to generation `id` of the user's game
    pub async fn handle(&self, user: &str, id: u64) -> Option<H> {
        let inner = self.inner.lock().await;
        inner
            .sessions
            .get(user)
            .filter(|s| s.id == id)
            .and_then(|s| s.handle.clone())
    }

    pub async fn is_current(&self, user: &str, id: u64) -> bool {
        let inner = self.inner.lock().await;
        inner.sessions.get(user).map(|s| s.id == id).unwrap_or(false)
    }

    /// Drop the handle if connection `owner` still holds it; the game keeps running
    pub async fn detach(&self, user: &str, owner: usize) {
        let mut inner = self.inner.lock().await;
        if let Some(session) = inner.sessions.get_mut(user) {
            if session.owner == Some(owner) {
                session.handle = None;
                session.owner = None;
            }
        }
    }

    /// End generation `id` of the user's game. Returns false if it was already gone.
    pub async fn remove(&self, user: &str, id: u64) -> bool {
        let mut inner = self.inner.lock().await;
        match inner.sessions.get(user) {
            Some(session) if session.id == id => {
                inner.sessions.remove(user);
                true
            }
            _ => false,
        }
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.sessions.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
