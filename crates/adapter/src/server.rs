//! TCP server for the session adapter
//!
//! Handles incoming connections, routes hello/command messages to per-user
//! games and drives gravity for every running game.

use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot};
use tokio::time::MissedTickBehavior;

use crate::core::GameEngine;
use crate::protocol::*;
use crate::session::{SessionRegistry, SharedGame};
use crate::types::{DEFAULT_COLUMNS, DEFAULT_GRAVITY_MS, DEFAULT_VISIBLE_ROWS};

/// Shortest accepted gravity period
pub const MIN_GRAVITY_MS: u64 = 10;

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub visible_rows: u16,
    pub columns: u16,
    pub gravity_ms: u64,
    pub max_sessions: usize,
    /// Fixed bag seed for every new game; clock-seeded when `None`
    pub seed: Option<u32>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7878,
            visible_rows: DEFAULT_VISIBLE_ROWS,
            columns: DEFAULT_COLUMNS,
            gravity_ms: DEFAULT_GRAVITY_MS,
            max_sessions: 64,
            seed: None,
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

impl ServerConfig {
    /// Create from `CHATTRIS_*` environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let host = std::env::var("CHATTRIS_HOST")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.host);

        Self {
            host,
            port: env_or("CHATTRIS_PORT", defaults.port),
            visible_rows: env_or("CHATTRIS_ROWS", defaults.visible_rows),
            columns: env_or("CHATTRIS_COLUMNS", defaults.columns),
            gravity_ms: env_or("CHATTRIS_GRAVITY_MS", defaults.gravity_ms).max(MIN_GRAVITY_MS),
            max_sessions: env_or("CHATTRIS_MAX_SESSIONS", defaults.max_sessions).max(1),
            seed: std::env::var("CHATTRIS_SEED")
                .ok()
                .and_then(|s| s.trim().parse().ok()),
        }
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid socket address {}:{}", self.host, self.port))
    }

    fn new_engine(&self) -> GameEngine {
        match self.seed {
            Some(seed) => GameEngine::with_seed(self.visible_rows, self.columns, seed),
            None => GameEngine::new(self.visible_rows, self.columns),
        }
    }
}

/// Channel feeding one connection's writer task
pub type Outbound = mpsc::UnboundedSender<ServerMessage>;

/// Shared server state
pub struct ServerState {
    config: ServerConfig,
    sessions: SessionRegistry<Outbound>,
}

impl ServerState {
    pub fn new(config: ServerConfig) -> Self {
        let sessions = SessionRegistry::new(config.max_sessions);
        Self { config, sessions }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn sessions(&self) -> &SessionRegistry<Outbound> {
        &self.sessions
    }
}

/// Start the TCP server
pub async fn run_server(
    config: ServerConfig,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    let bound = listener.local_addr()?;
    println!("[Adapter] TCP server listening on {}", bound);
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let state = Arc::new(ServerState::new(config));
    let mut client_id_counter = 0usize;

    loop {
        let (socket, addr) = listener.accept().await?;
        client_id_counter += 1;
        let client_id = client_id_counter;

        println!("[Adapter] Client {} connected from {}", client_id, addr);

        let state = Arc::clone(&state);
        tokio::spawn(async move {
            if let Err(e) = handle_client(socket, client_id, state).await {
                eprintln!("[Adapter] Client {} error: {}", client_id, e);
            }
            println!("[Adapter] Client {} disconnected", client_id);
        });
    }
}

/// Per-connection state
struct Connection {
    id: usize,
    user: Option<String>,
    last_seq: Option<u64>,
    tx: Outbound,
}

impl Connection {
    fn send(&self, msg: ServerMessage) {
        let _ = self.tx.send(msg);
    }

    fn send_error(&self, seq: u64, err: &ProtocolError) {
        self.send(create_error(seq, err));
    }

    /// Seq must strictly increase per connection
    fn check_seq(&mut self, seq: u64) -> Result<(), ProtocolError> {
        match self.last_seq {
            Some(previous) if seq <= previous => {
                Err(ProtocolError::SequenceRegression { seq, previous })
            }
            _ => {
                self.last_seq = Some(seq);
                Ok(())
            }
        }
    }
}

/// Seq of a line that failed to parse, if one can be recovered
fn seq_hint(line: &str) -> u64 {
    serde_json::from_str::<serde_json::Value>(line)
        .ok()
        .and_then(|v| v.get("seq").and_then(|s| s.as_u64()))
        .unwrap_or(0)
}

/// Handle a single client connection
async fn handle_client(
    socket: TcpStream,
    client_id: usize,
    state: Arc<ServerState>,
) -> anyhow::Result<()> {
    let (reader, mut writer) = socket.into_split();
    let mut reader = BufReader::new(reader);

    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    let write_task = tokio::spawn(async move {
        let mut buf: Vec<u8> = Vec::with_capacity(4096);
        while let Some(msg) = rx.recv().await {
            buf.clear();
            if serde_json::to_writer(&mut buf, &msg).is_err() {
                continue;
            }
            buf.push(b'\n');
            if writer.write_all(&buf).await.is_err() {
                break;
            }
            if writer.flush().await.is_err() {
                break;
            }
        }
    });

    let mut conn = Connection {
        id: client_id,
        user: None,
        last_seq: None,
        tx,
    };

    let result = read_loop(&mut reader, &mut conn, &state).await;

    if let Some(user) = conn.user.as_deref() {
        state.sessions.detach(user, conn.id).await;
    }
    drop(conn);
    // Writer drains what is queued, then ends once every sender is gone
    let _ = tokio::time::timeout(Duration::from_secs(1), write_task).await;

    result
}

async fn read_loop<R>(
    reader: &mut BufReader<R>,
    conn: &mut Connection,
    state: &Arc<ServerState>,
) -> anyhow::Result<()>
where
    R: tokio::io::AsyncRead + Unpin,
{
    let mut line = String::new();

    loop {
        line.clear();
        let bytes_read = reader.read_line(&mut line).await?;
        if bytes_read == 0 {
            return Ok(());
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let msg = match parse_client_line(trimmed) {
            Ok(msg) => msg,
            Err(err) => {
                conn.send_error(seq_hint(trimmed), &err);
                continue;
            }
        };

        let seq = msg.seq();
        let outcome = match msg {
            ClientMessage::Hello { seq, user } => on_hello(conn, state, seq, &user).await,
            ClientMessage::Command { seq, actions } => {
                on_command(conn, state, seq, &actions).await
            }
        };

        if let Err(err) = outcome {
            conn.send_error(seq, &err);
        }
    }
}

async fn on_hello(
    conn: &mut Connection,
    state: &Arc<ServerState>,
    seq: u64,
    user: &str,
) -> Result<(), ProtocolError> {
    conn.check_seq(seq)?;

    let user = user.trim();
    if user.is_empty() {
        return Err(ProtocolError::InvalidUser);
    }

    // Switching users releases the previous game's handle
    if let Some(previous) = conn.user.take() {
        if previous != user {
            state.sessions.detach(&previous, conn.id).await;
        }
    }

    let attached = state
        .sessions
        .attach(user, conn.id, conn.tx.clone(), || state.config.new_engine())
        .await
        .map_err(|e| ProtocolError::SessionLimit(e.0))?;
    conn.user = Some(user.to_string());

    if attached.resumed {
        println!("[Adapter] Client {} resumed game of {}", conn.id, user);
    } else {
        println!("[Adapter] Client {} started game for {}", conn.id, user);
        spawn_gravity(
            Arc::clone(state),
            user.to_string(),
            attached.session_id,
            Arc::clone(&attached.game),
        );
    }

    let mut game = attached.game.lock().await;
    let field = game.engine.playfield();
    conn.send(create_welcome(
        seq,
        user,
        field.visible_rows(),
        field.columns(),
        attached.resumed,
    ));
    let frame = game.next_frame();
    conn.send(frame);
    Ok(())
}

async fn on_command(
    conn: &mut Connection,
    state: &Arc<ServerState>,
    seq: u64,
    actions: &[String],
) -> Result<(), ProtocolError> {
    let user = conn.user.clone().ok_or(ProtocolError::HandshakeRequired)?;
    conn.check_seq(seq)?;

    let batch = parse_actions(actions)?;
    let (session_id, game) = state
        .sessions
        .game(&user)
        .await
        .ok_or(ProtocolError::NoSession)?;

    let (game_over, lines) = {
        let mut game = game.lock().await;
        let applied: Vec<bool> = batch
            .iter()
            .map(|&action| game.engine.apply_action(action))
            .collect();
        let frame = game.next_frame();
        conn.send(create_ack(seq, &applied));
        conn.send(frame);
        (game.engine.is_game_over(), game.engine.lines_cleared())
    };

    if game_over {
        end_game(state, &user, session_id, lines, Some(&conn.tx)).await;
    }
    Ok(())
}

/// Remove a finished game and announce it once
async fn end_game(
    state: &ServerState,
    user: &str,
    session_id: u64,
    lines_cleared: u32,
    handle: Option<&Outbound>,
) {
    if !state.sessions.remove(user, session_id).await {
        return;
    }
    println!(
        "[Adapter] Game over for {}, lines cleared: {}",
        user, lines_cleared
    );
    if let Some(tx) = handle {
        let _ = tx.send(create_game_over(user, lines_cleared));
    }
}

/// Drive gravity for one game until it ends or is replaced
fn spawn_gravity(state: Arc<ServerState>, user: String, session_id: u64, game: SharedGame) {
    let period = Duration::from_millis(state.config.gravity_ms.max(MIN_GRAVITY_MS));

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            if !state.sessions.is_current(&user, session_id).await {
                break;
            }

            let handle = state.sessions.handle(&user, session_id).await;

            // Frames are queued while the game is locked so they leave in order
            let (game_over, lines) = {
                let mut game = game.lock().await;
                game.engine.gravity_tick();
                let frame = game.next_frame();
                if let Some(tx) = handle.as_ref() {
                    let _ = tx.send(frame);
                }
                (game.engine.is_game_over(), game.engine.lines_cleared())
            };

            if game_over {
                end_game(&state, &user, session_id, lines, handle.as_ref()).await;
                break;
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 7878);
        assert_eq!(config.visible_rows, 19);
        assert_eq!(config.columns, 10);
        assert_eq!(config.gravity_ms, 1000);
        assert_eq!(
            config.socket_addr().unwrap(),
            "127.0.0.1:7878".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn test_bad_host_is_an_error() {
        let config = ServerConfig {
            host: "not a host".to_string(),
            ..ServerConfig::default()
        };
        assert!(config.socket_addr().is_err());
    }

    #[test]
    fn test_env_or_falls_back() {
        std::env::set_var("CHATTRIS_TEST_ENV_OR_GOOD", " 42 ");
        std::env::set_var("CHATTRIS_TEST_ENV_OR_BAD", "forty-two");
        assert_eq!(env_or("CHATTRIS_TEST_ENV_OR_GOOD", 7u16), 42);
        assert_eq!(env_or("CHATTRIS_TEST_ENV_OR_BAD", 7u16), 7);
        assert_eq!(env_or("CHATTRIS_TEST_ENV_OR_MISSING", 7u16), 7);
    }

    #[test]
    fn test_seq_must_increase() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut conn = Connection {
            id: 1,
            user: None,
            last_seq: None,
            tx,
        };
        assert!(conn.check_seq(5).is_ok());
        assert_eq!(
            conn.check_seq(5),
            Err(ProtocolError::SequenceRegression {
                seq: 5,
                previous: 5
            })
        );
        assert!(conn.check_seq(6).is_ok());
    }

    #[test]
    fn test_seq_hint() {
        assert_eq!(seq_hint(r#"{"type":"launch","seq":12}"#), 12);
        assert_eq!(seq_hint("not json"), 0);
    }

    #[test]
    fn test_seeded_engines_match() {
        let config = ServerConfig {
            seed: Some(99),
            ..ServerConfig::default()
        };
        assert_eq!(config.new_engine().render(), config.new_engine().render());
    }
}
