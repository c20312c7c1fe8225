//! Session server runner (default binary).
//!
//! Reads `CHATTRIS_*` environment variables and serves games until killed.

use anyhow::Result;

use chattris::adapter::{run_server, ServerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServerConfig::from_env();
    println!(
        "[Chattris] {}x{} board, gravity every {} ms, up to {} sessions",
        config.columns, config.visible_rows, config.gravity_ms, config.max_sessions
    );

    tokio::select! {
        result = run_server(config, None) => result,
        _ = tokio::signal::ctrl_c() => {
            println!("[Chattris] Shutting down");
            Ok(())
        }
    }
}
