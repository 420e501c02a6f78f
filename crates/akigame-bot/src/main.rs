//! akigame entry point: play Akinator from a terminal.

use std::error::Error;
use std::sync::Arc;

use akigame_bot::config::BotConfig;
use akigame_bot::console::{self, ConsoleTransport};
use akigame_bot::state::AppState;
use akigame_core::transport::ChatTransport;
use akigame_oracle::HttpOracleFactory;
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Logs go to stderr; stdout carries the game.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    tracing::info!("Starting akigame");

    let config = BotConfig::from_env()?;
    tracing::info!(
        oracle_url = %config.oracle_url,
        prefix = %config.command_prefix,
        "configuration loaded"
    );

    let oracles = HttpOracleFactory::new(config.oracle_url.clone(), config.oracle_timeout)?;
    let console = Arc::new(ConsoleTransport::new(tokio::io::stdout()));
    let transport: Arc<dyn ChatTransport> = console.clone();
    let state = AppState::new(config, Arc::new(oracles), transport);

    console::run_console(
        state,
        &console,
        BufReader::new(tokio::io::stdin()),
        console::local_user(),
        console::local_channel(),
    )
    .await?;

    Ok(())
}
