//! playpass — spend all play passes of one account, then exit.
//!
//! Usage:
//!   playpass --token "Bearer <jwt>"
//!   PLAYPASS_TOKEN="Bearer <jwt>" playpass --max-games 10
//!
//! Log verbosity follows `RUST_LOG` (default `playpass=info`).

use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use playpass::config::{Overrides, RunnerConfig};
use playpass::transport::HttpTransport;
use playpass::{GameClient, SessionDriver};

/// Play and claim games until the play passes run out.
#[derive(Parser)]
#[command(name = "playpass", version)]
struct Cli {
    /// Session token sent as the authorization header (falls back to PLAYPASS_TOKEN, then the keyring)
    #[arg(long)]
    token: Option<String>,

    /// API base URL (falls back to PLAYPASS_BASE_URL)
    #[arg(long)]
    base_url: Option<String>,

    /// Route all traffic through this proxy (falls back to PLAYPASS_PROXY_URL)
    #[arg(long)]
    proxy: Option<String>,

    /// Stop after this many completed games
    #[arg(long)]
    max_games: Option<u32>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("playpass=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = RunnerConfig::resolve(Overrides {
        token: cli.token,
        base_url: cli.base_url,
        proxy_url: cli.proxy,
        max_games: cli.max_games,
    })
    .context("resolving configuration")?;

    let transport = HttpTransport::new(config.proxy_url.as_deref())
        .map_err(playpass::Error::from)
        .context("building HTTP transport")?;
    let client = GameClient::new(Arc::new(transport)).with_base_url(config.base_url.clone());

    let report = SessionDriver::new(client)
        .with_max_games(config.max_games)
        .run(&config.credential)
        .await;

    tracing::info!(
        games_played = report.games_played,
        reason = %report.stop_reason,
        balance = ?report.last_balance.and_then(|b| b.available_balance),
        "session finished"
    );

    Ok(())
}
