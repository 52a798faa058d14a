//! SEVENCAST — Seven-day stock price analysis service.
//!
//! Entry point. Loads configuration, initialises structured logging,
//! and serves the analysis API until a shutdown signal arrives.

use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use sevencast::config::AppConfig;
use sevencast::server::{self, ServerState};

const BANNER: &str = r#"
 ____  _______     _______ _   _  ____    _    ____ _____
/ ___|| ____\ \   / / ____| \ | |/ ___|  / \  / ___|_   _|
\___ \|  _|  \ \ / /|  _| |  \| | |     / _ \ \___ \ | |
 ___) | |___  \ V / | |___| |\  | |___ / ___ \ ___) || |
|____/|_____|  \_/  |_____|_| \_|\____/_/   \_\____/ |_|

  Seven-day stock price analysis service
  v0.1.0
"#;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let cfg = AppConfig::load_or_default("config.toml")?;

    init_logging();

    println!("{BANNER}");
    info!(
        host = %cfg.server.host,
        port = cfg.server.port,
        series_len = cfg.estimator.series_len,
        window = cfg.estimator.window,
        markup = cfg.estimator.markup,
        "SEVENCAST starting up"
    );

    let state = Arc::new(ServerState::new(cfg.estimator.clone()));

    server::serve(state.clone(), &cfg.server.host, cfg.server.port).await?;

    let uptime = (chrono::Utc::now() - state.started_at).num_seconds();
    info!(uptime_secs = uptime, "SEVENCAST shut down cleanly.");

    Ok(())
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("sevencast=info"));

    let json_logging = std::env::var("SEVENCAST_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt().with_env_filter(env_filter).with_target(true).init();
    }
}
