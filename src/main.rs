//! newsdesk — classified-news analytics and browsing backend.
//!
//! Entry point. Loads configuration, initialises structured logging,
//! opens (creating if needed) the SQLite database, and serves the HTTP
//! API with graceful shutdown.

use anyhow::Result;
use tracing::info;

use newsdesk::api;
use newsdesk::config;
use newsdesk::storage;

const BANNER: &str = r#"
  _  _ _____      _____ ___  ___ ___ _  __
 | \| | __\ \    / / __|   \| __/ __| |/ /
 | .` | _| \ \/\/ /\__ \ |) | _|\__ \ ' <
 |_|\_|___| \_/\_/ |___/___/|___|___/_|\_\

  Media monitoring analytics
  v0.1.0
"#;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    // Load configuration from TOML
    let cfg = config::AppConfig::load("config.toml")?;

    // Initialise structured logging
    init_logging(&cfg);

    // Print startup banner
    println!("{BANNER}");
    info!(
        host = %cfg.server.host,
        port = cfg.server.port,
        database = %cfg.database.url,
        "newsdesk starting up"
    );

    let pool = storage::open(&cfg.database.url).await?;

    api::serve(pool, &cfg.server.host, cfg.server.port).await?;

    info!("newsdesk shut down cleanly.");
    Ok(())
}

/// Initialise the `tracing` subscriber.
fn init_logging(cfg: &config::AppConfig) {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.logging.level.clone()));

    if cfg.logging.json {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
