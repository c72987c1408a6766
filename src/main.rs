//! Fauna - world engine server
//!
//! Loads configuration, opens the store and drives the game clock until
//! Ctrl-C. Request handling lives in front of the engine, not here.

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use fauna::core::error::Result;
use fauna::spatial::ValueNoise;
use fauna::store::{MemoryStore, Store};
use fauna::{Engine, GameConfig};

/// Fauna world engine
#[derive(Parser, Debug)]
#[command(name = "fauna")]
#[command(about = "Run the Fauna world engine and its game clock")]
struct Args {
    /// Game configuration (TOML); built-in defaults when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override engine.tick_freq_hz
    #[arg(long)]
    tick_hz: Option<u32>,

    /// Store snapshot loaded at start and written on shutdown
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Seconds between status lines
    #[arg(long, default_value_t = 30)]
    status_every: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("fauna=info")))
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    if let Some(hz) = args.tick_hz {
        config.engine.tick_freq_hz = hz;
    }

    let store = match &args.snapshot {
        Some(path) if path.exists() => {
            tracing::info!(path = %path.display(), "loading snapshot");
            Arc::new(MemoryStore::load_snapshot(path)?)
        }
        _ => Arc::new(MemoryStore::new()),
    };

    let engine = Arc::new(Engine::new(
        config,
        store.clone() as Arc<dyn Store>,
        Arc::new(ValueNoise),
    )?);

    let runner = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.run().await })
    };

    let status = {
        let engine = engine.clone();
        let every = Duration::from_secs(args.status_every.max(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let info = engine.runtime_info();
                tracing::info!(
                    ticks = info.ticks,
                    season = %info.season,
                    epoch = info.game_time.epoch,
                    pending = info.pending_writes,
                    uptime_ms = info.uptime_ms,
                    "status"
                );
            }
        })
    };

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");

    engine.stop();
    status.abort();
    if let Err(e) = runner.await {
        tracing::warn!(error = %e, "run loop ended abnormally");
    }

    // Apply whatever was queued after the last tick
    let last = engine.tick();
    tracing::info!(applied = last.applied, failed = last.failed, "final flush");

    if let Some(path) = &args.snapshot {
        store.save_snapshot(path)?;
        tracing::info!(path = %path.display(), "snapshot written");
    }

    Ok(())
}
