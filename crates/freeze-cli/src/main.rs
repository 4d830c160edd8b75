//! freeze - runs the weekly freeze/thaw scheduler against an in-memory league.
//!
//! ```text
//! freeze --config freeze.toml --seed league.json
//! freeze --seed league.json --once
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::watch;
use tracing::{info, warn};

use freeze_core::app::AppBuilder;
use freeze_core::app::scheduler::SchedulerRunState;
use freeze_core::config::Config;
use freeze_core::impls::{InMemoryLeague, LeagueSnapshot, SentMessage};

#[derive(Debug, Parser)]
#[command(name = "freeze", about = "Weekly transaction freeze scheduler")]
struct Args {
    /// TOML config file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON league snapshot to load into the in-memory league.
    #[arg(short, long)]
    seed: PathBuf,

    /// Run a single tick and exit.
    #[arg(long)]
    once: bool,
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path)
            .with_context(|| format!("loading config from {}", path.display())),
        None => Config::from_env().context("loading default config"),
    }
}

fn load_snapshot(path: &PathBuf) -> Result<LeagueSnapshot> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading league snapshot {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing league snapshot {}", path.display()))
}

async fn print_messages(league: &InMemoryLeague) {
    for message in league.messages().await {
        match message {
            SentMessage::Announcement { channel, message } => println!("[#{channel}]\n{message}\n"),
            SentMessage::Direct { user_id, message } => println!("[dm {user_id}]\n{message}\n"),
            SentMessage::Cleared { channel } => println!("[#{channel} cleared]\n"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let config = load_config(args.config.as_ref())?;
    config.logging.init();

    let league = InMemoryLeague::from_snapshot(load_snapshot(&args.seed)?);
    let scheduler = Arc::new(
        AppBuilder::new(config)
            .with_in_memory(league.clone())
            .build()
            .context("building scheduler")?,
    );

    if args.once {
        let (_, outcome) = scheduler.tick(SchedulerRunState::default()).await;
        info!(?outcome, "single tick finished");
        print_messages(&league).await;
        return Ok(());
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn(Arc::clone(&scheduler).run(shutdown_rx));

    tokio::signal::ctrl_c()
        .await
        .context("waiting for ctrl-c")?;
    info!("shutdown requested");
    if shutdown_tx.send(true).is_err() {
        warn!("scheduler already stopped");
    }

    let run = handle.await.context("scheduler task")?;
    info!(
        last_freeze_week = ?run.last_freeze_week,
        last_thaw_week = ?run.last_thaw_week,
        "scheduler exited"
    );
    print_messages(&league).await;
    Ok(())
}
