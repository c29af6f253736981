use std::sync::Arc;

use clap::Parser;
use recall_core::config::{IntervalPreset, RecallConfig};
use recall_core::OwnerId;
use recall_dialog::ConversationController;
use recall_scheduler::{IntervalPolicy, ReminderScheduler};
use recall_store::SqliteStore;
use tokio::io::AsyncBufReadExt;
use tracing::{info, warn};

mod commands;
mod console;

/// Spaced-repetition reminders on the local console.
#[derive(Parser, Debug)]
#[command(name = "recall-gateway", version, about)]
struct Cli {
    /// Path to the TOML config file (default: ~/.recall/recall.toml).
    #[arg(short, long, env = "RECALL_CONFIG")]
    config: Option<String>,

    /// Owner id to attribute console input to (overrides console.owner).
    #[arg(long)]
    owner: Option<i64>,

    /// Use the second-scale staging intervals.
    #[arg(long)]
    staging: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries reminders and replies; logs go to stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "recall_gateway=info,recall_scheduler=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let mut config = RecallConfig::load(cli.config.as_deref()).unwrap_or_else(|e| {
        warn!("Config load failed ({}), using defaults", e);
        RecallConfig::default()
    });
    if cli.staging {
        config.scheduler.intervals = IntervalPreset::Staging;
    }
    let owner = OwnerId(cli.owner.unwrap_or(config.console.owner));
    let output = config.console.output;

    let db_path = &config.database.path;
    ensure_parent_dir(db_path);
    info!(path = %db_path, "opening SQLite database");
    let db = rusqlite::Connection::open(db_path)?;
    db.execute_batch("PRAGMA journal_mode=WAL;")?;
    let store = Arc::new(SqliteStore::new(db)?);

    let policy = IntervalPolicy::from_config(&config.scheduler)?;
    let sink = Arc::new(console::ConsoleSink::new(std::io::stdout(), output));
    let scheduler = ReminderScheduler::new(store.clone(), sink, policy);
    info!(
        intervals = ?config.scheduler.intervals,
        chain_secs = scheduler.policy().chain_length().as_secs(),
        "interval policy loaded"
    );

    // steps are not persisted; every stored entry starts over at step 1
    let resumed = scheduler.resume().await?;
    info!(resumed, %owner, "recall ready");

    let controller = ConversationController::new(store, scheduler.clone());
    println!("{}", console::render_reply(&controller.help(), output));

    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    info!("stdin closed");
                    break;
                };
                let Some(command) = commands::parse(&line) else {
                    continue;
                };
                match commands::dispatch(&controller, owner, command).await {
                    Ok(Some(reply)) => println!("{}", console::render_reply(&reply, output)),
                    Ok(None) => {}
                    Err(e) => {
                        tracing::error!("command failed: {e}");
                        println!("Something went wrong, please try again.");
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                break;
            }
        }
    }

    scheduler.shutdown().await;
    Ok(())
}

/// Ensure the parent directory for a file path exists.
fn ensure_parent_dir(path: &str) {
    if let Some(parent) = std::path::Path::new(path).parent() {
        let _ = std::fs::create_dir_all(parent);
    }
}
