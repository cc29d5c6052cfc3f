//! Dibs Daemon
//!
//! Runs the shepherd sweep loop against a SQLite claim store until a
//! shutdown signal arrives.

mod config;
mod notify;

use anyhow::Context;
use config::DaemonConfig;
use dibs_domain::SystemClock;
use dibs_shepherd::ShepherdWorker;
use dibs_store::SqliteStore;
use notify::LogNotifier;
use std::env;
use std::process;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();

    let config = if args.len() > 2 && args[1] == "--config" {
        let config_path = &args[2];
        DaemonConfig::from_file(config_path)
            .with_context(|| format!("loading configuration from {}", config_path))?
    } else if args.len() > 1 && args[1] == "--help" {
        print_help();
        process::exit(0);
    } else {
        anyhow::bail!("no config file specified; run with --config <path-to-config.toml>");
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let store = SqliteStore::new(&config.database_path)
        .with_context(|| format!("opening claim database at {}", config.database_path))?;

    tracing::info!(
        database = %config.database_path,
        nudge_interval_days = config.shepherd.nudge_interval_days,
        claim_expiry_days = config.shepherd.claim_expiry_days,
        "dibs daemon starting"
    );

    let mut worker = ShepherdWorker::new(config.shepherd, SystemClock);
    worker.run(store, LogNotifier).await?;

    Ok(())
}

fn print_help() {
    println!("Dibs Daemon - automated staleness handling for issue claims");
    println!();
    println!("USAGE:");
    println!("    dibs-daemon --config <path-to-config.toml>");
    println!();
    println!("OPTIONS:");
    println!("    --config <file>    Load configuration from TOML file");
    println!("    --help             Print this help message");
    println!();
    println!("CONFIGURATION:");
    println!("    The TOML config file should contain:");
    println!("    - database_path: SQLite database file for claims");
    println!("    - [shepherd] nudge_interval_days: days before a reminder nudge (> 0)");
    println!("    - [shepherd] claim_expiry_days: days of inactivity before release (> 0)");
    println!("    - [shepherd] sweep_interval_minutes: sweep cadence (default: 60)");
}
