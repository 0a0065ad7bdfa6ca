//! `rollcall`: RFID attendance with parent SMS notifications.
//!
//! # Usage
//!
//! ```text
//! rollcall register --rfid 04A1B2 --name "Jane Doe" --admission-number ADM-001 --phone 0800000001
//! rollcall scan
//! rollcall attendance list --date 2024-03-04
//! rollcall --config /etc/rollcall.toml students import roster.csv
//! ```

mod commands;
mod config;
mod pipeline;

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use commands::Command;
use config::Config;
use rollcall_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "rollcall", version, about = "RFID attendance with parent SMS notifications")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "rollcall.toml", env = "ROLLCALL_CONFIG")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Logs go to stderr; stdout is for command output.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();
  let config = Config::load(&cli.config)?;
  tracing::debug!(?config, "configuration loaded");

  let store = SqliteStore::open(&config.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", config.store_path))?;

  commands::run(cli.command, &config, Arc::new(store)).await
}
