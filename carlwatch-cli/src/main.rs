//! carlwatch - Carlcare spare-parts catalog watcher
//!
//! Fetches the catalog once, records it, and posts new models to Telegram.
//! Meant to be triggered by an external scheduler (cron, systemd timer, CI).

use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use carlwatch_core::config::{Settings, WatchConfig};
use carlwatch_core::runner::{self, FetchStatus};

/// Log levels
#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_filter_directive(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Parser, Debug)]
#[clap(
    name = "carlwatch",
    about = "Notify a Telegram chat about new models in the Carlcare spare-parts catalog",
    version
)]
struct Cli {
    /// Directory holding models.json, previous_models.json and carlwatch.json
    #[clap(long, default_value = ".")]
    data_dir: PathBuf,

    /// Configuration file (defaults to <data-dir>/carlwatch.json if present)
    #[clap(long)]
    config: Option<PathBuf>,

    /// Set log level (RUST_LOG takes precedence)
    #[clap(long, default_value = "info")]
    log_level: LogLevel,

    /// Emit logs as JSON
    #[clap(long)]
    json_logs: bool,

    /// Log messages instead of sending them and keep the snapshot unchanged
    #[clap(long)]
    dry_run: bool,
}

fn initialize_tracing(log_level: &LogLevel, json_logs: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_filter_directive()));

    if json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }
}

impl Cli {
    fn settings(&self) -> Result<Settings> {
        let config = match &self.config {
            Some(path) => WatchConfig::load_from_path(path)?,
            None => WatchConfig::load_from_dir(&self.data_dir)?,
        };

        let mut settings = Settings::new(&self.data_dir, config);
        settings.dry_run = self.dry_run;
        Ok(settings)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    initialize_tracing(&cli.log_level, cli.json_logs);

    let settings = cli.settings()?;
    debug!(
        "Resolved settings: data_dir={}, catalog_url={}, on_fetch_error={}, dry_run={}",
        settings.data_dir.display(),
        settings.config.catalog_url,
        settings.config.on_fetch_error,
        settings.dry_run
    );

    let report = runner::run_once(&settings).await?;

    match &report.fetch {
        FetchStatus::Skipped { reason } => info!("Run skipped: {}", reason),
        FetchStatus::TreatedAsEmpty { reason } => {
            info!("Run finished on an empty catalog after fetch error: {}", reason)
        }
        FetchStatus::Fetched => info!(
            "Run finished: {} brands, {} models, {} new, {} messages sent, {} failed",
            report.brands,
            report.models,
            report.new_models.model_count(),
            report.notifications.sent,
            report.notifications.failed
        ),
    }

    Ok(())
}
