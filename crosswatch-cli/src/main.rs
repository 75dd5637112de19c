//! Crosswatch CLI: scan, universe preview, and config commands.
//!
//! Commands:
//! - `scan`: one scan, or one every `--every` minutes until Ctrl-C
//! - `universe`: print the instruments the next scan would analyse
//! - `config`: print the default configuration as TOML
//!
//! The Telegram bot token is read from `TELEGRAM_TOKEN` (a `.env` file in the
//! working directory is honoured). `--dry-run` logs alerts instead of sending.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing_subscriber::EnvFilter;

use crosswatch_core::alert::{AlertSink, LogSink, TelegramSink};
use crosswatch_core::data::{BinanceFuturesProvider, Timeframe};
use crosswatch_core::domain::display_symbol;
use crosswatch_runner::{ScanConfig, ScanReport, Scanner};

const TOKEN_ENV: &str = "TELEGRAM_TOKEN";

#[derive(Parser)]
#[command(
    name = "crosswatch",
    version,
    about = "Crosswatch: EMA crossover alerts for crypto futures"
)]
struct Cli {
    /// Log filter used when RUST_LOG is unset (e.g. "info", "crosswatch_runner=debug").
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan the universe and send an alert for every signal.
    Scan {
        /// Path to a TOML config file. Defaults are used when omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Repeat every N minutes until interrupted.
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        every: Option<u64>,

        /// Log alerts instead of sending them.
        #[arg(long, default_value_t = false)]
        dry_run: bool,

        /// Override the universe size.
        #[arg(long)]
        top_n: Option<usize>,

        /// Override the liquidity floor (quote volume × price).
        #[arg(long)]
        min_volume: Option<f64>,

        /// Override the candle interval (1m, 5m, 15m, 30m, 1h, 2h, 4h, 12h, 1d).
        #[arg(long)]
        timeframe: Option<Timeframe>,

        /// Print each run report as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print the ranked universe without analysing it.
    Universe {
        /// Path to a TOML config file. Defaults are used when omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Override the universe size.
        #[arg(long)]
        top_n: Option<usize>,
    },
    /// Print the default configuration as TOML.
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match cli.command {
        Commands::Scan {
            config,
            every,
            dry_run,
            top_n,
            min_volume,
            timeframe,
            json,
        } => {
            let mut scan_config = load_config(config.as_deref())?;
            if let Some(n) = top_n {
                scan_config.top_n = n;
            }
            if let Some(v) = min_volume {
                scan_config.min_volume_usdt = v;
            }
            if let Some(tf) = timeframe {
                scan_config.timeframe = tf;
            }
            run_scan(scan_config, every, dry_run, json).await
        }
        Commands::Universe { config, top_n } => {
            let mut scan_config = load_config(config.as_deref())?;
            if let Some(n) = top_n {
                scan_config.top_n = n;
            }
            run_universe(scan_config).await
        }
        Commands::Config => {
            print!("{}", ScanConfig::default().to_toml()?);
            Ok(())
        }
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<ScanConfig> {
    match path {
        Some(path) => ScanConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display())),
        None => Ok(ScanConfig::default()),
    }
}

fn build_provider(config: &ScanConfig) -> Result<Arc<BinanceFuturesProvider>> {
    let provider = BinanceFuturesProvider::new(config.binance.base_url.as_str())
        .context("building market-data client")?;
    Ok(Arc::new(provider))
}

fn build_sink(config: &ScanConfig, dry_run: bool) -> Result<Arc<dyn AlertSink>> {
    if dry_run {
        return Ok(Arc::new(LogSink));
    }
    dotenv::dotenv().ok();
    let token = std::env::var(TOKEN_ENV)
        .with_context(|| format!("{TOKEN_ENV} is not set (use --dry-run to scan without sending)"))?;
    let sink = TelegramSink::new(config.telegram.base_url.as_str(), token)
        .context("building Telegram client")?;
    Ok(Arc::new(sink))
}

async fn run_scan(config: ScanConfig, every: Option<u64>, dry_run: bool, json: bool) -> Result<()> {
    if !dry_run && config.recipients.is_empty() {
        tracing::warn!("no recipients configured; signals will only be logged");
    }
    let provider = build_provider(&config)?;
    let sink = build_sink(&config, dry_run)?;
    let scanner = Scanner::new(config, provider, sink).context("invalid configuration")?;

    let Some(minutes) = every else {
        let report = scanner.run().await?;
        print_report(&report, json)?;
        return Ok(());
    };

    tracing::info!(minutes, "repeating scan until interrupted");
    let mut interval = tokio::time::interval(Duration::from_secs(minutes * 60));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = interval.tick() => {}
        }
        tokio::select! {
            _ = &mut shutdown => break,
            result = scanner.run() => match result {
                Ok(report) => print_report(&report, json)?,
                // a failed run does not stop the schedule
                Err(e) => tracing::error!(error = %e, "scan failed"),
            },
        }
    }

    tracing::info!("interrupted, exiting");
    Ok(())
}

async fn run_universe(config: ScanConfig) -> Result<()> {
    let provider = build_provider(&config)?;
    let scanner = Scanner::new(config, provider, Arc::new(LogSink)).context("invalid configuration")?;
    let universe = scanner.select().await?;

    for (rank, symbol) in universe.iter().enumerate() {
        println!("{:>4}  {}", rank + 1, display_symbol(symbol));
    }
    println!("{} instruments", universe.len());
    Ok(())
}

fn print_report(report: &ScanReport, json: bool) -> Result<()> {
    if json {
        println!("{}", report.to_json()?);
        return Ok(());
    }

    println!("=== Scan {} ===", report.finished_at.format("%Y-%m-%d %H:%M:%S UTC"));
    println!("{}", report.summary());
    for signal in &report.signals {
        println!(
            "  {:<5} {:<16} {:.4}",
            signal.direction.label(),
            display_symbol(&signal.symbol),
            signal.reference_price
        );
    }
    for skipped in &report.skipped {
        println!("  skipped {}: {}", skipped.symbol, skipped.reason);
    }
    for failed in report.failed_deliveries() {
        println!(
            "  delivery to {} failed for {}: {}",
            failed.recipient,
            failed.symbol,
            failed.error.as_deref().unwrap_or("unknown error")
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn scan_overrides_parse() {
        let cli = Cli::try_parse_from([
            "crosswatch",
            "scan",
            "--dry-run",
            "--top-n",
            "25",
            "--min-volume",
            "5000000",
            "--timeframe",
            "4h",
            "--every",
            "60",
        ])
        .unwrap();
        match cli.command {
            Commands::Scan {
                dry_run,
                top_n,
                min_volume,
                timeframe,
                every,
                ..
            } => {
                assert!(dry_run);
                assert_eq!(top_n, Some(25));
                assert_eq!(min_volume, Some(5_000_000.0));
                assert_eq!(timeframe, Some(Timeframe::H4));
                assert_eq!(every, Some(60));
            }
            _ => panic!("expected scan command"),
        }
    }

    #[test]
    fn zero_interval_is_rejected() {
        assert!(Cli::try_parse_from(["crosswatch", "scan", "--every", "0"]).is_err());
    }

    #[test]
    fn unknown_timeframe_is_rejected() {
        assert!(Cli::try_parse_from(["crosswatch", "scan", "--timeframe", "7h"]).is_err());
    }

    #[test]
    fn default_config_when_no_path() {
        assert_eq!(load_config(None).unwrap(), ScanConfig::default());
    }
}
