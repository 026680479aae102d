//! Stable Yield Rotator - Main Entry Point
//!
//! Runs a single rotation pass and exits.

use anyhow::Result;
use clap::Parser;
use stable_yield_rotator::config::{Config, LoggingConfig};
use stable_yield_rotator::feed::YieldFeedClient;
use stable_yield_rotator::runner::RotationRunner;
use stable_yield_rotator::wallet::{WalletApi, WalletApiClient};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "stable-yield-rotator")]
#[command(version, about = "Rotate stablecoin holdings into the best lending yield")]
struct Cli {
    /// Preview swaps without executing them
    #[arg(long)]
    dry_run: bool,

    /// Path to a config file (defaults to ./rotator.{toml,yaml,json} if present)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {:#}", e);
            return ExitCode::FAILURE;
        }
    };
    config.rotation.dry_run |= cli.dry_run;

    let _guard = match init_logging(&config.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(config).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            error!("Rotation run aborted: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config) -> Result<u8> {
    config.validate()?;
    log_config(&config);

    let feed = YieldFeedClient::new(&config.feed)?;
    let wallet: Arc<dyn WalletApi> = Arc::new(WalletApiClient::new(&config.wallet)?);

    let summary = RotationRunner::new(config, feed, wallet).run().await?;
    Ok(summary.exit_code())
}

/// Initialize logging to stdout and a daily rolling file.
///
/// The returned guard flushes the file writer on drop.
fn init_logging(config: &LoggingConfig) -> Result<WorkerGuard> {
    use tracing_subscriber::fmt::writer::MakeWriterExt;

    std::fs::create_dir_all(&config.directory)?;

    let file_appender = tracing_appender::rolling::daily(&config.directory, "rotator.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stdout.and(file_writer))
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE);

    if config.json {
        builder.json().init();
    } else {
        builder.with_ansi(false).init();
    }

    Ok(guard)
}

/// Log configuration on startup.
fn log_config(config: &Config) {
    info!("Configuration:");
    info!("   Network: {} (chain {})", config.feed.network, config.feed.chain_id);
    info!("   Min TVL: ${}", config.feed.min_tvl_usd);
    info!("   Max APY: {}%", config.feed.max_apy);
    info!(
        "   Min APY Improvement: {} pts",
        config.rotation.min_apy_improvement
    );
    info!("   Min Balance: ${}", config.rotation.min_balance_usd);
    info!("   Max Slippage: {}%", config.rotation.max_slippage_pct);
    info!("   Sell Percentage: {}%", config.rotation.sell_percentage);
    info!(
        "   Mode: {}",
        if config.rotation.dry_run {
            "DRY RUN"
        } else {
            "LIVE"
        }
    );
}
