mod app;
mod constants;
mod handlers;
mod rendering;
mod subscriptions;

use aep_notification_config::{NotificationContentConfig, PayloadPolicy};
use aep_notification_util::{Clock, NotificationContent, SystemClock};
use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{Level, debug};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "aep-notification-content")]
#[command(about = "Shows an AEP rich push notification (basic, carousel or timer template)")]
#[command(version)]
struct Args {
    /// Notification JSON: {"title", "body", "userInfo"}
    payload: PathBuf,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level, overridden by RUST_LOG
    #[arg(short, long, default_value = "info", value_parser = clap::value_parser!(Level))]
    log_level: Level,

    /// Delivery time in seconds since the Unix epoch (default: now)
    #[arg(long)]
    delivered_at: Option<f64>,

    /// Use the strict payload rules of older payload producers
    #[arg(long)]
    legacy: bool,

    /// Exit after this many seconds
    #[arg(long)]
    run_for: Option<f64>,
}

fn main() -> anyhow::Result<()> {
    color_backtrace::install();
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_level.to_string()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!(
        "Parsed command line arguments: payload={:?}, config={:?}, legacy={}",
        args.payload, args.config, args.legacy
    );

    let mut config = NotificationContentConfig::load(args.config.as_deref())
        .context("Failed to load configuration")?;
    if args.legacy {
        config.policy = PayloadPolicy::legacy();
    }
    debug!("Configuration: {:?}", config);

    let raw = std::fs::read_to_string(&args.payload)
        .with_context(|| format!("Failed to read {}", args.payload.display()))?;
    let content: NotificationContent = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse notification JSON in {}", args.payload.display()))?;

    let reference_time = args.delivered_at.unwrap_or_else(|| SystemClock.now());
    let run_for = args
        .run_for
        .map(Duration::try_from_secs_f64)
        .transpose()
        .context("Invalid --run-for")?;

    let rt = tokio::runtime::Runtime::new()?;
    let result = rt.block_on(app::run(config, content, reference_time, run_for));
    // The stdin reader blocks a thread that cannot be interrupted
    rt.shutdown_timeout(constants::SHUTDOWN_TIMEOUT);
    result
}
