//! faultring stress driver
//!
//! Runs a parameterized multi-producer/multi-consumer workload against a
//! ring of the canonical capacity and verifies end-to-end consistency:
//! conservation of events, zero duplicates, zero misses, and equal
//! cursors at quiescence.

use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use faultring::{
    run_workload, BackoffPolicy, NoBackoff, SleepBackoff, SpinBackoff, WorkloadConfig,
    YieldBackoff, RING_CAPACITY,
};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "faultring-stress")]
#[command(about = "Stress workload for the lock-free bounded MPMC event ring")]
#[command(version)]
pub struct Args {
    /// Number of producer threads
    #[arg(short, long, default_value = "8")]
    pub producers: usize,

    /// Number of consumer threads
    #[arg(short, long, default_value = "2")]
    pub consumers: usize,

    /// Events retired by each producer
    #[arg(short, long, default_value = "500000")]
    pub events_per_producer: u32,

    /// Backoff policy after rejections
    #[arg(short, long, default_value = "spin")]
    #[arg(value_parser = parse_backoff)]
    pub backoff: BackoffType,

    /// Pause after each consumed event, in microseconds (simulates a
    /// slow monitoring layer)
    #[arg(long, default_value = "0")]
    pub consumer_pause_us: u64,

    /// Pin worker threads to CPU cores round-robin
    #[arg(long)]
    pub pin_threads: bool,

    /// Print the final report as JSON
    #[arg(long)]
    pub json: bool,

    /// Log level
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

/// Backoff policy types
#[derive(Debug, Clone)]
pub enum BackoffType {
    None,
    Spin,
    Yield,
    Sleep,
}

fn parse_backoff(s: &str) -> Result<BackoffType, String> {
    match s.to_lowercase().as_str() {
        "none" => Ok(BackoffType::None),
        "spin" => Ok(BackoffType::Spin),
        "yield" => Ok(BackoffType::Yield),
        "sleep" => Ok(BackoffType::Sleep),
        _ => Err(format!("Invalid backoff policy: {s}")),
    }
}

impl BackoffType {
    fn build(&self) -> Arc<dyn BackoffPolicy> {
        match self {
            Self::None => Arc::new(NoBackoff::new()),
            Self::Spin => Arc::new(SpinBackoff::new()),
            Self::Yield => Arc::new(YieldBackoff::new()),
            Self::Sleep => Arc::new(SleepBackoff::default()),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level)?;
    validate_args(&args)?;

    info!("Starting faultring stress workload");
    info!("Configuration: {:?}", args);

    let config = WorkloadConfig {
        producers: args.producers,
        consumers: args.consumers,
        events_per_producer: args.events_per_producer,
        producer_backoff: args.backoff.build(),
        consumer_backoff: args.backoff.build(),
        consumer_pause: (args.consumer_pause_us > 0)
            .then(|| Duration::from_micros(args.consumer_pause_us)),
        pin_threads: args.pin_threads,
    };

    let report = run_workload::<RING_CAPACITY>(&config);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("--- Workload Summary ---");
        println!("Produced: {}, Consumed: {}", report.produced, report.consumed);
        println!(
            "Rejections: {} full, {} empty",
            report.producer_rejections, report.consumer_rejections
        );
        println!(
            "Final state: head={}, tail={}",
            report.final_head, report.final_tail
        );
        println!(
            "Integrity: {} duplicates, {} missing",
            report.duplicate_events, report.missing_events
        );
        println!("Elapsed: {:?}", report.elapsed);
    }

    if report.is_consistent() {
        info!("All events delivered exactly once");
        Ok(())
    } else {
        error!(
            produced = report.produced,
            consumed = report.consumed,
            duplicates = report.duplicate_events,
            missing = report.missing_events,
            "workload verification failed"
        );
        anyhow::bail!("workload verification failed")
    }
}

/// Initialize logging based on the specified level
fn init_logging(level: &str) -> anyhow::Result<()> {
    let filter = match level.to_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "info" => "info",
        "warn" => "warn",
        "error" => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .init();

    Ok(())
}

/// Validate the command line arguments
fn validate_args(args: &Args) -> anyhow::Result<()> {
    if args.producers == 0 {
        anyhow::bail!("at least one producer is required");
    }
    if args.consumers == 0 {
        anyhow::bail!("at least one consumer is required");
    }
    if args.events_per_producer == 0 {
        anyhow::bail!("events per producer must be greater than 0");
    }
    Ok(())
}
