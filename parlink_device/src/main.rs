//! # Parlink Device
//!
//! Simulated coprocessor running the shared-register protocol against
//! loopback converters. Loads `device.toml` (or defaults when absent),
//! installs the enabled processes, and ticks them at the configured
//! period until interrupted or `--run-for` elapses.

use clap::Parser;
use parlink_common::bank::SharedParamBank;
use parlink_common::config::{ConfigError, ConfigLoader, DeviceConfig};
use parlink_device::process::{DuplexProcess, MeasureProcess};
use parlink_device::sim::SimBus;
use parlink_device::tick::{TickDriver, period_from_delay};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{Level, error, info};
use tracing_subscriber::EnvFilter;

/// Parlink Device — simulated register-protocol coprocessor
#[derive(Parser, Debug)]
#[command(name = "parlink_device")]
#[command(version)]
#[command(about = "Timer-driven register-protocol coprocessor over loopback converters")]
struct Args {
    /// Path to the device configuration TOML.
    #[arg(default_value = "config/device.toml")]
    config: PathBuf,

    /// Stop after this many seconds (default: run until interrupted).
    #[arg(long, value_name = "SECS")]
    run_for: Option<u64>,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();
    setup_tracing(&args);

    info!("Parlink Device v{} starting...", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(&args) {
        error!("FATAL: {e}");
        process::exit(1);
    }

    info!("Parlink Device shutdown complete");
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = match DeviceConfig::load(&args.config) {
        Ok(config) => config,
        Err(ConfigError::FileNotFound) => {
            info!(
                "No config file at {}, using defaults",
                args.config.display()
            );
            DeviceConfig::default()
        }
        Err(e) => return Err(Box::new(e)),
    };
    config.validate()?;

    info!(
        "Config OK: process_delay={} units, measure={} (done_slot={:?}), duplex={}",
        config.process_delay,
        config.measure.enabled,
        config.measure.done_slot,
        config.duplex.enabled,
    );

    let bank = SharedParamBank::new();
    let bus = SimBus::new();

    let mut driver = TickDriver::new(period_from_delay(config.process_delay));
    if config.measure.enabled {
        driver.install(Box::new(MeasureProcess::new(
            bus.adc(),
            config.measure.done_slot,
        )));
    }
    if config.duplex.enabled {
        driver.install(Box::new(DuplexProcess::new(bus.adc(), bus.dac())));
    }

    // Setup signal handler for graceful shutdown.
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    })?;

    if let Some(secs) = args.run_for {
        let r = running.clone();
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_secs(secs));
            r.store(false, Ordering::SeqCst);
        });
    }

    info!("Entering tick loop");
    driver.run(&bank, &running);

    let stats = driver.stats();
    info!(
        "Tick loop done: {} ticks, avg {} ns, max {} ns, {} overruns",
        stats.tick_count,
        stats.avg_tick_ns(),
        stats.max_tick_ns,
        stats.overruns,
    );

    Ok(())
}

/// Setup tracing subscriber based on CLI arguments.
fn setup_tracing(args: &Args) {
    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .init();
    }
}
