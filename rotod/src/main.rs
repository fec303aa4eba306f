//! # rotod — Two-Axis Positioner Daemon
//!
//! Wires the control cycle to the link tasks: loads configuration, brings
//! up the station state machine on its serialized event queue, blocks
//! startup until connectivity resolves, then runs the fixed-period
//! regulation loop on its own thread until SIGINT.
//!
//! A failed link only degrades telemetry: regulation starts and runs
//! identically whether the station connects, retries, or exhausts its
//! budget.
//!
//! Hardware transducer/relay drivers are external collaborators behind the
//! `PositionSampler`/`Actuator` seams; the daemon ships with the
//! simulation positioner as its built-in driver.

use clap::Parser;
use roto_common::config::{ConfigLoader, LogLevel, RotoConfig};
use roto_common::state::StateStore;
use roto_control::cycle::{CycleRunner, rt_setup};
use roto_control::sim::SimPositioner;
use roto_link::station::{self, LinkEvent, LinkState, ScriptedStation, StationFsm};
use roto_link::telemetry;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{Level, error, info, warn};
use tracing_subscriber::EnvFilter;

/// rotod — two-axis positioner control daemon
#[derive(Parser, Debug)]
#[command(name = "rotod")]
#[command(version)]
#[command(about = "Deadband regulation daemon for a two-axis positioner")]
struct Args {
    /// Path to the daemon configuration TOML.
    #[arg(default_value = "config/roto.toml")]
    config: PathBuf,

    /// CPU core to pin the control thread to (rt builds only).
    #[arg(long, default_value_t = 1)]
    cpu_core: usize,

    /// SCHED_FIFO priority (rt builds only).
    #[arg(long, default_value_t = 50)]
    rt_priority: i32,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let config = match RotoConfig::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("FATAL: {}: {e}", args.config.display());
            process::exit(1);
        }
    };

    setup_tracing(&args, config.shared.log_level);
    info!("rotod v{} starting...", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(&args, config).await {
        error!("FATAL: {e}");
        process::exit(1);
    }

    info!("rotod shutdown complete");
}

async fn run(args: &Args, config: RotoConfig) -> Result<(), Box<dyn std::error::Error>> {
    config.validate()?;
    info!(
        service = %config.shared.service_name,
        period_ms = config.control.period_ms,
        "config OK"
    );

    let store = Arc::new(StateStore::new(config.targets.azim, config.targets.elev));

    // ── Station state machine on its serialized event queue ──
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let (ready_tx, mut ready_rx) = station::ready_signal();
    let driver = ScriptedStation::immediate(&events_tx);

    info!(
        ssid = %config.link.ssid,
        max_retries = config.link.max_retries,
        "starting station"
    );
    tokio::spawn(station::run_station(
        StationFsm::new(config.link.max_retries),
        driver,
        events_rx,
        ready_tx,
    ));
    events_tx.send(LinkEvent::StationStart)?;

    // Block until connectivity resolves — the regulator must not actuate
    // motors before the link outcome is known. SIGINT cancels the wait.
    let resolved = tokio::select! {
        state = station::wait_ready(&mut ready_rx) => state,
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown requested before link resolution");
            return Ok(());
        }
    };
    match resolved {
        Some(LinkState::Connected) => info!("link up"),
        Some(state) => warn!(?state, "link unavailable, regulation continues without telemetry"),
        None => warn!("station task ended during startup"),
    }

    // ── Telemetry endpoint ──
    let listener = TcpListener::bind(&config.link.listen).await?;
    info!(listen = %config.link.listen, "telemetry endpoint up");
    tokio::spawn(telemetry::serve(
        listener,
        store.clone(),
        config.link.max_frame_len,
    ));

    // ── Control cycle on its own thread ──
    rt_setup(args.cpu_core, args.rt_priority)?;
    let positioner = SimPositioner::new(2048, 2048, 25);
    let mut runner = CycleRunner::new(
        &config.control,
        &config.axes,
        store,
        positioner.clone(),
        positioner,
    );

    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = shutdown.clone();
    let control = std::thread::spawn(move || runner.run(&flag));

    tokio::signal::ctrl_c().await?;
    info!("received shutdown signal");
    shutdown.store(true, Ordering::SeqCst);
    // Closing the event queue lets the station task exit.
    drop(events_tx);

    tokio::task::spawn_blocking(move || control.join())
        .await?
        .map_err(|_| "control thread panicked")?;

    Ok(())
}

/// Setup tracing subscriber from CLI arguments and the configured level.
fn setup_tracing(args: &Args, log_level: LogLevel) {
    let level = if args.verbose {
        Level::DEBUG
    } else {
        match log_level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
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
