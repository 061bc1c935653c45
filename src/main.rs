//! Lightwindow — daily light window controller.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  FileScheduleStore  RelayDriver<Pin>  LocalClock  LogEventSink │
//! │  (ScheduleStore)    (OutputPort)      (Clock)     (EventSink)  │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │  ScheduleService (mutations)   Reconciler (loop)       │    │
//! │  │              evaluator::desired_state                  │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The relay is driven through a simulated pin on hosts; boards supply
//! their own `embedded-hal` output pin to [`RelayDriver`].

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use log::{info, warn};
use tracing_subscriber::EnvFilter;

use lightwindow::adapters::file_store::FileScheduleStore;
use lightwindow::adapters::log_sink::LogEventSink;
use lightwindow::adapters::time::LocalClock;
use lightwindow::app::ports::Clock;
use lightwindow::app::service::{Controller, LightStatus, ScheduleService};
use lightwindow::config::ControllerConfig;
use lightwindow::drivers::relay::RelayDriver;
use lightwindow::drivers::sim_pin::SimulatedPin;
use lightwindow::evaluator::desired_state;
use lightwindow::reconciler::{self, Reconciler, ShutdownSignal};

#[derive(Parser)]
#[command(
    name = "lightwindow",
    version,
    about = "Switch a relay-driven light on a daily ON/OFF window"
)]
struct Cli {
    /// Controller configuration file (JSON); defaults apply if absent
    #[arg(long, global = true, default_value = "lightwindow.json")]
    config: PathBuf,

    /// Schedule record path, overriding the configuration
    #[arg(long, global = true)]
    schedule: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the reconciliation loop until SIGINT/SIGTERM
    Run,
    /// Commit a new ON/OFF window (HH:MM HH:MM)
    Set { on: String, off: String },
    /// Print the committed window
    Show,
    /// Print the light state for this instant as JSON
    Status,
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let mut config = ControllerConfig::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    if let Some(path) = cli.schedule {
        config.schedule_path = path;
    }

    match cli.command {
        Commands::Run => run(&config),
        Commands::Set { on, off } => Ok(set(&config, &on, &off)?),
        Commands::Show => {
            show(&config);
            Ok(())
        }
        Commands::Status => status(&config),
    }
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("lightwindow=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// ── run ───────────────────────────────────────────────────────

fn run(config: &ControllerConfig) -> Result<()> {
    info!("Lightwindow v{} starting", env!("CARGO_PKG_VERSION"));

    // Handler first: a signal arriving during startup still ends
    // with the relay OFF.
    let shutdown = Arc::new(ShutdownSignal::new());
    let on_signal = Arc::clone(&shutdown);
    ctrlc::set_handler(move || {
        info!("Termination signal received, stopping");
        on_signal.signal(());
    })
    .context("installing signal handler")?;

    let store = Arc::new(FileScheduleStore::new(&config.schedule_path));
    let service = Arc::new(ScheduleService::new(Arc::clone(&store)));

    // Output LOW before anything else, whatever the pin held before.
    let mut relay = RelayDriver::new(
        SimulatedPin::new(config.relay_gpio),
        config.relay_active_low,
    );
    relay.setup().context("relay setup failed")?;

    let reconciler = Reconciler::new(store, relay, LocalClock::new(), config);
    let controller = Controller::new(service, reconciler.status_handle());
    match controller.get_schedule() {
        Some(window) => info!("Schedule in effect: {}", window),
        None => info!("No schedule configured; light stays OFF"),
    }

    let handle = reconciler::spawn_with_signal(reconciler, shutdown, LogEventSink::new())
        .context("spawning reconcile thread")?;

    let relay = handle
        .join()
        .map_err(|_| anyhow!("reconcile thread panicked"))?;
    let pin = relay.release();
    info!(
        "Relay released: GPIO{} {}, final status {:?}",
        config.relay_gpio,
        if pin.is_high() { "HIGH" } else { "LOW" },
        controller.status()
    );
    Ok(())
}

// ── set / show / status ───────────────────────────────────────

fn set(config: &ControllerConfig, on: &str, off: &str) -> lightwindow::error::Result<()> {
    let service = ScheduleService::new(FileScheduleStore::new(&config.schedule_path));
    let window = service.set_schedule(on, off, &mut LogEventSink::new())?;
    println!("{}", window.to_record());
    Ok(())
}

fn show(config: &ControllerConfig) {
    let service = ScheduleService::new(FileScheduleStore::new(&config.schedule_path));
    match service.schedule() {
        Ok(Some(window)) => println!("{}", window.to_record()),
        Ok(None) => println!("unconfigured"),
        Err(e) => {
            warn!("{e}");
            println!("unconfigured");
        }
    }
}

fn status(config: &ControllerConfig) -> Result<()> {
    let store = FileScheduleStore::new(&config.schedule_path);
    let schedule = ScheduleService::new(store).schedule().unwrap_or_else(|e| {
        warn!("{e}, treating as unconfigured");
        None
    });
    let state = desired_state(LocalClock::new().now(), schedule.as_ref(), config.buffer());
    let status = LightStatus::new(Some(state), schedule);
    println!("{}", serde_json::to_string(&status)?);
    Ok(())
}
