//! kestrel — deterministic host-health monitoring daemon.
//!
//! Samples cpu/memory/battery/storage on per-signal cadences, classifies
//! them against the standard rule set, and appends one JSON event per line
//! to the event log and stdout. A fault profile can schedule controlled
//! degradation for verifying the detect → degrade → recover lifecycle.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod providers;
mod supervisor;

use kestrel_core::{
    Engine, EventSink, FaultProfile, ImplausibleValueRule, MissingDataRule, MonitorError,
    MonitorResult, RateOfChangeRule, Rule, Scheduler, Severity, ThresholdRule,
};

use providers::{BatteryProvider, CpuLoadProvider, MemoryProvider, StorageProvider};
use supervisor::Supervisor;

/// Host-health monitoring daemon.
#[derive(Parser)]
#[command(name = "kestrel")]
#[command(about = "Deterministic host-health monitoring daemon", long_about = None)]
#[command(version)]
struct Cli {
    /// Fault profile JSON to schedule controlled degradation
    #[arg(long)]
    fault: Option<PathBuf>,

    /// Event log path (append-only JSONL)
    #[arg(long, default_value = "kestrel.jsonl")]
    log: PathBuf,

    /// Degradation threshold in [0, 1] for the standard rule set
    #[arg(long, default_value_t = 0.95)]
    threshold: f64,
}

/// The standard rule set.
///
/// High usage is bad for cpu/memory/storage; low charge is bad for
/// battery, expressed as the inverted band `[1 - threshold, 1]`.
fn standard_rules(threshold: f64) -> Vec<Box<dyn Rule>> {
    let battery_low = 1.0 - threshold;
    vec![
        Box::new(ThresholdRule::new(
            0.0,
            threshold,
            Severity::Degraded,
            "cpu_load",
        )),
        Box::new(ThresholdRule::new(
            0.0,
            threshold,
            Severity::Degraded,
            "memory",
        )),
        Box::new(ThresholdRule::new(
            0.0,
            threshold,
            Severity::Degraded,
            "storage",
        )),
        Box::new(ThresholdRule::new(
            battery_low,
            1.0,
            Severity::Degraded,
            "battery",
        )),
        Box::new(ImplausibleValueRule::new(-1.0, 200.0)),
        Box::new(RateOfChangeRule::new(0.5)),
        Box::new(MissingDataRule::new(
            Duration::from_millis(5000),
            Duration::from_millis(15000),
        )),
    ]
}

fn main() -> MonitorResult<()> {
    let cli = Cli::parse();

    // Diagnostics go to stderr; stdout carries only event lines.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if !(0.0..=1.0).contains(&cli.threshold) {
        return Err(MonitorError::Config(format!(
            "threshold {} outside [0, 1]",
            cli.threshold
        )));
    }

    let fault_configs = match &cli.fault {
        Some(path) => {
            let configs = FaultProfile::load(path)?;
            tracing::info!(
                count = configs.len(),
                path = %path.display(),
                "loaded fault profile"
            );
            for fc in &configs {
                tracing::info!(
                    signal = %fc.signal_id,
                    kind = %fc.kind,
                    trigger_after_s = fc.trigger_after_s,
                    duration_s = fc.duration_s,
                    "scheduled fault"
                );
            }
            configs
        }
        None => Vec::new(),
    };

    let sink = EventSink::new(Some(cli.log.as_path()))?;

    let mut scheduler = Scheduler::new();
    scheduler.register(Box::new(CpuLoadProvider::new()), Duration::from_millis(1000));
    scheduler.register(Box::new(MemoryProvider::new()), Duration::from_millis(2000));
    scheduler.register(Box::new(BatteryProvider::new()), Duration::from_millis(5000));
    scheduler.register(Box::new(StorageProvider::new()), Duration::from_millis(10000));

    let mut engine = Engine::default();
    for rule in standard_rules(cli.threshold) {
        engine.add_rule(rule);
    }

    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = shutdown.clone();
    ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed))
        .map_err(|e| MonitorError::Config(format!("cannot install signal handler: {e}")))?;

    let mut supervisor = Supervisor::new(scheduler, engine, sink, fault_configs, shutdown);
    supervisor.run();

    Ok(())
}
