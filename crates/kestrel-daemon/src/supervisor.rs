//! The supervisor loop.
//!
//! One tick: advance the fault schedule → poll signals → apply the fault
//! stage → emit `reading` events → run the engine → emit `transition`
//! events for everything new → sleep. All stages run on this one thread;
//! shutdown is a process-wide flag checked at the top of each tick.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use kestrel_core::{Engine, EventSink, FaultConfig, FaultStage, Sample, Scheduler, SystemState};

/// Default pause between ticks.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(500);

/// Thin orchestrator over the monitoring pipeline.
pub struct Supervisor {
    scheduler: Scheduler,
    stage: FaultStage,
    engine: Engine,
    sink: EventSink,
    fault_configs: Vec<FaultConfig>,
    shutdown: Arc<AtomicBool>,
    tick_interval: Duration,
}

impl Supervisor {
    pub fn new(
        scheduler: Scheduler,
        engine: Engine,
        sink: EventSink,
        fault_configs: Vec<FaultConfig>,
        shutdown: Arc<AtomicBool>,
    ) -> Self {
        Self {
            scheduler,
            stage: FaultStage::new(),
            engine,
            sink,
            fault_configs,
            shutdown,
            tick_interval: DEFAULT_TICK_INTERVAL,
        }
    }

    /// Run until the shutdown flag is raised, then report the final
    /// aggregate state.
    pub fn run(&mut self) -> SystemState {
        let start = Instant::now();
        let mut drained = 0usize;

        tracing::info!("monitoring started");

        while !self.shutdown.load(Ordering::Relaxed) {
            let elapsed_s = start.elapsed().as_secs_f64();
            advance_fault_schedule(
                &mut self.fault_configs,
                &mut self.stage,
                &self.sink,
                elapsed_s,
            );

            let samples: Vec<Sample> = self
                .scheduler
                .poll()
                .into_iter()
                .map(|s| self.stage.apply(s))
                .collect();

            for sample in &samples {
                self.sink.reading(sample);
            }

            self.engine.process(&samples);

            let transitions = self.engine.recent_transitions();
            for t in &transitions[drained..] {
                self.sink.transition(t);
                tracing::info!(
                    signal = %t.signal_id,
                    from = %t.from,
                    to = %t.to,
                    reason = %t.reason,
                    "state transition"
                );
            }
            drained = transitions.len();

            thread::sleep(self.tick_interval);
        }

        let aggregate = self.engine.aggregate_state();
        tracing::info!(aggregate = %aggregate, "shutting down");
        aggregate
    }
}

/// Advance the declarative fault schedule by one tick.
///
/// Injects faults whose trigger time has arrived (emitting a `fault` event
/// and stamping the runtime flags) and clears triggered faults whose
/// duration has expired. A zero duration never auto-clears.
pub(crate) fn advance_fault_schedule(
    configs: &mut [FaultConfig],
    stage: &mut FaultStage,
    sink: &EventSink,
    elapsed_s: f64,
) {
    for fc in configs.iter_mut() {
        if !fc.triggered && elapsed_s >= fc.trigger_after_s {
            stage.inject(&fc.signal_id, fc.kind, fc.params());
            fc.triggered = true;
            fc.injected_at_s = elapsed_s;
            sink.fault(&fc.signal_id, fc.kind, fc.value);
            tracing::info!(
                signal = %fc.signal_id,
                kind = %fc.kind,
                at_s = elapsed_s,
                "fault injected"
            );
        }

        if fc.triggered
            && !fc.cleared
            && fc.duration_s > 0.0
            && elapsed_s >= fc.injected_at_s + fc.duration_s
        {
            stage.clear(&fc.signal_id);
            fc.cleared = true;
            tracing::info!(signal = %fc.signal_id, at_s = elapsed_s, "fault cleared");
        }
    }
}
