//! The monitoring engine — the core classification pipeline.
//!
//! Consumes batches of samples, retains them in the measurement window,
//! runs the rule list, and maintains the per-signal state machine plus the
//! worst-wins aggregate. Every state change appends exactly one transition
//! record.

use std::collections::HashMap;
use std::time::Instant;

use crate::error::MonitorResult;
use crate::rules::Rule;
use crate::sample::{RuleResult, Sample, Severity, StateTransition, SystemState};
use crate::window::MeasurementWindow;

/// Reason string recorded on rule-driven transitions.
const REASON_RULE_EVALUATION: &str = "rule_evaluation";

/// Deterministic per-signal and aggregate health classification.
pub struct Engine {
    window: MeasurementWindow,
    rules: Vec<Box<dyn Rule>>,
    signal_states: HashMap<String, SystemState>,
    transitions: Vec<StateTransition>,
    violations: Vec<RuleResult>,
}

impl Engine {
    /// Create an engine with the given per-signal window capacity.
    pub fn new(window_capacity: usize) -> MonitorResult<Self> {
        Ok(Self {
            window: MeasurementWindow::new(window_capacity)?,
            rules: Vec::new(),
            signal_states: HashMap::new(),
            transitions: Vec::new(),
            violations: Vec::new(),
        })
    }

    /// Extend the rule list. Registration order is significant: the first
    /// rule to fire supplies the diagnostic for its severity.
    pub fn add_rule(&mut self, rule: Box<dyn Rule>) {
        self.rules.push(rule);
    }

    /// Consume a batch of samples in iteration order, updating per-signal
    /// states and appending a transition record on every change.
    pub fn process(&mut self, samples: &[Sample]) {
        self.violations.clear();

        for sample in samples {
            self.window.push(sample.clone());

            let id = sample.signal_id.clone();
            self.signal_states
                .entry(id.clone())
                .or_insert(SystemState::Unknown);

            let new_state = self.evaluate_signal(&id);
            if self.signal_states[&id] != new_state {
                self.transition(&id, new_state, REASON_RULE_EVALUATION);
            }
        }
    }

    /// Current state of one signal; `Unknown` for never-seen signals.
    pub fn signal_state(&self, signal_id: &str) -> SystemState {
        self.signal_states
            .get(signal_id)
            .copied()
            .unwrap_or(SystemState::Unknown)
    }

    /// Worst-wins reduction over all known signals:
    /// FAILED > UNKNOWN > DEGRADED > OK. `Unknown` when no signal has ever
    /// been observed.
    pub fn aggregate_state(&self) -> SystemState {
        if self.signal_states.is_empty() {
            return SystemState::Unknown;
        }

        let mut worst = SystemState::Ok;
        for state in self.signal_states.values() {
            match state {
                SystemState::Failed => return SystemState::Failed,
                SystemState::Unknown => worst = SystemState::Unknown,
                SystemState::Degraded if worst == SystemState::Ok => {
                    worst = SystemState::Degraded;
                }
                _ => {}
            }
        }
        worst
    }

    /// All transitions recorded since construction, in order.
    pub fn recent_transitions(&self) -> &[StateTransition] {
        &self.transitions
    }

    /// Non-OK rule results from the most recent `process` call.
    pub fn last_violations(&self) -> &[RuleResult] {
        &self.violations
    }

    /// Read-only window access for inspection.
    pub fn window(&self) -> &MeasurementWindow {
        &self.window
    }

    /// Classify one signal from its retained samples.
    ///
    /// An invalid latest reading trumps rule logic. Otherwise rules run in
    /// registration order and evaluation returns at the first non-OK
    /// verdict, keeping diagnostic messages deterministic.
    fn evaluate_signal(&mut self, signal_id: &str) -> SystemState {
        if !self.window.latest(signal_id).valid {
            return SystemState::Failed;
        }

        for rule in &self.rules {
            let result = rule.evaluate(&self.window, signal_id);
            match result.severity {
                Severity::Failed => {
                    self.violations.push(result);
                    return SystemState::Failed;
                }
                Severity::Degraded => {
                    self.violations.push(result);
                    return SystemState::Degraded;
                }
                Severity::Ok => {}
            }
        }

        SystemState::Ok
    }

    fn transition(&mut self, signal_id: &str, to: SystemState, reason: &str) {
        let from = self.signal_states[signal_id];
        tracing::debug!(signal = signal_id, from = %from, to = %to, "state change");
        self.transitions.push(StateTransition {
            signal_id: signal_id.to_string(),
            from,
            to,
            reason: reason.to_string(),
            timestamp: Instant::now(),
        });
        self.signal_states.insert(signal_id.to_string(), to);
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self {
            window: MeasurementWindow::default(),
            rules: Vec::new(),
            signal_states: HashMap::new(),
            transitions: Vec::new(),
            violations: Vec::new(),
        }
    }
}
