//! The fault stage — a per-signal transform between signal acquisition and
//! the engine, used to verify the detect → degrade → recover lifecycle.

use std::collections::HashMap;
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::sample::Sample;

/// Kinds of injectable faults. Variant spellings are the wire contract of
/// both the profile document and fault event lines.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FaultKind {
    /// Replace the value once, then self-clear.
    Spike,
    /// Replace the value on every pass-through.
    InvalidValue,
    /// Suppress validity for a counted number of applications.
    MissingUpdate,
    /// Block the apply call for a configured delay.
    DelayedReading,
    /// Suppress validity on every pass-through.
    InterfaceFailure,
}

impl std::fmt::Display for FaultKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Spike => "Spike",
            Self::InvalidValue => "InvalidValue",
            Self::MissingUpdate => "MissingUpdate",
            Self::DelayedReading => "DelayedReading",
            Self::InterfaceFailure => "InterfaceFailure",
        };
        f.write_str(s)
    }
}

/// Parameters interpreted per fault kind; unused fields are ignored.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FaultParams {
    /// Replacement value for `Spike` and `InvalidValue`.
    pub injected_value: f64,
    /// Suppressed applications for `MissingUpdate`.
    pub suppress_cycles: u32,
    /// Blocking delay for `DelayedReading`.
    pub delay_ms: u64,
}

#[derive(Clone, Debug)]
struct ActiveFault {
    kind: FaultKind,
    params: FaultParams,
    cycles_remaining: u32,
}

/// Table of active faults, at most one per signal.
///
/// Self-clearing faults (`Spike`, exhausted `MissingUpdate`) clear inside
/// `apply`, never on a timer.
#[derive(Debug, Default)]
pub struct FaultStage {
    faults: HashMap<String, ActiveFault>,
}

impl FaultStage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a fault for `signal_id`, replacing any existing one.
    pub fn inject(&mut self, signal_id: &str, kind: FaultKind, params: FaultParams) {
        tracing::debug!(signal = signal_id, kind = %kind, "fault installed");
        self.faults.insert(
            signal_id.to_string(),
            ActiveFault {
                kind,
                params,
                cycles_remaining: params.suppress_cycles,
            },
        );
    }

    /// Remove the fault for `signal_id`, if any.
    pub fn clear(&mut self, signal_id: &str) {
        self.faults.remove(signal_id);
    }

    /// Remove every fault.
    pub fn clear_all(&mut self) {
        self.faults.clear();
    }

    /// Apply the fault registered for the sample's signal, if any.
    ///
    /// Samples for signals without a fault pass through unchanged. The
    /// fault is taken out of the table and reinserted only when it
    /// persists past this application.
    pub fn apply(&mut self, sample: Sample) -> Sample {
        let mut fault = match self.faults.remove(&sample.signal_id) {
            Some(f) => f,
            None => return sample,
        };

        let mut modified = sample;
        let retain = match fault.kind {
            FaultKind::Spike => {
                modified.value = fault.params.injected_value;
                // One-shot.
                false
            }
            FaultKind::InvalidValue => {
                modified.value = fault.params.injected_value;
                true
            }
            FaultKind::MissingUpdate => {
                if fault.cycles_remaining > 0 {
                    fault.cycles_remaining -= 1;
                    modified.valid = false;
                    true
                } else {
                    // Exhausted on a previous apply; this one passes clean.
                    false
                }
            }
            FaultKind::DelayedReading => {
                thread::sleep(Duration::from_millis(fault.params.delay_ms));
                true
            }
            FaultKind::InterfaceFailure => {
                modified.valid = false;
                true
            }
        };

        if retain {
            self.faults.insert(modified.signal_id.clone(), fault);
        }
        modified
    }

    /// Whether a fault is registered for `signal_id`.
    pub fn has_fault(&self, signal_id: &str) -> bool {
        self.faults.contains_key(signal_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn reading(id: &str, value: f64) -> Sample {
        Sample::new(id, value, Instant::now())
    }

    #[test]
    fn no_fault_passes_through() {
        let mut stage = FaultStage::new();
        let out = stage.apply(reading("s", 0.5));
        assert!((out.value - 0.5).abs() < f64::EPSILON);
        assert!(out.valid);
    }

    #[test]
    fn fault_on_other_signal_is_a_no_op() {
        let mut stage = FaultStage::new();
        stage.inject(
            "other",
            FaultKind::InterfaceFailure,
            FaultParams::default(),
        );

        let out = stage.apply(reading("s", 0.5));
        assert!(out.valid);
        assert!(stage.has_fault("other"));
    }

    #[test]
    fn invalid_value_replaces_and_persists() {
        let mut stage = FaultStage::new();
        stage.inject(
            "s",
            FaultKind::InvalidValue,
            FaultParams {
                injected_value: -1.0,
                ..FaultParams::default()
            },
        );

        for _ in 0..3 {
            let out = stage.apply(reading("s", 0.5));
            assert!((out.value + 1.0).abs() < f64::EPSILON);
        }
        assert!(stage.has_fault("s"));
    }

    #[test]
    fn spike_is_one_shot() {
        let mut stage = FaultStage::new();
        stage.inject(
            "s",
            FaultKind::Spike,
            FaultParams {
                injected_value: 0.99,
                ..FaultParams::default()
            },
        );

        let first = stage.apply(reading("s", 0.5));
        assert!((first.value - 0.99).abs() < f64::EPSILON);
        assert!(!stage.has_fault("s"));

        let second = stage.apply(reading("s", 0.5));
        assert!((second.value - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_update_suppresses_exactly_k_cycles() {
        let mut stage = FaultStage::new();
        stage.inject(
            "s",
            FaultKind::MissingUpdate,
            FaultParams {
                suppress_cycles: 2,
                ..FaultParams::default()
            },
        );

        assert!(!stage.apply(reading("s", 0.5)).valid);
        assert!(!stage.apply(reading("s", 0.5)).valid);

        let third = stage.apply(reading("s", 0.5));
        assert!(third.valid);
        assert!((third.value - 0.5).abs() < f64::EPSILON);
        assert!(!stage.has_fault("s"));
    }

    #[test]
    fn interface_failure_suppresses_every_cycle() {
        let mut stage = FaultStage::new();
        stage.inject("s", FaultKind::InterfaceFailure, FaultParams::default());

        for _ in 0..3 {
            assert!(!stage.apply(reading("s", 0.5)).valid);
        }
        assert!(stage.has_fault("s"));
    }

    #[test]
    fn delayed_reading_blocks_without_modifying() {
        let mut stage = FaultStage::new();
        stage.inject(
            "s",
            FaultKind::DelayedReading,
            FaultParams {
                delay_ms: 20,
                ..FaultParams::default()
            },
        );

        let start = Instant::now();
        let out = stage.apply(reading("s", 0.5));
        assert!(start.elapsed() >= Duration::from_millis(20));
        assert!(out.valid);
        assert!((out.value - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn inject_replaces_existing_fault() {
        let mut stage = FaultStage::new();
        stage.inject("s", FaultKind::InterfaceFailure, FaultParams::default());
        stage.inject(
            "s",
            FaultKind::InvalidValue,
            FaultParams {
                injected_value: 7.0,
                ..FaultParams::default()
            },
        );

        let out = stage.apply(reading("s", 0.5));
        assert!(out.valid);
        assert!((out.value - 7.0).abs() < f64::EPSILON);
    }

    #[test]
    fn clear_and_clear_all_remove_faults() {
        let mut stage = FaultStage::new();
        stage.inject("a", FaultKind::InterfaceFailure, FaultParams::default());
        stage.inject("b", FaultKind::InterfaceFailure, FaultParams::default());

        stage.clear("a");
        assert!(!stage.has_fault("a"));
        assert!(stage.has_fault("b"));

        stage.clear_all();
        assert!(!stage.has_fault("b"));
    }

    #[test]
    fn kind_display_matches_wire_spelling() {
        assert_eq!(FaultKind::Spike.to_string(), "Spike");
        assert_eq!(FaultKind::InvalidValue.to_string(), "InvalidValue");
        assert_eq!(FaultKind::MissingUpdate.to_string(), "MissingUpdate");
        assert_eq!(FaultKind::DelayedReading.to_string(), "DelayedReading");
        assert_eq!(FaultKind::InterfaceFailure.to_string(), "InterfaceFailure");
    }
}
