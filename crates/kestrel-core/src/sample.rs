//! Core observation types: samples, severities, system states, transitions.
//!
//! Pipeline time is monotonic (`Instant`). Wall-clock time exists only at
//! the event-sink boundary where lines are stamped for external consumers.

use std::time::Instant;

/// One observation of one signal at one instant.
///
/// A sample with `valid == false` means the provider could not produce a
/// reading this tick; `value` must not be interpreted in that case.
#[derive(Clone, Debug)]
pub struct Sample {
    /// Stable identifier of the source signal.
    pub signal_id: String,
    /// Observed value, normalized by providers into their declared domain.
    pub value: f64,
    /// Monotonic instant the sample was produced.
    pub timestamp: Instant,
    /// Whether the provider produced a usable reading.
    pub valid: bool,
}

impl Sample {
    /// A valid observation.
    pub fn new(signal_id: impl Into<String>, value: f64, timestamp: Instant) -> Self {
        Self {
            signal_id: signal_id.into(),
            value,
            timestamp,
            valid: true,
        }
    }

    /// A "no reading this tick" observation. `value` is zeroed.
    pub fn invalid(signal_id: impl Into<String>, timestamp: Instant) -> Self {
        Self {
            signal_id: signal_id.into(),
            value: 0.0,
            timestamp,
            valid: false,
        }
    }
}

/// Rule verdict severity, totally ordered: `Ok < Degraded < Failed`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Ok,
    Degraded,
    Failed,
}

/// Externally reported classification of a signal or the whole system.
///
/// `Unknown` exists only before a signal's first observation; once a signal
/// has produced a sample it never reports `Unknown` again.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SystemState {
    Ok,
    Degraded,
    Failed,
    Unknown,
}

impl SystemState {
    /// Wire spelling used on transition event lines.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Degraded => "DEGRADED",
            Self::Failed => "FAILED",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for SystemState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Severity> for SystemState {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Ok => Self::Ok,
            Severity::Degraded => Self::Degraded,
            Severity::Failed => Self::Failed,
        }
    }
}

/// Outcome of one rule evaluation for one signal.
#[derive(Clone, Debug)]
pub struct RuleResult {
    pub rule_name: String,
    pub signal_id: String,
    pub severity: Severity,
    pub message: String,
}

impl RuleResult {
    /// A passing result with no diagnostic.
    pub fn ok(rule_name: impl Into<String>, signal_id: impl Into<String>) -> Self {
        Self {
            rule_name: rule_name.into(),
            signal_id: signal_id.into(),
            severity: Severity::Ok,
            message: String::new(),
        }
    }

    /// A non-passing result carrying a diagnostic message.
    pub fn breach(
        rule_name: impl Into<String>,
        signal_id: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            rule_name: rule_name.into(),
            signal_id: signal_id.into(),
            severity,
            message: message.into(),
        }
    }
}

/// Record of one per-signal state change.
#[derive(Clone, Debug)]
pub struct StateTransition {
    pub signal_id: String,
    pub from: SystemState,
    pub to: SystemState,
    pub reason: String,
    pub timestamp: Instant,
}
