//! Health rules and the pluggable rule trait.
//!
//! Provides:
//! - `Rule` trait for pluggable classification
//! - 4 built-in rules: Threshold, ImplausibleValue, RateOfChange, MissingData
//!
//! Rules are stateless predicates over the measurement window; the engine
//! reduces their verdicts into per-signal states.

use std::collections::HashMap;
use std::time::Duration;

use crate::sample::{RuleResult, Severity};
use crate::window::MeasurementWindow;

// ── Trait ───────────────────────────────────────────────────────────────

/// Pluggable health rule.
///
/// Each rule inspects the retained samples for one signal and produces a
/// severity verdict with an optional diagnostic.
pub trait Rule {
    /// Evaluate this rule for a single signal over the window.
    fn evaluate(&self, window: &MeasurementWindow, signal_id: &str) -> RuleResult;

    /// Stable rule name (for event lines and diagnostics).
    fn name(&self) -> &str;
}

// ── 1. Threshold ────────────────────────────────────────────────────────

/// Bounds applied to one signal by a `ThresholdRule`.
#[derive(Clone, Copy, Debug)]
pub struct ThresholdBounds {
    pub min: f64,
    pub max: f64,
    pub breach_severity: Severity,
}

/// Range check against the latest sample.
///
/// Two modes: a global scalar bound applied to every signal, or a
/// per-signal bounds map where unmapped signals deliberately pass. A
/// "low is bad" signal is expressed with an inverted band, e.g. battery
/// `[0.05, 1.0]` breaches when charge drops below 5%.
pub struct ThresholdRule {
    global: Option<ThresholdBounds>,
    bounds: HashMap<String, ThresholdBounds>,
}

impl ThresholdRule {
    /// Scalar construction. An empty `target_signal` applies the bounds to
    /// every signal; otherwise only the named signal is checked and all
    /// others pass.
    pub fn new(min: f64, max: f64, breach_severity: Severity, target_signal: &str) -> Self {
        let bounds = ThresholdBounds {
            min,
            max,
            breach_severity,
        };
        if target_signal.is_empty() {
            Self {
                global: Some(bounds),
                bounds: HashMap::new(),
            }
        } else {
            Self {
                global: None,
                bounds: HashMap::from([(target_signal.to_string(), bounds)]),
            }
        }
    }

    /// Per-signal map construction. Signals absent from the map pass.
    pub fn from_bounds(bounds: HashMap<String, ThresholdBounds>) -> Self {
        Self {
            global: None,
            bounds,
        }
    }
}

impl Rule for ThresholdRule {
    fn evaluate(&self, window: &MeasurementWindow, signal_id: &str) -> RuleResult {
        let bounds = match self.global.as_ref().or_else(|| self.bounds.get(signal_id)) {
            Some(b) => b,
            None => return RuleResult::ok(self.name(), signal_id),
        };

        let latest = window.latest(signal_id);
        if !latest.valid {
            return RuleResult::breach(self.name(), signal_id, Severity::Failed, "no valid reading");
        }

        if latest.value < bounds.min || latest.value > bounds.max {
            return RuleResult::breach(
                self.name(),
                signal_id,
                bounds.breach_severity,
                format!(
                    "value {} outside bounds [{}, {}]",
                    latest.value, bounds.min, bounds.max
                ),
            );
        }

        RuleResult::ok(self.name(), signal_id)
    }

    fn name(&self) -> &str {
        "ThresholdRule"
    }
}

// ── 2. Implausible value ────────────────────────────────────────────────

/// Hard physical bounds, independent of per-signal thresholds.
///
/// An invalid latest sample passes here — missing data is the
/// `MissingDataRule`'s verdict to make.
pub struct ImplausibleValueRule {
    absolute_min: f64,
    absolute_max: f64,
}

impl ImplausibleValueRule {
    pub fn new(absolute_min: f64, absolute_max: f64) -> Self {
        Self {
            absolute_min,
            absolute_max,
        }
    }
}

impl Rule for ImplausibleValueRule {
    fn evaluate(&self, window: &MeasurementWindow, signal_id: &str) -> RuleResult {
        let latest = window.latest(signal_id);
        if !latest.valid {
            return RuleResult::ok(self.name(), signal_id);
        }

        if latest.value < self.absolute_min || latest.value > self.absolute_max {
            return RuleResult::breach(
                self.name(),
                signal_id,
                Severity::Failed,
                format!(
                    "implausible value {} outside absolute bounds [{}, {}]",
                    latest.value, self.absolute_min, self.absolute_max
                ),
            );
        }

        RuleResult::ok(self.name(), signal_id)
    }

    fn name(&self) -> &str {
        "ImplausibleValueRule"
    }
}

// ── 3. Rate of change ───────────────────────────────────────────────────

/// Flags jumps between the last two retained samples.
///
/// Passes when fewer than two samples exist, either is invalid, or the
/// time delta is non-positive (identical timestamps guard).
pub struct RateOfChangeRule {
    max_rate_per_second: f64,
}

impl RateOfChangeRule {
    pub fn new(max_rate_per_second: f64) -> Self {
        Self {
            max_rate_per_second,
        }
    }
}

impl Rule for RateOfChangeRule {
    fn evaluate(&self, window: &MeasurementWindow, signal_id: &str) -> RuleResult {
        let readings = window.readings_for(signal_id);
        if readings.len() < 2 {
            return RuleResult::ok(self.name(), signal_id);
        }

        let prev = &readings[readings.len() - 2];
        let curr = &readings[readings.len() - 1];
        if !prev.valid || !curr.valid {
            return RuleResult::ok(self.name(), signal_id);
        }

        let dt = curr
            .timestamp
            .saturating_duration_since(prev.timestamp)
            .as_secs_f64();
        if dt <= 0.0 {
            return RuleResult::ok(self.name(), signal_id);
        }

        let rate = (curr.value - prev.value).abs() / dt;
        if rate > self.max_rate_per_second {
            return RuleResult::breach(
                self.name(),
                signal_id,
                Severity::Degraded,
                format!(
                    "rate of change {:.3}/s exceeds limit {}/s",
                    rate, self.max_rate_per_second
                ),
            );
        }

        RuleResult::ok(self.name(), signal_id)
    }

    fn name(&self) -> &str {
        "RateOfChangeRule"
    }
}

// ── 4. Missing data ─────────────────────────────────────────────────────

/// Staleness check on the latest sample's age.
///
/// `max_age` marks the signal DEGRADED, `fail_age` marks it FAILED; both
/// comparisons are strict, so an age of exactly `max_age` still passes.
pub struct MissingDataRule {
    max_age: Duration,
    fail_age: Duration,
}

impl MissingDataRule {
    /// `max_age` must be shorter than `fail_age`.
    pub fn new(max_age: Duration, fail_age: Duration) -> Self {
        debug_assert!(max_age < fail_age);
        Self { max_age, fail_age }
    }
}

impl Rule for MissingDataRule {
    fn evaluate(&self, window: &MeasurementWindow, signal_id: &str) -> RuleResult {
        let latest = window.latest(signal_id);
        if !latest.valid {
            return RuleResult::breach(self.name(), signal_id, Severity::Failed, "no valid reading");
        }

        let age = latest.timestamp.elapsed();
        if age > self.fail_age {
            return RuleResult::breach(
                self.name(),
                signal_id,
                Severity::Failed,
                "reading age exceeds failure threshold",
            );
        }
        if age > self.max_age {
            return RuleResult::breach(
                self.name(),
                signal_id,
                Severity::Degraded,
                "reading age exceeds expected interval",
            );
        }

        RuleResult::ok(self.name(), signal_id)
    }

    fn name(&self) -> &str {
        "MissingDataRule"
    }
}
