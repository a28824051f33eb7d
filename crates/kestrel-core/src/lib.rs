//! # kestrel-core
//!
//! Deterministic host-health monitoring engine.
//!
//! A fixed set of numeric signals is sampled on per-signal cadences,
//! passed through an optional fault-injection stage, classified by a rule
//! pipeline into per-signal and aggregate health states, and emitted as an
//! append-only JSONL event stream.
//!
//! ## Architecture
//!
//! ```text
//!   ┌────────────┐     ┌────────────┐     ┌───────────────────────┐
//!   │ Scheduler  │────▶│ FaultStage │────▶│ Engine                │
//!   │ (cadences) │ raw │ (transform)│     │  ┌──────────────────┐ │
//!   └────────────┘     └────────────┘     │  │MeasurementWindow │ │
//!                                         │  └──────────────────┘ │
//!                                         │  ┌──────────────────┐ │
//!                                         │  │ Rules            │ │
//!                                         │  └──────────────────┘ │
//!                                         │  states + transitions │
//!                                         └──────────┬────────────┘
//!                                                    │
//!                                             ┌──────▼─────┐
//!                                             │ EventSink  │ → JSONL
//!                                             └────────────┘
//! ```
//!
//! ## Invariants
//!
//! - Per-signal retention never exceeds the window capacity
//! - Classification is deterministic: rules run in registration order and
//!   the first non-OK verdict wins
//! - Aggregate is worst-wins: FAILED > UNKNOWN > DEGRADED > OK
//! - A signal that has produced a sample never reports UNKNOWN again
//! - Every state change appends exactly one transition record
//! - At most one active fault per signal; self-clearing faults clear
//!   inside `apply`, never on a timer
//!
//! ## Quick start
//!
//! ```rust
//! use std::time::Instant;
//! use kestrel_core::{Engine, Sample, Severity, SystemState, ThresholdRule};
//!
//! let mut engine = Engine::default();
//! engine.add_rule(Box::new(ThresholdRule::new(0.0, 0.95, Severity::Degraded, "")));
//!
//! engine.process(&[Sample::new("cpu_load", 0.42, Instant::now())]);
//! assert_eq!(engine.signal_state("cpu_load"), SystemState::Ok);
//! assert_eq!(engine.aggregate_state(), SystemState::Ok);
//! ```

#![deny(unsafe_code)]

pub mod engine;
pub mod error;
pub mod fault;
pub mod rules;
pub mod sample;
pub mod scheduler;
pub mod sink;
pub mod window;

// ── Re-exports ──────────────────────────────────────────────────────────

pub use engine::Engine;
pub use error::{MonitorError, MonitorResult};
pub use fault::{FaultConfig, FaultKind, FaultParams, FaultProfile, FaultStage};
pub use rules::{
    ImplausibleValueRule, MissingDataRule, RateOfChangeRule, Rule, ThresholdBounds, ThresholdRule,
};
pub use sample::{RuleResult, Sample, Severity, StateTransition, SystemState};
pub use scheduler::{Scheduler, SignalProvider};
pub use sink::EventSink;
pub use window::{MeasurementWindow, DEFAULT_WINDOW_CAPACITY};
