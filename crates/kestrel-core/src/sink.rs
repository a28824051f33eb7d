//! Line-oriented JSON event sink.
//!
//! Four event kinds — `reading`, `transition`, `fault`, `rule_violation` —
//! each serialized as one JSON object per line to an append-only file (when
//! configured) and to standard output, flushed per line. Consumers must
//! tolerate unknown fields and unknown `type` values.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use chrono::Utc;
use parking_lot::Mutex;
use serde_json::json;

use crate::error::{MonitorError, MonitorResult};
use crate::fault::FaultKind;
use crate::sample::{RuleResult, Sample, StateTransition};

/// Serializes pipeline events as JSONL.
///
/// Safe under concurrent callers: an internal mutex makes each line atomic,
/// so interleaving happens only at line boundaries. File write failures are
/// swallowed — standard output still receives every line.
#[derive(Debug)]
pub struct EventSink {
    file: Mutex<Option<File>>,
}

impl EventSink {
    /// Open a sink appending to `path`. `None` writes to stdout only.
    pub fn new(path: Option<&Path>) -> MonitorResult<Self> {
        let file = match path {
            Some(p) => Some(
                OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(p)
                    .map_err(|source| MonitorError::SinkOpen {
                        path: p.display().to_string(),
                        source,
                    })?,
            ),
            None => None,
        };

        Ok(Self {
            file: Mutex::new(file),
        })
    }

    /// A sink that writes to stdout only.
    pub fn stdout_only() -> Self {
        Self {
            file: Mutex::new(None),
        }
    }

    /// Emit a `reading` event for one sample.
    pub fn reading(&self, sample: &Sample) {
        self.write_line(json!({
            "ts": Self::timestamp(),
            "type": "reading",
            "sensor": sample.signal_id,
            "value": sample.value,
            "valid": sample.valid,
        }));
    }

    /// Emit a `transition` event for one state change.
    pub fn transition(&self, transition: &StateTransition) {
        self.write_line(json!({
            "ts": Self::timestamp(),
            "type": "transition",
            "sensor": transition.signal_id,
            "from": transition.from.as_str(),
            "to": transition.to.as_str(),
            "reason": transition.reason,
        }));
    }

    /// Emit a `fault` event for an injected fault.
    pub fn fault(&self, signal_id: &str, kind: FaultKind, injected_value: f64) {
        self.write_line(json!({
            "ts": Self::timestamp(),
            "type": "fault",
            "sensor": signal_id,
            "fault_type": kind.to_string(),
            "injected_value": injected_value,
        }));
    }

    /// Emit a `rule_violation` event for one non-passing rule result.
    pub fn rule_violation(&self, result: &RuleResult) {
        self.write_line(json!({
            "ts": Self::timestamp(),
            "type": "rule_violation",
            "rule": result.rule_name,
            "sensor": result.signal_id,
            "message": result.message,
        }));
    }

    fn write_line(&self, event: serde_json::Value) {
        let line = event.to_string();

        let mut file = self.file.lock();
        if let Some(f) = file.as_mut() {
            // File errors are swallowed; stdout still receives the line.
            let _ = writeln!(f, "{line}").and_then(|_| f.flush());
        }
        println!("{line}");
    }

    /// UTC ISO-8601 with second precision, fixed 20-character form.
    fn timestamp() -> String {
        Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}
