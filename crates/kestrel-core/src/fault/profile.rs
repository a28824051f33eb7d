//! Declarative fault schedules, stored as a JSON document:
//!
//! ```json
//! {"faults": [{"sensor_id": "cpu_load", "type": "Spike", "value": 3.0,
//!              "trigger_after_s": 2.0, "duration_s": 0.0}]}
//! ```
//!
//! Runtime state (`triggered`, `cleared`, `injected_at_s`) never round-trips
//! through the document; loaded configs always start untriggered.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{MonitorError, MonitorResult};
use crate::fault::stage::{FaultKind, FaultParams};

/// One scheduled fault occurrence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FaultConfig {
    #[serde(rename = "sensor_id")]
    pub signal_id: String,
    #[serde(rename = "type")]
    pub kind: FaultKind,
    /// Replacement value for `Spike` / `InvalidValue`.
    #[serde(default)]
    pub value: f64,
    /// Suppressed applications for `MissingUpdate`.
    #[serde(default)]
    pub suppress_cycles: u32,
    /// Blocking delay for `DelayedReading`.
    #[serde(default)]
    pub delay_ms: u64,
    /// Seconds after supervisor start at which to inject.
    #[serde(default)]
    pub trigger_after_s: f64,
    /// Seconds the fault stays active; 0 means no auto-clear.
    #[serde(default)]
    pub duration_s: f64,

    // Runtime state, owned by the supervisor.
    #[serde(skip)]
    pub triggered: bool,
    #[serde(skip)]
    pub cleared: bool,
    #[serde(skip)]
    pub injected_at_s: f64,
}

impl FaultConfig {
    /// Stage parameters for this schedule entry.
    pub fn params(&self) -> FaultParams {
        FaultParams {
            injected_value: self.value,
            suppress_cycles: self.suppress_cycles,
            delay_ms: self.delay_ms,
        }
    }
}

#[derive(Deserialize)]
struct ProfileDocument {
    faults: Vec<FaultConfig>,
}

#[derive(Serialize)]
struct ProfileDocumentRef<'a> {
    faults: &'a [FaultConfig],
}

/// Loader and writer for fault profile documents.
pub struct FaultProfile;

impl FaultProfile {
    /// Parse a profile document. Missing files, malformed JSON, and unknown
    /// fault kind spellings are all reported as errors.
    pub fn load(path: impl AsRef<Path>) -> MonitorResult<Vec<FaultConfig>> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| MonitorError::ProfileIo {
            path: path.display().to_string(),
            source,
        })?;

        let doc: ProfileDocument =
            serde_json::from_str(&contents).map_err(|e| MonitorError::ProfileParse {
                path: path.display().to_string(),
                detail: e.to_string(),
            })?;

        Ok(doc.faults)
    }

    /// Write a profile document containing the declared fields of `configs`.
    pub fn save(path: impl AsRef<Path>, configs: &[FaultConfig]) -> MonitorResult<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(&ProfileDocumentRef { faults: configs })
            .map_err(|e| MonitorError::ProfileParse {
                path: path.display().to_string(),
                detail: e.to_string(),
            })?;

        fs::write(path, json).map_err(|source| MonitorError::ProfileIo {
            path: path.display().to_string(),
            source,
        })
    }
}
