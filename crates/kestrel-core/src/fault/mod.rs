//! Fault injection: the in-line transform stage and the declarative
//! profile loader used to schedule controlled degradation.

mod profile;
mod stage;

pub use profile::{FaultConfig, FaultProfile};
pub use stage::{FaultKind, FaultParams, FaultStage};
