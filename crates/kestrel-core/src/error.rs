use thiserror::Error;

/// Errors from the monitoring core.
///
/// Provider failures are deliberately NOT represented here — a provider
/// that cannot read its facility returns a `Sample` with `valid == false`
/// and the rule pipeline classifies the signal as FAILED. Only
/// construction-time and startup-time problems are typed errors.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("measurement window capacity must be positive")]
    InvalidCapacity,

    #[error("cannot read fault profile {path}: {source}")]
    ProfileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed fault profile {path}: {detail}")]
    ProfileParse { path: String, detail: String },

    #[error("cannot open event log {path}: {source}")]
    SinkOpen {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("configuration error: {0}")]
    Config(String),
}

/// Convenience type alias for monitoring results.
pub type MonitorResult<T> = Result<T, MonitorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let e = MonitorError::InvalidCapacity;
        assert!(e.to_string().contains("capacity"));

        let e = MonitorError::ProfileParse {
            path: "faults.json".into(),
            detail: "unknown variant `Meltdown`".into(),
        };
        assert!(e.to_string().contains("faults.json"));
        assert!(e.to_string().contains("Meltdown"));

        let e = MonitorError::Config("threshold 1.5 outside [0, 1]".into());
        assert!(e.to_string().contains("threshold"));
    }

    #[test]
    fn io_errors_carry_source() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let e = MonitorError::ProfileIo {
            path: "missing.json".into(),
            source: io,
        };
        assert!(e.to_string().contains("missing.json"));
        assert!(std::error::Error::source(&e).is_some());
    }

    #[test]
    fn result_alias_works() {
        let ok: MonitorResult<u32> = Ok(7);
        assert_eq!(ok.unwrap(), 7);

        let err: MonitorResult<u32> = Err(MonitorError::InvalidCapacity);
        assert!(err.is_err());
    }
}
