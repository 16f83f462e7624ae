//! Error types for gridbench
//!
//! This module defines the error type shared by every crate in the workspace.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! A failing benchmarked process is not an error here: it is recorded as an
//! [`InvocationStatus`](crate::InvocationStatus) on the raw result and
//! surfaced in the report.

use std::io;
use thiserror::Error;

/// Result type alias for gridbench operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the benchmark harness
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid harness configuration (unsupported platform, bad grid,
    /// zero workers, unknown template placeholder). Always raised before any
    /// process is spawned.
    #[error("configuration error: {reason}")]
    Configuration {
        /// What was wrong
        reason: String,
    },

    /// Captured output could not be turned into metrics
    #[error("parse error: {reason}")]
    Parse {
        /// What was wrong
        reason: String,
    },

    /// Results handed to the aggregator do not match the work items
    #[error("invariant violation: {reason}")]
    InvariantViolation {
        /// What was wrong
        reason: String,
    },

    /// I/O error (artifact files, config files)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Serialization/deserialization error
    #[error("serialization error: {reason}")]
    Serialization {
        /// What was wrong
        reason: String,
    },
}

impl Error {
    /// Build a [`Error::Configuration`]
    pub fn configuration(reason: impl Into<String>) -> Self {
        Error::Configuration {
            reason: reason.into(),
        }
    }

    /// Build a [`Error::Parse`]
    pub fn parse(reason: impl Into<String>) -> Self {
        Error::Parse {
            reason: reason.into(),
        }
    }

    /// Build a [`Error::InvariantViolation`]
    pub fn invariant(reason: impl Into<String>) -> Self {
        Error::InvariantViolation {
            reason: reason.into(),
        }
    }

    /// Check if this is a configuration error
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Configuration { .. })
    }

    /// Check if this is a parse error
    pub fn is_parse(&self) -> bool {
        matches!(self, Error::Parse { .. })
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization {
            reason: e.to_string(),
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Serialization {
            reason: e.to_string(),
        }
    }
}

impl From<toml::ser::Error> for Error {
    fn from(e: toml::ser::Error) -> Self {
        Error::Serialization {
            reason: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_configuration() {
        let err = Error::configuration("unsupported platform: plan9");
        let msg = err.to_string();
        assert!(msg.contains("configuration error"));
        assert!(msg.contains("plan9"));
        assert!(err.is_configuration());
        assert!(!err.is_parse());
    }

    #[test]
    fn test_error_display_parse() {
        let err = Error::parse("no structured blob");
        assert!(err.to_string().contains("parse error"));
        assert!(err.is_parse());
    }

    #[test]
    fn test_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_error_from_serde_json() {
        let result: Result<serde_json::Value> = serde_json::from_str("{").map_err(|e| e.into());
        assert!(matches!(result, Err(Error::Serialization { .. })));
    }

    #[test]
    fn test_error_from_toml() {
        let result: std::result::Result<toml::Value, _> = toml::from_str("workers = ");
        let err: Error = result.unwrap_err().into();
        assert!(matches!(err, Error::Serialization { .. }));
    }
}
