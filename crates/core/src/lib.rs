//! Core types for gridbench
//!
//! This crate defines the foundational types used throughout the harness:
//! - Error: the shared error type and `Result` alias
//! - WorkItem / Parameters: one benchmark configuration with a stable id
//! - ParameterGrid: deterministic expansion of parameter domains
//! - Invocation / RawResult: one external process launch and its capture
//! - ParsedMetrics: metrics extracted from captured output
//! - Platform: OS family selecting timing flags and memory report formats
//! - HarnessConfig: the optional `gridbench.toml` file

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod grid;
pub mod metrics;
pub mod platform;
pub mod types;

pub use config::{HarnessConfig, LoadFactorConfig, MapsConfig, CONFIG_FILE_NAME, DEFAULT_TIME_BINARY};
pub use error::{Error, Result};
pub use grid::{Axis, ParameterGrid};
pub use metrics::ParsedMetrics;
pub use platform::Platform;
pub use types::{
    Invocation, InvocationStatus, ParamValue, Parameters, RawResult, Role, WorkItem, WorkItemId,
};
