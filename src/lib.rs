//! gridbench - parametrized benchmark orchestration
//!
//! Runs external benchmark executables across a grid of parameter values
//! with bounded parallelism, wraps selected steps in the platform's timing
//! utility, extracts metrics from their captured output and writes a raw
//! dump plus a deterministic summary.
//!
//! # Quick Start
//!
//! ```ignore
//! use gridbench::{Harness, HarnessConfig, LoadFactorArgs, Platform, ReportWriter, Suite};
//!
//! let platform = Platform::detect()?;
//! let args = LoadFactorArgs { exe: "bench".into(), key_fn: "keys.txt".into(), capa_bits: 16 };
//! let suite = Suite::load_factor(&args, &HarnessConfig::default(), platform)?;
//! let writer = ReportWriter::new(".", suite.name.as_str(), "tmp", gridbench::run_stamp());
//! let (report, paths) = Harness::new(platform, 1)?.run_and_write(&suite, &writer, suite.summary)?;
//! ```
//!
//! # Architecture
//!
//! - `gridbench-core`: grid, work items, platform, config, errors
//! - `gridbench-parse`: free-text and structured-blob output parsers
//! - `gridbench-report`: aggregation and artifact writing
//! - `gridbench-executor`: command building, the concurrent runner, suites

pub use gridbench_core::*;
pub use gridbench_executor::*;
pub use gridbench_parse::{MemoryReport, OutputFormat, OutputParser};
pub use gridbench_report::{
    render_json, render_raw, render_tsv, run_stamp, ReportPaths, ReportRow, ReportWriter,
    ResultAggregator, RoleOutcome, RowIssue, SummaryFormat,
};
