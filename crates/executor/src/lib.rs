//! # gridbench executor
//!
//! Turns a parameter grid into running processes and a report:
//!
//! - [`CommandBuilder`]: renders work items into shell command lines
//! - [`ConcurrentRunner`]: runs them with bounded parallelism
//! - [`Suite`]: built-in benchmark definitions (load-factor sweep, maps)
//! - [`Harness`]: the full pipeline, ending in a [`Report`]
//!
//! ```text
//! use gridbench_executor::{Harness, LoadFactorArgs, Suite};
//!
//! let platform = Platform::detect()?;
//! let suite = Suite::load_factor(&args, &HarnessConfig::default(), platform)?;
//! let report = Harness::new(platform, 4)?.run(&suite)?;
//! ```

#![warn(missing_docs)]

pub mod command;
pub mod harness;
pub mod runner;
pub mod suite;

pub use command::{local_executable, shell_quote, CommandBuilder, CommandTemplate, Step, TimeWrapper};
pub use harness::Harness;
pub use runner::{ConcurrentRunner, ProcessLauncher, ShellLauncher};
pub use suite::{LoadFactorArgs, MapsArgs, Suite};

pub use gridbench_report::Report;
