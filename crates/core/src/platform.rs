//! Host platform detection
//!
//! Only two OS families are supported because the harness depends on the
//! output of their `/usr/bin/time`: BSD-style on macOS (`-l`) and GNU-style on
//! Linux (`--verbose`). Anything else is a configuration error, raised before
//! any process is spawned.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// OS family whose timing utility output the harness understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// GNU time, `--verbose`, peak RSS reported in kilobytes
    Linux,
    /// BSD time, `-l`, peak RSS reported in bytes
    MacOs,
}

impl Platform {
    /// Platform of the running process
    ///
    /// # Errors
    ///
    /// Returns a configuration error on any OS other than Linux or macOS.
    pub fn detect() -> Result<Self> {
        Self::from_os_name(std::env::consts::OS)
    }

    /// Map an OS name (as in `std::env::consts::OS` or `uname -s`) to a
    /// platform
    pub fn from_os_name(os: &str) -> Result<Self> {
        match os.to_ascii_lowercase().as_str() {
            "linux" => Ok(Platform::Linux),
            "macos" | "darwin" => Ok(Platform::MacOs),
            other => Err(Error::configuration(format!(
                "unsupported platform '{}': process timing requires Linux or macOS",
                other
            ))),
        }
    }

    /// Flag that makes `/usr/bin/time` report peak resident set size
    pub fn time_flag(&self) -> &'static str {
        match self {
            Platform::Linux => "--verbose",
            Platform::MacOs => "-l",
        }
    }

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Linux => "linux",
            Platform::MacOs => "macos",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
