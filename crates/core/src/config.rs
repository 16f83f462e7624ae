//! Harness configuration via `gridbench.toml`
//!
//! Every field is optional. The file only overrides suite defaults; command
//! line flags in turn override the file.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file name looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "gridbench.toml";

/// Default timing utility.
pub const DEFAULT_TIME_BINARY: &str = "/usr/bin/time";

/// Grid domains of the load-factor sweep.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoadFactorConfig {
    /// Maximum load factors, in percent
    #[serde(default = "default_max_factors")]
    pub max_factors: Vec<i64>,
    /// Bits reserved for the first displacement value
    #[serde(default = "default_dsp_bits")]
    pub dsp_bits: Vec<i64>,
}

fn default_max_factors() -> Vec<i64> {
    vec![80, 85, 90, 95]
}

fn default_dsp_bits() -> Vec<i64> {
    vec![3, 4, 5]
}

impl Default for LoadFactorConfig {
    fn default() -> Self {
        Self {
            max_factors: default_max_factors(),
            dsp_bits: default_dsp_bits(),
        }
    }
}

/// Type-id range of the map build/speed suite (inclusive on both ends).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MapsConfig {
    /// First type id
    #[serde(default = "default_first_type_id")]
    pub first_type_id: i64,
    /// Last type id
    #[serde(default = "default_last_type_id")]
    pub last_type_id: i64,
}

fn default_first_type_id() -> i64 {
    1
}

fn default_last_type_id() -> i64 {
    19
}

impl Default for MapsConfig {
    fn default() -> Self {
        Self {
            first_type_id: default_first_type_id(),
            last_type_id: default_last_type_id(),
        }
    }
}

/// Harness configuration loaded from `gridbench.toml`.
///
/// # Example
///
/// ```toml
/// workers = 4
/// time_binary = "/usr/bin/time"
/// output_dir = "results"
///
/// [load_factor]
/// max_factors = [80, 90]
/// dsp_bits = [4]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HarnessConfig {
    /// Worker count; when absent each suite uses its own default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workers: Option<usize>,
    /// Timing utility wrapped around timed steps.
    #[serde(default = "default_time_binary")]
    pub time_binary: String,
    /// Directory receiving the artifacts (default: working directory).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
    /// Load-factor sweep domains.
    #[serde(default)]
    pub load_factor: LoadFactorConfig,
    /// Map suite type ids.
    #[serde(default)]
    pub maps: MapsConfig,
}

fn default_time_binary() -> String {
    DEFAULT_TIME_BINARY.to_string()
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            workers: None,
            time_binary: default_time_binary(),
            output_dir: None,
            load_factor: LoadFactorConfig::default(),
            maps: MapsConfig::default(),
        }
    }
}

impl HarnessConfig {
    /// Check the values a TOML schema cannot express.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for zero workers, an empty grid domain,
    /// an empty timing binary or an inverted type-id range.
    pub fn validate(&self) -> Result<()> {
        if self.workers == Some(0) {
            return Err(Error::configuration("workers must be at least 1"));
        }
        if self.time_binary.trim().is_empty() {
            return Err(Error::configuration("time_binary must not be empty"));
        }
        if self.load_factor.max_factors.is_empty() || self.load_factor.dsp_bits.is_empty() {
            return Err(Error::configuration(
                "load_factor.max_factors and load_factor.dsp_bits must not be empty",
            ));
        }
        if self.maps.first_type_id > self.maps.last_type_id {
            return Err(Error::configuration(format!(
                "maps.first_type_id ({}) is greater than maps.last_type_id ({})",
                self.maps.first_type_id, self.maps.last_type_id
            )));
        }
        Ok(())
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# gridbench configuration
#
# Worker threads running benchmark processes concurrently.
# Defaults: 1 for load-factor, 8 for maps.
# workers = 4

# Timing utility wrapped around timed steps. It is invoked with
# --verbose on Linux and -l on macOS.
time_binary = "/usr/bin/time"

# Directory receiving the raw capture and summary files.
# output_dir = "results"

[load_factor]
max_factors = [80, 85, 90, 95]
dsp_bits = [3, 4, 5]

[maps]
first_type_id = 1
last_type_id = 19
"#
    }

    /// Read, parse and validate config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::configuration(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: HarnessConfig = toml::from_str(&content).map_err(|e| {
            Error::configuration(format!(
                "failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    /// Load `path` if given, otherwise `gridbench.toml` from the working
    /// directory if it exists, otherwise defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => {
                let default_path = Path::new(CONFIG_FILE_NAME);
                if default_path.exists() {
                    Self::from_file(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Write the default config file if it does not already exist.
    ///
    /// Returns `true` if the file was created.
    pub fn write_default_if_missing(path: &Path) -> Result<bool> {
        if path.exists() {
            return Ok(false);
        }
        std::fs::write(path, Self::default_toml())?;
        Ok(true)
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
