//! Peak-memory report strategies
//!
//! `/usr/bin/time` prints peak resident set size differently per OS family:
//!
//! | Platform | Line | Unit |
//! |----------|------|------|
//! | Linux | `\tMaximum resident set size (kbytes): 5120` | KB |
//! | macOS | `   5242880  maximum resident set size` | bytes |
//!
//! Each variant knows how to read its own line; callers pick the variant from
//! an explicit [`Platform`] instead of sniffing the text.

use gridbench_core::Platform;
use serde_json::Value;

const LINUX_PHRASE: &str = "Maximum resident set size (kbytes)";
const MACOS_PHRASE: &str = "maximum resident set size";

/// Memory report format of one timing utility flavor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryReport {
    /// GNU time: value in kilobytes after the colon
    GnuKilobytes,
    /// BSD time: value in bytes before the phrase
    BsdBytes,
}

impl MemoryReport {
    /// Strategy for a platform
    pub fn for_platform(platform: Platform) -> Self {
        match platform {
            Platform::Linux => MemoryReport::GnuKilobytes,
            Platform::MacOs => MemoryReport::BsdBytes,
        }
    }

    /// Fixed phrase identifying the memory line
    pub fn phrase(&self) -> &'static str {
        match self {
            MemoryReport::GnuKilobytes => LINUX_PHRASE,
            MemoryReport::BsdBytes => MACOS_PHRASE,
        }
    }

    /// Peak RSS in kilobytes from one line of timing output, if the line is
    /// this platform's memory line and well formed
    ///
    /// GNU values are integral kilobytes. BSD byte counts are divided by 1024
    /// and may be fractional.
    pub fn kilobytes_from_line(&self, line: &str) -> Option<Value> {
        if !line.contains(self.phrase()) {
            return None;
        }
        match self {
            MemoryReport::GnuKilobytes => {
                let kb: u64 = line.split_whitespace().nth(5)?.parse().ok()?;
                Some(Value::from(kb))
            }
            MemoryReport::BsdBytes => {
                let bytes: u64 = line.split_whitespace().next()?.parse().ok()?;
                Some(Value::from(bytes as f64 / 1024.0))
            }
        }
    }

    /// Raw peak-RSS figure, verbatim and in the utility's own unit, from a
    /// block of text following a structured blob
    pub fn raw_figure(&self, text: &str) -> Option<String> {
        let at = text.find(self.phrase())?;
        let figure = match self {
            // "...: 5120"
            MemoryReport::GnuKilobytes => {
                let rest = &text[at + self.phrase().len()..];
                let rest = rest.trim_start().strip_prefix(':')?;
                rest.split_whitespace().next()?
            }
            // "5242880  maximum resident set size"
            MemoryReport::BsdBytes => text[..at].split_whitespace().last()?,
        };
        if !figure.is_empty() && figure.bytes().all(|b| b.is_ascii_digit()) {
            Some(figure.to_string())
        } else {
            None
        }
    }
}
