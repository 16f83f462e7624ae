//! Output parsing for gridbench
//!
//! Turns the captured text of one invocation into [`ParsedMetrics`]. Two
//! formats are understood:
//!
//! - [`OutputFormat::FreeText`]: `key:value` lines plus the timing utility's
//!   report (see [`free_text`])
//! - [`OutputFormat::StructuredBlob`]: one JSON object embedded in free text,
//!   optionally followed by a memory report (see [`blob`])
//!
//! Parsing is a pure function of the text and the [`Platform`] it was
//! captured on.

#![warn(missing_docs)]

pub mod blob;
pub mod free_text;
pub mod memory;

pub use blob::{find_blob, parse_structured_blob, MAX_RSS};
pub use free_text::{parse_free_text, MAX_RSS_KB};
pub use memory::MemoryReport;

use gridbench_core::{ParsedMetrics, Platform, RawResult, Result};

/// Shape of an invocation's output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Line-oriented `key:value` text
    FreeText,
    /// Embedded JSON object
    StructuredBlob,
}

/// Parser bound to the platform the output was captured on
#[derive(Debug, Clone, Copy)]
pub struct OutputParser {
    platform: Platform,
    memory: MemoryReport,
}

impl OutputParser {
    /// Create a parser for output captured on `platform`
    pub fn new(platform: Platform) -> Self {
        OutputParser {
            platform,
            memory: MemoryReport::for_platform(platform),
        }
    }

    /// Platform this parser reads
    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Parse captured text
    ///
    /// # Errors
    ///
    /// Free text never fails. A structured blob that is missing, unbalanced
    /// or undecodable is a parse error.
    pub fn parse(&self, text: &str, format: OutputFormat) -> Result<ParsedMetrics> {
        match format {
            OutputFormat::FreeText => Ok(parse_free_text(text, self.memory)),
            OutputFormat::StructuredBlob => parse_structured_blob(text, self.memory),
        }
    }

    /// Parse the capture of one raw result
    pub fn parse_result(&self, raw: &RawResult, format: OutputFormat) -> Result<ParsedMetrics> {
        let parsed = self.parse(&raw.captured, format);
        match &parsed {
            Ok(m) => tracing::debug!(
                item = raw.item_id,
                role = %raw.role,
                metrics = m.len(),
                "parsed output"
            ),
            Err(e) => tracing::warn!(
                item = raw.item_id,
                role = %raw.role,
                error = %e,
                "failed to parse output"
            ),
        }
        parsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridbench_core::{Invocation, InvocationStatus, Role};
    use serde_json::json;

    #[test]
    fn test_dispatch_free_text() {
        let parser = OutputParser::new(Platform::Linux);
        let m = parser
            .parse("elapsed_sec:1.0\n", OutputFormat::FreeText)
            .unwrap();
        assert_eq!(m.get("elapsed_sec"), Some(&json!("1.0")));
    }

    #[test]
    fn test_dispatch_structured_blob() {
        let parser = OutputParser::new(Platform::MacOs);
        assert!(parser.parse("no blob", OutputFormat::StructuredBlob).is_err());
        // Free text tolerates the same input
        assert!(parser.parse("no blob", OutputFormat::FreeText).unwrap().is_empty());
    }

    #[test]
    fn test_parse_result_of_failed_process() {
        let parser = OutputParser::new(Platform::Linux);
        let inv = Invocation::new(0, Role::Speed, "./speed 1 k q 16");
        let raw = RawResult::new(
            &inv,
            "{\"ok\": \"3\"}\nterminate called\n".into(),
            InvocationStatus::Failed { exit_code: Some(134) },
        );
        let m = parser.parse_result(&raw, OutputFormat::StructuredBlob).unwrap();
        assert_eq!(m.get("ok"), Some(&json!("3")));
    }

    #[test]
    fn test_platform_accessor() {
        assert_eq!(OutputParser::new(Platform::MacOs).platform(), Platform::MacOs);
    }
}
