//! Structured output embedded in free text
//!
//! Build runs print a JSON object somewhere in the middle of their output:
//! compiler or loader noise before it, the timing utility's report after it.
//! The object is located by brace matching from the first `{`, so nested
//! objects and braces inside strings do not end it early.

use crate::memory::MemoryReport;
use gridbench_core::{Error, ParsedMetrics, Result};
use serde_json::Value;

/// Metric name under which the raw peak-RSS figure is injected.
pub const MAX_RSS: &str = "max_rss";

/// Byte range `start..end` of the first balanced `{...}` span.
///
/// # Errors
///
/// Returns a parse error if there is no `{` or it is never closed.
pub fn find_blob(text: &str) -> Result<(usize, usize)> {
    let start = text
        .find('{')
        .ok_or_else(|| Error::parse("no structured blob in output"))?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok((start, start + offset + 1));
                }
            }
            _ => {}
        }
    }
    Err(Error::parse(format!(
        "structured blob starting at byte {} is not closed",
        start
    )))
}

/// Decode the embedded object and attach the peak-RSS figure found after it.
///
/// # Errors
///
/// Returns a parse error if no blob is found or it does not decode to a JSON
/// object. A missing memory line is not an error.
pub fn parse_structured_blob(text: &str, memory: MemoryReport) -> Result<ParsedMetrics> {
    let (start, end) = find_blob(text)?;
    let decoded: Value = serde_json::from_str(&text[start..end])
        .map_err(|e| Error::parse(format!("structured blob does not decode: {}", e)))?;
    let object = match decoded {
        Value::Object(map) => map,
        other => {
            return Err(Error::parse(format!(
                "structured blob is not an object: {}",
                other
            )))
        }
    };

    let mut metrics = ParsedMetrics::from(object);
    match memory.raw_figure(&text[end..]) {
        Some(figure) => metrics.insert(MAX_RSS, figure),
        None => tracing::debug!(phrase = memory.phrase(), "no memory report after blob"),
    }
    Ok(metrics)
}
