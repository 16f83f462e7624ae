//! Line-oriented `key:value` output of the measured program plus the
//! timing utility's report.

use crate::memory::MemoryReport;
use gridbench_core::ParsedMetrics;
use serde_json::Value;

/// Recognized prefixes and the metric each one yields.
///
/// The nested statistics are printed one level deep by the measured program,
/// hence the two-tab indentation.
const PREFIXES: &[(&str, &str)] = &[
    ("elapsed_sec:", "elapsed_sec"),
    ("\t\tmax_factor:", "max_factor"),
    ("\t\tdsp1st_bits:", "dsp1st_bits"),
    ("\t\tnum_resize:", "num_resize"),
];

/// Metric name for peak resident set size in kilobytes.
pub const MAX_RSS_KB: &str = "max_rss_kb";

/// Extract metrics from free-text output. Unrecognized lines are skipped.
pub fn parse_free_text(text: &str, memory: MemoryReport) -> ParsedMetrics {
    let mut metrics = ParsedMetrics::new();
    for line in text.lines() {
        if let Some(kb) = memory.kilobytes_from_line(line) {
            metrics.insert(MAX_RSS_KB, kb);
            continue;
        }
        for (prefix, name) in PREFIXES {
            if let Some(rest) = line.strip_prefix(prefix) {
                metrics.insert(*name, Value::String(rest.trim().to_string()));
                break;
            }
        }
    }
    metrics
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const PROGRAM_OUTPUT: &str = "map_name:compact_bonsai_trie\n\
key_name:keys.txt\n\
elapsed_sec:12.3\n\
map:\n\
\tname:compact_bonsai_map\n\
\tht:\n\
\t\tmax_factor:90\n\
\t\tdsp1st_bits:4\n\
\t\tnum_resize:2\n";

    #[test]
    fn test_linux_output() {
        let text = format!(
            "{}\tCommand being timed: \"./bench\"\n\
\tElapsed (wall clock) time (h:mm:ss or m:ss): 0:12.40\n\
\tMaximum resident set size (kbytes): 20480\n\
\tExit status: 0\n",
            PROGRAM_OUTPUT
        );
        let m = parse_free_text(&text, MemoryReport::GnuKilobytes);
        assert_eq!(m.get("elapsed_sec"), Some(&json!("12.3")));
        assert_eq!(m.get("max_factor"), Some(&json!("90")));
        assert_eq!(m.get("dsp1st_bits"), Some(&json!("4")));
        assert_eq!(m.get("num_resize"), Some(&json!("2")));
        assert_eq!(m.get(MAX_RSS_KB), Some(&json!(20480)));
        assert_eq!(m.len(), 5);
    }

    #[test]
    fn test_macos_output() {
        let text = format!(
            "{}       12.40 real        12.01 user         0.30 sys\n\
  20971520  maximum resident set size\n\
         0  average shared memory size\n",
            PROGRAM_OUTPUT
        );
        let m = parse_free_text(&text, MemoryReport::BsdBytes);
        assert_eq!(m.get("elapsed_sec"), Some(&json!("12.3")));
        assert_eq!(m.get(MAX_RSS_KB), Some(&json!(20480.0)));
    }

    #[test]
    fn test_unindented_nested_keys_ignored() {
        // Only the nested (two-tab) statistics count
        let m = parse_free_text("max_factor:50\n\tnum_resize:9\n", MemoryReport::GnuKilobytes);
        assert!(m.is_empty());
    }

    #[test]
    fn test_garbage_is_ignored() {
        let m = parse_free_text("segfault\n\u{0}\u{1}\n:::\n", MemoryReport::BsdBytes);
        assert!(m.is_empty());
    }

    #[test]
    fn test_value_keeps_text_after_first_colon() {
        let m = parse_free_text("elapsed_sec:1:30\n", MemoryReport::GnuKilobytes);
        assert_eq!(m.get("elapsed_sec"), Some(&json!("1:30")));
    }

    #[test]
    fn test_crlf_lines() {
        let m = parse_free_text("elapsed_sec:0.5\r\n", MemoryReport::GnuKilobytes);
        assert_eq!(m.get("elapsed_sec"), Some(&json!("0.5")));
    }
}
