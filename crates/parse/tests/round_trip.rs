//! Synthetic timing outputs with known values must parse back to exactly
//! those values on both platforms.

use gridbench_core::Platform;
use gridbench_parse::{OutputFormat, OutputParser, MAX_RSS_KB};
use proptest::prelude::*;
use serde_json::json;

fn program_lines(elapsed: &str, max_factor: u32, dsp_bits: u32, num_resize: u32) -> String {
    format!(
        "elapsed_sec:{}\nmap:\n\tht:\n\t\tmax_factor:{}\n\t\tdsp1st_bits:{}\n\t\tnum_resize:{}\n",
        elapsed, max_factor, dsp_bits, num_resize
    )
}

#[test]
fn test_known_values_linux() {
    let text = format!(
        "{}\tMaximum resident set size (kbytes): 4096\n",
        program_lines("12.3", 90, 4, 2)
    );
    let m = OutputParser::new(Platform::Linux)
        .parse(&text, OutputFormat::FreeText)
        .unwrap();
    assert_eq!(m.get("elapsed_sec"), Some(&json!("12.3")));
    assert_eq!(m.get("max_factor"), Some(&json!("90")));
    assert_eq!(m.get("dsp1st_bits"), Some(&json!("4")));
    assert_eq!(m.get("num_resize"), Some(&json!("2")));
    assert_eq!(m.get(MAX_RSS_KB), Some(&json!(4096)));
}

#[test]
fn test_known_values_macos() {
    let text = format!(
        "{}   4194304  maximum resident set size\n",
        program_lines("12.3", 90, 4, 2)
    );
    let m = OutputParser::new(Platform::MacOs)
        .parse(&text, OutputFormat::FreeText)
        .unwrap();
    assert_eq!(m.get("elapsed_sec"), Some(&json!("12.3")));
    assert_eq!(m.get("max_factor"), Some(&json!("90")));
    assert_eq!(m.get(MAX_RSS_KB), Some(&json!(4096.0)));
}

#[test]
fn test_spec_blob_example() {
    let text = "noise {\"a\":1,\"b\":{\"c\":2}} 1234  maximum resident set size\n";
    let m = OutputParser::new(Platform::MacOs)
        .parse(text, OutputFormat::StructuredBlob)
        .unwrap();
    assert_eq!(
        m.into_json(),
        json!({"a": 1, "b": {"c": 2}, "max_rss": "1234"})
    );
}

proptest! {
    #[test]
    fn prop_free_text_values_survive(
        secs in 0u32..100_000,
        frac in 0u32..1000,
        mf in 50u32..100,
        db in 1u32..8,
        nr in 0u32..64,
        kb in 1u64..1_000_000_000,
    ) {
        let elapsed = format!("{}.{}", secs, frac);
        let text = format!(
            "{}\tMaximum resident set size (kbytes): {}\n",
            program_lines(&elapsed, mf, db, nr),
            kb
        );
        let m = OutputParser::new(Platform::Linux)
            .parse(&text, OutputFormat::FreeText)
            .unwrap();
        prop_assert_eq!(m.get("elapsed_sec"), Some(&json!(elapsed)));
        prop_assert_eq!(m.get("max_factor"), Some(&json!(mf.to_string())));
        prop_assert_eq!(m.get("dsp1st_bits"), Some(&json!(db.to_string())));
        prop_assert_eq!(m.get("num_resize"), Some(&json!(nr.to_string())));
        prop_assert_eq!(m.get(MAX_RSS_KB), Some(&json!(kb)));
    }
}
