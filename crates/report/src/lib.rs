//! Aggregation and reporting for gridbench
//!
//! - [`ResultAggregator`]: restores grid order over outcomes delivered in
//!   completion order and merges per-role metrics into one row per work item
//! - [`ReportWriter`]: raw capture dump plus TSV or JSON summary

#![warn(missing_docs)]

pub mod aggregate;
pub mod writer;

pub use aggregate::{Report, ReportRow, ResultAggregator, RoleOutcome, RowIssue};
pub use writer::{
    render_json, render_raw, render_tsv, run_stamp, ReportPaths, ReportWriter, SummaryFormat,
    MISSING_VALUE, STAMP_FORMAT,
};
