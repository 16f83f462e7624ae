//! Report serialization
//!
//! Two artifacts per run, both rendered fully in memory and then written with
//! a single create-or-truncate, so re-writing the same report with the same
//! stamp produces byte-identical files:
//!
//! - raw capture (`*.stdout.txt`): command line and verbatim output of every
//!   invocation, in id order
//! - summary: TSV (`*.basic.txt`) with a fixed column order, or JSON
//!   (`*.json`)

use crate::aggregate::Report;
use gridbench_core::{Error, InvocationStatus, Result};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Placeholder for values a row does not have.
pub const MISSING_VALUE: &str = "NA";

/// Run stamp format used in artifact names.
pub const STAMP_FORMAT: &str = "%Y_%m_%d_%H_%M_%S";

/// Summary serialization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryFormat {
    /// Tab-separated table
    Tsv,
    /// Pretty-printed JSON array
    Json,
}

impl SummaryFormat {
    /// Parse `"tsv"` or `"json"`
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "tsv" => Ok(SummaryFormat::Tsv),
            "json" => Ok(SummaryFormat::Json),
            other => Err(Error::configuration(format!(
                "unknown summary format '{}', expected \"tsv\" or \"json\"",
                other
            ))),
        }
    }

    fn file_suffix(&self) -> &'static str {
        match self {
            SummaryFormat::Tsv => "basic.txt",
            SummaryFormat::Json => "json",
        }
    }
}

/// Current local time formatted as a run stamp
pub fn run_stamp() -> String {
    chrono::Local::now().format(STAMP_FORMAT).to_string()
}

/// Raw capture dump
pub fn render_raw(report: &Report) -> String {
    let mut out = String::new();
    for raw in report.invocations() {
        out.push_str(&raw.command);
        out.push('\n');
        out.push_str(&raw.captured);
        if !raw.captured.ends_with('\n') {
            out.push('\n');
        }
        if raw.status != InvocationStatus::Success {
            let _ = writeln!(out, "[{}]", raw.status);
        }
        out.push('\n');
    }
    out
}

/// Tab-separated summary; each cell is the row's metric of that name, else
/// its parameter of that name, else [`MISSING_VALUE`]
pub fn render_tsv(report: &Report, columns: &[String]) -> String {
    let mut out = columns.join("\t");
    out.push('\n');
    for row in report.rows() {
        let cells: Vec<String> = columns
            .iter()
            .map(|col| {
                row.metrics
                    .display_value(col)
                    .or_else(|| row.parameters.get(col).map(|v| v.to_string()))
                    .unwrap_or_else(|| MISSING_VALUE.to_string())
            })
            .collect();
        out.push_str(&cells.join("\t"));
        out.push('\n');
    }
    out
}

/// JSON summary: array of `{id, parameters, metrics, issues}`
pub fn render_json(report: &Report) -> Result<String> {
    let mut out = serde_json::to_string_pretty(report)?;
    out.push('\n');
    Ok(out)
}

/// Paths of the files written for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    /// Raw capture dump
    pub raw: PathBuf,
    /// Summary file
    pub summary: PathBuf,
}

/// Writes run artifacts named `<prefix>.<base>.<stamp>.<suffix>`
#[derive(Debug, Clone)]
pub struct ReportWriter {
    dir: PathBuf,
    prefix: String,
    base: String,
    stamp: String,
}

impl ReportWriter {
    /// Writer placing files in `dir`
    pub fn new(
        dir: impl Into<PathBuf>,
        prefix: impl Into<String>,
        base: impl Into<String>,
        stamp: impl Into<String>,
    ) -> Self {
        ReportWriter {
            dir: dir.into(),
            prefix: prefix.into(),
            base: base.into(),
            stamp: stamp.into(),
        }
    }

    fn path(&self, suffix: &str) -> PathBuf {
        self.dir.join(format!(
            "{}.{}.{}.{}",
            self.prefix, self.base, self.stamp, suffix
        ))
    }

    /// Paths this writer will produce for `format`
    pub fn paths(&self, format: SummaryFormat) -> ReportPaths {
        ReportPaths {
            raw: self.path("stdout.txt"),
            summary: self.path(format.file_suffix()),
        }
    }

    /// Render and write both artifacts
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or a file cannot
    /// be written.
    pub fn write(
        &self,
        report: &Report,
        format: SummaryFormat,
        columns: &[String],
    ) -> Result<ReportPaths> {
        let raw = render_raw(report);
        let summary = match format {
            SummaryFormat::Tsv => render_tsv(report, columns),
            SummaryFormat::Json => render_json(report)?,
        };

        let paths = self.paths(format);
        std::fs::create_dir_all(&self.dir)?;
        write_file(&paths.raw, &raw)?;
        write_file(&paths.summary, &summary)?;
        tracing::info!(raw = %paths.raw.display(), summary = %paths.summary.display(), "wrote report");
        Ok(paths)
    }
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content).map_err(|e| {
        Error::Io(std::io::Error::new(
            e.kind(),
            format!("failed to write '{}': {}", path.display(), e),
        ))
    })
}
