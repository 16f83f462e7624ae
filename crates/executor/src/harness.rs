//! End-to-end pipeline: grid -> commands -> runner -> parser -> aggregator.

use crate::runner::{ConcurrentRunner, ProcessLauncher, ShellLauncher};
use crate::suite::Suite;
use gridbench_core::{Error, Platform, Result};
use gridbench_parse::OutputParser;
use gridbench_report::{Report, ReportPaths, ReportWriter, ResultAggregator, RoleOutcome, SummaryFormat};
use tracing::info;

/// Runs suites on one platform with one worker pool
#[derive(Debug)]
pub struct Harness<L = ShellLauncher> {
    runner: ConcurrentRunner<L>,
    parser: OutputParser,
}

impl Harness<ShellLauncher> {
    /// Harness spawning real processes with `workers` parallelism
    pub fn new(platform: Platform, workers: usize) -> Result<Self> {
        Ok(Self::with_runner(ConcurrentRunner::new(workers)?, platform))
    }
}

impl<L: ProcessLauncher> Harness<L> {
    /// Harness around an existing runner
    pub fn with_runner(runner: ConcurrentRunner<L>, platform: Platform) -> Self {
        Harness {
            runner,
            parser: OutputParser::new(platform),
        }
    }

    /// Runner executing the invocations
    pub fn runner(&self) -> &ConcurrentRunner<L> {
        &self.runner
    }

    /// Run a suite and aggregate its results
    ///
    /// Every command is rendered before the first process starts, so
    /// configuration errors abort the run with nothing spawned. Failing
    /// processes and unparsable output only mark their rows.
    pub fn run(&self, suite: &Suite) -> Result<Report> {
        suite.validate()?;
        let items = suite.grid.expand()?;
        let invocations = suite.builder.build_all(&items)?;
        info!(
            suite = %suite.name,
            items = items.len(),
            invocations = invocations.len(),
            workers = self.runner.workers(),
            platform = %self.parser.platform(),
            "running suite"
        );

        let raws = self.runner.run(invocations);
        let mut outcomes = Vec::with_capacity(raws.len());
        for raw in raws {
            let format = suite.format_for(raw.role).ok_or_else(|| {
                Error::invariant(format!("no output format for role '{}'", raw.role))
            })?;
            let parsed = self.parser.parse_result(&raw, format);
            outcomes.push(RoleOutcome::new(raw, parsed));
        }

        let roles = suite.roles();
        ResultAggregator::new(&items, &roles).aggregate(outcomes)
    }

    /// Run a suite and write its artifacts
    pub fn run_and_write(
        &self,
        suite: &Suite,
        writer: &ReportWriter,
        format: SummaryFormat,
    ) -> Result<(Report, ReportPaths)> {
        let report = self.run(suite)?;
        let paths = writer.write(&report, format, &suite.columns)?;
        Ok((report, paths))
    }
}
