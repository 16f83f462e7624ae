//! gridbench command-line entry point.
//!
//! Parses arguments, installs logging, loads configuration and hands the
//! selected suite to the harness. Fatal configuration problems exit with
//! status 1 before any benchmark process is started; failed benchmark
//! processes do not change the exit status.

mod commands;
mod parse;

use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use gridbench_core::{HarnessConfig, Platform};
use gridbench_executor::{Harness, Suite};
use gridbench_report::{run_stamp, ReportWriter};
use tracing_subscriber::EnvFilter;

use commands::build_cli;
use parse::{global_options, matches_to_action, CliAction, GlobalOptions, RunOptions};

fn main() {
    let matches = build_cli().get_matches();
    let global = global_options(&matches);
    init_logging(&global);

    let code = match matches_to_action(&matches).and_then(|action| dispatch(&global, action)) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            1
        }
    };
    process::exit(code);
}

fn init_logging(global: &GlobalOptions) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(global.verbosity.directive()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn dispatch(global: &GlobalOptions, action: CliAction) -> Result<()> {
    match action {
        CliAction::InitConfig { path } => init_config(&path),
        CliAction::LoadFactor { args, run } => {
            let config = load_config(global)?;
            let platform = Platform::detect()?;
            let suite = Suite::load_factor(&args, &config, platform)?;
            run_suite(global, &config, platform, &suite, &run)
        }
        CliAction::Maps { args, run } => {
            let config = load_config(global)?;
            let platform = Platform::detect()?;
            let suite = Suite::maps(&args, &config, platform)?;
            run_suite(global, &config, platform, &suite, &run)
        }
    }
}

fn init_config(path: &Path) -> Result<()> {
    let created = HarnessConfig::write_default_if_missing(path)
        .with_context(|| format!("writing {}", path.display()))?;
    if created {
        println!("Wrote {}", path.display());
    } else {
        println!("{} already exists, left unchanged", path.display());
    }
    Ok(())
}

fn load_config(global: &GlobalOptions) -> Result<HarnessConfig> {
    let config = HarnessConfig::load(global.config.as_deref())?;
    config.validate()?;
    Ok(config)
}

fn run_suite(
    global: &GlobalOptions,
    config: &HarnessConfig,
    platform: Platform,
    suite: &Suite,
    run: &RunOptions,
) -> Result<()> {
    let workers = run
        .workers
        .or(config.workers)
        .unwrap_or(suite.default_workers);
    let out_dir = global
        .out_dir
        .clone()
        .or_else(|| config.output_dir.clone())
        .unwrap_or_else(|| PathBuf::from("."));
    let format = run.format.unwrap_or(suite.summary);

    tracing::info!(
        suite = %suite.name,
        platform = %platform,
        workers,
        items = suite.grid.len(),
        "starting run"
    );

    let harness = Harness::new(platform, workers)?;
    let writer = ReportWriter::new(out_dir, suite.name.as_str(), run.output.as_str(), run_stamp());
    let (report, paths) = harness.run_and_write(suite, &writer, format)?;

    let failed = report.failed_rows();
    if failed > 0 {
        tracing::warn!(failed, rows = report.len(), "some work items did not complete cleanly");
    }
    println!("{}", paths.raw.display());
    println!("{}", paths.summary.display());
    Ok(())
}
