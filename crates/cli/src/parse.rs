//! ArgMatches → CliAction conversion.
//!
//! Global options (config file, output directory, verbosity) are collected
//! into [`GlobalOptions`]; the subcommand becomes a [`CliAction`].

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::ArgMatches;
use gridbench_core::CONFIG_FILE_NAME;
use gridbench_executor::{LoadFactorArgs, MapsArgs};
use gridbench_report::SummaryFormat;

/// Log verbosity requested on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// `-q`: warnings and errors only
    Quiet,
    /// default: one line per batch and artifact
    Normal,
    /// `-v`: every spawn and parse
    Verbose,
}

impl Verbosity {
    /// Default filter directive for this verbosity.
    pub fn directive(self) -> &'static str {
        match self {
            Verbosity::Quiet => "warn",
            Verbosity::Normal => "info",
            Verbosity::Verbose => "debug",
        }
    }
}

/// Options shared by every subcommand.
#[derive(Debug, Clone)]
pub struct GlobalOptions {
    pub config: Option<PathBuf>,
    pub out_dir: Option<PathBuf>,
    pub verbosity: Verbosity,
}

/// Options shared by the run subcommands.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub output: String,
    pub workers: Option<usize>,
    pub format: Option<SummaryFormat>,
}

/// What the user asked for.
#[derive(Debug, Clone)]
pub enum CliAction {
    LoadFactor { args: LoadFactorArgs, run: RunOptions },
    Maps { args: MapsArgs, run: RunOptions },
    InitConfig { path: PathBuf },
}

/// Extract the global options.
///
/// Global args are propagated to the subcommand matches, so they are read
/// from there when a subcommand is present.
pub fn global_options(matches: &ArgMatches) -> GlobalOptions {
    let scope = matches.subcommand().map(|(_, sub)| sub).unwrap_or(matches);
    let verbosity = if scope.get_flag("verbose") {
        Verbosity::Verbose
    } else if scope.get_flag("quiet") {
        Verbosity::Quiet
    } else {
        Verbosity::Normal
    };
    GlobalOptions {
        config: scope.get_one::<String>("config").map(PathBuf::from),
        out_dir: scope.get_one::<String>("out-dir").map(PathBuf::from),
        verbosity,
    }
}

/// Convert top-level matches into a [`CliAction`].
pub fn matches_to_action(matches: &ArgMatches) -> Result<CliAction> {
    match matches.subcommand() {
        Some(("load-factor", sub)) => Ok(CliAction::LoadFactor {
            args: LoadFactorArgs {
                exe: required(sub, "exe")?,
                key_fn: required(sub, "keys")?,
                capa_bits: capa_bits(sub)?,
            },
            run: run_options(sub)?,
        }),
        Some(("maps", sub)) => Ok(CliAction::Maps {
            args: MapsArgs {
                build_exe: required(sub, "build-exe")?,
                speed_exe: required(sub, "speed-exe")?,
                key_fn: required(sub, "keys")?,
                query_fn: required(sub, "queries")?,
                capa_bits: capa_bits(sub)?,
            },
            run: run_options(sub)?,
        }),
        Some(("init-config", sub)) => Ok(CliAction::InitConfig {
            path: sub
                .get_one::<String>("path")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME)),
        }),
        Some((name, _)) => Err(anyhow!("Unknown command: {}", name)),
        None => Err(anyhow!("No command given")),
    }
}

fn required(m: &ArgMatches, name: &str) -> Result<String> {
    m.get_one::<String>(name)
        .cloned()
        .ok_or_else(|| anyhow!("Missing required argument: {}", name))
}

fn capa_bits(m: &ArgMatches) -> Result<u32> {
    m.get_one::<u32>("capa-bits")
        .copied()
        .ok_or_else(|| anyhow!("Missing required argument: capa-bits"))
}

fn run_options(m: &ArgMatches) -> Result<RunOptions> {
    let format = match m.get_one::<String>("format") {
        Some(name) => Some(SummaryFormat::from_name(name)?),
        None => None,
    };
    Ok(RunOptions {
        output: m
            .get_one::<String>("output")
            .cloned()
            .unwrap_or_else(|| "tmp".to_string()),
        workers: m.get_one::<usize>("workers").copied(),
        format,
    })
}
