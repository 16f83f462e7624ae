//! Clap command tree definition.

use clap::{value_parser, Arg, ArgAction, Command};

/// Build the complete CLI command tree.
pub fn build_cli() -> Command {
    Command::new("gridbench")
        .about("Run benchmark executables across a parameter grid and collect timing and memory")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("Config file (default: ./gridbench.toml if present)")
                .global(true),
        )
        .arg(
            Arg::new("out-dir")
                .long("out-dir")
                .help("Directory for output files (default: config output_dir or .)")
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log every spawned command")
                .action(ArgAction::SetTrue)
                .conflicts_with("quiet")
                .global(true),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .short('q')
                .help("Only log warnings and errors")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(build_load_factor())
        .subcommand(build_maps())
        .subcommand(build_init_config())
}

// =========================================================================
// Shared run options
// =========================================================================

fn run_args(cmd: Command, default_output: &'static str) -> Command {
    cmd.arg(
        Arg::new("output")
            .long("output")
            .short('o')
            .help("Base name of the output files")
            .default_value(default_output),
    )
    .arg(
        Arg::new("workers")
            .long("workers")
            .short('w')
            .help("Maximum number of benchmark processes running at once")
            .value_parser(value_parser!(usize)),
    )
    .arg(
        Arg::new("format")
            .long("format")
            .help("Summary format (default depends on the suite)")
            .value_parser(["tsv", "json"]),
    )
}

// =========================================================================
// Suites
// =========================================================================

fn build_load_factor() -> Command {
    let cmd = Command::new("load-factor")
        .about("Sweep max load factor x displacement bits, one timed run each")
        .arg(
            Arg::new("exe")
                .long("exe")
                .short('e')
                .help("Benchmark executable")
                .required(true),
        )
        .arg(
            Arg::new("keys")
                .long("keys")
                .short('k')
                .help("Input file of keys")
                .required(true),
        )
        .arg(
            Arg::new("capa-bits")
                .long("capa-bits")
                .short('b')
                .help("Bits of initial capacity")
                .value_parser(value_parser!(u32))
                .default_value("16"),
        );
    run_args(cmd, "tmp")
}

fn build_maps() -> Command {
    let cmd = Command::new("maps")
        .about("Build and speed-test every map type id")
        .arg(Arg::new("build-exe").help("Build executable (timed)").required(true))
        .arg(Arg::new("speed-exe").help("Speed-test executable").required(true))
        .arg(Arg::new("keys").help("Input file of keys").required(true))
        .arg(Arg::new("queries").help("Input file of queries").required(true))
        .arg(
            Arg::new("capa-bits")
                .help("Bits of initial capacity")
                .value_parser(value_parser!(u32))
                .required(true),
        );
    run_args(cmd, "tmp")
}

fn build_init_config() -> Command {
    Command::new("init-config")
        .about("Write a commented default config file")
        .arg(Arg::new("path").help("Target path (default: ./gridbench.toml)"))
}
