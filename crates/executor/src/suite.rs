//! Benchmark suites
//!
//! A suite bundles everything one kind of run needs: the parameter grid, the
//! command steps per work item, how each step's output is parsed, and how the
//! summary is laid out. Two suites are built in:
//!
//! | Suite | Grid | Steps | Summary |
//! |-------|------|-------|---------|
//! | load-factor | `dsp1st_bits` x `max_factor` | timed `measure` | TSV |
//! | maps | `type_id` range | timed `build`, `speed` | JSON |

use crate::command::{local_executable, CommandBuilder, CommandTemplate, TimeWrapper};
use gridbench_core::{Error, HarnessConfig, ParameterGrid, Platform, Result, Role};
use gridbench_parse::OutputFormat;
use gridbench_report::SummaryFormat;

/// Command template of the load-factor measurement.
pub const LOAD_FACTOR_TEMPLATE: &str = "{exe} -k {key_fn} -t {max_factor}_{dsp1st_bits} -b {capa_bits}";
/// Command template of the map build step.
pub const MAPS_BUILD_TEMPLATE: &str = "{build_exe} {type_id} {key_fn} {capa_bits}";
/// Command template of the map speed-test step.
pub const MAPS_SPEED_TEMPLATE: &str = "{speed_exe} {type_id} {key_fn} {query_fn} {capa_bits}";

/// Columns of the load-factor TSV summary.
pub const LOAD_FACTOR_COLUMNS: &[&str] = &[
    "max_factor",
    "dsp1st_bits",
    "elapsed_sec",
    "max_rss_kb",
    "num_resize",
];

/// Columns of the maps summary when rendered as TSV.
pub const MAPS_COLUMNS: &[&str] = &[
    "type_id",
    "build.map_name",
    "build.num_keys",
    "build.elapsed_sec",
    "build.max_rss",
    "speed.update_us_key",
    "speed.find_us_query",
    "speed.ok",
    "speed.ng",
];

/// Inputs of the load-factor sweep
#[derive(Debug, Clone)]
pub struct LoadFactorArgs {
    /// Benchmark executable
    pub exe: String,
    /// Key file
    pub key_fn: String,
    /// Bits of initial capacity
    pub capa_bits: u32,
}

/// Inputs of the map build/speed suite
#[derive(Debug, Clone)]
pub struct MapsArgs {
    /// Build executable (run under the timing utility)
    pub build_exe: String,
    /// Speed-test executable
    pub speed_exe: String,
    /// Key file
    pub key_fn: String,
    /// Query file
    pub query_fn: String,
    /// Bits of initial capacity
    pub capa_bits: u32,
}

/// A complete benchmark definition
#[derive(Debug, Clone)]
pub struct Suite {
    /// Artifact name prefix
    pub name: String,
    /// Parameter grid
    pub grid: ParameterGrid,
    /// Command steps
    pub builder: CommandBuilder,
    /// Output format of each step's role
    pub formats: Vec<(Role, OutputFormat)>,
    /// Summary columns for TSV output
    pub columns: Vec<String>,
    /// Default summary format
    pub summary: SummaryFormat,
    /// Worker count when neither config nor CLI sets one
    pub default_workers: usize,
}

impl Suite {
    /// Load-factor sweep: one timed run per (`dsp1st_bits`, `max_factor`)
    pub fn load_factor(
        args: &LoadFactorArgs,
        config: &HarnessConfig,
        platform: Platform,
    ) -> Result<Self> {
        let grid = ParameterGrid::new()
            .axis("dsp1st_bits", config.load_factor.dsp_bits.iter().copied())
            .axis("max_factor", config.load_factor.max_factors.iter().copied());

        let builder = CommandBuilder::new()
            .var("exe", local_executable(&args.exe))
            .var("key_fn", args.key_fn.as_str())
            .var("capa_bits", args.capa_bits.to_string())
            .step(Role::Measure, CommandTemplate::parse(LOAD_FACTOR_TEMPLATE)?, true)
            .time_wrapper(TimeWrapper::for_platform(platform, config.time_binary.as_str()));

        Ok(Suite {
            name: "load_factor_analyze".to_string(),
            grid,
            builder,
            formats: vec![(Role::Measure, OutputFormat::FreeText)],
            columns: LOAD_FACTOR_COLUMNS.iter().map(|c| c.to_string()).collect(),
            summary: SummaryFormat::Tsv,
            default_workers: 1,
        })
    }

    /// Map suite: timed build then speed test for every type id
    pub fn maps(args: &MapsArgs, config: &HarnessConfig, platform: Platform) -> Result<Self> {
        let grid = ParameterGrid::range(
            "type_id",
            config.maps.first_type_id..config.maps.last_type_id + 1,
        );

        let builder = CommandBuilder::new()
            .var("build_exe", local_executable(&args.build_exe))
            .var("speed_exe", local_executable(&args.speed_exe))
            .var("key_fn", args.key_fn.as_str())
            .var("query_fn", args.query_fn.as_str())
            .var("capa_bits", args.capa_bits.to_string())
            .step(Role::Build, CommandTemplate::parse(MAPS_BUILD_TEMPLATE)?, true)
            .step(Role::Speed, CommandTemplate::parse(MAPS_SPEED_TEMPLATE)?, false)
            .time_wrapper(TimeWrapper::for_platform(platform, config.time_binary.as_str()));

        Ok(Suite {
            name: "map_bench".to_string(),
            grid,
            builder,
            formats: vec![
                (Role::Build, OutputFormat::StructuredBlob),
                (Role::Speed, OutputFormat::StructuredBlob),
            ],
            columns: MAPS_COLUMNS.iter().map(|c| c.to_string()).collect(),
            summary: SummaryFormat::Json,
            default_workers: 8,
        })
    }

    /// Roles of the suite's steps, in declaration order
    pub fn roles(&self) -> Vec<Role> {
        self.builder.roles()
    }

    /// Output format of a role
    pub fn format_for(&self, role: Role) -> Option<OutputFormat> {
        self.formats
            .iter()
            .find(|(r, _)| *r == role)
            .map(|(_, f)| *f)
    }

    /// Check steps and formats agree
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the steps are invalid or a step's
    /// role has no output format.
    pub fn validate(&self) -> Result<()> {
        self.builder.validate()?;
        for role in self.roles() {
            if self.format_for(role).is_none() {
                return Err(Error::configuration(format!(
                    "suite '{}' has no output format for role '{}'",
                    self.name, role
                )));
            }
        }
        Ok(())
    }
}
