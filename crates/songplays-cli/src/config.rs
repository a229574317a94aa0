//! Settings resolution: command-line flags, environment, then a TOML file.

use std::path::Path;

use serde::Deserialize;
use snafu::{OptionExt, ResultExt};
use songplays_core::{ReportingTimezone, StorageLocation};
use songplays_datafusion::{PipelineConfig, StageOptions};

use crate::error::{
    CliResult, InvalidRootSnafu, InvalidTimezoneSnafu, MissingRootSnafu, ParseConfigSnafu,
    ReadConfigSnafu,
};

pub const INPUT_ENV: &str = "SONGPLAYS_INPUT";
pub const OUTPUT_ENV: &str = "SONGPLAYS_OUTPUT";
pub const TIMEZONE_ENV: &str = "SONGPLAYS_TIMEZONE";
pub const LOG_ENV: &str = "SONGPLAYS_LOG";

/// Optional defaults loaded from `--config <file.toml>`.
#[derive(Debug, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub input: Option<String>,
    pub output: Option<String>,
    /// IANA zone used for the time dimension
    pub timezone: Option<String>,
    /// Preview this many rows of each written table
    pub show: Option<usize>,
    /// Default log filter when SONGPLAYS_LOG is unset, e.g. "debug"
    pub log_level: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = std::fs::read_to_string(path).context(ReadConfigSnafu {
            path: path.display().to_string(),
        })?;
        toml::from_str(&content).context(ParseConfigSnafu {
            path: path.display().to_string(),
        })
    }
}

/// Values given on the command line (or through their env vars).
#[derive(Debug, Default)]
pub struct CliSettings {
    pub input: Option<String>,
    pub output: Option<String>,
    pub timezone: Option<String>,
    pub show: Option<usize>,
    /// Whether the command derives calendar parts. When false, any timezone
    /// from flags or the file is ignored and not validated.
    pub uses_timezone: bool,
}

/// Merge flags over file values and validate the result.
pub fn resolve(cli: CliSettings, file: &FileConfig) -> CliResult<PipelineConfig> {
    let input = cli
        .input
        .or_else(|| file.input.clone())
        .context(MissingRootSnafu {
            name: "input",
            env: INPUT_ENV,
        })?;
    let output = cli
        .output
        .or_else(|| file.output.clone())
        .context(MissingRootSnafu {
            name: "output",
            env: OUTPUT_ENV,
        })?;

    let timezone = match cli.timezone.or_else(|| file.timezone.clone()) {
        Some(spec) if cli.uses_timezone => spec
            .parse::<ReportingTimezone>()
            .context(InvalidTimezoneSnafu)?,
        _ => ReportingTimezone::default(),
    };

    Ok(PipelineConfig {
        input: StorageLocation::parse(&input).context(InvalidRootSnafu { name: "input" })?,
        output: StorageLocation::parse(&output).context(InvalidRootSnafu { name: "output" })?,
        options: StageOptions {
            timezone,
            preview_rows: cli.show.or(file.show),
        },
    })
}
