use songplays_core::{ParseTimezoneError, StorageError};
use songplays_datafusion::EtlError;

use snafu::Snafu;

pub type CliResult<T> = std::result::Result<T, CliError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CliError {
    #[snafu(display("Failed to read config file: {path}"))]
    ReadConfig {
        path: String,
        source: std::io::Error,
    },

    #[snafu(display("Failed to parse config file {path}: {source}"))]
    ParseConfig {
        path: String,
        source: toml::de::Error,
    },

    #[snafu(display(
        "No {name} root given. \
         Pass --{name}, set {env}, or add `{name} = \"...\"` to the config file."
    ))]
    MissingRoot {
        name: &'static str,
        env: &'static str,
    },

    #[snafu(display("Invalid {name} root: {source}"))]
    InvalidRoot {
        name: &'static str,
        source: StorageError,
    },

    #[snafu(display("Invalid --timezone: {source}"))]
    InvalidTimezone { source: ParseTimezoneError },

    #[snafu(display(
        "Pipeline failed: {source}. \
         Tables written before the failure were kept; re-run to replace them."
    ))]
    Pipeline {
        #[snafu(source(from(EtlError, Box::new)))]
        source: Box<EtlError>,
    },
}
