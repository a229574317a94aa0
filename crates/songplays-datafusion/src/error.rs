//! Error types and SNAFU context selectors for the pipeline stages.
//!
//! Each variant names the step that failed (which source was being loaded,
//! which table was being written) so a failed run can be re-run with an
//! actionable message. Engine errors are boxed to keep the enum small.

use arrow::{datatypes::DataType, error::ArrowError};
use datafusion::error::DataFusionError;
use parquet::errors::ParquetError;
use snafu::prelude::*;
use songplays_core::{StarTable, StorageError};

/// Result alias used throughout this crate.
pub type EtlResult<T> = Result<T, EtlError>;

/// Errors from the song-catalog and activity-log stages.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum EtlError {
    /// Input or output root could not be resolved.
    #[snafu(display("Invalid {role} location {location}: {source}"))]
    Location {
        /// Which root was being resolved (`input` or `output`).
        role: &'static str,
        /// The location as supplied by the caller.
        location: String,
        /// Underlying storage error.
        source: StorageError,
    },

    /// Listing raw record files failed (unreadable directory).
    #[snafu(display("Failed to discover {source_name} files under {location}: {source}"))]
    Discover {
        /// Name of the raw source (`song_data` or `log_data`).
        source_name: &'static str,
        /// Input root that was searched.
        location: String,
        /// Underlying storage error.
        source: StorageError,
    },

    /// Reading or parsing raw records failed. Malformed records are fatal.
    #[snafu(display("Failed to load {source_name} records from {location}: {source}"))]
    Load {
        /// Name of the raw source (`song_data` or `log_data`).
        source_name: &'static str,
        /// Input root the records were read from.
        location: String,
        /// Underlying engine error (parse or I/O).
        #[snafu(source(from(DataFusionError, Box::new)))]
        source: Box<DataFusionError>,
    },

    /// Planning a transformation step failed.
    #[snafu(display("Failed to build {step}: {source}"))]
    Transform {
        /// Human-readable name of the step.
        step: &'static str,
        /// Underlying engine error.
        #[snafu(source(from(DataFusionError, Box::new)))]
        source: Box<DataFusionError>,
    },

    /// The table's output subpath could not be cleared for overwrite.
    #[snafu(display("Failed to prepare output for the {table} table: {source}"))]
    PrepareOutput {
        /// Table whose subpath was being reset.
        table: StarTable,
        /// Underlying storage error.
        source: StorageError,
    },

    /// Executing or writing a table failed. Earlier tables stay written.
    #[snafu(display("Failed to write the {table} table to {path}: {source}"))]
    WriteTable {
        /// Table being written.
        table: StarTable,
        /// Destination directory.
        path: String,
        /// Underlying engine error.
        #[snafu(source(from(DataFusionError, Box::new)))]
        source: Box<DataFusionError>,
    },

    /// Writing the schema-only file for an empty table failed.
    #[snafu(display("Failed to write empty {table} table file at {path}: {source}"))]
    WriteEmptyTable {
        /// Table being written.
        table: StarTable,
        /// File path that was being created.
        path: String,
        /// Underlying Parquet error.
        source: ParquetError,
    },

    /// Creating the schema-only file for an empty table failed.
    #[snafu(display("Failed to create empty {table} table file at {path}: {source}"))]
    CreateEmptyTable {
        /// Table being written.
        table: StarTable,
        /// File path that was being created.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Arrow error while assembling or rendering batches.
    #[snafu(display("Arrow error while building the {table} table: {source}"))]
    Arrow {
        /// Table being assembled.
        table: StarTable,
        /// Underlying Arrow error.
        source: ArrowError,
    },

    /// A collected column did not have the type its schema promises.
    #[snafu(display(
        "Column {column} has type {actual:?} while building the {table} table, expected {expected:?}"
    ))]
    UnexpectedColumnType {
        /// Table being assembled.
        table: StarTable,
        /// Column name.
        column: &'static str,
        /// Type that was expected.
        expected: DataType,
        /// Type that was found.
        actual: DataType,
    },
}
