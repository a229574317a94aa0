//! On-disk layout helpers for the input and output roots.
//!
//! This module centralizes all *relative* path conventions:
//! - where raw song metadata and activity logs live under the input root
//!   (`song_data/`, `log_data/`)
//! - where each star-schema table lives under the output root
//!   (for example `song-table-data/songs.parquet/`)
//!
//! The functions here return relative [`std::path::PathBuf`] values. Callers are
//! expected to join these with a root (for example, a
//! [`crate::storage::StorageLocation`]) before doing IO.

use std::path::PathBuf;

use crate::tables::StarTable;

// ====================
// Input layout
// ====================

/// Directory holding the song metadata hierarchy.
pub const SONG_DATA_DIR_NAME: &str = "song_data";

/// Number of directory levels between `song_data/` and the record files
/// (`song_data/A/B/C/TRABCEI128F424C983.json`).
pub const SONG_DATA_NESTING: usize = 3;

/// Directory holding the activity logs (searched recursively).
pub const LOG_DATA_DIR_NAME: &str = "log_data";

/// Extension of raw record files, without the dot.
pub const RECORD_FILE_EXT: &str = "json";

/// Relative path: `song_data/`
pub fn song_data_rel_dir() -> PathBuf {
    PathBuf::from(SONG_DATA_DIR_NAME)
}

/// Relative path: `log_data/`
pub fn log_data_rel_dir() -> PathBuf {
    PathBuf::from(LOG_DATA_DIR_NAME)
}

// ====================
// Output layout
// ====================

/// Relative path of a table dataset under the output root,
/// e.g. `time-table-data/time.parquet`.
pub fn table_rel_dir(table: StarTable) -> PathBuf {
    PathBuf::from(format!("{}-table-data", table.dir_prefix()))
        .join(format!("{}.parquet", table.name()))
}
