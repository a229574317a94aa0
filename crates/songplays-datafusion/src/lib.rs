//! DataFusion stages that build the songplays star schema.
//!
//! Two independent stages turn raw JSON records into five Hive-partitioned
//! Parquet tables:
//!
//! - [`process_song_data`] reads `song_data/` and writes `songs` and
//!   `artists`.
//! - [`process_log_data`] reads `log_data/` (plus `song_data/` for matching)
//!   and writes `users`, `time` and `songplays`.
//!
//! Every run recomputes its tables from scratch and replaces whatever a
//! previous run wrote. The table builders ([`songs_table`], [`users_table`],
//! [`songplays_table`], ...) are plain `DataFrame -> DataFrame` functions and
//! can be used without touching the filesystem.
#![deny(missing_docs)]

pub mod activity_log;
mod dimension;
pub mod error;
pub mod pipeline;
pub mod play_time;
pub mod pretty;
pub mod report;
pub mod sink;
pub mod song_catalog;
pub mod songplays;
pub mod source;

pub use activity_log::{next_song_plays, process_log_data, users_table};
pub use error::{EtlError, EtlResult};
pub use pipeline::{PipelineConfig, StageOptions, run_pipeline};
pub use report::{Stage, StageReport, TableWriteReport};
pub use song_catalog::{artists_table, process_song_data, songs_table};
pub use songplays::songplays_table;
