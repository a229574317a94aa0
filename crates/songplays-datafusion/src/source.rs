//! Loading raw song and log records into DataFusion frames.

use std::path::PathBuf;

use arrow::{datatypes::SchemaRef, record_batch::RecordBatch};
use datafusion::prelude::{DataFrame, NdJsonReadOptions, SessionContext};
use log::{info, warn};
use snafu::ResultExt;
use songplays_core::{
    StorageLocation, schema,
    storage::{self, FileDepth, layout},
};

use crate::error::{DiscoverSnafu, EtlResult, LoadSnafu};

/// One of the two raw record hierarchies under the input root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordSource {
    /// Song metadata, `song_data/*/*/*/*.json`.
    Songs,
    /// Activity logs, `log_data/**/*.json`.
    Logs,
}

impl RecordSource {
    /// Directory name of the hierarchy under the input root.
    pub fn name(self) -> &'static str {
        match self {
            RecordSource::Songs => layout::SONG_DATA_DIR_NAME,
            RecordSource::Logs => layout::LOG_DATA_DIR_NAME,
        }
    }

    fn rel_dir(self) -> PathBuf {
        match self {
            RecordSource::Songs => layout::song_data_rel_dir(),
            RecordSource::Logs => layout::log_data_rel_dir(),
        }
    }

    fn depth(self) -> FileDepth {
        match self {
            RecordSource::Songs => FileDepth::Exactly(layout::SONG_DATA_NESTING),
            RecordSource::Logs => FileDepth::Any,
        }
    }

    /// Fixed schema the records are read against.
    pub fn schema(self) -> SchemaRef {
        match self {
            RecordSource::Songs => schema::song_record_schema(),
            RecordSource::Logs => schema::log_record_schema(),
        }
    }
}

/// Build a lazy frame over every record file of `source` under `input`.
///
/// `input` must already be absolute. With no matching files the frame is
/// empty but still carries the full record schema, so downstream projections
/// and writes behave exactly as for a non-empty input.
pub async fn read_records(
    ctx: &SessionContext,
    input: &StorageLocation,
    source: RecordSource,
) -> EtlResult<DataFrame> {
    let files = storage::list_record_files(
        input,
        &source.rel_dir(),
        source.depth(),
        layout::RECORD_FILE_EXT,
    )
    .await
    .context(DiscoverSnafu {
        source_name: source.name(),
        location: input.to_string(),
    })?;

    let schema = source.schema();

    if files.is_empty() {
        warn!(
            "No {} files found under {}; continuing with an empty table",
            source.name(),
            input
        );
        return ctx
            .read_batch(RecordBatch::new_empty(schema))
            .context(LoadSnafu {
                source_name: source.name(),
                location: input.to_string(),
            });
    }

    info!(
        "Reading {} {} file(s) from {}",
        files.len(),
        source.name(),
        input
    );

    let paths: Vec<String> = files
        .iter()
        .map(|p| p.to_string_lossy().into_owned())
        .collect();
    let extension = format!(".{}", layout::RECORD_FILE_EXT);
    let options = NdJsonReadOptions::default()
        .schema(schema.as_ref())
        .file_extension(&extension);

    ctx.read_json(paths, options).await.context(LoadSnafu {
        source_name: source.name(),
        location: input.to_string(),
    })
}

/// Read every record of `source` into memory.
///
/// Materializing here makes a malformed record fail the load step itself,
/// and lets the stage reuse the records for several tables without parsing
/// the files again.
pub async fn load_records(
    ctx: &SessionContext,
    input: &StorageLocation,
    source: RecordSource,
) -> EtlResult<DataFrame> {
    read_records(ctx, input, source)
        .await?
        .cache()
        .await
        .context(LoadSnafu {
            source_name: source.name(),
            location: input.to_string(),
        })
}
