//! Song catalog stage: song metadata to the `songs` and `artists` tables.

use datafusion::{
    error::Result,
    prelude::{DataFrame, SessionContext, col},
};
use log::info;
use snafu::ResultExt;
use songplays_core::{StarTable, StorageLocation, storage};

use crate::{
    StageOptions,
    dimension::project_dimension,
    error::{EtlResult, LocationSnafu, TransformSnafu},
    report::{Stage, StageReport, StageReportBuilder},
    sink::write_partitioned,
    source::{RecordSource, load_records},
};

/// Project song records to the `songs` dimension.
pub fn songs_table(records: DataFrame) -> Result<DataFrame> {
    project_dimension(
        records,
        StarTable::Songs,
        vec![
            col("song_id"),
            col("title"),
            col("artist_id"),
            col("year"),
            col("duration"),
        ],
    )
}

/// Project song records to the `artists` dimension.
///
/// Many songs share an artist, so artist attributes collapse to one row per
/// distinct attribute combination.
pub fn artists_table(records: DataFrame) -> Result<DataFrame> {
    project_dimension(
        records,
        StarTable::Artists,
        vec![
            col("artist_id"),
            col("artist_name"),
            col("artist_location"),
            col("artist_latitude"),
            col("artist_longitude"),
        ],
    )
}

/// Read `song_data` under `input` and write `songs` and `artists` under
/// `output`.
///
/// Both tables are written in full or the stage fails; a failure while writing
/// `artists` leaves the freshly written `songs` in place.
pub async fn process_song_data(
    ctx: &SessionContext,
    input: &StorageLocation,
    output: &StorageLocation,
    options: &StageOptions,
) -> EtlResult<StageReport> {
    let input = storage::absolute(input).context(LocationSnafu {
        role: "input",
        location: input.to_string(),
    })?;
    let output = storage::absolute(output).context(LocationSnafu {
        role: "output",
        location: output.to_string(),
    })?;

    info!("Processing song data from {input} into {output}");
    let mut report = StageReportBuilder::new(Stage::SongCatalog);

    let records = load_records(ctx, &input, RecordSource::Songs).await?;

    let songs = songs_table(records.clone()).context(TransformSnafu {
        step: "songs table",
    })?;
    report.push_table(
        write_partitioned(songs, &output, StarTable::Songs, options.preview_rows).await?,
    );

    let artists = artists_table(records).context(TransformSnafu {
        step: "artists table",
    })?;
    report.push_table(
        write_partitioned(artists, &output, StarTable::Artists, options.preview_rows).await?,
    );

    Ok(report.finish())
}
