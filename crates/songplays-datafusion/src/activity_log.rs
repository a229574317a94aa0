//! Activity log stage: NextSong events to `users`, `time` and `songplays`.

use datafusion::{
    error::Result,
    logical_expr::ident,
    prelude::{DataFrame, SessionContext, col, lit},
};
use log::{Level, debug, info, log_enabled};
use snafu::ResultExt;
use songplays_core::{StarTable, StorageLocation, storage};

use crate::{
    StageOptions,
    dimension::project_dimension,
    error::{EtlResult, LoadSnafu, LocationSnafu, TransformSnafu},
    play_time::derive_play_times,
    report::{Stage, StageReport, StageReportBuilder},
    sink::write_partitioned,
    songplays::songplays_table,
    source::{RecordSource, load_records, read_records},
};

/// `page` value of a song play event.
pub const NEXT_SONG_PAGE: &str = "NextSong";

/// Keep only song play events.
pub fn next_song_plays(records: DataFrame) -> Result<DataFrame> {
    records.filter(col("page").eq(lit(NEXT_SONG_PAGE)))
}

/// Project plays to the `users` dimension.
///
/// A user seen with two `level` values keeps one row per value.
pub fn users_table(plays: DataFrame) -> Result<DataFrame> {
    project_dimension(
        plays,
        StarTable::Users,
        vec![
            ident("userId").alias("user_id"),
            ident("firstName").alias("first_name"),
            ident("lastName").alias("last_name"),
            col("gender"),
            col("level"),
        ],
    )
}

/// Read `log_data` (and `song_data` for matching) under `input` and write
/// `users`, `time` and `songplays` under `output`.
///
/// This stage does not read the song catalog stage's output; it loads song
/// records itself, so the two stages can run in any order.
pub async fn process_log_data(
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

    info!(
        "Processing log data from {input} into {output} (timezone {})",
        options.timezone
    );
    let mut report = StageReportBuilder::new(Stage::ActivityLog);

    let records = read_records(ctx, &input, RecordSource::Logs).await?;
    let plays = next_song_plays(records)
        .context(TransformSnafu {
            step: "NextSong filter",
        })?
        .cache()
        .await
        .context(LoadSnafu {
            source_name: RecordSource::Logs.name(),
            location: input.to_string(),
        })?;

    let users = users_table(plays.clone()).context(TransformSnafu {
        step: "users table",
    })?;
    report.push_table(
        write_partitioned(users, &output, StarTable::Users, options.preview_rows).await?,
    );

    let times = derive_play_times(ctx, &plays, options.timezone).await?;
    report.push_table(
        write_partitioned(
            times.time_table,
            &output,
            StarTable::Time,
            options.preview_rows,
        )
        .await?,
    );

    let catalog = load_records(ctx, &input, RecordSource::Songs).await?;
    let songplays = songplays_table(plays.clone(), catalog, times.start_times).context(
        TransformSnafu {
            step: "songplays table",
        },
    )?;
    let written =
        write_partitioned(songplays, &output, StarTable::Songplays, options.preview_rows).await?;

    if log_enabled!(Level::Debug) {
        match plays.count().await {
            Ok(total) => debug!(
                "{} songplay row(s) from {total} NextSong event(s); unmatched plays were dropped",
                written.rows
            ),
            Err(e) => debug!("Could not count NextSong events: {e}"),
        }
    }
    report.push_table(written);

    Ok(report.finish())
}
