//! The `songplays` fact table.
//!
//! The log does not carry `song_id`/`artist_id`, so plays are matched to the
//! catalog on `(song, artist) = (title, artist_name)` with exact,
//! case-sensitive equality. Unmatched plays are dropped: a title that differs
//! from the catalog only in case or punctuation does not match.

use datafusion::{
    common::JoinType,
    error::Result,
    functions_window::expr_fn::row_number,
    logical_expr::{ExprFunctionExt, ident},
    prelude::{DataFrame, col},
};

use crate::play_time::EVENT_TS_COLUMN;

/// Join NextSong `plays` to the song `catalog` and the per-play start times.
///
/// Only plays with a catalog match survive. A matched play without a usable
/// `ts` keeps null `start_time`, `year` and `month`. Identical fact
/// rows collapse to one before `songplay_id` is assigned, so ids are unique
/// but carry no meaning beyond identity.
pub fn songplays_table(
    plays: DataFrame,
    catalog: DataFrame,
    start_times: DataFrame,
) -> Result<DataFrame> {
    let catalog = catalog
        .select(vec![
            col("song_id"),
            col("title"),
            col("artist_id"),
            col("artist_name"),
        ])?
        .filter(col("song_id").is_not_null().and(col("artist_id").is_not_null()))?;

    let matched = plays.join(
        catalog,
        JoinType::Inner,
        &["song", "artist"],
        &["title", "artist_name"],
        None,
    )?;
    let timed = matched.join(
        start_times,
        JoinType::Left,
        &["ts"],
        &[EVENT_TS_COLUMN],
        None,
    )?;

    let facts = timed
        .select(vec![
            col("start_time"),
            ident("userId").alias("user_id"),
            col("level"),
            col("song_id"),
            col("artist_id"),
            ident("sessionId").alias("session_id"),
            col("location"),
            ident("userAgent").alias("user_agent"),
            col("year"),
            col("month"),
        ])?
        .distinct()?;

    // Numbering follows a total order over the fact columns so repeated runs
    // over the same input assign the same ids.
    let songplay_id = row_number()
        .order_by(vec![
            col("start_time").sort(true, true),
            col("user_id").sort(true, true),
            col("session_id").sort(true, true),
            col("song_id").sort(true, true),
            col("artist_id").sort(true, true),
            col("level").sort(true, true),
            col("location").sort(true, true),
            col("user_agent").sort(true, true),
        ])
        .build()?
        .alias("songplay_id");

    facts.window(vec![songplay_id])
}
