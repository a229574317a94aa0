//! Derivation of the `time` dimension and of per-play start times.
//!
//! Distinct raw `ts` values are collected once and decomposed with
//! [`songplays_core::calendar`]. The same decomposition feeds both the `time`
//! table and a lookup frame joined into `songplays`, so a play's `year` and
//! `month` always agree with its `time` row.

use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};

use arrow::{
    array::{AsArray, Int32Array, Int64Array, RecordBatch, TimestampSecondArray},
    datatypes::{DataType, Field, Int64Type, Schema, SchemaRef},
};
use datafusion::prelude::{DataFrame, SessionContext, col};
use log::{debug, warn};
use snafu::{OptionExt, ResultExt};
use songplays_core::{
    CalendarParts, ReportingTimezone, StarTable,
    calendar::decompose_epoch_millis,
    schema::{start_time_type, time_table_schema},
};

use crate::error::{ArrowSnafu, EtlResult, TransformSnafu, UnexpectedColumnTypeSnafu};

/// Raw timestamp column of the lookup frame, joined against the log's `ts`.
pub const EVENT_TS_COLUMN: &str = "event_ts";

/// Frames derived from the play timestamps.
#[derive(Debug, Clone)]
pub struct PlayTimes {
    /// The `time` dimension, one row per distinct second.
    pub time_table: DataFrame,
    /// `{event_ts, start_time, year, month}`, one row per distinct raw `ts`.
    pub start_times: DataFrame,
}

/// Schema of the start-time lookup frame.
pub fn start_time_lookup_schema(timezone: &str) -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new(EVENT_TS_COLUMN, DataType::Int64, false),
        Field::new("start_time", start_time_type(timezone), false),
        Field::new("year", DataType::Int32, false),
        Field::new("month", DataType::Int32, false),
    ]))
}

/// Decompose the distinct non-null `ts` values of `plays` in `tz`.
pub async fn derive_play_times(
    ctx: &SessionContext,
    plays: &DataFrame,
    tz: ReportingTimezone,
) -> EtlResult<PlayTimes> {
    let batches = plays
        .clone()
        .select(vec![col("ts")])
        .and_then(|df| df.filter(col("ts").is_not_null()))
        .and_then(|df| df.distinct())
        .context(TransformSnafu {
            step: "play timestamps",
        })?
        .collect()
        .await
        .context(TransformSnafu {
            step: "play timestamps",
        })?;

    let mut by_event: BTreeMap<i64, CalendarParts> = BTreeMap::new();
    for batch in &batches {
        let column = batch.column(0);
        let ts = column
            .as_primitive_opt::<Int64Type>()
            .context(UnexpectedColumnTypeSnafu {
                table: StarTable::Time,
                column: "ts",
                expected: DataType::Int64,
                actual: column.data_type().clone(),
            })?;

        for millis in ts.iter().flatten() {
            match decompose_epoch_millis(millis, tz) {
                Some(parts) => {
                    by_event.insert(millis, parts);
                }
                None => warn!("Skipping play timestamp {millis}: outside the representable range"),
            }
        }
    }

    let time_batch = time_batch(by_event.values(), tz)?;
    let lookup_batch = lookup_batch(&by_event, tz)?;
    debug!(
        "Derived {} time row(s) from {} distinct play timestamp(s) in {tz}",
        time_batch.num_rows(),
        lookup_batch.num_rows()
    );

    Ok(PlayTimes {
        time_table: ctx.read_batch(time_batch).context(TransformSnafu {
            step: "time table",
        })?,
        start_times: ctx.read_batch(lookup_batch).context(TransformSnafu {
            step: "start time lookup",
        })?,
    })
}

fn time_batch<'a>(
    parts: impl Iterator<Item = &'a CalendarParts>,
    tz: ReportingTimezone,
) -> EtlResult<RecordBatch> {
    // Several raw millisecond values share one second; they decompose
    // identically, so a set keyed on the parts collapses them.
    let distinct: BTreeSet<CalendarParts> = parts.copied().collect();

    let start_time: Vec<i64> = distinct.iter().map(|p| p.start_time).collect();
    let hour: Vec<i32> = distinct.iter().map(|p| p.hour as i32).collect();
    let day: Vec<i32> = distinct.iter().map(|p| p.day as i32).collect();
    let week: Vec<i32> = distinct.iter().map(|p| p.week as i32).collect();
    let month: Vec<i32> = distinct.iter().map(|p| p.month as i32).collect();
    let year: Vec<i32> = distinct.iter().map(|p| p.year).collect();
    let weekday: Vec<i32> = distinct.iter().map(|p| p.weekday as i32).collect();

    RecordBatch::try_new(
        time_table_schema(tz.name()),
        vec![
            Arc::new(TimestampSecondArray::from(start_time).with_timezone(tz.name())),
            Arc::new(Int32Array::from(hour)),
            Arc::new(Int32Array::from(day)),
            Arc::new(Int32Array::from(week)),
            Arc::new(Int32Array::from(month)),
            Arc::new(Int32Array::from(year)),
            Arc::new(Int32Array::from(weekday)),
        ],
    )
    .context(ArrowSnafu {
        table: StarTable::Time,
    })
}

fn lookup_batch(
    by_event: &BTreeMap<i64, CalendarParts>,
    tz: ReportingTimezone,
) -> EtlResult<RecordBatch> {
    let event_ts: Vec<i64> = by_event.keys().copied().collect();
    let start_time: Vec<i64> = by_event.values().map(|p| p.start_time).collect();
    let year: Vec<i32> = by_event.values().map(|p| p.year).collect();
    let month: Vec<i32> = by_event.values().map(|p| p.month as i32).collect();

    RecordBatch::try_new(
        start_time_lookup_schema(tz.name()),
        vec![
            Arc::new(Int64Array::from(event_ts)),
            Arc::new(TimestampSecondArray::from(start_time).with_timezone(tz.name())),
            Arc::new(Int32Array::from(year)),
            Arc::new(Int32Array::from(month)),
        ],
    )
    .context(ArrowSnafu {
        table: StarTable::Songplays,
    })
}
