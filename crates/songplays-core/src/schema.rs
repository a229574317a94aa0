//! Arrow schemas for the raw record sources and for the `time` dimension.
//!
//! Raw JSON is always read against these fixed schemas instead of an
//! inferred one. A field missing from a file loads as null and an unknown
//! field is ignored, so files with drifting shapes still load into one
//! uniform table, and an input with no files still has the right columns.

use std::sync::Arc;

use arrow::datatypes::{DataType, Field, Schema, SchemaRef, TimeUnit};

/// Schema of one song metadata record (`song_data/*/*/*/*.json`).
pub fn song_record_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new("num_songs", DataType::Int64, true),
        Field::new("artist_id", DataType::Utf8, true),
        Field::new("artist_latitude", DataType::Float64, true),
        Field::new("artist_longitude", DataType::Float64, true),
        Field::new("artist_location", DataType::Utf8, true),
        Field::new("artist_name", DataType::Utf8, true),
        Field::new("song_id", DataType::Utf8, true),
        Field::new("title", DataType::Utf8, true),
        Field::new("duration", DataType::Float64, true),
        Field::new("year", DataType::Int64, true),
    ]))
}

/// Schema of one activity log record (`log_data/**/*.json`).
///
/// `userId` is text: logged-out events carry an empty string there.
pub fn log_record_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new("artist", DataType::Utf8, true),
        Field::new("auth", DataType::Utf8, true),
        Field::new("firstName", DataType::Utf8, true),
        Field::new("gender", DataType::Utf8, true),
        Field::new("itemInSession", DataType::Int64, true),
        Field::new("lastName", DataType::Utf8, true),
        Field::new("length", DataType::Float64, true),
        Field::new("level", DataType::Utf8, true),
        Field::new("location", DataType::Utf8, true),
        Field::new("method", DataType::Utf8, true),
        Field::new("page", DataType::Utf8, true),
        Field::new("registration", DataType::Float64, true),
        Field::new("sessionId", DataType::Int64, true),
        Field::new("song", DataType::Utf8, true),
        Field::new("status", DataType::Int64, true),
        Field::new("ts", DataType::Int64, true),
        Field::new("userAgent", DataType::Utf8, true),
        Field::new("userId", DataType::Utf8, true),
    ]))
}

/// Data type of `start_time` in `time` and `songplays`.
pub fn start_time_type(timezone: &str) -> DataType {
    DataType::Timestamp(TimeUnit::Second, Some(timezone.into()))
}

/// Schema of the `time` dimension, with `start_time` tagged with `timezone`.
pub fn time_table_schema(timezone: &str) -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new("start_time", start_time_type(timezone), false),
        Field::new("hour", DataType::Int32, false),
        Field::new("day", DataType::Int32, false),
        Field::new("week", DataType::Int32, false),
        Field::new("month", DataType::Int32, false),
        Field::new("year", DataType::Int32, false),
        Field::new("weekday", DataType::Int32, false),
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::StarTable;

    #[test]
    fn time_schema_matches_table_columns() {
        let schema = time_table_schema("UTC");
        let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
        assert_eq!(names, StarTable::Time.columns());
    }

    #[test]
    fn song_schema_carries_every_projected_column() {
        let schema = song_record_schema();
        for table in [StarTable::Songs, StarTable::Artists] {
            for c in table.columns() {
                assert!(schema.field_with_name(c).is_ok(), "{c}");
            }
        }
    }
}
