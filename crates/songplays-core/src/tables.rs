//! The five star-schema tables and their static properties.

use std::fmt;

/// One of the tables written by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StarTable {
    /// Song dimension, one row per distinct song.
    Songs,
    /// Artist dimension, one row per distinct artist.
    Artists,
    /// User dimension, one row per distinct user attribute snapshot.
    Users,
    /// Time dimension, one row per distinct play timestamp.
    Time,
    /// Fact table, one row per play matched to a known song.
    Songplays,
}

impl StarTable {
    /// Every table, in the order the pipeline writes them.
    pub const ALL: [StarTable; 5] = [
        StarTable::Songs,
        StarTable::Artists,
        StarTable::Users,
        StarTable::Time,
        StarTable::Songplays,
    ];

    /// Table name, also used as the dataset file name (`<name>.parquet`).
    pub fn name(self) -> &'static str {
        match self {
            StarTable::Songs => "songs",
            StarTable::Artists => "artists",
            StarTable::Users => "users",
            StarTable::Time => "time",
            StarTable::Songplays => "songplays",
        }
    }

    pub(crate) fn dir_prefix(self) -> &'static str {
        match self {
            StarTable::Songs => "song",
            StarTable::Artists => "artist",
            StarTable::Users => "user",
            StarTable::Time => "time",
            StarTable::Songplays => "songplays",
        }
    }

    /// Output columns in their logical order (partition columns included).
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            StarTable::Songs => &["song_id", "title", "artist_id", "year", "duration"],
            StarTable::Artists => &[
                "artist_id",
                "artist_name",
                "artist_location",
                "artist_latitude",
                "artist_longitude",
            ],
            StarTable::Users => &["user_id", "first_name", "last_name", "gender", "level"],
            StarTable::Time => &[
                "start_time",
                "hour",
                "day",
                "week",
                "month",
                "year",
                "weekday",
            ],
            StarTable::Songplays => &[
                "songplay_id",
                "start_time",
                "user_id",
                "level",
                "song_id",
                "artist_id",
                "session_id",
                "location",
                "user_agent",
                "year",
                "month",
            ],
        }
    }

    /// Columns the dataset is physically partitioned by, outermost first.
    pub fn partition_columns(self) -> &'static [&'static str] {
        match self {
            StarTable::Songs => &["year", "artist_id"],
            StarTable::Artists => &["artist_id"],
            StarTable::Users => &["user_id"],
            StarTable::Time | StarTable::Songplays => &["year", "month"],
        }
    }

    /// Columns whose non-null values every row must carry.
    ///
    /// `time` and `songplays` are keyed by derived values that cannot be null
    /// by construction, so only the dimension keys are listed.
    pub fn required_key(self) -> Option<&'static str> {
        match self {
            StarTable::Songs => Some("song_id"),
            StarTable::Artists => Some("artist_id"),
            StarTable::Users => Some("user_id"),
            StarTable::Time | StarTable::Songplays => None,
        }
    }

    /// Sort order applied before writing so file contents are reproducible.
    pub fn sort_columns(self) -> &'static [&'static str] {
        match self {
            StarTable::Songs => &["song_id", "title", "artist_id", "year", "duration"],
            StarTable::Artists => &["artist_id", "artist_name", "artist_location"],
            StarTable::Users => &["user_id", "level", "first_name", "last_name", "gender"],
            StarTable::Time => &["start_time"],
            StarTable::Songplays => &["songplay_id"],
        }
    }
}

impl fmt::Display for StarTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
