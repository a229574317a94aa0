#![allow(dead_code)]

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use arrow::array::Array;
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use arrow::util::display::array_value_to_string;
use datafusion::prelude::{ParquetReadOptions, SessionContext};
use songplays_core::StarTable;
use songplays_core::storage::layout;

pub type TestResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

pub const CASUAL_ID: &str = "ARD7TVE1187B99BFB1";
pub const GOB_ID: &str = "ARXR32B1187FB57099";
pub const RENAUD_ID: &str = "ARJIE2Y1187B994AB7";

/// First sample play: 2018-11-14 19:41:21 in New York.
pub const SAMPLE_TS: i64 = 1_542_242_481_796;

pub struct Song {
    pub song_id: Option<&'static str>,
    pub title: &'static str,
    pub artist_id: Option<&'static str>,
    pub artist_name: &'static str,
    pub year: i64,
    pub duration: f64,
}

fn json_str(v: Option<&str>) -> String {
    match v {
        Some(s) => format!("\"{s}\""),
        None => "null".to_string(),
    }
}

impl Song {
    pub fn to_json(&self) -> String {
        format!(
            concat!(
                "{{\"num_songs\": 1, \"artist_id\": {}, \"artist_latitude\": null, ",
                "\"artist_longitude\": null, \"artist_location\": \"\", ",
                "\"artist_name\": \"{}\", \"song_id\": {}, \"title\": \"{}\", ",
                "\"duration\": {}, \"year\": {}}}"
            ),
            json_str(self.artist_id),
            self.artist_name,
            json_str(self.song_id),
            self.title,
            self.duration,
            self.year
        )
    }
}

#[derive(Clone)]
pub struct Event {
    pub page: &'static str,
    pub user_id: &'static str,
    pub first_name: &'static str,
    pub level: &'static str,
    pub song: Option<&'static str>,
    pub artist: Option<&'static str>,
    pub session_id: i64,
    pub ts: Option<i64>,
}

impl Event {
    pub fn play(user_id: &'static str, song: &'static str, artist: &'static str, ts: i64) -> Self {
        Self {
            page: "NextSong",
            user_id,
            first_name: "Ryan",
            level: "free",
            song: Some(song),
            artist: Some(artist),
            session_id: 583,
            ts: Some(ts),
        }
    }

    pub fn to_json(&self) -> String {
        format!(
            concat!(
                "{{\"artist\": {}, \"auth\": \"Logged In\", \"firstName\": \"{}\", ",
                "\"gender\": \"M\", \"itemInSession\": 0, \"lastName\": \"Smith\", ",
                "\"length\": 218.93179, \"level\": \"{}\", ",
                "\"location\": \"San Jose-Sunnyvale-Santa Clara, CA\", \"method\": \"PUT\", ",
                "\"page\": \"{}\", \"registration\": 1.541016707796E12, \"sessionId\": {}, ",
                "\"song\": {}, \"status\": 200, \"ts\": {}, ",
                "\"userAgent\": \"Mozilla/5.0 (X11; Linux x86_64)\", \"userId\": \"{}\"}}"
            ),
            json_str(self.artist),
            self.first_name,
            self.level,
            self.page,
            self.session_id,
            json_str(self.song),
            self.ts.map_or_else(|| "null".to_string(), |ts| ts.to_string()),
            self.user_id
        )
    }
}

pub fn write_file(path: &Path, lines: &[String]) -> TestResult {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, lines.join("\n"))?;
    Ok(())
}

/// Songs: three distinct songs by three artists, one exact duplicate, one
/// record without ids, and a second song by an existing artist.
pub fn write_song_data(input: &Path) -> TestResult {
    let songs = [
        (
            "song_data/A/A/A/TRAAAAW128F429D538.json",
            Song {
                song_id: Some("SOMZWCG12A8C13C480"),
                title: "I Didn't Mean To",
                artist_id: Some(CASUAL_ID),
                artist_name: "Casual",
                year: 0,
                duration: 218.93179,
            },
        ),
        (
            "song_data/A/A/B/TRAABCL128F4286650.json",
            Song {
                song_id: Some("SOMZWCG12A8C13C480"),
                title: "I Didn't Mean To",
                artist_id: Some(CASUAL_ID),
                artist_name: "Casual",
                year: 0,
                duration: 218.93179,
            },
        ),
        (
            "song_data/A/B/A/TRABACN128F425B784.json",
            Song {
                song_id: Some("SOUPIRU12A6D4FA1E1"),
                title: "Der Kleine Dompfaff",
                artist_id: Some(RENAUD_ID),
                artist_name: "Line Renaud",
                year: 0,
                duration: 152.92036,
            },
        ),
        (
            "song_data/A/B/B/TRABBBV128F42967D7.json",
            Song {
                song_id: Some("SOFSOCN12A8C143F5D"),
                title: "Face the Ashes",
                artist_id: Some(GOB_ID),
                artist_name: "Gob",
                year: 2007,
                duration: 209.60608,
            },
        ),
        (
            "song_data/A/B/C/TRABCEI128F424C983.json",
            Song {
                song_id: Some("SOQHXMF12AB0182363"),
                title: "Young Boy Blues",
                artist_id: Some(CASUAL_ID),
                artist_name: "Casual",
                year: 2007,
                duration: 218.77506,
            },
        ),
        (
            "song_data/A/C/A/TRACAAA128F000000.json",
            Song {
                song_id: None,
                title: "Untitled",
                artist_id: None,
                artist_name: "Unknown",
                year: 0,
                duration: 1.0,
            },
        ),
    ];

    for (rel, song) in songs {
        write_file(&input.join(rel), &[song.to_json()])?;
    }
    Ok(())
}

/// Log events spread over two files in nested directories.
pub fn write_log_data(input: &Path) -> TestResult {
    let matched = Event::play("26", "I Didn't Mean To", "Casual", SAMPLE_TS);
    let upgraded = Event {
        level: "paid",
        session_id: 584,
        ..Event::play("26", "Face the Ashes", "Gob", 1_542_253_449_796)
    };
    let unmatched = Event {
        first_name: "Kaylee",
        ..Event::play("8", "Not In The Catalog", "Nobody", 1_542_260_935_796)
    };
    let case_mismatch = Event {
        first_name: "Kaylee",
        ..Event::play("8", "i didn't mean to", "Casual", 1_542_261_224_796)
    };
    let home = Event {
        page: "Home",
        user_id: "9",
        first_name: "Wyatt",
        song: None,
        artist: None,
        ..Event::play("9", "", "", 1_542_262_728_796)
    };

    write_file(
        &input.join("log_data/2018/11/2018-11-14-events.json"),
        &[
            matched.to_json(),
            home.to_json(),
            unmatched.to_json(),
            // Same play logged twice.
            matched.to_json(),
        ],
    )?;
    write_file(
        &input.join("log_data/2018/11/late/2018-11-15-events.json"),
        &[upgraded.to_json(), case_mismatch.to_json()],
    )?;
    Ok(())
}

pub fn write_sample_input(input: &Path) -> TestResult {
    write_song_data(input)?;
    write_log_data(input)?;
    Ok(())
}

pub fn table_dir(output: &Path, table: StarTable) -> PathBuf {
    output.join(layout::table_rel_dir(table))
}

/// Read a written table back, with its partition columns as text.
pub async fn read_table(output: &Path, table: StarTable) -> TestResult<Vec<RecordBatch>> {
    let ctx = SessionContext::new();
    let partition_cols = table
        .partition_columns()
        .iter()
        .map(|c| (c.to_string(), DataType::Utf8))
        .collect();
    let options = ParquetReadOptions::default().table_partition_cols(partition_cols);
    let dir = format!("{}/", table_dir(output, table).display());
    let df = ctx.read_parquet(dir, options).await?;
    Ok(df.collect().await?)
}

/// Render `columns` of every row as text, sorted.
pub fn rows(batches: &[RecordBatch], columns: &[&str]) -> TestResult<Vec<Vec<String>>> {
    let mut out = Vec::new();
    for batch in batches {
        for row in 0..batch.num_rows() {
            let mut values = Vec::with_capacity(columns.len());
            for name in columns {
                let column = batch
                    .column_by_name(name)
                    .ok_or_else(|| format!("missing column {name}"))?;
                values.push(if column.is_null(row) {
                    "NULL".to_string()
                } else {
                    array_value_to_string(column, row)?
                });
            }
            out.push(values);
        }
    }
    out.sort();
    Ok(out)
}

pub fn column_values(batches: &[RecordBatch], column: &str) -> TestResult<BTreeSet<String>> {
    Ok(rows(batches, &[column])?
        .into_iter()
        .flatten()
        .collect())
}
