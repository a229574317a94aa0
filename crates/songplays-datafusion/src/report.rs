//! Summary reports returned by the pipeline stages.

use std::{
    fmt,
    path::PathBuf,
    time::Instant,
};

use songplays_core::StarTable;

/// The two independent pipeline stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Song metadata to `songs` and `artists`.
    SongCatalog,
    /// Activity logs to `users`, `time` and `songplays`.
    ActivityLog,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::SongCatalog => f.write_str("song catalog"),
            Stage::ActivityLog => f.write_str("activity log"),
        }
    }
}

/// Outcome of writing one table.
#[derive(Debug, Clone)]
pub struct TableWriteReport {
    /// Table that was written.
    pub table: StarTable,
    /// Directory holding the partitioned dataset.
    pub path: PathBuf,
    /// Number of rows written.
    pub rows: u64,
    /// Whether a previous run's files were replaced.
    pub replaced: bool,
    /// Elapsed wall time of the write in milliseconds.
    pub elapsed_ms: u128,
    /// Rendered preview of the first rows, when one was requested.
    pub preview: Option<String>,
}

/// Outcome of one stage run.
#[derive(Debug, Clone)]
pub struct StageReport {
    /// Which stage ran.
    pub stage: Stage,
    /// One entry per table, in write order.
    pub tables: Vec<TableWriteReport>,
    /// Total elapsed wall time in milliseconds.
    pub total_ms: u128,
}

impl StageReport {
    /// Report for `table`, if this stage wrote it.
    pub fn table(&self, table: StarTable) -> Option<&TableWriteReport> {
        self.tables.iter().find(|t| t.table == table)
    }

    /// Row count written for `table` (0 if this stage did not write it).
    pub fn rows(&self, table: StarTable) -> u64 {
        self.table(table).map_or(0, |t| t.rows)
    }
}

/// Builder for stage reports.
#[derive(Debug)]
pub struct StageReportBuilder {
    start: Instant,
    stage: Stage,
    tables: Vec<TableWriteReport>,
}

impl StageReportBuilder {
    /// Create a new report builder and start the total timer.
    pub fn new(stage: Stage) -> Self {
        Self {
            start: Instant::now(),
            stage,
            tables: Vec::new(),
        }
    }

    /// Record a finished table write.
    pub fn push_table(&mut self, report: TableWriteReport) {
        self.tables.push(report);
    }

    /// Finalize the report.
    pub fn finish(self) -> StageReport {
        StageReport {
            stage: self.stage,
            tables: self.tables,
            total_ms: self.start.elapsed().as_millis(),
        }
    }
}
