//! Running both stages in sequence.

use datafusion::prelude::SessionContext;
use log::info;
use songplays_core::{ReportingTimezone, StorageLocation};

use crate::{
    activity_log::process_log_data, error::EtlResult, report::StageReport,
    song_catalog::process_song_data,
};

/// Knobs shared by both stages.
#[derive(Debug, Clone, Copy, Default)]
pub struct StageOptions {
    /// Zone in which play timestamps are decomposed.
    pub timezone: ReportingTimezone,
    /// Render this many rows of each written table into its report.
    pub preview_rows: Option<usize>,
}

/// Where a full run reads from and writes to.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Root holding `song_data/` and `log_data/`.
    pub input: StorageLocation,
    /// Root receiving the five table subpaths.
    pub output: StorageLocation,
    /// Options passed to both stages.
    pub options: StageOptions,
}

/// Run the song catalog stage, then the activity log stage.
///
/// Stops at the first failure. Tables written before the failure stay on
/// disk; re-running replaces them.
pub async fn run_pipeline(
    ctx: &SessionContext,
    config: &PipelineConfig,
) -> EtlResult<Vec<StageReport>> {
    let songs = process_song_data(ctx, &config.input, &config.output, &config.options).await?;
    let logs = process_log_data(ctx, &config.input, &config.output, &config.options).await?;

    info!("Pipeline finished in {} ms", songs.total_ms + logs.total_ms);
    Ok(vec![songs, logs])
}
