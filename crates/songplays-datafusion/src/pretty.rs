//! Table previews for the `--show` option.
//!
//! Arrow's default display prints `f64` values with their full binary-float
//! representation, so a song duration shows up as `218.93179000000001`.
//! Before rendering, float columns of the preview rows are replaced by text
//! columns rounded to [`PREVIEW_FLOAT_DECIMALS`] places with trailing zeros
//! trimmed.

use std::sync::Arc;

use arrow::{
    array::{ArrayRef, AsArray, RecordBatch, StringArray},
    datatypes::{DataType, Field, Float64Type, Schema},
    error::ArrowError,
    util::pretty::pretty_format_batches,
};
use datafusion::prelude::DataFrame;
use snafu::ResultExt;
use songplays_core::StarTable;

use crate::error::{ArrowSnafu, EtlResult, WriteTableSnafu};

/// Decimal places kept for `f64` values in a preview.
pub const PREVIEW_FLOAT_DECIMALS: usize = 6;

fn trim_float(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let prec = PREVIEW_FLOAT_DECIMALS;
    let mut s = format!("{value:.prec$}");
    let kept = s.trim_end_matches('0').trim_end_matches('.').len();
    s.truncate(kept);
    if s == "-0" {
        s.remove(0);
    }
    s
}

/// Swap every `Float64` column of `batch` for its trimmed text rendering.
fn with_trimmed_floats(batch: &RecordBatch) -> Result<RecordBatch, ArrowError> {
    let schema = batch.schema();
    let mut fields = Vec::with_capacity(schema.fields().len());
    let mut columns: Vec<ArrayRef> = Vec::with_capacity(batch.num_columns());

    for (field, column) in schema.fields().iter().zip(batch.columns()) {
        match column.as_primitive_opt::<Float64Type>() {
            Some(values) => {
                let text: StringArray = values.iter().map(|v| v.map(trim_float)).collect();
                fields.push(Field::new(field.name(), DataType::Utf8, field.is_nullable()));
                columns.push(Arc::new(text));
            }
            None => {
                fields.push(field.as_ref().clone());
                columns.push(Arc::clone(column));
            }
        }
    }

    RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)
}

/// Render record batches as a pretty table with trimmed floats.
pub fn format_preview(batches: &[RecordBatch]) -> Result<String, ArrowError> {
    let trimmed = batches
        .iter()
        .map(with_trimmed_floats)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(pretty_format_batches(&trimmed)?.to_string())
}

/// Render at most `rows` rows of `df` as a pretty table.
pub async fn render_preview(
    df: DataFrame,
    table: StarTable,
    path: &str,
    rows: usize,
) -> EtlResult<String> {
    let batches = df
        .limit(0, Some(rows))
        .context(WriteTableSnafu { table, path })?
        .collect()
        .await
        .context(WriteTableSnafu { table, path })?;

    format_preview(&batches).context(ArrowSnafu { table })
}
