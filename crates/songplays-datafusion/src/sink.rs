//! Writing star-schema tables as Hive-partitioned Parquet datasets.
//!
//! Every table owns one subpath under the output root (see
//! [`songplays_core::storage::layout::table_rel_dir`]). A write replaces the
//! whole subpath, so re-running a stage never appends to a previous run.

use std::{path::Path, sync::Arc, time::Instant};

use arrow::{
    array::{AsArray, RecordBatch},
    datatypes::{DataType, Schema, SchemaRef, UInt64Type},
};
use datafusion::{
    dataframe::DataFrameWriteOptions,
    functions::expr_fn::coalesce,
    logical_expr::{Expr, SortExpr},
    prelude::{DataFrame, cast, col, lit},
};
use log::{debug, info};
use parquet::arrow::ArrowWriter;
use snafu::ResultExt;
use songplays_core::{
    StarTable, StorageLocation,
    storage::{self, layout},
};

use crate::{
    error::{
        CreateEmptyTableSnafu, EtlResult, PrepareOutputSnafu, TransformSnafu,
        WriteEmptyTableSnafu, WriteTableSnafu,
    },
    pretty,
    report::TableWriteReport,
};

/// Directory value used for a null partition column, as Hive and Spark do.
pub const NULL_PARTITION_VALUE: &str = "__HIVE_DEFAULT_PARTITION__";

/// File written when a table has no rows, so readers still see its schema.
pub const EMPTY_TABLE_FILE_NAME: &str = "part-00000-empty.parquet";

/// Write `df` as `table` under `output`, replacing any previous contents.
///
/// Rows are sorted by the table's sort columns and projected to its output
/// columns first. Partition columns are rendered as text so every value maps
/// to a `column=value/` directory. When `preview_rows` is set, the first rows
/// of the table are rendered into the report.
pub async fn write_partitioned(
    df: DataFrame,
    output: &StorageLocation,
    table: StarTable,
    preview_rows: Option<usize>,
) -> EtlResult<TableWriteReport> {
    let start = Instant::now();
    let rel = layout::table_rel_dir(table);
    let replaced = storage::reset_dir(output, &rel)
        .await
        .context(PrepareOutputSnafu { table })?;

    let dir = output.resolve(&rel);
    let path = dir.display().to_string();

    let ordered = order_for_write(df, table).context(TransformSnafu {
        step: "output ordering",
    })?;
    let file_schema = file_schema(ordered.schema().as_arrow(), table);
    let prepared = render_partition_columns(ordered.clone(), table).context(TransformSnafu {
        step: "partition columns",
    })?;

    let partition_by = table
        .partition_columns()
        .iter()
        .map(|c| c.to_string())
        .collect();
    let options = DataFrameWriteOptions::new().with_partition_by(partition_by);
    // A trailing slash makes the target a directory rather than a single file.
    let target = format!("{}/", path.trim_end_matches('/'));

    let batches = prepared
        .write_parquet(&target, options, None)
        .await
        .context(WriteTableSnafu {
            table,
            path: path.as_str(),
        })?;
    let rows = written_rows(&batches);

    if rows == 0 {
        write_empty_file(&dir, table, file_schema).await?;
    }

    let preview = match preview_rows {
        Some(n) => Some(pretty::render_preview(ordered, table, &path, n).await?),
        None => None,
    };

    info!("Wrote {rows} row(s) to the {table} table at {path}");
    if replaced {
        debug!("Replaced previous {table} output at {path}");
    }

    Ok(TableWriteReport {
        table,
        path: dir,
        rows,
        replaced,
        elapsed_ms: start.elapsed().as_millis(),
        preview,
    })
}

fn order_for_write(df: DataFrame, table: StarTable) -> datafusion::error::Result<DataFrame> {
    let sort: Vec<SortExpr> = table
        .sort_columns()
        .iter()
        .map(|c| col(*c).sort(true, true))
        .collect();
    let projection: Vec<Expr> = table.columns().iter().map(|c| col(*c)).collect();

    df.sort(sort)?.select(projection)
}

fn render_partition_columns(
    df: DataFrame,
    table: StarTable,
) -> datafusion::error::Result<DataFrame> {
    let partition = table.partition_columns();
    let projection: Vec<Expr> = table
        .columns()
        .iter()
        .map(|c| {
            if partition.contains(c) {
                coalesce(vec![
                    cast(col(*c), DataType::Utf8),
                    lit(NULL_PARTITION_VALUE),
                ])
                .alias(*c)
            } else {
                col(*c)
            }
        })
        .collect();

    df.select(projection)
}

/// Schema of the data files: partition columns live in directory names.
fn file_schema(schema: &Schema, table: StarTable) -> SchemaRef {
    let partition = table.partition_columns();
    let fields: Vec<_> = schema
        .fields()
        .iter()
        .filter(|f| !partition.contains(&f.name().as_str()))
        .cloned()
        .collect();
    Arc::new(Schema::new(fields))
}

/// Sum the `count` column DataFusion returns from a write.
fn written_rows(batches: &[RecordBatch]) -> u64 {
    batches
        .iter()
        .filter_map(|b| b.column_by_name("count"))
        .filter_map(|c| c.as_primitive_opt::<UInt64Type>())
        .flat_map(|counts| counts.iter().flatten())
        .sum()
}

async fn write_empty_file(dir: &Path, table: StarTable, schema: SchemaRef) -> EtlResult<()> {
    let file = dir.join(EMPTY_TABLE_FILE_NAME);
    let file_path = file.display().to_string();

    let mut buf = Vec::new();
    let writer = ArrowWriter::try_new(&mut buf, schema, None).context(WriteEmptyTableSnafu {
        table,
        path: file_path.as_str(),
    })?;
    writer.close().context(WriteEmptyTableSnafu {
        table,
        path: file_path.as_str(),
    })?;

    tokio::fs::write(&file, buf)
        .await
        .context(CreateEmptyTableSnafu {
            table,
            path: file_path.as_str(),
        })?;

    debug!("Wrote schema-only file for the empty {table} table at {file_path}");
    Ok(())
}
