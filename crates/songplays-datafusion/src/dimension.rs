//! Shared projection step for the `songs`, `artists` and `users` dimensions.

use datafusion::{
    error::Result,
    logical_expr::Expr,
    prelude::{DataFrame, col},
};
use songplays_core::StarTable;

/// Project `records` to a dimension, drop rows without a key, deduplicate.
///
/// `projection` must produce exactly the table's output columns.
pub(crate) fn project_dimension(
    records: DataFrame,
    table: StarTable,
    projection: Vec<Expr>,
) -> Result<DataFrame> {
    let projected = records.select(projection)?;
    let keyed = match table.required_key() {
        Some(key) => projected.filter(col(key).is_not_null())?,
        None => projected,
    };
    keyed.distinct()
}
