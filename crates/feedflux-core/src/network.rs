// crates/feedflux-core/src/network.rs

use polars::prelude::*;

use crate::error::{PipelineError, Result};
use crate::transform::has_column;

/// Projects a source/target column pair into a weighted directed edge list.
///
/// Rows with a null endpoint carry no edge and are dropped before
/// aggregation. Self-referential pairs are excluded: they are not a directed
/// interaction and would distort downstream centrality computations. Weight
/// is the co-occurrence count of the exact (source, target) pair. No sort
/// order is imposed; callers sort as needed.
pub fn project_edges(df: &DataFrame, source_col: &str, target_col: &str) -> Result<DataFrame> {
    if !has_column(df, source_col) {
        return Err(PipelineError::missing_column(source_col, "primary"));
    }
    if !has_column(df, target_col) {
        return Err(PipelineError::missing_column(target_col, "primary"));
    }

    let edges = df
        .clone()
        .lazy()
        .drop_nulls(Some(vec![col(source_col), col(target_col)]))
        .filter(col(source_col).neq(col(target_col)))
        .group_by([col(source_col), col(target_col)])
        .agg([len().cast(DataType::Int64).alias("weight")])
        .collect()?;
    Ok(edges)
}
