// crates/feedflux-core/src/profiling.rs

use polars::prelude::*;

use crate::error::{PipelineError, Result};
use crate::transform::has_column;

/// Per-column null counts and ratios, tagged against the caller's key
/// columns for prioritized review. Sorted descending by ratio. A zero-row
/// frame yields a ratio of 0.0 for every column.
pub fn missingness_summary(df: &DataFrame, key_columns: &[&str]) -> Result<DataFrame> {
    let total = df.height();

    let mut names: Vec<String> = Vec::with_capacity(df.width());
    let mut null_counts: Vec<i64> = Vec::with_capacity(df.width());
    let mut null_ratios: Vec<f64> = Vec::with_capacity(df.width());
    let mut is_key: Vec<bool> = Vec::with_capacity(df.width());

    for column in df.get_columns() {
        let nulls = column.null_count();
        names.push(column.name().to_string());
        null_counts.push(nulls as i64);
        null_ratios.push(if total == 0 {
            0.0
        } else {
            nulls as f64 / total as f64
        });
        is_key.push(key_columns.contains(&column.name().as_str()));
    }

    let report = DataFrame::new(vec![
        Series::new("column".into(), names).into(),
        Series::new("null_count".into(), null_counts).into(),
        Series::new("null_ratio".into(), null_ratios).into(),
        Series::new("is_key".into(), is_key).into(),
    ])?;
    Ok(report.sort(
        ["null_ratio"],
        SortMultipleOptions::default().with_order_descending(true),
    )?)
}

/// Value tuples of the subset occurring more than once, with their counts,
/// sorted descending by count. An absent subset column is a caller mistake
/// and fails rather than being ignored.
pub fn duplicate_check(df: &DataFrame, subset: &[&str]) -> Result<DataFrame> {
    for &name in subset {
        if !has_column(df, name) {
            return Err(PipelineError::missing_column(name, "primary"));
        }
    }

    let keys: Vec<Expr> = subset.iter().map(|name| col(*name)).collect();
    let dupes = df
        .clone()
        .lazy()
        .group_by(keys)
        .agg([len().cast(DataType::Int64).alias("count")])
        .filter(col("count").gt(lit(1)))
        .sort(
            ["count"],
            SortMultipleOptions::default().with_order_descending(true),
        )
        .collect()?;
    Ok(dupes)
}

/// Distributional summaries for numeric engagement columns: mean, median,
/// sample standard deviation, 95th percentile (linear interpolation), max,
/// and the fraction of strictly positive values. Columns absent from the
/// frame are skipped; the positive ratio of an empty frame is 0.0.
pub fn engagement_distribution(df: &DataFrame, engagement_cols: &[&str]) -> Result<DataFrame> {
    let total = df.height();

    let mut metrics: Vec<String> = Vec::new();
    let mut means: Vec<Option<f64>> = Vec::new();
    let mut medians: Vec<Option<f64>> = Vec::new();
    let mut stds: Vec<Option<f64>> = Vec::new();
    let mut p95s: Vec<Option<f64>> = Vec::new();
    let mut maxes: Vec<Option<f64>> = Vec::new();
    let mut non_zero_ratios: Vec<f64> = Vec::new();

    for &name in engagement_cols {
        if !has_column(df, name) {
            continue;
        }
        let column = df.column(name)?.cast(&DataType::Float64)?;
        let values: Vec<f64> = column.f64()?.into_iter().flatten().collect();
        let positive = values.iter().filter(|v| **v > 0.0).count();

        metrics.push(name.to_string());
        means.push(mean(&values));
        medians.push(percentile(&values, 0.5));
        stds.push(sample_std(&values));
        p95s.push(percentile(&values, 0.95));
        maxes.push(values.iter().copied().fold(None, |acc: Option<f64>, v| {
            Some(acc.map_or(v, |m| m.max(v)))
        }));
        non_zero_ratios.push(if total == 0 {
            0.0
        } else {
            positive as f64 / total as f64
        });
    }

    let report = DataFrame::new(vec![
        Series::new("metric".into(), metrics).into(),
        Series::new("mean".into(), means).into(),
        Series::new("median".into(), medians).into(),
        Series::new("std".into(), stds).into(),
        Series::new("p95".into(), p95s).into(),
        Series::new("max".into(), maxes).into(),
        Series::new("non_zero_ratio".into(), non_zero_ratios).into(),
    ])?;
    Ok(report)
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let avg = mean(values)?;
    let variance =
        values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(variance.sqrt())
}

fn percentile(values: &[f64], quantile: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let rank = quantile * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        return Some(sorted[lower]);
    }
    let weight = rank - lower as f64;
    Some(sorted[lower] * (1.0 - weight) + sorted[upper] * weight)
}
