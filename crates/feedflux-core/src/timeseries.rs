// crates/feedflux-core/src/timeseries.rs

use polars::prelude::*;

use crate::error::{PipelineError, Result};
use crate::transform::has_column;

/// Days of prior history a rolling mean needs before it is defined.
pub const ROLLING_WINDOW_DAYS: usize = 7;
/// A day is anomalous when its raw value exceeds this multiple of the
/// rolling baseline.
pub const ANOMALY_MULTIPLIER: f64 = 3.0;

/// The three daily views derived from one source relation. They share a row
/// shape; `rolling_metrics` and `anomalies` add the `*_ma7` baselines.
#[derive(Debug, Clone)]
pub struct TimeSeriesProfile {
    pub daily_counts: DataFrame,
    pub rolling_metrics: DataFrame,
    pub anomalies: DataFrame,
}

/// Aggregates the relation into daily buckets and derives rolling baselines
/// and the anomaly subset.
///
/// The date column is parsed as a UTC datetime and truncated to the calendar
/// date; rows whose date fails to parse are excluded from the buckets rather
/// than failing the build. The baseline for a day is the mean over the 7
/// prior days, so today's spike cannot inflate its own baseline; days
/// without 7 prior days of history are dropped from `rolling_metrics`, not
/// zero-filled.
pub fn build_time_series(
    df: &DataFrame,
    date_col: &str,
    value_col: &str,
) -> Result<TimeSeriesProfile> {
    if !has_column(df, date_col) {
        return Err(PipelineError::missing_column(date_col, "primary"));
    }
    if !has_column(df, value_col) {
        return Err(PipelineError::missing_column(value_col, "primary"));
    }

    let parse_options = StrptimeOptions {
        strict: false,
        ..Default::default()
    };

    let daily_counts = df
        .clone()
        .lazy()
        .with_column(
            col(date_col)
                .cast(DataType::String)
                .str()
                .to_datetime(
                    Some(TimeUnit::Microseconds),
                    Some(TimeZone::UTC),
                    parse_options,
                    lit("raise"),
                )
                .dt()
                .date()
                .alias("event_date"),
        )
        .drop_nulls(Some(vec![col("event_date")]))
        .group_by([col("event_date")])
        .agg([
            len().cast(DataType::Int64).alias("tweet_count"),
            col(value_col)
                .cast(DataType::Float64)
                .sum()
                .alias("total_engagement"),
        ])
        .sort(["event_date"], SortMultipleOptions::default())
        .collect()?;

    let rolling_options = RollingOptionsFixedWindow {
        window_size: ROLLING_WINDOW_DAYS,
        min_periods: ROLLING_WINDOW_DAYS,
        ..Default::default()
    };

    // shift(1) keeps the current day out of its own baseline.
    let rolling_metrics = daily_counts
        .clone()
        .lazy()
        .with_columns([
            col("tweet_count")
                .shift(lit(1))
                .rolling_mean(rolling_options.clone())
                .alias("count_ma7"),
            col("total_engagement")
                .shift(lit(1))
                .rolling_mean(rolling_options)
                .alias("engagement_ma7"),
        ])
        .drop_nulls(Some(vec![col("count_ma7"), col("engagement_ma7")]))
        .collect()?;

    let anomalies = rolling_metrics
        .clone()
        .lazy()
        .filter(
            col("tweet_count")
                .gt(col("count_ma7") * lit(ANOMALY_MULTIPLIER))
                .or(col("total_engagement").gt(col("engagement_ma7") * lit(ANOMALY_MULTIPLIER))),
        )
        .collect()?;

    Ok(TimeSeriesProfile {
        daily_counts,
        rolling_metrics,
        anomalies,
    })
}
