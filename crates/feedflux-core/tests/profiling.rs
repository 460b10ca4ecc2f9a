use polars::prelude::*;

use feedflux_core::error::PipelineError;
use feedflux_core::profiling::{duplicate_check, engagement_distribution, missingness_summary};

#[test]
fn missingness_counts_and_sorts_by_ratio() -> PolarsResult<()> {
    let df = DataFrame::new(vec![
        Series::new("id".into(), vec![Some(1i64), Some(2), Some(3), Some(4)]).into(),
        Series::new(
            "lang".into(),
            vec![Some("en"), None, None, Some("fr")],
        )
        .into(),
        Series::new(
            "place".into(),
            vec![None::<&str>, None, None, Some("x")],
        )
        .into(),
    ])?;

    let report = missingness_summary(&df, &["id"]).unwrap();
    assert_eq!(report.height(), 3);

    let columns = report.column("column")?.str()?;
    let ratios = report.column("null_ratio")?.f64()?;
    let is_key = report.column("is_key")?.bool()?;

    assert_eq!(columns.get(0), Some("place"));
    assert_eq!(ratios.get(0), Some(0.75));
    assert_eq!(columns.get(1), Some("lang"));
    assert_eq!(ratios.get(1), Some(0.5));
    assert_eq!(columns.get(2), Some("id"));
    assert_eq!(ratios.get(2), Some(0.0));
    assert_eq!(is_key.get(2), Some(true));
    assert_eq!(is_key.get(0), Some(false));
    Ok(())
}

#[test]
fn missingness_of_empty_frame_is_all_zero() -> PolarsResult<()> {
    let df = DataFrame::new(vec![
        Series::new("id".into(), Vec::<Option<i64>>::new()).into(),
        Series::new("lang".into(), Vec::<Option<&str>>::new()).into(),
    ])?;

    let report = missingness_summary(&df, &[]).unwrap();
    assert_eq!(report.height(), 2);
    let ratios = report.column("null_ratio")?.f64()?;
    for idx in 0..report.height() {
        assert_eq!(ratios.get(idx), Some(0.0));
    }
    Ok(())
}

#[test]
fn duplicate_check_returns_only_repeated_groups() -> PolarsResult<()> {
    let df = DataFrame::new(vec![Series::new(
        "id".into(),
        vec!["x", "y", "x", "z", "x", "y"],
    )
    .into()])?;

    let dupes = duplicate_check(&df, &["id"]).unwrap();
    assert_eq!(dupes.height(), 2);

    let ids = dupes.column("id")?.str()?;
    let counts = dupes.column("count")?.i64()?;
    assert_eq!(ids.get(0), Some("x"));
    assert_eq!(counts.get(0), Some(3));
    assert_eq!(ids.get(1), Some("y"));
    assert_eq!(counts.get(1), Some(2));
    Ok(())
}

#[test]
fn duplicate_check_rejects_missing_subset_column() {
    let df = DataFrame::new(vec![Series::new("id".into(), vec!["x"]).into()]).unwrap();
    let err = duplicate_check(&df, &["id", "author_id"]).unwrap_err();
    match err {
        PipelineError::MissingColumn { column, .. } => assert_eq!(column, "author_id"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn engagement_stats_match_known_values() -> PolarsResult<()> {
    let df = DataFrame::new(vec![
        Series::new("likeCount".into(), vec![0.0f64, 1.0, 2.0, 3.0, 4.0]).into(),
        Series::new("lang".into(), vec!["en"; 5]).into(),
    ])?;

    let report = engagement_distribution(&df, &["likeCount", "viewCount"]).unwrap();
    // Absent columns are skipped without error.
    assert_eq!(report.height(), 1);

    assert_eq!(report.column("metric")?.str()?.get(0), Some("likeCount"));
    assert_eq!(report.column("mean")?.f64()?.get(0), Some(2.0));
    assert_eq!(report.column("median")?.f64()?.get(0), Some(2.0));
    let std = report.column("std")?.f64()?.get(0).unwrap();
    assert!((std - (2.5f64).sqrt()).abs() < 1e-9);
    let p95 = report.column("p95")?.f64()?.get(0).unwrap();
    assert!((p95 - 3.8).abs() < 1e-9);
    assert_eq!(report.column("max")?.f64()?.get(0), Some(4.0));
    assert_eq!(report.column("non_zero_ratio")?.f64()?.get(0), Some(0.8));
    Ok(())
}

#[test]
fn engagement_stats_guard_empty_frames() -> PolarsResult<()> {
    let df = DataFrame::new(vec![Series::new(
        "likeCount".into(),
        Vec::<Option<f64>>::new(),
    )
    .into()])?;

    let report = engagement_distribution(&df, &["likeCount"]).unwrap();
    assert_eq!(report.height(), 1);
    assert_eq!(report.column("mean")?.f64()?.get(0), None);
    assert_eq!(report.column("non_zero_ratio")?.f64()?.get(0), Some(0.0));
    Ok(())
}
