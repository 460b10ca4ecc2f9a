use std::path::Path;

use polars::prelude::*;

use feedflux_core::error::PipelineError;
use feedflux_core::outputs::{iter_batches, list_parquet_files, materialize_parquet};

fn sample_frame(rows: usize) -> DataFrame {
    let ids: Vec<i64> = (0..rows as i64).collect();
    let langs: Vec<&str> = (0..rows).map(|i| if i % 3 == 0 { "en" } else { "fr" }).collect();
    DataFrame::new(vec![
        Series::new("id".into(), ids).into(),
        Series::new("lang".into(), langs).into(),
    ])
    .unwrap()
}

#[test]
fn materialize_then_chunk_read_round_trips() -> PolarsResult<()> {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache").join("events.parquet");

    let df = sample_frame(25);
    materialize_parquet(df.clone().lazy(), &path, None).unwrap();
    assert!(path.exists());

    let batches: Vec<DataFrame> = iter_batches(&path, 10).unwrap().collect();
    assert_eq!(batches.len(), 3); // ceil(25 / 10)
    assert_eq!(batches[0].height(), 10);
    assert_eq!(batches[1].height(), 10);
    assert_eq!(batches[2].height(), 5);

    let mut recombined = batches[0].clone();
    for batch in &batches[1..] {
        recombined.vstack_mut(batch)?;
    }
    assert_eq!(recombined.height(), df.height());
    assert_eq!(
        recombined.column("id")?.i64()?.get(24),
        df.column("id")?.i64()?.get(24)
    );
    assert_eq!(
        recombined.column("lang")?.str()?.get(0),
        df.column("lang")?.str()?.get(0)
    );
    Ok(())
}

#[test]
fn chunk_reader_restarts_on_fresh_call() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("events.parquet");
    materialize_parquet(sample_frame(7).lazy(), &path, None).unwrap();

    let first: usize = iter_batches(&path, 3).unwrap().map(|b| b.height()).sum();
    let second: usize = iter_batches(&path, 3).unwrap().map(|b| b.height()).sum();
    assert_eq!(first, 7);
    assert_eq!(second, 7);
}

#[test]
fn chunk_reader_rejects_zero_batch_size() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("events.parquet");
    materialize_parquet(sample_frame(3).lazy(), &path, None).unwrap();

    let err = iter_batches(&path, 0).map(|_| ()).unwrap_err();
    assert!(matches!(err, PipelineError::InvalidBatchSize));
}

#[test]
fn chunk_reader_fails_fast_on_missing_artifact() {
    let err = iter_batches(Path::new("/nonexistent/events.parquet"), 10)
        .map(|_| ())
        .unwrap_err();
    assert!(matches!(err, PipelineError::MissingInput { .. }));
}

#[test]
fn partitioned_write_uses_hive_layout() -> PolarsResult<()> {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("events");

    materialize_parquet(sample_frame(9).lazy(), &root, Some(&["lang"])).unwrap();

    assert!(root.join("lang=en").is_dir());
    assert!(root.join("lang=fr").is_dir());

    let files = list_parquet_files(&root).unwrap();
    assert_eq!(files.len(), 2);

    // Partitions together hold every source row.
    let mut total = 0;
    for file in &files {
        total += iter_batches(file, 100).unwrap().map(|b| b.height()).sum::<usize>();
    }
    assert_eq!(total, 9);
    Ok(())
}

#[test]
fn listing_a_missing_cache_dir_is_empty_not_fatal() {
    let files = list_parquet_files(Path::new("/nonexistent/parquet")).unwrap();
    assert!(files.is_empty());
}
