// crates/feedflux-core/src/outputs.rs

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use polars::io::parquet::write::{ParquetCompression, ParquetWriter, StatisticsOptions};
use polars::prelude::*;
use tracing::info;

use crate::error::{PipelineError, Result};

/// Batch size used by the chunked reader when the caller does not pick one.
pub const DEFAULT_BATCH_SIZE: usize = 100_000;

/// Executes a lazy relation and sinks it to zstd-compressed parquet. This is
/// the only point in the pipeline where a plan is forced to run.
///
/// With partition columns the output path becomes a directory holding a
/// hive-style `col=value` layout; otherwise a single file is written. Parent
/// directories are created as needed.
pub fn materialize_parquet(
    lf: LazyFrame,
    output_path: &Path,
    partitions: Option<&[&str]>,
) -> Result<()> {
    let df = lf.collect()?;

    match partitions {
        Some(cols) if !cols.is_empty() => {
            fs::create_dir_all(output_path)?;
            write_partitioned(&df, output_path, cols)?;
        }
        _ => {
            if let Some(parent) = output_path.parent() {
                fs::create_dir_all(parent)?;
            }
            write_single(&df, output_path)?;
        }
    }

    info!(
        path = %output_path.display(),
        rows = df.height(),
        "materialized parquet artifact"
    );
    Ok(())
}

fn write_single(df: &DataFrame, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    let mut clone = df.clone();
    ParquetWriter::new(file)
        .with_compression(ParquetCompression::Zstd(None))
        .with_statistics(StatisticsOptions::default())
        .finish(&mut clone)?;
    Ok(())
}

fn write_partitioned(df: &DataFrame, root: &Path, cols: &[&str]) -> Result<()> {
    let keys: Vec<PlSmallStr> = cols.iter().map(|name| PlSmallStr::from(*name)).collect();
    let parts = df.partition_by_stable(keys, true)?;

    for (index, part) in parts.iter().enumerate() {
        let mut dir = root.to_path_buf();
        for &name in cols {
            let value = part.column(name)?.get(0)?;
            dir = dir.join(format!("{}={}", name, partition_value(&value)));
        }
        fs::create_dir_all(&dir)?;
        write_single(part, &dir.join(format!("part-{index:05}.parquet")))?;
    }
    Ok(())
}

fn partition_value(value: &AnyValue) -> String {
    match value {
        AnyValue::Null => "__null__".to_string(),
        other => other.to_string().trim_matches('"').to_string(),
    }
}

/// Finite sequence of row batches over one materialized artifact. A fresh
/// `iter_batches` call restarts from the beginning.
pub struct ParquetBatches {
    df: DataFrame,
    offset: usize,
    batch_size: usize,
}

impl Iterator for ParquetBatches {
    type Item = DataFrame;

    fn next(&mut self) -> Option<DataFrame> {
        if self.offset >= self.df.height() {
            return None;
        }
        let batch = self.df.slice(self.offset as i64, self.batch_size);
        self.offset += self.batch_size;
        Some(batch)
    }
}

/// Re-reads a parquet artifact in batches of at most `batch_size` rows (the
/// last batch may be smaller).
///
/// The artifact is read fully and then sliced. That keeps the batch-size
/// contract but not a bounded peak memory one.
// TODO: switch to a streaming parquet reader so peak memory stays bounded.
pub fn iter_batches(path: &Path, batch_size: usize) -> Result<ParquetBatches> {
    if batch_size == 0 {
        return Err(PipelineError::InvalidBatchSize);
    }
    if !path.exists() {
        return Err(PipelineError::missing_input(path));
    }

    let df = ParquetReader::new(File::open(path)?).finish()?;
    Ok(ParquetBatches {
        df,
        offset: 0,
        batch_size,
    })
}

/// Sorted recursive listing of the cached parquet artifacts under a
/// directory. A missing directory is an empty cache, not an error.
pub fn list_parquet_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let pattern = dir.join("**").join("*.parquet");
    let pattern = pattern.to_string_lossy();
    let mut files: Vec<PathBuf> = glob::glob(&pattern)?
        .filter_map(|entry| entry.ok())
        .collect();
    files.sort();
    Ok(files)
}
