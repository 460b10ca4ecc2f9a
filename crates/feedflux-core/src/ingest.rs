// crates/feedflux-core/src/ingest.rs

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use once_cell::sync::Lazy;
use polars::prelude::*;
use tracing::debug;

use crate::error::{PipelineError, Result};

/// Natural key the registry is deduplicated on.
pub const REGISTRY_KEY: &str = "author_userName";

/// Columns declared as text at scan time. Dates and string-encoded booleans
/// are coerced later by the transform stages, not by the CSV reader.
static DEFAULT_EVENT_DTYPES: Lazy<Schema> = Lazy::new(|| {
    Schema::from_iter([
        (PlSmallStr::from_static("created_at"), DataType::String),
        (PlSmallStr::from_static("author_id"), DataType::String),
        (PlSmallStr::from_static("lang"), DataType::String),
        (PlSmallStr::from_static("isReply"), DataType::String),
        (
            PlSmallStr::from_static("author_isBlueVerified"),
            DataType::String,
        ),
    ])
});

/// Opens the primary event export as a lazy relation. Nothing is read until
/// the plan is materialized; malformed rows are skipped rather than aborting
/// the scan. Caller-supplied dtypes are merged on top of the default map.
pub fn scan_raw_events(path: &Path, dtypes: Option<Schema>) -> Result<LazyFrame> {
    if !path.exists() {
        return Err(PipelineError::missing_input(path));
    }

    let mut schema = DEFAULT_EVENT_DTYPES.clone();
    if let Some(overrides) = dtypes {
        for (name, dtype) in overrides.iter() {
            schema.with_column(name.clone(), dtype.clone());
        }
    }

    debug!(path = %path.display(), "building lazy CSV scan for raw events");
    let lf = LazyCsvReader::new(path.to_path_buf())
        .with_has_header(true)
        .with_ignore_errors(true)
        .with_dtype_overwrite(Some(Arc::new(schema)))
        .finish()?;
    Ok(lf)
}

/// Reads the author registry eagerly (it is small), trims whitespace from
/// column names, and deduplicates on the natural key keeping the first-seen
/// row per key in original order. Later joins rely on this determinism.
pub fn read_registry(path: &Path) -> Result<DataFrame> {
    if !path.exists() {
        return Err(PipelineError::missing_input(path));
    }

    let mut df = CsvReadOptions::default()
        .with_has_header(true)
        .with_ignore_errors(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;

    let renames: Vec<(String, String)> = df
        .get_column_names()
        .iter()
        .filter_map(|name| {
            let trimmed = name.trim();
            (trimmed != name.as_str()).then(|| (name.to_string(), trimmed.to_string()))
        })
        .collect();
    for (old, new) in renames {
        df.rename(&old, new.into())?;
    }

    if !df.get_column_names().iter().any(|n| n.as_str() == REGISTRY_KEY) {
        return Err(PipelineError::missing_column(REGISTRY_KEY, "registry"));
    }

    let keys = df.column(REGISTRY_KEY)?.cast(&DataType::String)?;
    let keys = keys.str()?;
    let mut seen: HashSet<Option<String>> = HashSet::new();
    let keep: Vec<bool> = keys
        .into_iter()
        .map(|key| seen.insert(key.map(str::to_string)))
        .collect();
    let mask = BooleanChunked::from_slice("keep".into(), &keep);

    let deduped = df.filter(&mask)?;
    debug!(
        rows_in = df.height(),
        rows_out = deduped.height(),
        "registry deduplicated on natural key"
    );
    Ok(deduped)
}
