// crates/feedflux-core/src/config.rs

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{PipelineError, Result};

/// Filesystem layout for one pipeline invocation. Every component receives
/// its paths from here; nothing computes a path relative to its own module.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Directory holding the raw CSV exports.
    pub data_dir: PathBuf,
    /// Directory the materialized parquet artifacts are written into.
    pub parquet_dir: PathBuf,
    /// Primary event export (one row per post).
    pub raw_events: PathBuf,
    /// Secondary registry export (well-known author metadata).
    pub raw_registry: PathBuf,
}

impl PipelineConfig {
    /// Conventional layout under a single project root:
    /// `<root>/data/{events,authors}.csv` and `<root>/parquet`.
    pub fn from_root(root: &Path) -> Self {
        let data_dir = root.join("data");
        let raw_events = data_dir.join("events.csv");
        let raw_registry = data_dir.join("authors.csv");
        PipelineConfig {
            data_dir,
            parquet_dir: root.join("parquet"),
            raw_events,
            raw_registry,
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(PipelineError::missing_input(path));
        }
        let contents = fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_root_builds_conventional_layout() {
        let config = PipelineConfig::from_root(Path::new("/srv/feedflux"));
        assert_eq!(config.data_dir, Path::new("/srv/feedflux/data"));
        assert_eq!(config.raw_events, Path::new("/srv/feedflux/data/events.csv"));
        assert_eq!(
            config.raw_registry,
            Path::new("/srv/feedflux/data/authors.csv")
        );
        assert_eq!(config.parquet_dir, Path::new("/srv/feedflux/parquet"));
    }

    #[test]
    fn from_file_rejects_missing_path() {
        let err = PipelineConfig::from_file(Path::new("/nonexistent/feedflux.toml")).unwrap_err();
        assert!(matches!(err, PipelineError::MissingInput { .. }));
    }
}
