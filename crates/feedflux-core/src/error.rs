// crates/feedflux-core/src/error.rs

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("required input file not found: {path}")]
    MissingInput { path: PathBuf },

    #[error("column '{column}' not found in {frame} relation")]
    MissingColumn { column: String, frame: String },

    #[error("batch size must be greater than zero")]
    InvalidBatchSize,

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars operation failed: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Configuration file error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Artifact glob error: {0}")]
    Glob(#[from] glob::PatternError),
}

impl PipelineError {
    pub fn missing_input(path: impl Into<PathBuf>) -> Self {
        PipelineError::MissingInput { path: path.into() }
    }

    pub fn missing_column(column: impl Into<String>, frame: impl Into<String>) -> Self {
        PipelineError::MissingColumn {
            column: column.into(),
            frame: frame.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
