pub mod config;
pub mod error;
pub mod ingest;
pub mod network;
pub mod outputs;
pub mod profiling;
pub mod timeseries;
pub mod transform;

pub use error::{PipelineError, Result};
