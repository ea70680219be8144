//! CLI error types and conversions

use crate::analysis::AnalysisError;
use crate::config::ConfigError;
use crate::series::SeriesError;
use crate::RequestError;

/// CLI errors
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration error
    #[error("configuration error: {0}")]
    ConfigError(#[from] ConfigError),

    /// Request error
    #[error("request error: {0}")]
    RequestError(#[from] RequestError),

    /// Series conversion error
    #[error("series error: {0}")]
    SeriesError(#[from] SeriesError),

    /// Analysis error
    #[error("analysis error: {0}")]
    AnalysisError(#[from] AnalysisError),

    /// Output error
    #[error("output error: {0}")]
    OutputError(#[from] csv::Error),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Invalid argument
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Retrieval produced nothing to work with
    #[error("retrieval failed: {0}")]
    RetrievalFailed(String),
}
