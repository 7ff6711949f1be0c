use std::io;

use thiserror::Error;

/// Invalid configuration. Raised only while building an extractor.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field} pattern '{pattern}': {source}")]
    InvalidPattern {
        field: &'static str,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid option: {0}")]
    InvalidOption(String),

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to parse document tree: {0}")]
    Tree(#[source] serde_json::Error),

    #[error("failed to serialize schedule: {0}")]
    Json(#[source] serde_json::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid output: {0}")]
    InvalidOutput(String),
}
