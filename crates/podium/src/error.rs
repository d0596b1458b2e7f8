//! Error types for the report pipeline.

use podium_data::DataError;
use std::path::PathBuf;
use thiserror::Error;

/// Invalid or unreadable configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Failed to read config file {path}: {source}")]
    Read {
        /// File that was read
        path: PathBuf,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// Config file is not valid TOML for the expected fields
    #[error("Invalid config file: {0}")]
    Toml(#[from] toml::de::Error),

    /// A field is out of range
    #[error("Invalid {field}: {reason}")]
    Invalid {
        /// Offending field
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },
}

/// Errors that abort a pipeline run.
///
/// Per-season, per-driver and per-subsession failures never surface here;
/// they are recovered where they happen.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Configuration rejected before any remote call
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The active season listing failed, so there is nothing to discover from
    #[error("Failed to list active seasons: {0}")]
    ActiveSeasons(#[source] DataError),
}
