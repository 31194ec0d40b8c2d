//! Error types for the monitoring system.

use std::path::PathBuf;

/// Errors that can occur while reading catalogs, loading configuration or
/// recording results.
#[derive(Debug, thiserror::Error)]
pub enum DriftError {
    /// The object does not exist in the given schema's catalog.
    #[error("Object '{object}' not found in schema '{schema}'")]
    ObjectNotFound {
        /// Schema label of the side that was read.
        schema: String,
        /// The monitored object name.
        object: String,
    },

    /// Database error while reading a catalog or writing results.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// IO error (reading the object list or access file).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A configuration file is present but unusable.
    #[error("Invalid configuration in '{path}': {message}")]
    InvalidConfig {
        /// Path to the offending file.
        path: PathBuf,
        /// What is wrong with it.
        message: String,
    },

    /// A connection string could not be interpreted.
    #[error("Invalid connection string: {0}")]
    InvalidConnection(String),

    /// A stored timestamp could not be parsed.
    #[error("Invalid timestamp '{0}'")]
    InvalidTimestamp(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Multiple errors occurred.
    #[error("Multiple errors occurred:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Multiple(Vec<DriftError>),
}

/// Result type for monitoring operations.
pub type Result<T> = std::result::Result<T, DriftError>;
