//! Error types for territory outlining.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading territories or synchronizing markers.
#[derive(Error, Debug)]
pub enum Error {
    /// The marker sink refused to create a marker. Retry policy belongs to
    /// the caller.
    #[error("marker sink rejected area marker {key}")]
    MarkerRejected { key: String },

    /// An owner has more chunks than the configured cap allows
    #[error("owner {owner} has {count} chunks, above the limit of {limit}")]
    TooManyCells {
        owner: String,
        count: usize,
        limit: usize,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for territory outlining.
pub type Result<T> = std::result::Result<T, Error>;
