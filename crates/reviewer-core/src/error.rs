//! Error types for git-reviewer.

use thiserror::Error;

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// git-reviewer error types.
#[derive(Debug, Error)]
pub enum Error {
    /// A path does not exist at a revision
    #[error("Not found: {0}")]
    NotFound(String),

    /// Blame could not attribute a line deterministically
    #[error("Ambiguous blame for {path} at {revision}")]
    Ambiguous { revision: String, path: String },

    /// Diff search gave up after the configured bound
    #[error("Maximum edit distance of {limit} exceeded")]
    MaxEditDistanceExceeded { limit: usize },

    /// A source or target revision cannot be resolved
    #[error("Invalid revision: {0}")]
    InvalidRevision(String),

    /// Blame output does not cover the file line for line
    #[error("Blame for {path} covers {blamed} lines but the file has {lines}")]
    IncompleteBlame {
        path: String,
        blamed: usize,
        lines: usize,
    },

    /// The run was cancelled between files
    #[error("Analysis cancelled")]
    Cancelled,

    /// Version control backend failure
    #[error("Gateway error: {0}")]
    Gateway(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Whether the run may continue after this error hit a single file.
    pub fn is_file_local(&self) -> bool {
        !matches!(self, Error::InvalidRevision(_) | Error::Cancelled)
    }
}
