//! History error types.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for history operations.
pub type HistoryResult<T> = Result<T, HistoryError>;

/// Errors that can occur while reading or writing version history.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// The operation needs a tracked file but the buffer has none.
    #[error("No file selected for version control: {0}")]
    Configuration(String),

    /// A referenced snapshot or history entry does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Filesystem read, write or create failure.
    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// `history.json` exists but is not a list of entries.
    #[error("Malformed history at {}: {source}", path.display())]
    MalformedHistory {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Coarse classification of a [`HistoryError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryErrorKind {
    Configuration,
    NotFound,
    Io,
    MalformedHistory,
}

impl HistoryError {
    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create a not found error.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Create an IO error tied to a path.
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create a malformed history error.
    pub fn malformed(path: impl AsRef<Path>, source: serde_json::Error) -> Self {
        Self::MalformedHistory {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> HistoryErrorKind {
        match self {
            Self::Configuration(_) => HistoryErrorKind::Configuration,
            Self::NotFound(_) => HistoryErrorKind::NotFound,
            Self::Io { .. } => HistoryErrorKind::Io,
            Self::MalformedHistory { .. } => HistoryErrorKind::MalformedHistory,
        }
    }
}
