//! Error types for packaging operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while validating, selecting, or packaging an add-on.
#[derive(Debug, Error)]
pub enum BundleError {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// ZIP archive error.
    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Manifest validation error.
    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),

    /// Mandatory package files absent from the selected file set.
    #[error("Missing required package files: {}", .0.join(", "))]
    MissingRequiredFiles(Vec<String>),

    /// Entries absent from the archive after it was written.
    #[error("Archive verification failed, missing entries: {}", .0.join(", "))]
    VerificationFailed(Vec<String>),

    /// The archive holds a different number of entries than were selected.
    #[error("Archive verification failed: expected {expected} entries, found {actual}")]
    EntryCountMismatch { expected: usize, actual: usize },

    /// The version-control listing could not be obtained.
    #[error("Failed to list tracked files: {0}")]
    SourceListing(String),

    /// A selected file could not be read from the source tree.
    #[error("Failed to read {}: {source}", path.display())]
    ReadSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
