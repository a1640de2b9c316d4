// src/error.rs

//! Error types for the feature package engine
//!
//! Feed-level and manifest-level failures abort their phase. Everything else
//! is reported against a single node or artifact and the run continues.

use thiserror::Error;

/// Errors produced by the resolution, repackaging and install pipeline
#[derive(Error, Debug)]
pub enum Error {
    /// The release feed could not be retrieved
    #[error("Release feed unavailable: {0}")]
    FeedUnavailable(String),

    /// The release feed was retrieved but is not valid JSON of the expected shape
    #[error("Release feed malformed: {0}")]
    FeedMalformed(String),

    /// A version string could not be parsed
    #[error("Invalid version '{version}': {reason}")]
    VersionParse { version: String, reason: String },

    /// A download failed (network error or non-success status)
    #[error("Download failed: {0}")]
    DownloadFailed(String),

    /// Corrupt archive, or an expected entry/subdirectory is missing
    #[error("Archive error: {0}")]
    Archive(String),

    /// The target project has no manifest document
    #[error("Manifest not found at {0}")]
    ManifestMissing(String),

    /// A user-supplied selection index is out of range
    #[error("Invalid selection index {index} (catalog has {available} entries)")]
    InvalidSelectionIndex { index: usize, available: usize },

    /// The target path is not a usable project
    #[error("Invalid project at {path}: {reason}")]
    InvalidProject { path: String, reason: String },

    /// Configuration file could not be read or parsed
    #[error("Configuration error: {0}")]
    Config(String),

    /// An engine phase was invoked before the phase it depends on
    #[error("{0}")]
    NotReady(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error outside the release feed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether this error should abort the whole phase rather than one branch
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::FeedUnavailable(_) | Error::FeedMalformed(_) | Error::ManifestMissing(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(Error::FeedUnavailable("offline".into()).is_fatal());
        assert!(Error::ManifestMissing("Packages/manifest.json".into()).is_fatal());
        assert!(!Error::DownloadFailed("404".into()).is_fatal());
        assert!(!Error::Archive("missing package.json".into()).is_fatal());
    }

    #[test]
    fn test_display_includes_context() {
        let err = Error::VersionParse {
            version: "3.x.0".into(),
            reason: "non-numeric component 'x'".into(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid version '3.x.0': non-numeric component 'x'"
        );
    }
}
