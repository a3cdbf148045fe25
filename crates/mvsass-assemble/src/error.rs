//! Errors raised while assembling the library.

use std::path::PathBuf;

/// Errors that can occur during assembly.
///
/// Every variant is fatal to the current run. Nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum AssembleError {
    #[error("Source root not found: {}", path.display())]
    MissingSourceRoot { path: PathBuf },

    #[error("Failed to read {}: {source}", path.display())]
    ReadFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {}: {source}", path.display())]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to copy auxiliary file {}: {source}", path.display())]
    AuxiliaryCopyFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Manifest entry '{entry}' matched no fragment")]
    UnmatchedManifestEntry { entry: String },

    #[error("Manifest entry '{entry}' matched {} fragments: {}", matches.len(), matches.join(", "))]
    AmbiguousManifestEntry { entry: String, matches: Vec<String> },
}

impl AssembleError {
    pub(crate) fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReadFailure {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::WriteFailure {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn pattern(pattern: &str, err: glob::PatternError) -> Self {
        Self::InvalidPattern {
            pattern: pattern.to_string(),
            message: err.to_string(),
        }
    }
}
