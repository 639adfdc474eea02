//! Repository error handling
//!
//! Typed errors for the persistence layer. Adapter errors bubble unmodified
//! through the repository facade; only the migration coordinator isolates
//! failures (per item, logged, never fatal to the batch).

use std::io;
use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur in the project repository
#[derive(Error, Debug)]
pub enum RepoError {
    /// Malformed input on save (e.g. empty title)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Requested project does not exist
    ///
    /// Raised by `get`, never by `delete` (which is idempotent).
    #[error("Project not found: {id}")]
    NotFound { id: Uuid },

    /// Remote backend unreachable or rejecting requests
    ///
    /// Surfaced as-is; calls are never silently redirected to the local
    /// store, so data-location confusion stays visible.
    #[error("Remote backend unavailable: {details}")]
    BackendUnavailable { details: String },

    /// Failed to read the local collection file
    #[error("Failed to read '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to write the local collection file
    #[error("Failed to write '{path}': {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Local collection file exists but cannot be parsed
    #[error("Invalid store format in '{path}': {details}")]
    InvalidFormat { path: PathBuf, details: String },

    /// Record serialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RepoError {
    /// Construct a `BackendUnavailable` from any transport-level failure
    pub fn backend(details: impl Into<String>) -> Self {
        RepoError::BackendUnavailable {
            details: details.into(),
        }
    }

    /// Whether this error means the record simply does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, RepoError::NotFound { .. })
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_predicate() {
        let err = RepoError::NotFound { id: Uuid::new_v4() };
        assert!(err.is_not_found());

        let err = RepoError::Validation("title must not be empty".into());
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_error_display() {
        let id = Uuid::new_v4();
        let err = RepoError::NotFound { id };
        assert!(err.to_string().contains(&id.to_string()));

        let err = RepoError::backend("connection refused");
        let msg = err.to_string();
        assert!(msg.contains("unavailable"));
        assert!(msg.contains("connection refused"));
    }

    #[test]
    fn test_read_error_includes_path() {
        let err = RepoError::ReadError {
            path: PathBuf::from("/data/projects.json"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("/data/projects.json"));
    }

    #[test]
    fn test_serialization_error_conversion() {
        let parse_err = serde_json::from_str::<Vec<u32>>("not json").unwrap_err();
        let err: RepoError = parse_err.into();
        assert!(matches!(err, RepoError::Serialization(_)));
    }
}
