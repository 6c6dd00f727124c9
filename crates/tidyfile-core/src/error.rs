//! Error taxonomy for the backend boundary.

use std::path::PathBuf;

use thiserror::Error;

/// Errors a backend call can fail with.
///
/// Every failure carries a human-readable message; callers convert them
/// into transient notices and roll back the triggering transition.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Path does not exist.
    #[error("Path not found: {path}")]
    PathNotFound { path: PathBuf },

    /// Permission denied for a path.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// The backend process or transport is unavailable.
    #[error("Backend unavailable: {message}")]
    Unavailable { message: String },

    /// The request was rejected before reaching the backend.
    #[error("{message}")]
    Validation { message: String },

    /// Residual I/O failure with path context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BackendError {
    /// Create an I/O error with path context, mapping the well-known
    /// kinds onto their structured variants.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::PathNotFound { path },
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            _ => Self::Io { path, source },
        }
    }

    /// Create a path-not-found error.
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::PathNotFound { path: path.into() }
    }

    /// Create a transport/availability error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_kind_mapping() {
        let err = BackendError::io(
            "/test/path",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        assert!(matches!(err, BackendError::PathNotFound { .. }));

        let err = BackendError::io(
            "/test/path",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(matches!(err, BackendError::PermissionDenied { .. }));

        let err = BackendError::io(
            "/test/path",
            std::io::Error::new(std::io::ErrorKind::Other, "disk on fire"),
        );
        assert!(matches!(err, BackendError::Io { .. }));
    }

    #[test]
    fn test_messages_are_human_readable() {
        let err = BackendError::not_found("/missing/dir");
        assert!(err.to_string().contains("/missing/dir"));

        let err = BackendError::validation("no files selected");
        assert_eq!(err.to_string(), "no files selected");
    }
}
