//! Error types for preference storage.

use std::io;

/// Errors raised by [`PreferenceStore`](crate::PreferenceStore) implementations.
///
/// The reconciler never hands these to its callers: a failing store is logged
/// and replaced by an in-memory value for the rest of the session.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("storage I/O failed: {0}")]
    Io(#[source] io::Error),

    /// The backing file exists but does not hold a JSON object of strings.
    #[error("storage file is corrupt: {0}")]
    Encoding(#[source] serde_json::Error),

    /// Storage is disabled or not reachable in this context.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl StorageError {
    /// Create an unavailable-storage error.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable(reason.into())
    }
}

impl From<io::Error> for StorageError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::Encoding(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_display() {
        let err = StorageError::unavailable("quota exceeded");
        assert_eq!(err.to_string(), "storage unavailable: quota exceeded");
    }

    #[test]
    fn io_error_keeps_source() {
        use std::error::Error;

        let err = StorageError::from(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
        assert!(err.source().is_some());
        assert!(err.to_string().contains("denied"));
    }
}
