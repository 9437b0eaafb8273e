//! Local key/value storage errors.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by [`crate::traits::KeyValueStore`] implementations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("store file {} is not valid JSON: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode value for key '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not determine a data directory")]
    NoDataDirectory,

    #[error("store lock poisoned")]
    Poisoned,
}

impl StorageError {
    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            StorageError::Read { .. } => "E_STORE_READ",
            StorageError::Write { .. } => "E_STORE_WRITE",
            StorageError::Corrupt { .. } => "E_STORE_CORRUPT",
            StorageError::Encode { .. } => "E_STORE_ENCODE",
            StorageError::NoDataDirectory => "E_STORE_NO_DIR",
            StorageError::Poisoned => "E_STORE_POISONED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_path() {
        let err = StorageError::Write {
            path: PathBuf::from("/tmp/store.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let text = err.to_string();
        assert!(text.contains("/tmp/store.json"));
        assert!(text.contains("denied"));
        assert_eq!(err.error_code(), "E_STORE_WRITE");
    }
}
