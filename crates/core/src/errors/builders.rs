//! Builder methods for creating errors with context

use super::types::Error;
use std::path::PathBuf;

impl Error {
    /// Create an invalid digest error
    #[must_use]
    pub fn invalid_digest(value: impl Into<String>, message: impl Into<String>) -> Self {
        Error::InvalidDigest {
            value: value.into(),
            message: message.into(),
        }
    }

    /// Create an unsupported algorithm error
    #[must_use]
    pub fn unsupported_algorithm(name: impl Into<String>) -> Self {
        Error::UnsupportedAlgorithm { name: name.into() }
    }

    /// Create an invalid path error
    #[must_use]
    pub fn invalid_path(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Error::InvalidPath {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a file system error
    #[must_use]
    pub fn file_system(
        path: impl Into<PathBuf>,
        operation: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        Error::FileSystem {
            path: path.into(),
            operation: operation.into(),
            source,
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
        }
    }
}
