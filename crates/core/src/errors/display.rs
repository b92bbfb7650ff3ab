//! Display implementations for error types

use super::types::Error;
use std::fmt;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidDigest { value, message } => {
                write!(f, "invalid digest '{value}': {message}")
            }
            Error::UnsupportedAlgorithm { name } => {
                write!(f, "unsupported digest algorithm '{name}'")
            }
            Error::InvalidPath { path, message } => {
                write!(f, "invalid versioned path '{}': {}", path.display(), message)
            }
            Error::FileSystem {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "file system error during {} on '{}': {}",
                    operation,
                    path.display(),
                    source
                )
            }
            Error::Configuration { message } => {
                write!(f, "configuration error: {message}")
            }
        }
    }
}
