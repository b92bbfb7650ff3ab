//! Core error type definitions

use std::path::PathBuf;

/// Result type alias for ocflstore operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for ocflstore operations using thiserror
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A digest string or value that does not match its algorithm
    InvalidDigest { value: String, message: String },

    /// A digest algorithm name that is not supported
    UnsupportedAlgorithm { name: String },

    /// A versioned path that would escape its storage root
    InvalidPath { path: PathBuf, message: String },

    /// File system operations
    FileSystem {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration errors
    Configuration { message: String },
}
