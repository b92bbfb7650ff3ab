//! Core error types for the storage system

use std::path::PathBuf;
use std::time::Duration;

/// Result type for storage operations
pub type Result<T> = std::result::Result<T, CacheError>;

/// Re-export CacheError as Error for convenience
pub use CacheError as Error;

/// Error type for storage and cache operations
#[derive(Debug)]
pub enum CacheError {
    /// I/O errors during storage operations
    Io {
        path: PathBuf,
        operation: &'static str,
        source: std::io::Error,
        recovery_hint: RecoveryHint,
    },

    /// No such cached file
    NotFound {
        key: String,
        recovery_hint: RecoveryHint,
    },

    /// A journal line that cannot be decoded
    Deserialization {
        path: PathBuf,
        line_number: usize,
        line: String,
        reason: String,
        recovery_hint: RecoveryHint,
    },

    /// Operation invoked in a state that does not allow it
    InvalidState {
        component: &'static str,
        message: String,
        recovery_hint: RecoveryHint,
    },

    /// Transactional storage used outside a transaction
    NoActiveTransaction {
        operation: &'static str,
        recovery_hint: RecoveryHint,
    },

    /// Configuration error
    Configuration {
        message: String,
        recovery_hint: RecoveryHint,
    },

    /// Serialization/deserialization errors
    Serialization {
        key: String,
        operation: SerializationOp,
        source: Box<dyn std::error::Error + Send + Sync>,
        recovery_hint: RecoveryHint,
    },

    /// Errors raised by the core types (digests, paths, hashing)
    Core {
        source: ocflstore_core::Error,
        recovery_hint: RecoveryHint,
    },
}

impl CacheError {
    /// I/O failure on a physical path
    pub fn io(path: impl Into<PathBuf>, operation: &'static str, source: std::io::Error) -> Self {
        let path = path.into();
        let recovery_hint = match source.kind() {
            std::io::ErrorKind::PermissionDenied => RecoveryHint::CheckPermissions {
                path: path.clone(),
            },
            std::io::ErrorKind::Interrupted | std::io::ErrorKind::WouldBlock => {
                RecoveryHint::Retry {
                    after: Duration::from_millis(10),
                }
            }
            _ => RecoveryHint::CheckDiskSpace,
        };
        Self::Io {
            path,
            operation,
            source,
            recovery_hint,
        }
    }

    /// I/O failure where "not found" means the key is absent
    pub fn io_or_not_found(
        path: impl Into<PathBuf>,
        operation: &'static str,
        source: std::io::Error,
        key: impl Into<String>,
    ) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::not_found(key)
        } else {
            Self::io(path, operation, source)
        }
    }

    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound {
            key: key.into(),
            recovery_hint: RecoveryHint::Ignore,
        }
    }

    pub fn invalid_state(component: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidState {
            component,
            message: message.into(),
            recovery_hint: RecoveryHint::Manual {
                instructions: format!("Open the {component} before using it"),
            },
        }
    }

    pub fn no_active_transaction(operation: &'static str) -> Self {
        Self::NoActiveTransaction {
            operation,
            recovery_hint: RecoveryHint::BeginTransaction,
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            recovery_hint: RecoveryHint::UpdateConfiguration,
        }
    }
}

/// Recovery hints for error handling
#[derive(Debug, Clone, PartialEq)]
pub enum RecoveryHint {
    /// Retry the operation
    Retry { after: Duration },

    /// Clear the cache and retry
    ClearAndRetry,

    /// Check file permissions
    CheckPermissions { path: PathBuf },

    /// Check disk space and clean up if needed
    CheckDiskSpace,

    /// Rebuild the in-memory index
    RebuildIndex,

    /// Begin a transaction before using transactional storage
    BeginTransaction,

    /// Update configuration
    UpdateConfiguration,

    /// Use a default value
    UseDefault { value: String },

    /// No automated recovery possible
    Manual { instructions: String },

    /// Operation can be safely ignored
    Ignore,

    /// No recovery possible
    NoRecovery,
}

/// Serialization operation types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SerializationOp {
    Encode,
    Decode,
}
