//! Error conversion utilities

use super::types::{CacheError, RecoveryHint, SerializationOp};
use std::path::PathBuf;

impl From<std::io::Error> for CacheError {
    fn from(error: std::io::Error) -> Self {
        CacheError::io(PathBuf::from("."), "unknown", error)
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization {
            key: String::new(),
            operation: SerializationOp::Decode,
            source: Box::new(error),
            recovery_hint: RecoveryHint::Manual {
                instructions: "Check JSON format and data types".to_string(),
            },
        }
    }
}

impl From<ocflstore_core::Error> for CacheError {
    fn from(error: ocflstore_core::Error) -> Self {
        let recovery_hint = match &error {
            ocflstore_core::Error::FileSystem { path, .. } => RecoveryHint::CheckPermissions {
                path: path.clone(),
            },
            ocflstore_core::Error::Configuration { .. }
            | ocflstore_core::Error::UnsupportedAlgorithm { .. } => {
                RecoveryHint::UpdateConfiguration
            }
            ocflstore_core::Error::InvalidDigest { .. }
            | ocflstore_core::Error::InvalidPath { .. } => RecoveryHint::NoRecovery,
        };
        Self::Core {
            source: error,
            recovery_hint,
        }
    }
}
