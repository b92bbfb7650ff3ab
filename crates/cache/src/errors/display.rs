//! Display implementations for storage errors

use super::types::CacheError;
use std::fmt;

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io {
                path,
                operation,
                source,
                ..
            } => write!(
                f,
                "I/O error during {} on '{}': {}",
                operation,
                path.display(),
                source
            ),
            Self::NotFound { key, .. } => write!(f, "No such cached file: {key}"),
            Self::Deserialization {
                path,
                line_number,
                reason,
                ..
            } => write!(
                f,
                "Cannot decode line {} of journal '{}': {}",
                line_number,
                path.display(),
                reason
            ),
            Self::InvalidState {
                component, message, ..
            } => write!(f, "Invalid {component} state: {message}"),
            Self::NoActiveTransaction { operation, .. } => {
                write!(f, "No active transaction for {operation}")
            }
            Self::Configuration { message, .. } => write!(f, "Configuration error: {message}"),
            Self::Serialization {
                key,
                operation,
                source,
                ..
            } => write!(f, "Failed to {operation:?} '{key}': {source}"),
            Self::Core { source, .. } => write!(f, "{source}"),
        }
    }
}

impl std::error::Error for CacheError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Serialization { source, .. } => Some(source.as_ref()),
            Self::Core { source, .. } => Some(source),
            _ => None,
        }
    }
}
