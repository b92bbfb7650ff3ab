//! Recovery utilities for storage errors

use super::types::{CacheError, RecoveryHint};

impl CacheError {
    /// Get the recovery hint for this error
    #[must_use]
    pub const fn recovery_hint(&self) -> &RecoveryHint {
        match self {
            Self::Io { recovery_hint, .. }
            | Self::NotFound { recovery_hint, .. }
            | Self::Deserialization { recovery_hint, .. }
            | Self::InvalidState { recovery_hint, .. }
            | Self::NoActiveTransaction { recovery_hint, .. }
            | Self::Configuration { recovery_hint, .. }
            | Self::Serialization { recovery_hint, .. }
            | Self::Core { recovery_hint, .. } => recovery_hint,
        }
    }

    /// Check if this error is transient and can be retried
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self.recovery_hint(), RecoveryHint::Retry { .. })
    }

    /// Check if this error means the requested file is absent
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::Io { source, .. } => source.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }

    /// Check if this error indicates persisted state that cannot be read back
    #[must_use]
    pub const fn is_corruption(&self) -> bool {
        matches!(self, Self::Deserialization { .. })
    }

    /// The underlying I/O error kind, if this is an I/O error
    #[must_use]
    pub fn io_kind(&self) -> Option<std::io::ErrorKind> {
        match self {
            Self::Io { source, .. } => Some(source.kind()),
            Self::Core {
                source: ocflstore_core::Error::FileSystem { source, .. },
                ..
            } => Some(source.kind()),
            _ => None,
        }
    }
}
