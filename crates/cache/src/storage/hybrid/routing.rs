//! Tier selection for hybrid storage

use super::HybridTempFileStorage;
use crate::errors::Result;
use crate::storage::traits::TempFileStorage;
use ocflstore_core::{TransactionId, VersionedPath};

/// Where a call against a path should go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Route {
    /// No transaction is active
    Rolling,
    /// The transaction's overlay already holds the path
    Overlay(TransactionId),
    /// Transaction active, path only present in the rolling cache
    Seed(TransactionId),
    /// Transaction active, path present in neither tier
    Fresh(TransactionId),
}

impl HybridTempFileStorage {
    pub(super) fn route(&self, path: &VersionedPath) -> Result<Route> {
        let Some(transaction) = self.transactional.context().current() else {
            return Ok(Route::Rolling);
        };

        if self
            .transactional
            .to_physical_path_for(transaction, path)
            .exists()
        {
            Ok(Route::Overlay(transaction))
        } else if self.rolling.exists(path)? {
            Ok(Route::Seed(transaction))
        } else {
            Ok(Route::Fresh(transaction))
        }
    }
}
