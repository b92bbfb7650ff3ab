//! Per-transaction overlay storage

use super::traits::TempFileStorage;
use crate::errors::{CacheError, Result};
use ocflstore_core::{TransactionContext, TransactionId, VersionedPath};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Stores files below `root/<transaction id>/owner/version/...`
///
/// Every path resolves against the transaction that is active when the call
/// is made. Without one, resolution fails with `NoActiveTransaction`, except
/// for [`exists`](TempFileStorage::exists), which simply answers `false`.
pub struct TransactionalTempFileStorage {
    root: PathBuf,
    context: Arc<dyn TransactionContext>,
}

impl TransactionalTempFileStorage {
    pub fn new(root: impl Into<PathBuf>, context: Arc<dyn TransactionContext>) -> Result<Self> {
        let root = root.into();
        match std::fs::create_dir_all(&root) {
            Ok(()) => {}
            Err(e) => return Err(CacheError::io(&root, "create transaction root", e)),
        }
        Ok(Self { root, context })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn context(&self) -> &Arc<dyn TransactionContext> {
        &self.context
    }

    /// Directory holding everything written by `transaction`
    pub fn transaction_root(&self, transaction: TransactionId) -> PathBuf {
        self.root.join(transaction.to_string())
    }

    /// Physical location of `path` inside a specific transaction
    pub fn to_physical_path_for(&self, transaction: TransactionId, path: &VersionedPath) -> PathBuf {
        self.transaction_root(transaction)
            .join(path.to_relative_physical())
    }

    /// Recursively delete the overlay of `transaction`
    ///
    /// Returns whether the transaction had written anything.
    pub fn purge(&self, transaction: TransactionId) -> Result<bool> {
        let dir = self.transaction_root(transaction);
        let removed = ocflstore_utils::remove_dir_all_if_exists(&dir)?;
        tracing::info!(tx = %transaction, removed, "purged transaction overlay");
        Ok(removed)
    }
}

impl TempFileStorage for TransactionalTempFileStorage {
    fn to_physical_path(&self, path: &VersionedPath) -> Result<PathBuf> {
        match self.context.current() {
            Some(transaction) => Ok(self.to_physical_path_for(transaction, path)),
            None => Err(CacheError::no_active_transaction("resolve transactional path")),
        }
    }

    fn exists(&self, path: &VersionedPath) -> Result<bool> {
        match self.context.current() {
            Some(transaction) => Ok(self.to_physical_path_for(transaction, path).exists()),
            None => Ok(false),
        }
    }
}

impl fmt::Debug for TransactionalTempFileStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionalTempFileStorage")
            .field("root", &self.root)
            .field("transaction", &self.context.current())
            .finish()
    }
}
