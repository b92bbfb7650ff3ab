//! Transactional overlay in front of the rolling cache
//!
//! Routing for every call:
//!
//! 1. An active transaction whose overlay already holds the path uses the
//!    overlay exclusively.
//! 2. Reads, and writes outside a transaction, go to the rolling cache.
//! 3. Writes inside a transaction land in the overlay. When the rolling
//!    cache already holds the file, the overlay is seeded first so the
//!    transaction sees the existing bytes; the rolling copy is left alone
//!    until the transaction is committed elsewhere.

mod routing;

#[cfg(test)]
mod tests;

use self::routing::Route;
use super::attributes::FileAttributes;
use super::channel::ByteChannel;
use super::options::{CopyOptions, OpenOptionSet};
use super::physical;
use super::rolling::RollingCacheStorage;
use super::traits::TempFileStorage;
use super::transactional::TransactionalTempFileStorage;
use crate::errors::{CacheError, Result};
use ocflstore_core::{TransactionId, VersionedPath};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

/// Storage combining a per-transaction overlay with the rolling cache
#[derive(Debug, Clone)]
pub struct HybridTempFileStorage {
    transactional: Arc<TransactionalTempFileStorage>,
    rolling: Arc<RollingCacheStorage>,
}

impl HybridTempFileStorage {
    pub fn new(
        transactional: Arc<TransactionalTempFileStorage>,
        rolling: Arc<RollingCacheStorage>,
    ) -> Self {
        Self {
            transactional,
            rolling,
        }
    }

    pub fn transactional(&self) -> &Arc<TransactionalTempFileStorage> {
        &self.transactional
    }

    pub fn rolling(&self) -> &Arc<RollingCacheStorage> {
        &self.rolling
    }

    /// Discard everything `transaction` wrote; the rolling cache is untouched
    pub fn purge(&self, transaction: TransactionId) -> Result<bool> {
        self.transactional.purge(transaction)
    }

    /// Copy the rolling cache's file into the overlay of `transaction`
    fn materialize(
        &self,
        transaction: TransactionId,
        source: &VersionedPath,
        target: &VersionedPath,
        options: CopyOptions,
    ) -> Result<PathBuf> {
        let from = self.rolling.to_physical_path(source)?;
        let to = self.transactional.to_physical_path_for(transaction, target);
        physical::copy_file(&from, &to, options, &source.to_string())?;
        self.rolling.touch(source)?;
        tracing::debug!(
            tx = %transaction,
            source = %source,
            target = %target,
            "materialized rolling cache file into transaction overlay"
        );
        Ok(to)
    }
}

impl TempFileStorage for HybridTempFileStorage {
    fn to_physical_path(&self, path: &VersionedPath) -> Result<PathBuf> {
        match self.route(path)? {
            Route::Overlay(transaction) => {
                Ok(self.transactional.to_physical_path_for(transaction, path))
            }
            Route::Rolling | Route::Seed(_) | Route::Fresh(_) => {
                self.rolling.to_physical_path(path)
            }
        }
    }

    fn exists(&self, path: &VersionedPath) -> Result<bool> {
        Ok(self.transactional.exists(path)? || self.rolling.exists(path)?)
    }

    fn new_byte_channel(&self, path: &VersionedPath, options: OpenOptionSet) -> Result<ByteChannel> {
        if options.is_read_only() {
            return match self.route(path)? {
                Route::Overlay(_) => self.transactional.new_byte_channel(path, options),
                _ => self.rolling.new_byte_channel(path, options),
            };
        }

        match self.route(path)? {
            Route::Overlay(_) => self.transactional.new_byte_channel(path, options),
            Route::Rolling => self.rolling.new_byte_channel(path, options),
            Route::Fresh(_) => self.transactional.new_byte_channel(path, options),
            Route::Seed(transaction) => {
                if options.contains(OpenOptionSet::CREATE_NEW) {
                    return Err(CacheError::io(
                        self.rolling.to_physical_path(path)?,
                        "create new file",
                        io::Error::new(io::ErrorKind::AlreadyExists, "file already exists"),
                    ));
                }
                if options.contains(OpenOptionSet::TRUNCATE_EXISTING)
                    && !options.contains(OpenOptionSet::APPEND)
                {
                    // Nothing in the overlay to truncate yet
                    let options = options
                        .without(OpenOptionSet::TRUNCATE_EXISTING)
                        .with(OpenOptionSet::CREATE);
                    return self.transactional.new_byte_channel(path, options);
                }
                self.materialize(transaction, path, path, CopyOptions::REPLACE_EXISTING)?;
                self.transactional.new_byte_channel(path, options)
            }
        }
    }

    fn copy(&self, source: &VersionedPath, target: &VersionedPath, options: CopyOptions) -> Result<()> {
        match self.route(source)? {
            Route::Rolling => self.rolling.copy(source, target, options),
            Route::Overlay(_) => self.transactional.copy(source, target, options),
            Route::Seed(transaction) => self
                .materialize(transaction, source, target, options)
                .map(|_| ()),
            Route::Fresh(_) => Err(CacheError::not_found(source.to_string())),
        }
    }

    fn move_file(
        &self,
        source: &VersionedPath,
        target: &VersionedPath,
        options: CopyOptions,
    ) -> Result<()> {
        match self.route(source)? {
            Route::Rolling => self.rolling.move_file(source, target, options),
            Route::Overlay(_) => self.transactional.move_file(source, target, options),
            // The rolling copy stays until the transaction is committed
            Route::Seed(transaction) => self
                .materialize(transaction, source, target, options)
                .map(|_| ()),
            Route::Fresh(_) => Err(CacheError::not_found(source.to_string())),
        }
    }

    fn delete_if_exists(&self, path: &VersionedPath) -> Result<bool> {
        if self.transactional.context().is_active() {
            self.transactional.delete_if_exists(path)
        } else {
            self.rolling.delete_if_exists(path)
        }
    }

    fn create_directories(&self, path: &VersionedPath) -> Result<()> {
        if self.transactional.context().is_active() {
            self.transactional.create_directories(path)
        } else {
            self.rolling.create_directories(path)
        }
    }

    fn read_attributes(&self, path: &VersionedPath) -> Result<FileAttributes> {
        match self.route(path)? {
            Route::Overlay(_) => self.transactional.read_attributes(path),
            _ => self.rolling.read_attributes(path),
        }
    }
}
