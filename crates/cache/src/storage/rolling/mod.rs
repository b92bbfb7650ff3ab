//! Size-bounded cache of recently used files
//!
//! Files are keyed by physical path, not content, so identical bytes under
//! two addresses are two entries. There is no journal: the index starts
//! empty (or from a scan of the root) and losing it only costs refetching
//! from the authoritative store.

mod index;


use self::index::RollingIndex;
use super::attributes::FileAttributes;
use super::channel::ByteChannel;
use super::local::LocalTempFileStorage;
use super::options::{CopyOptions, OpenOptionSet};
use super::physical;
use super::traits::TempFileStorage;
use crate::errors::{CacheError, Result};
use crate::eviction::EvictionStrategy;
use ocflstore_core::VersionedPath;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Temp file storage with LRU eviction over everything written through it
#[derive(Debug)]
pub struct RollingCacheStorage {
    inner: LocalTempFileStorage,
    index: Arc<RollingIndex>,
}

impl RollingCacheStorage {
    /// Create an empty rolling cache below `root`
    pub fn new(root: impl Into<PathBuf>, strategy: Arc<dyn EvictionStrategy>) -> Result<Self> {
        Ok(Self {
            inner: LocalTempFileStorage::new(root)?,
            index: Arc::new(RollingIndex::new(strategy)),
        })
    }

    /// Create a rolling cache that adopts files already below `root`
    ///
    /// Existing files enter the LRU oldest modification first, then the
    /// strategy is applied once.
    pub fn with_existing_files(
        root: impl Into<PathBuf>,
        strategy: Arc<dyn EvictionStrategy>,
    ) -> Result<Self> {
        let storage = Self::new(root, strategy)?;
        let files = ocflstore_utils::files_by_modification(storage.root());
        for file in &files {
            storage.index.record_without_eviction(&file.path);
        }
        let evicted = storage.index.roll_over();
        tracing::info!(
            root = %storage.root().display(),
            indexed = files.len(),
            evicted,
            "rolling cache indexed existing files"
        );
        Ok(storage)
    }

    pub fn root(&self) -> &Path {
        self.inner.root()
    }

    /// Mark `path` as recently used without opening it
    pub fn touch(&self, path: &VersionedPath) -> Result<()> {
        self.index.touch(&self.to_physical_path(path)?);
        Ok(())
    }

    /// Whether `path` is currently accounted for by the index
    pub fn contains(&self, path: &VersionedPath) -> Result<bool> {
        Ok(self.index.contains(&self.to_physical_path(path)?))
    }

    pub fn count(&self) -> u64 {
        self.index.count()
    }

    pub fn allocated(&self) -> u64 {
        self.index.allocated()
    }

    /// Physical paths from least to most recently used
    pub fn lru_order(&self) -> Vec<PathBuf> {
        self.index.lru_order()
    }

    /// Evict until the strategy is satisfied; returns the number of evictions
    pub fn roll_over(&self) -> usize {
        self.index.roll_over()
    }

    /// Drop the index and delete every file below the root
    pub fn clear(&self) -> Result<()> {
        self.index.clear();
        ocflstore_utils::remove_dir_all_if_exists(self.root())?;
        match std::fs::create_dir_all(self.root()) {
            Ok(()) => {}
            Err(e) => return Err(CacheError::io(self.root(), "recreate rolling cache root", e)),
        }
        tracing::info!(root = %self.root().display(), "rolling cache cleared");
        Ok(())
    }
}

impl TempFileStorage for RollingCacheStorage {
    fn to_physical_path(&self, path: &VersionedPath) -> Result<PathBuf> {
        self.inner.to_physical_path(path)
    }

    fn new_byte_channel(&self, path: &VersionedPath, options: OpenOptionSet) -> Result<ByteChannel> {
        let target = self.to_physical_path(path)?;
        let channel = physical::open_channel(&target, options, &path.to_string())?;

        if options.is_writing() {
            let index = Arc::clone(&self.index);
            Ok(channel.on_close(move |written| index.record(written)))
        } else {
            self.index.touch(&target);
            Ok(channel)
        }
    }

    fn copy(&self, source: &VersionedPath, target: &VersionedPath, options: CopyOptions) -> Result<()> {
        let from = self.to_physical_path(source)?;
        let to = self.to_physical_path(target)?;
        physical::copy_file(&from, &to, options, &source.to_string())?;
        self.index.touch(&from);
        self.index.record(&to);
        Ok(())
    }

    fn move_file(
        &self,
        source: &VersionedPath,
        target: &VersionedPath,
        options: CopyOptions,
    ) -> Result<()> {
        let from = self.to_physical_path(source)?;
        let to = self.to_physical_path(target)?;
        physical::move_file(&from, &to, options, &source.to_string())?;
        self.index.forget(&from);
        self.index.record(&to);
        Ok(())
    }

    fn delete_if_exists(&self, path: &VersionedPath) -> Result<bool> {
        let target = self.to_physical_path(path)?;
        let deleted = physical::delete_if_exists(&target)?;
        self.index.forget(&target);
        Ok(deleted)
    }

    fn read_attributes(&self, path: &VersionedPath) -> Result<FileAttributes> {
        let target = self.to_physical_path(path)?;
        let attributes = physical::attributes(&target, &path.to_string())?;
        self.index.touch(&target);
        Ok(attributes)
    }
}
