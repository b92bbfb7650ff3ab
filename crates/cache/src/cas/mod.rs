//! Content-addressable cache with a durable journal
//!
//! Files are stored once per digest at `root/<hex[0..3]>/<hex>`. The index
//! (digest map, LRU queue, allocation counter) lives in memory and is
//! rebuilt at start-up by replaying `root/cache.journal`, so restarting
//! never re-hashes stored files.
//!
//! A journal that cannot be decoded is not fatal: the cache wipes its
//! directory and starts empty. The authoritative copy of every file lives
//! in the remote store, so this only costs refetching.

mod builder;
mod content_type;
mod entry;
mod events;
mod index;
mod maintenance;
mod operations;
mod stats;

#[cfg(test)]
mod tests;

pub use builder::CacheBuilder;
pub use entry::CacheEntryWriter;
pub use events::{CacheEvent, CacheEventCodec};
pub use stats::CacheStatistics;

use self::index::CacheIndex;
use self::stats::StatsCounters;
use crate::errors::{CacheError, Result};
use crate::eviction::EvictionStrategy;
use crate::journal::Journal;
use ocflstore_core::{Digest, DigestCalculator, FileInfo};
use parking_lot::Mutex;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Name of the journal file inside the cache root
pub const JOURNAL_FILE_NAME: &str = "cache.journal";

/// Prefix of staging files for writes that are not yet committed
pub(crate) const STAGING_PREFIX: &str = "tmp-";

/// Digest-keyed local cache of remote content
pub struct ContentAddressableCache {
    root: PathBuf,
    calculator: Arc<dyn DigestCalculator>,
    strategy: Arc<dyn EvictionStrategy>,
    index: CacheIndex,
    journal: Journal<CacheEvent, CacheEventCodec>,
    stats: StatsCounters,
    compaction_threshold: Option<u64>,
    /// Serializes changes that move files in or out of place together with
    /// their journal record
    placement: Mutex<()>,
}

impl ContentAddressableCache {
    /// Open (or create) a cache below `root`
    pub fn open(
        root: impl Into<PathBuf>,
        strategy: Arc<dyn EvictionStrategy>,
        calculator: Arc<dyn DigestCalculator>,
    ) -> Result<Self> {
        Self::builder(root)
            .with_eviction_strategy(strategy)
            .with_calculator(calculator)
            .open()
    }

    pub fn builder(root: impl Into<PathBuf>) -> CacheBuilder {
        CacheBuilder::new(root)
    }

    pub(crate) fn open_internal(
        root: PathBuf,
        strategy: Arc<dyn EvictionStrategy>,
        calculator: Arc<dyn DigestCalculator>,
        compaction_threshold: Option<u64>,
    ) -> Result<Self> {
        create_root(&root)?;

        let cache = Self {
            journal: Journal::new(root.join(JOURNAL_FILE_NAME), CacheEventCodec),
            root,
            calculator,
            strategy,
            index: CacheIndex::new(),
            stats: StatsCounters::default(),
            compaction_threshold,
            placement: Mutex::new(()),
        };
        cache.load()?;
        Ok(cache)
    }

    /// Replay the journal, resetting the whole cache if it is corrupt
    fn load(&self) -> Result<()> {
        match self.journal.open(|event| self.index.apply(event)) {
            Ok(replayed) => {
                self.sweep_staging()?;
                tracing::info!(
                    root = %self.root.display(),
                    events = replayed,
                    entries = self.index.count(),
                    allocated = self.index.allocated(),
                    "content-addressable cache loaded"
                );
                Ok(())
            }
            Err(e) if e.is_corruption() => {
                tracing::info!(
                    root = %self.root.display(),
                    error = %e,
                    "journal is corrupt, resetting content-addressable cache"
                );
                self.index.clear();
                self.reset_directory()?;
                self.journal.open(|_| {})?;
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Delete staging files an interrupted writer left in the root
    fn sweep_staging(&self) -> Result<()> {
        let entries = std::fs::read_dir(&self.root)
            .map_err(|e| CacheError::io(&self.root, "list cache root", e))?;
        let mut swept = 0usize;
        for entry in entries.flatten() {
            let stale = entry.file_name().to_string_lossy().starts_with(STAGING_PREFIX)
                && entry.file_type().map(|t| t.is_file()).unwrap_or(false);
            if stale && ocflstore_utils::remove_file_best_effort(&entry.path()) {
                swept += 1;
            }
        }
        if swept > 0 {
            tracing::debug!(root = %self.root.display(), swept, "removed stale staging files");
        }
        Ok(())
    }

    fn reset_directory(&self) -> Result<()> {
        ocflstore_utils::remove_dir_all_if_exists(&self.root)?;
        create_root(&self.root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Physical location of `digest`, whether or not it is cached
    pub fn physical_path(&self, digest: &Digest) -> PathBuf {
        self.root.join(digest.shard()).join(digest.hex())
    }

    pub fn journal_path(&self) -> &Path {
        self.journal.path()
    }

    pub fn calculator(&self) -> &Arc<dyn DigestCalculator> {
        &self.calculator
    }

    /// Number of cached files
    pub fn count(&self) -> u64 {
        self.index.count()
    }

    /// Total bytes of all cached files
    pub fn allocated(&self) -> u64 {
        self.index.allocated()
    }

    pub fn file_info(&self, digest: &Digest) -> Option<FileInfo> {
        self.index.get(digest)
    }

    /// Cached digests from least to most recently used
    pub fn lru_order(&self) -> Vec<Digest> {
        self.index.lru_order()
    }

    pub fn statistics(&self) -> CacheStatistics {
        self.stats.snapshot(self.index.count(), self.index.allocated())
    }

    /// Flush and close the journal
    pub fn close(&self) -> Result<()> {
        self.journal.close()
    }
}

fn create_root(root: &Path) -> Result<()> {
    match std::fs::create_dir_all(root) {
        Ok(()) => Ok(()),
        Err(e) => Err(CacheError::io(root, "create cache root", e)),
    }
}

impl fmt::Debug for ContentAddressableCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentAddressableCache")
            .field("root", &self.root)
            .field("strategy", &self.strategy)
            .field("algorithm", &self.calculator.algorithm())
            .field("entries", &self.index.count())
            .field("allocated", &self.index.allocated())
            .finish()
    }
}
