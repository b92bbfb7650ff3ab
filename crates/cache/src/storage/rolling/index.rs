//! LRU index over physical paths

use crate::eviction::EvictionStrategy;
use crate::lru::LruQueue;
use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Sizes and recency of the files written through a rolling cache
#[derive(Debug)]
pub(crate) struct RollingIndex {
    lru: LruQueue<PathBuf>,
    sizes: DashMap<PathBuf, u64>,
    allocated: AtomicU64,
    strategy: Arc<dyn EvictionStrategy>,
}

impl RollingIndex {
    pub(crate) fn new(strategy: Arc<dyn EvictionStrategy>) -> Self {
        Self {
            lru: LruQueue::new(),
            sizes: DashMap::new(),
            allocated: AtomicU64::new(0),
            strategy,
        }
    }

    /// Account for a completed write to `path`, then evict if needed
    pub(crate) fn record(&self, path: &Path) {
        self.record_without_eviction(path);
        self.roll_over();
    }

    pub(crate) fn record_without_eviction(&self, path: &Path) {
        let size = match std::fs::metadata(path) {
            Ok(metadata) if metadata.is_file() => metadata.len(),
            Ok(_) => return,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cannot stat written file, not indexing it");
                self.forget(path);
                return;
            }
        };

        match self.sizes.insert(path.to_path_buf(), size) {
            Some(previous) => {
                self.allocated.fetch_add(size, Ordering::AcqRel);
                self.allocated.fetch_sub(previous, Ordering::AcqRel);
                self.lru.touch(&path.to_path_buf());
            }
            None => {
                self.allocated.fetch_add(size, Ordering::AcqRel);
                self.lru.offer(path.to_path_buf());
            }
        }
    }

    /// Drop `path` from the index without touching the file
    pub(crate) fn forget(&self, path: &Path) {
        if let Some((_, size)) = self.sizes.remove(path) {
            self.allocated.fetch_sub(size, Ordering::AcqRel);
        }
        self.lru.remove(&path.to_path_buf());
    }

    pub(crate) fn touch(&self, path: &Path) {
        if self.sizes.contains_key(path) {
            self.lru.touch(&path.to_path_buf());
        }
    }

    /// Evict least recently used files while the strategy asks for it
    pub(crate) fn roll_over(&self) -> usize {
        let mut evicted = 0;
        while self.strategy.should_evict(self.count(), self.allocated()) {
            let Some(path) = self.lru.poll() else {
                break;
            };
            if let Some((_, size)) = self.sizes.remove(&path) {
                self.allocated.fetch_sub(size, Ordering::AcqRel);
            }
            ocflstore_utils::remove_file_best_effort(&path);
            tracing::debug!(path = %path.display(), "evicted from rolling cache");
            evicted += 1;
        }
        evicted
    }

    pub(crate) fn contains(&self, path: &Path) -> bool {
        self.sizes.contains_key(path)
    }

    pub(crate) fn count(&self) -> u64 {
        self.sizes.len() as u64
    }

    pub(crate) fn allocated(&self) -> u64 {
        self.allocated.load(Ordering::Acquire)
    }

    pub(crate) fn lru_order(&self) -> Vec<PathBuf> {
        self.lru.snapshot()
    }

    pub(crate) fn clear(&self) {
        self.lru.clear();
        self.sizes.clear();
        self.allocated.store(0, Ordering::Release);
    }
}
