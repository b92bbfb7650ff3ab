//! Eviction, journal compaction and clearing

use super::events::CacheEvent;
use super::ContentAddressableCache;
use crate::errors::Result;
use ocflstore_utils::tracing::storage_span;

impl ContentAddressableCache {
    /// Evict least recently used entries while the strategy asks for it
    ///
    /// Runs inline after every insert. Each eviction is journaled before the
    /// file is deleted; a file that cannot be deleted is logged and left
    /// behind as an orphan, since the index is authoritative.
    pub fn roll_over(&self) -> Result<u64> {
        let mut evicted = 0;
        while self
            .strategy
            .should_evict(self.index.count(), self.index.allocated())
        {
            let placement = self.placement.lock();
            let Some((digest, info)) = self.index.poll() else {
                break;
            };
            let Some(info) = info else {
                tracing::warn!(digest = %digest, "evicted digest was not indexed, skipping");
                continue;
            };

            if let Err(e) = self.journal.append(&CacheEvent::Remove(digest.clone())) {
                // Still on disk and still journaled, so keep it indexed
                self.index.insert_if_absent(info);
                return Err(e);
            }
            ocflstore_utils::remove_file_best_effort(&self.physical_path(&digest));
            drop(placement);
            self.stats.record_eviction();
            evicted += 1;
            tracing::debug!(digest = %digest, size = info.size, "evicted from cache");
        }
        Ok(evicted)
    }

    /// Rewrite the journal as one `Add` per entry in LRU order
    pub fn compact_journal(&self) -> Result<u64> {
        let _span = storage_span("cas", "compact_journal").entered();
        self.journal.compact(|| self.index.snapshot_events())
    }

    /// Compact once enough events piled up; failures are only logged
    pub(crate) fn maybe_compact(&self) {
        let Some(threshold) = self.compaction_threshold else {
            return;
        };
        if self.journal.entries_since_compaction() < threshold {
            return;
        }
        if let Err(e) = self.compact_journal() {
            tracing::warn!(
                journal = %self.journal.path().display(),
                error = %e,
                "automatic journal compaction failed"
            );
        }
    }

    /// Forget everything and delete the cache directory
    pub fn clear(&self) -> Result<()> {
        let _span = storage_span("cas", "clear").entered();
        let _placement = self.placement.lock();
        self.index.clear();
        self.stats.reset();
        self.journal.close()?;
        self.reset_directory()?;
        self.journal.open(|_| {})?;
        tracing::info!(root = %self.root.display(), "content-addressable cache cleared");
        Ok(())
    }
}
