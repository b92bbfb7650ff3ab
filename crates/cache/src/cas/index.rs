//! In-memory index of the content-addressable cache

use super::events::CacheEvent;
use crate::lru::LruQueue;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use ocflstore_core::{Digest, FileInfo};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

/// Digest map, recency queue and allocation counter
///
/// At quiescent points the allocation equals the sum of all entry sizes.
/// No method holds a map guard while taking the queue lock.
#[derive(Debug, Default)]
pub(crate) struct CacheIndex {
    entries: DashMap<Digest, FileInfo>,
    lru: LruQueue<Digest>,
    allocated: AtomicU64,
}

impl CacheIndex {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Insert `info` unless its digest is already present
    ///
    /// Only the caller that gets `true` owns the new entry and must journal it.
    pub(crate) fn insert_if_absent(&self, info: FileInfo) -> bool {
        let digest = info.digest.clone();
        let size = info.size;
        let inserted = match self.entries.entry(digest.clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(vacant) => {
                vacant.insert(info);
                self.allocated.fetch_add(size, Ordering::AcqRel);
                true
            }
        };
        if inserted {
            self.lru.offer(digest);
        }
        inserted
    }

    /// Apply a replayed journal event
    pub(crate) fn apply(&self, event: CacheEvent) {
        match event {
            CacheEvent::Add(info) => {
                let digest = info.digest.clone();
                let size = info.size;
                match self.entries.insert(digest.clone(), info) {
                    Some(previous) => {
                        self.allocated.fetch_add(size, Ordering::AcqRel);
                        self.allocated.fetch_sub(previous.size, Ordering::AcqRel);
                        self.lru.touch(&digest);
                    }
                    None => {
                        self.allocated.fetch_add(size, Ordering::AcqRel);
                        self.lru.offer(digest);
                    }
                }
            }
            CacheEvent::Remove(digest) => {
                self.remove(&digest);
            }
            CacheEvent::Touch(digest) => {
                self.touch(&digest);
            }
        }
    }

    /// Mark `digest` as used; returns whether it is indexed
    pub(crate) fn touch(&self, digest: &Digest) -> bool {
        if self.entries.contains_key(digest) {
            self.lru.touch(digest);
            true
        } else {
            false
        }
    }

    pub(crate) fn remove(&self, digest: &Digest) -> Option<FileInfo> {
        let removed = self.take(digest);
        self.lru.remove(digest);
        removed
    }

    /// Least recently used entry, removed from both queue and map
    ///
    /// A queued digest missing from the map yields `Some((digest, None))`.
    pub(crate) fn poll(&self) -> Option<(Digest, Option<FileInfo>)> {
        let digest = self.lru.poll()?;
        let info = self.take(&digest);
        Some((digest, info))
    }

    fn take(&self, digest: &Digest) -> Option<FileInfo> {
        let (_, info) = self.entries.remove(digest)?;
        self.allocated.fetch_sub(info.size, Ordering::AcqRel);
        Some(info)
    }

    pub(crate) fn get(&self, digest: &Digest) -> Option<FileInfo> {
        self.entries.get(digest).map(|entry| entry.value().clone())
    }

    pub(crate) fn contains(&self, digest: &Digest) -> bool {
        self.entries.contains_key(digest)
    }

    pub(crate) fn count(&self) -> u64 {
        self.entries.len() as u64
    }

    pub(crate) fn allocated(&self) -> u64 {
        self.allocated.load(Ordering::Acquire)
    }

    pub(crate) fn lru_order(&self) -> Vec<Digest> {
        self.lru.snapshot()
    }

    /// One `Add` per entry, least recently used first
    ///
    /// Queued digests missing from the map are logged and skipped. Entries
    /// not yet queued (an insert racing the snapshot) are appended last.
    pub(crate) fn snapshot_events(&self) -> Vec<CacheEvent> {
        let order = self.lru.snapshot();
        let mut seen = HashSet::with_capacity(order.len());
        let mut events = Vec::with_capacity(order.len());

        for digest in order {
            match self.get(&digest) {
                Some(info) => {
                    seen.insert(digest);
                    events.push(CacheEvent::Add(info));
                }
                None => {
                    tracing::warn!(digest = %digest, "LRU queue references a digest missing from the index, skipping");
                }
            }
        }

        let unqueued: Vec<FileInfo> = self
            .entries
            .iter()
            .filter(|entry| !seen.contains(entry.key()))
            .map(|entry| entry.value().clone())
            .collect();
        events.extend(unqueued.into_iter().map(CacheEvent::Add));
        events
    }

    pub(crate) fn clear(&self) {
        self.entries.clear();
        self.lru.clear();
        self.allocated.store(0, Ordering::Release);
    }
}
