//! Approximate LRU ordering shared by the caches
//!
//! Touching a key is a remove followed by a re-offer. The two steps take the
//! lock separately, so two threads touching the same key concurrently may
//! leave either order. Eviction only needs eventual recency, so callers must
//! not rely on an exact total order under contention.

use parking_lot::Mutex;
use std::collections::VecDeque;

/// Queue of keys, least recently used at the head
#[derive(Debug)]
pub struct LruQueue<K> {
    order: Mutex<VecDeque<K>>,
}

impl<K: PartialEq + Clone> LruQueue<K> {
    pub fn new() -> Self {
        Self {
            order: Mutex::new(VecDeque::new()),
        }
    }

    /// Append `key` at the most recently used end
    pub fn offer(&self, key: K) {
        self.order.lock().push_back(key);
    }

    /// Mark `key` as just used
    pub fn touch(&self, key: &K) {
        if self.remove(key) {
            self.offer(key.clone());
        }
    }

    /// Drop every occurrence of `key`; returns whether one was found
    pub fn remove(&self, key: &K) -> bool {
        let mut order = self.order.lock();
        let before = order.len();
        order.retain(|k| k != key);
        order.len() != before
    }

    /// Take the least recently used key
    pub fn poll(&self) -> Option<K> {
        self.order.lock().pop_front()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.order.lock().contains(key)
    }

    /// Keys from least to most recently used
    pub fn snapshot(&self) -> Vec<K> {
        self.order.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.order.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.lock().is_empty()
    }

    pub fn clear(&self) {
        self.order.lock().clear();
    }
}

impl<K: PartialEq + Clone> Default for LruQueue<K> {
    fn default() -> Self {
        Self::new()
    }
}
