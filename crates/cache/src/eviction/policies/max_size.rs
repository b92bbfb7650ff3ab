//! Size-bounded eviction

use crate::eviction::traits::EvictionStrategy;

const BYTES_PER_MEGABYTE: u64 = 1024 * 1024;

/// Evicts while the total allocation exceeds a byte limit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaxSizeEvictionStrategy {
    max_bytes: u64,
}

impl MaxSizeEvictionStrategy {
    pub fn new(max_bytes: u64) -> Self {
        Self { max_bytes }
    }

    /// Limit expressed in mebibytes
    pub fn from_megabytes(megabytes: u64) -> Self {
        Self::new(megabytes.saturating_mul(BYTES_PER_MEGABYTE))
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }
}

impl EvictionStrategy for MaxSizeEvictionStrategy {
    fn should_evict(&self, _total_entries: u64, total_bytes: u64) -> bool {
        total_bytes > self.max_bytes
    }

    fn name(&self) -> &'static str {
        "max_size"
    }
}
