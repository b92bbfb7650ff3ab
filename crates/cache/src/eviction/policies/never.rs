use crate::eviction::traits::EvictionStrategy;

/// Strategy that keeps everything
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NeverEvict;

impl EvictionStrategy for NeverEvict {
    fn should_evict(&self, _total_entries: u64, _total_bytes: u64) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "never"
    }
}
