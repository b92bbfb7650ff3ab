//! Core eviction strategy trait definition

use std::fmt::Debug;

/// Eviction strategy trait
///
/// Implementations must be side-effect free; they are consulted after
/// every mutating operation, possibly from many threads at once.
pub trait EvictionStrategy: Send + Sync + Debug {
    /// Whether the owner should evict its least recently used entry
    fn should_evict(&self, total_entries: u64, total_bytes: u64) -> bool;

    /// Short name used in logs and configuration
    fn name(&self) -> &'static str;
}
