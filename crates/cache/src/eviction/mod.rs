//! Eviction strategies for bounding storage size
//!
//! A strategy is a pure decision: given the current entry count and total
//! allocation, should the owner evict its least recently used entry.

mod factory;
mod policies;
mod traits;

pub use factory::{create_eviction_strategy, create_eviction_strategy_by_name};
pub use policies::{MaxSizeEvictionStrategy, NeverEvict};
pub use traits::EvictionStrategy;
