//! Eviction strategy implementations

mod max_size;
mod never;

pub use max_size::MaxSizeEvictionStrategy;
pub use never::NeverEvict;
