//! Factory for creating eviction strategies

use std::sync::Arc;

use crate::config::EvictionConfig;
use crate::errors::Result;

use super::policies::{MaxSizeEvictionStrategy, NeverEvict};
use super::traits::EvictionStrategy;

/// Build the strategy described by a configuration value
pub fn create_eviction_strategy(config: &EvictionConfig) -> Arc<dyn EvictionStrategy> {
    match config {
        EvictionConfig::Never => Arc::new(NeverEvict),
        EvictionConfig::MaxSize { max_bytes } => {
            Arc::new(MaxSizeEvictionStrategy::new(*max_bytes))
        }
    }
}

/// Build a strategy from its name, as found in environment variables
pub fn create_eviction_strategy_by_name(
    name: &str,
    max_bytes: Option<u64>,
) -> Result<Arc<dyn EvictionStrategy>> {
    EvictionConfig::from_name(name, max_bytes).map(|config| create_eviction_strategy(&config))
}
