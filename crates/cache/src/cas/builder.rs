//! Builder for ContentAddressableCache

use super::ContentAddressableCache;
use crate::errors::Result;
use crate::eviction::{EvictionStrategy, NeverEvict};
use ocflstore_core::{DigestCalculator, Sha2Calculator};
use std::path::PathBuf;
use std::sync::Arc;

/// Builder for [`ContentAddressableCache`]
///
/// Defaults: never evict, SHA-512, no automatic journal compaction.
pub struct CacheBuilder {
    root: PathBuf,
    strategy: Option<Arc<dyn EvictionStrategy>>,
    calculator: Option<Arc<dyn DigestCalculator>>,
    compaction_threshold: Option<u64>,
}

impl CacheBuilder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            strategy: None,
            calculator: None,
            compaction_threshold: None,
        }
    }

    pub fn with_eviction_strategy(mut self, strategy: Arc<dyn EvictionStrategy>) -> Self {
        self.strategy = Some(strategy);
        self
    }

    pub fn with_calculator(mut self, calculator: Arc<dyn DigestCalculator>) -> Self {
        self.calculator = Some(calculator);
        self
    }

    /// Compact the journal after this many appended events
    pub fn with_compaction_threshold(mut self, threshold: Option<u64>) -> Self {
        self.compaction_threshold = threshold.filter(|n| *n > 0);
        self
    }

    /// Open the cache, replaying its journal
    pub fn open(self) -> Result<ContentAddressableCache> {
        let strategy = self.strategy.unwrap_or_else(|| Arc::new(NeverEvict));
        let calculator = self
            .calculator
            .unwrap_or_else(|| Arc::new(Sha2Calculator::sha512()));
        ContentAddressableCache::open_internal(
            self.root,
            strategy,
            calculator,
            self.compaction_threshold,
        )
    }
}
