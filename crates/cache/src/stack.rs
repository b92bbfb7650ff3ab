//! Wiring of every storage tier from one configuration

use crate::cas::ContentAddressableCache;
use crate::config::StorageConfig;
use crate::errors::Result;
use crate::eviction::create_eviction_strategy;
use crate::storage::{HybridTempFileStorage, RollingCacheStorage, TransactionalTempFileStorage};
use ocflstore_core::{Sha2Calculator, TransactionContext, TransactionId};
use std::sync::Arc;

/// The storage tiers a repository host needs, sharing one root
///
/// The rolling cache and the content cache each get their own eviction
/// strategy instance built from the same configuration, so the size limit
/// applies to each tier separately.
#[derive(Debug)]
pub struct StorageStack {
    hybrid: HybridTempFileStorage,
    cas: Arc<ContentAddressableCache>,
}

impl StorageStack {
    pub fn from_config(
        config: &StorageConfig,
        context: Arc<dyn TransactionContext>,
    ) -> Result<Self> {
        config.validate()?;

        let transactional = Arc::new(TransactionalTempFileStorage::new(
            config.transactions_dir(),
            context,
        )?);

        let rolling_strategy = create_eviction_strategy(&config.eviction);
        let rolling = if config.index_existing_on_start {
            RollingCacheStorage::with_existing_files(config.rolling_dir(), rolling_strategy)?
        } else {
            RollingCacheStorage::new(config.rolling_dir(), rolling_strategy)?
        };

        let cas = ContentAddressableCache::builder(config.cas_dir())
            .with_eviction_strategy(create_eviction_strategy(&config.eviction))
            .with_calculator(Arc::new(Sha2Calculator::new(config.digest_algorithm)))
            .with_compaction_threshold(config.journal_compaction_threshold)
            .open()?;

        tracing::info!(
            root = %config.root.display(),
            eviction = ?config.eviction,
            algorithm = %config.digest_algorithm,
            "storage stack opened"
        );

        Ok(Self {
            hybrid: HybridTempFileStorage::new(transactional, Arc::new(rolling)),
            cas: Arc::new(cas),
        })
    }

    /// Transaction-aware view over the overlay and the rolling cache
    pub fn temp_storage(&self) -> &HybridTempFileStorage {
        &self.hybrid
    }

    pub fn transactional(&self) -> &Arc<TransactionalTempFileStorage> {
        self.hybrid.transactional()
    }

    pub fn rolling(&self) -> &Arc<RollingCacheStorage> {
        self.hybrid.rolling()
    }

    pub fn cas(&self) -> &Arc<ContentAddressableCache> {
        &self.cas
    }

    /// Drop the overlay of a finished transaction
    pub fn purge(&self, transaction: TransactionId) -> Result<bool> {
        self.hybrid.purge(transaction)
    }

    /// Flush and close the content cache journal
    pub fn close(&self) -> Result<()> {
        self.cas.close()
    }
}
