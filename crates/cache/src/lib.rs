//! Local storage tiers in front of an OCFL store
//!
//! This crate provides the temp and cache storage a repository host needs:
//! - Per-transaction overlays that isolate uncommitted writes
//! - A size-bounded rolling cache of recently used files
//! - A hybrid view that routes between the two
//! - A content-addressable cache of remote content, indexed by a journal
//!
//! Every operation is blocking and every type is safe to share between
//! threads.

pub mod cas;
pub mod config;
pub mod errors;
pub mod eviction;
pub mod journal;
pub mod lru;
pub mod stack;
pub mod storage;

pub use cas::{CacheBuilder, CacheEntryWriter, CacheStatistics, ContentAddressableCache};
pub use config::{
    ConfigSource, EvictionConfig, StorageConfig, StorageConfigBuilder, StorageConfigLoader,
};
pub use errors::{CacheError, Error, RecoveryHint, Result};
pub use eviction::{
    create_eviction_strategy, create_eviction_strategy_by_name, EvictionStrategy,
    MaxSizeEvictionStrategy, NeverEvict,
};
pub use journal::{Journal, JournalCodec, JsonCodec};
pub use stack::StorageStack;
pub use storage::{
    ByteChannel, CopyOptions, FileAttributes, HybridTempFileStorage, LocalTempFileStorage,
    OpenOptionSet, RollingCacheStorage, TempFileStorage, TransactionalTempFileStorage,
};

pub use ocflstore_core::{
    Digest, DigestAlgorithm, DigestCalculator, FileInfo, NoTransaction, Sha2Calculator,
    SharedTransactionContext, ThreadTransactionContext, TransactionContext, TransactionId,
    VersionNumber, VersionedPath,
};
