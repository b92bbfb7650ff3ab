//! Property-based tests for the content-addressable cache
//!
//! These check the invariants that must hold for any sequence of writes:
//! identical content is addressed identically, the allocation counter
//! matches the indexed entries and never exceeds the limit once eviction
//! has run, and a restart reproduces the same index.

use ocflstore_cache::{
    ContentAddressableCache, DigestCalculator, EvictionStrategy, MaxSizeEvictionStrategy,
    NeverEvict, Sha2Calculator,
};
use proptest::prelude::*;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

fn open(root: &Path, strategy: Arc<dyn EvictionStrategy>) -> ContentAddressableCache {
    ContentAddressableCache::open(root, strategy, Arc::new(Sha2Calculator::sha256())).unwrap()
}

/// Generate small blobs, with repeats so deduplication is exercised
fn arb_blobs() -> impl Strategy<Value = Vec<Vec<u8>>> {
    prop::collection::vec(
        prop_oneof![
            prop::collection::vec(any::<u8>(), 0..64),
            Just(b"repeated".to_vec()),
        ],
        1..24,
    )
}

fn indexed_bytes(cache: &ContentAddressableCache) -> u64 {
    cache
        .lru_order()
        .iter()
        .map(|digest| cache.file_info(digest).map(|info| info.size).unwrap_or(0))
        .sum()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_same_content_same_digest(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        let temp_dir = TempDir::new().unwrap();
        let cache = open(temp_dir.path(), Arc::new(NeverEvict));

        let first = cache.write("first", &bytes).unwrap();
        let second = cache.write("second", &bytes).unwrap();

        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first, Sha2Calculator::sha256().digest_bytes(&bytes));
        prop_assert_eq!(cache.count(), 1);
        prop_assert_eq!(cache.allocated(), bytes.len() as u64);
    }

    #[test]
    fn prop_allocation_matches_index_and_limit(blobs in arb_blobs(), limit in 32_u64..512) {
        let temp_dir = TempDir::new().unwrap();
        let cache = open(temp_dir.path(), Arc::new(MaxSizeEvictionStrategy::new(limit)));

        for (i, blob) in blobs.iter().enumerate() {
            cache.write(&format!("blob-{i}"), blob).unwrap();

            prop_assert!(cache.allocated() <= limit);
            prop_assert_eq!(cache.allocated(), indexed_bytes(&cache));
            prop_assert_eq!(cache.count(), cache.lru_order().len() as u64);
            for digest in cache.lru_order() {
                prop_assert!(cache.physical_path(&digest).is_file());
            }
        }
    }

    #[test]
    fn prop_restart_reproduces_index(blobs in arb_blobs(), limit in 32_u64..512) {
        let temp_dir = TempDir::new().unwrap();
        let strategy: Arc<dyn EvictionStrategy> = Arc::new(MaxSizeEvictionStrategy::new(limit));

        let (order, allocated) = {
            let cache = open(temp_dir.path(), strategy.clone());
            for (i, blob) in blobs.iter().enumerate() {
                cache.write(&format!("blob-{i}"), blob).unwrap();
            }
            let state = (cache.lru_order(), cache.allocated());
            cache.close().unwrap();
            state
        };

        let cache = open(temp_dir.path(), strategy);
        prop_assert_eq!(cache.lru_order(), order);
        prop_assert_eq!(cache.allocated(), allocated);
    }
}
