//! Tests for the content-addressable cache

use super::*;
use crate::eviction::{MaxSizeEvictionStrategy, NeverEvict};
use crate::storage::CopyOptions;
use ocflstore_core::Sha2Calculator;
use std::fs;
use std::io::{Read, Write};
use tempfile::TempDir;

fn open_with(root: &Path, strategy: Arc<dyn EvictionStrategy>) -> ContentAddressableCache {
    ocflstore_utils::tracing::init_for_tests();
    ContentAddressableCache::open(root, strategy, Arc::new(Sha2Calculator::sha256())).unwrap()
}

fn open(root: &Path) -> ContentAddressableCache {
    open_with(root, Arc::new(NeverEvict))
}

fn staging_files(root: &Path) -> usize {
    fs::read_dir(root)
        .unwrap()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name().to_string_lossy().starts_with(STAGING_PREFIX))
        .count()
}

fn read_all(cache: &ContentAddressableCache, digest: &Digest) -> Vec<u8> {
    let mut content = Vec::new();
    cache
        .read_byte_channel(digest)
        .unwrap()
        .read_to_end(&mut content)
        .unwrap();
    content
}

#[test]
fn test_write_is_deterministic_and_deduplicated() {
    let temp_dir = TempDir::new().unwrap();
    let cache = open(temp_dir.path());

    let first = cache.write("a.txt", b"same bytes").unwrap();
    let second = cache.write("b.bin", b"same bytes").unwrap();

    assert_eq!(first, second);
    assert_eq!(cache.count(), 1);
    assert_eq!(cache.allocated(), 10);
    assert_eq!(read_all(&cache, &first), b"same bytes");
    assert_eq!(cache.file_info(&first).unwrap().original_file_name, "a.txt");
}

#[test]
fn test_physical_layout_is_sharded() {
    let temp_dir = TempDir::new().unwrap();
    let cache = open(temp_dir.path());

    let digest = cache.write("a", b"hello").unwrap();
    let expected = temp_dir
        .path()
        .join(&digest.hex()[..3])
        .join(digest.hex());
    assert_eq!(cache.physical_path(&digest), expected);
    assert_eq!(fs::read(expected).unwrap(), b"hello");
    assert!(cache.journal_path().ends_with(JOURNAL_FILE_NAME));
}

#[test]
fn test_missing_digest_is_not_found() {
    let temp_dir = TempDir::new().unwrap();
    let cache = open(temp_dir.path());
    let digest = Sha2Calculator::sha256().digest_bytes(b"never written");

    assert!(!cache.exists(&digest));
    assert!(cache.read_byte_channel(&digest).unwrap_err().is_not_found());
    assert!(cache.probe_content_type(&digest).unwrap_err().is_not_found());
    assert!(cache
        .export_file(&digest, &temp_dir.path().join("out"), CopyOptions::default())
        .unwrap_err()
        .is_not_found());
    assert_eq!(cache.statistics().misses, 3);
}

#[test]
fn test_import_and_stream_converge_with_write() {
    let temp_dir = TempDir::new().unwrap();
    let cache = open(&temp_dir.path().join("cache"));

    let source = temp_dir.path().join("source.dat");
    fs::write(&source, b"shared content").unwrap();

    let written = cache.write("x", b"shared content").unwrap();
    let imported = cache.import_file(&source).unwrap();

    let mut entry = cache.new_cache_entry("streamed").unwrap();
    entry.write_all(b"shared ").unwrap();
    entry.write_all(b"content").unwrap();
    let streamed = entry.commit().unwrap();

    assert_eq!(written, imported);
    assert_eq!(written, streamed);
    assert_eq!(cache.count(), 1);

    let shard_files = fs::read_dir(cache.physical_path(&written).parent().unwrap())
        .unwrap()
        .count();
    assert_eq!(shard_files, 1);
}

#[test]
fn test_import_keeps_source_name_for_probing() {
    let temp_dir = TempDir::new().unwrap();
    let cache = open(&temp_dir.path().join("cache"));
    let source = temp_dir.path().join("page.html");
    fs::write(&source, b"<html></html>").unwrap();

    let digest = cache.import_file(&source).unwrap();

    assert_eq!(cache.file_info(&digest).unwrap().original_file_name, "page.html");
    assert_eq!(
        cache.probe_content_type(&digest).unwrap().as_deref(),
        Some("text/html")
    );
    assert!(source.exists());
}

#[test]
fn test_import_missing_source_is_not_found() {
    let temp_dir = TempDir::new().unwrap();
    let cache = open(temp_dir.path());

    let err = cache
        .import_file(&temp_dir.path().join("absent"))
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(staging_files(temp_dir.path()), 0);
}

#[test]
fn test_import_failure_leaves_no_staging_file() {
    let temp_dir = TempDir::new().unwrap();
    let cache = open(&temp_dir.path().join("cache"));
    let source = temp_dir.path().join("page.html");
    fs::write(&source, b"<html></html>").unwrap();
    cache.import_file(&source).unwrap();
    cache.close().unwrap();

    // The hit cannot be journaled once the cache is closed
    assert!(cache.import_file(&source).is_err());
    assert_eq!(staging_files(cache.root()), 0);
}

#[test]
fn test_eviction_follows_recency() {
    let temp_dir = TempDir::new().unwrap();
    let cache = open_with(temp_dir.path(), Arc::new(MaxSizeEvictionStrategy::new(10)));

    let a = cache.write("a", b"AAAAA").unwrap();
    let b = cache.write("b", b"BBBBB").unwrap();
    read_all(&cache, &a);
    let c = cache.write("c", b"CCCCC").unwrap();

    assert!(cache.exists(&a));
    assert!(!cache.exists(&b));
    assert!(cache.exists(&c));
    assert!(!cache.physical_path(&b).exists());
    assert!(cache.allocated() <= 10);
    assert_eq!(cache.statistics().evictions, 1);
}

#[test]
fn test_streamed_entry_dedups_against_existing() {
    let temp_dir = TempDir::new().unwrap();
    let cache = open(temp_dir.path());
    let existing = cache.write("a", b"payload").unwrap();

    let mut entry = cache.new_cache_entry("b").unwrap();
    entry.write_all(b"payload").unwrap();
    let staged = entry.staging_path().to_path_buf();
    assert_eq!(entry.commit().unwrap(), existing);

    assert!(!staged.exists());
    assert_eq!(cache.count(), 1);
}

#[test]
fn test_abort_leaves_cache_untouched() {
    let temp_dir = TempDir::new().unwrap();
    let cache = open(temp_dir.path());

    let mut entry = cache.new_cache_entry("x").unwrap();
    entry.channel().unwrap().write_all(b"discard me").unwrap();
    entry.close_channel().unwrap();
    let staged = entry.staging_path().to_path_buf();
    assert!(staged.exists());

    entry.abort().unwrap();

    assert!(!staged.exists());
    assert_eq!(cache.count(), 0);
    assert_eq!(cache.allocated(), 0);
}

#[test]
fn test_dropped_entry_removes_staging_file() {
    let temp_dir = TempDir::new().unwrap();
    let cache = open(temp_dir.path());

    let staged = {
        let mut entry = cache.new_cache_entry("x").unwrap();
        entry.write_all(b"partial").unwrap();
        entry.staging_path().to_path_buf()
    };

    assert!(!staged.exists());
    assert_eq!(cache.count(), 0);
}

#[test]
fn test_failed_commit_removes_staging_file() {
    let temp_dir = TempDir::new().unwrap();
    let cache = open(temp_dir.path());
    cache.write("a", b"same").unwrap();
    cache.close().unwrap();

    let mut entry = cache.new_cache_entry("b").unwrap();
    entry.write_all(b"same").unwrap();
    let staged = entry.staging_path().to_path_buf();

    assert!(entry.commit().is_err());
    assert!(!staged.exists());
}

#[test]
fn test_write_after_channel_closed_fails() {
    let temp_dir = TempDir::new().unwrap();
    let cache = open(temp_dir.path());

    let mut entry = cache.new_cache_entry("x").unwrap();
    entry.close_channel().unwrap();
    assert!(entry.channel().is_none());
    assert!(entry.write_all(b"late").is_err());
    entry.abort().unwrap();
}

#[test]
fn test_export_copies_bytes_out() {
    let temp_dir = TempDir::new().unwrap();
    let cache = open(&temp_dir.path().join("cache"));
    let digest = cache.write("a", b"exported").unwrap();

    let target = temp_dir.path().join("out").join("file");
    assert_eq!(cache.export_file(&digest, &target, CopyOptions::default()).unwrap(), 8);
    assert_eq!(fs::read(&target).unwrap(), b"exported");

    assert!(cache
        .export_file(&digest, &target, CopyOptions::default())
        .is_err());
    cache
        .export_file(&digest, &target, CopyOptions::REPLACE_EXISTING)
        .unwrap();
}

#[test]
fn test_remove_deletes_entry_and_file() {
    let temp_dir = TempDir::new().unwrap();
    let cache = open(temp_dir.path());
    let digest = cache.write("a", b"gone soon").unwrap();

    assert!(cache.remove(&digest).unwrap());
    assert!(!cache.remove(&digest).unwrap());
    assert!(!cache.exists(&digest));
    assert!(!cache.physical_path(&digest).exists());
    assert_eq!(cache.allocated(), 0);
}

#[test]
fn test_reopen_restores_index_and_order() {
    let temp_dir = TempDir::new().unwrap();
    let (a, b, order) = {
        let cache = open(temp_dir.path());
        let a = cache.write("a.txt", b"first").unwrap();
        let b = cache.write("b.txt", b"second").unwrap();
        cache.probe_content_type(&a).unwrap();
        let order = cache.lru_order();
        cache.close().unwrap();
        (a, b, order)
    };

    let reopened = open(temp_dir.path());
    assert_eq!(reopened.count(), 2);
    assert!(reopened.exists(&a));
    assert!(reopened.exists(&b));
    assert_eq!(reopened.allocated(), 11);
    assert_eq!(reopened.lru_order(), order);
    assert_eq!(reopened.file_info(&b).unwrap().original_file_name, "b.txt");
}

#[test]
fn test_corrupt_journal_resets_cache() {
    let temp_dir = TempDir::new().unwrap();
    let digest = {
        let cache = open(temp_dir.path());
        let digest = cache.write("a", b"content").unwrap();
        cache.close().unwrap();
        digest
    };

    let mut journal = fs::OpenOptions::new()
        .append(true)
        .open(temp_dir.path().join(JOURNAL_FILE_NAME))
        .unwrap();
    journal.write_all(b"NOT|A|VALID|LINE\n").unwrap();
    drop(journal);

    let cache = open(temp_dir.path());
    assert_eq!(cache.count(), 0);
    assert_eq!(cache.allocated(), 0);
    assert!(!cache.physical_path(&digest).exists());

    // Usable afterwards
    let again = cache.write("a", b"content").unwrap();
    assert_eq!(again, digest);
    assert_eq!(cache.count(), 1);
}

#[test]
fn test_compaction_shrinks_journal_and_preserves_state() {
    let temp_dir = TempDir::new().unwrap();
    let cache = open(temp_dir.path());
    let a = cache.write("a", b"a").unwrap();
    let b = cache.write("b", b"b").unwrap();
    for _ in 0..5 {
        read_all(&cache, &a);
    }
    cache.remove(&b).unwrap();
    let c = cache.write("c", b"c").unwrap();

    let before = fs::read_to_string(cache.journal_path()).unwrap().lines().count();
    assert_eq!(cache.compact_journal().unwrap(), 2);
    let after = fs::read_to_string(cache.journal_path()).unwrap();
    assert!(after.lines().count() < before);
    assert!(after.lines().all(|line| line.starts_with("ADD|")));

    let order = cache.lru_order();
    cache.close().unwrap();
    let reopened = open(temp_dir.path());
    assert_eq!(reopened.lru_order(), order);
    assert_eq!(reopened.lru_order(), vec![a, c]);
}

#[test]
fn test_automatic_compaction() {
    let temp_dir = TempDir::new().unwrap();
    let cache = ContentAddressableCache::builder(temp_dir.path())
        .with_calculator(Arc::new(Sha2Calculator::sha256()))
        .with_compaction_threshold(Some(4))
        .open()
        .unwrap();

    let digest = cache.write("a", b"x").unwrap();
    for _ in 0..10 {
        read_all(&cache, &digest);
    }

    let lines = fs::read_to_string(cache.journal_path()).unwrap().lines().count();
    assert!(lines <= 4, "journal has {lines} lines");
}

#[test]
fn test_clear_empties_cache() {
    let temp_dir = TempDir::new().unwrap();
    let cache = open(temp_dir.path());
    let digest = cache.write("a", b"content").unwrap();

    cache.clear().unwrap();

    assert_eq!(cache.count(), 0);
    assert!(!cache.physical_path(&digest).exists());
    assert_eq!(fs::read_to_string(cache.journal_path()).unwrap(), "");

    cache.write("b", b"more").unwrap();
    assert_eq!(cache.count(), 1);
}

#[test]
fn test_eviction_delete_failure_keeps_index_authoritative() {
    let temp_dir = TempDir::new().unwrap();
    let cache = open_with(temp_dir.path(), Arc::new(MaxSizeEvictionStrategy::new(5)));
    let a = cache.write("a", b"12345").unwrap();

    let physical = cache.physical_path(&a);
    fs::remove_file(&physical).unwrap();
    fs::create_dir_all(physical.join("blocker")).unwrap();

    let b = cache.write("b", b"67890").unwrap();

    assert!(!cache.exists(&a));
    assert!(cache.exists(&b));
    assert!(physical.exists());
    assert_eq!(cache.allocated(), 5);
}

#[test]
fn test_default_builder_uses_sha512() {
    let temp_dir = TempDir::new().unwrap();
    let cache = ContentAddressableCache::builder(temp_dir.path()).open().unwrap();
    let digest = cache.write("a", b"x").unwrap();
    assert_eq!(digest.hex().len(), 128);
}

/// Closes the cache the first time it is asked to evict, so the `Remove`
/// record of that eviction cannot be journaled
#[derive(Debug, Default)]
struct CloseOnEvict {
    cache: std::sync::OnceLock<std::sync::Weak<ContentAddressableCache>>,
}

impl EvictionStrategy for CloseOnEvict {
    fn should_evict(&self, count: u64, _allocated: u64) -> bool {
        if count == 0 {
            return false;
        }
        if let Some(cache) = self.cache.get().and_then(|c| c.upgrade()) {
            cache.close().unwrap();
        }
        true
    }

    fn name(&self) -> &'static str {
        "close-on-evict"
    }
}

#[test]
fn test_failed_eviction_does_not_fail_the_write() {
    let temp_dir = TempDir::new().unwrap();
    let strategy = Arc::new(CloseOnEvict::default());
    let cache = Arc::new(open_with(temp_dir.path(), strategy.clone()));
    strategy.cache.set(Arc::downgrade(&cache)).unwrap();

    let digest = cache.write("a", b"durable").unwrap();

    // The entry whose removal could not be journaled stays indexed
    assert!(cache.exists(&digest));
    assert!(cache.physical_path(&digest).exists());
    drop(cache);

    let reopened = open(temp_dir.path());
    assert!(reopened.exists(&digest));
    assert_eq!(read_all(&reopened, &digest), b"durable");
}
