//! Tests for hybrid routing

use super::*;
use crate::eviction::NeverEvict;
use ocflstore_core::SharedTransactionContext;
use std::io::{Read, Seek, SeekFrom, Write};
use tempfile::TempDir;

struct Fixture {
    _temp_dir: TempDir,
    context: Arc<SharedTransactionContext>,
    storage: HybridTempFileStorage,
}

fn fixture() -> Fixture {
    let temp_dir = TempDir::new().unwrap();
    let context = Arc::new(SharedTransactionContext::new());
    let transactional = Arc::new(
        TransactionalTempFileStorage::new(temp_dir.path().join("transactions"), context.clone())
            .unwrap(),
    );
    let rolling = Arc::new(
        RollingCacheStorage::new(temp_dir.path().join("rolling"), Arc::new(NeverEvict)).unwrap(),
    );
    Fixture {
        _temp_dir: temp_dir,
        context,
        storage: HybridTempFileStorage::new(transactional, rolling),
    }
}

fn address(name: &str) -> VersionedPath {
    VersionedPath::head("obj", name).unwrap()
}

fn write_with(storage: &dyn TempFileStorage, name: &str, options: OpenOptionSet, content: &[u8]) {
    let mut channel = storage.new_byte_channel(&address(name), options).unwrap();
    channel.write_all(content).unwrap();
    channel.close().unwrap();
}

fn read(storage: &dyn TempFileStorage, name: &str) -> String {
    let mut content = String::new();
    storage
        .new_byte_channel(&address(name), OpenOptionSet::READ)
        .unwrap()
        .read_to_string(&mut content)
        .unwrap();
    content
}

fn read_rolling(fixture: &Fixture, name: &str) -> String {
    read(&**fixture.storage.rolling(), name)
}

#[test]
fn test_without_transaction_everything_goes_to_rolling() {
    let f = fixture();
    write_with(&f.storage, "a", OpenOptionSet::create_truncate(), b"base");

    assert_eq!(read_rolling(&f, "a"), "base");
    assert_eq!(f.storage.rolling().count(), 1);
    assert_eq!(read(&f.storage, "a"), "base");
}

#[test]
fn test_append_in_transaction_materializes_overlay() {
    let f = fixture();
    write_with(&f.storage, "a", OpenOptionSet::create_truncate(), b"base");

    f.context.begin(TransactionId(7));
    write_with(&f.storage, "a", OpenOptionSet::APPEND, b"+more");

    assert_eq!(read(&f.storage, "a"), "base+more");
    assert_eq!(read_rolling(&f, "a"), "base");

    let overlay = f
        .storage
        .transactional()
        .to_physical_path_for(TransactionId(7), &address("a"));
    assert_eq!(std::fs::read(overlay).unwrap(), b"base+more");
}

#[test]
fn test_truncate_in_transaction_starts_empty_overlay() {
    let f = fixture();
    write_with(&f.storage, "a", OpenOptionSet::create_truncate(), b"base");

    f.context.begin(TransactionId(1));
    write_with(
        &f.storage,
        "a",
        OpenOptionSet::WRITE | OpenOptionSet::TRUNCATE_EXISTING,
        b"new",
    );

    assert_eq!(read(&f.storage, "a"), "new");
    assert_eq!(read_rolling(&f, "a"), "base");
}

#[test]
fn test_plain_write_keeps_untouched_bytes() {
    let f = fixture();
    write_with(&f.storage, "a", OpenOptionSet::create_truncate(), b"abcdef");

    f.context.begin(TransactionId(1));
    let mut channel = f
        .storage
        .new_byte_channel(&address("a"), OpenOptionSet::WRITE)
        .unwrap();
    channel.seek(SeekFrom::Start(2)).unwrap();
    channel.write_all(b"XY").unwrap();
    channel.close().unwrap();

    assert_eq!(read(&f.storage, "a"), "abXYef");
    assert_eq!(read_rolling(&f, "a"), "abcdef");
}

#[test]
fn test_create_new_conflicts_with_rolling_file() {
    let f = fixture();
    write_with(&f.storage, "a", OpenOptionSet::create_truncate(), b"base");

    f.context.begin(TransactionId(1));
    let err = f
        .storage
        .new_byte_channel(&address("a"), OpenOptionSet::WRITE | OpenOptionSet::CREATE_NEW)
        .unwrap_err();
    assert_eq!(err.io_kind(), Some(io::ErrorKind::AlreadyExists));
}

#[test]
fn test_new_file_in_transaction_is_isolated() {
    let f = fixture();
    f.context.begin(TransactionId(3));
    write_with(&f.storage, "fresh", OpenOptionSet::create_truncate(), b"tx only");

    assert!(f.storage.exists(&address("fresh")).unwrap());
    assert!(!f.storage.rolling().exists(&address("fresh")).unwrap());

    f.context.end();
    assert!(!f.storage.exists(&address("fresh")).unwrap());
}

#[test]
fn test_copy_and_move_from_rolling_leave_rolling_untouched() {
    let f = fixture();
    write_with(&f.storage, "src", OpenOptionSet::create_truncate(), b"payload");

    f.context.begin(TransactionId(5));
    f.storage
        .copy(&address("src"), &address("copied"), CopyOptions::default())
        .unwrap();
    f.storage
        .move_file(&address("src"), &address("moved"), CopyOptions::default())
        .unwrap();

    assert_eq!(read(&f.storage, "copied"), "payload");
    assert_eq!(read(&f.storage, "moved"), "payload");
    assert!(f.storage.rolling().exists(&address("src")).unwrap());
    assert!(!f.storage.rolling().exists(&address("copied")).unwrap());
    assert!(!f.storage.rolling().exists(&address("moved")).unwrap());
}

#[test]
fn test_copy_of_missing_source_is_not_found() {
    let f = fixture();
    f.context.begin(TransactionId(5));
    let err = f
        .storage
        .copy(&address("nope"), &address("x"), CopyOptions::default())
        .unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_delete_in_transaction_only_affects_overlay() {
    let f = fixture();
    write_with(&f.storage, "a", OpenOptionSet::create_truncate(), b"base");

    f.context.begin(TransactionId(9));
    write_with(&f.storage, "a", OpenOptionSet::APPEND, b"!");
    assert!(f.storage.delete_if_exists(&address("a")).unwrap());

    assert_eq!(read(&f.storage, "a"), "base");
    assert!(f.storage.rolling().exists(&address("a")).unwrap());
}

#[test]
fn test_purge_discards_overlay() {
    let f = fixture();
    write_with(&f.storage, "a", OpenOptionSet::create_truncate(), b"base");

    f.context.begin(TransactionId(2));
    write_with(&f.storage, "a", OpenOptionSet::APPEND, b"-tx");
    assert!(f.storage.purge(TransactionId(2)).unwrap());

    assert_eq!(read(&f.storage, "a"), "base");
    assert_eq!(f.storage.size(&address("a")).unwrap(), 4);
}
