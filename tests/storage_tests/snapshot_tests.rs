//! Snapshot Tests
//!
//! These tests verify:
//! - Save/load preserves every entry
//! - Header validation (magic, version, length)
//! - Checksum detection of corrupted bodies
//! - A failed load leaves the store untouched

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;
use vstorage::storage::{load_snapshot, save_snapshot, SNAPSHOT_MAGIC, SNAPSHOT_VERSION};
use vstorage::{MemoryStore, Storage, VstorageError};

// =============================================================================
// Helper Functions
// =============================================================================

fn snapshot_path(dir: &TempDir) -> PathBuf {
    dir.path().join("store.snap")
}

fn sample_store() -> MemoryStore {
    MemoryStore::from_entries([
        ("published/agoricNames/brand", "{\"BLD\":1}"),
        ("published/wallet/agoric1abc", "wallet"),
        ("bundles", ""),
    ])
    .unwrap()
}

fn write_sample(dir: &TempDir) -> PathBuf {
    let path = snapshot_path(dir);
    save_snapshot(&sample_store(), &path).unwrap();
    path
}

// =============================================================================
// Round-Trip Tests
// =============================================================================

#[test]
fn test_save_and_load() {
    let dir = TempDir::new().unwrap();
    let path = write_sample(&dir);

    let restored = MemoryStore::new();
    let count = load_snapshot(&restored, &path).unwrap();

    assert_eq!(count, sample_store().len());
    assert_eq!(restored.entries(), sample_store().entries());
    assert_eq!(
        restored.get_value("published/agoricNames/brand").unwrap(),
        Some("{\"BLD\":1}".to_string())
    );
}

#[test]
fn test_empty_store_snapshot() {
    let dir = TempDir::new().unwrap();
    let path = snapshot_path(&dir);
    save_snapshot(&MemoryStore::new(), &path).unwrap();

    let restored = MemoryStore::new();
    assert_eq!(load_snapshot(&restored, &path).unwrap(), 0);
    assert!(restored.is_empty());
}

#[test]
fn test_load_merges_into_existing_store() {
    let dir = TempDir::new().unwrap();
    let path = write_sample(&dir);

    let store = MemoryStore::from_entries([("bundles", "old"), ("local", "kept")]).unwrap();
    load_snapshot(&store, &path).unwrap();

    assert_eq!(store.get_value("bundles").unwrap(), Some(String::new()));
    assert_eq!(store.get_value("local").unwrap(), Some("kept".to_string()));
}

#[test]
fn test_save_overwrites_existing_file() {
    let dir = TempDir::new().unwrap();
    let path = write_sample(&dir);

    save_snapshot(&MemoryStore::from_entries([("only", "one")]).unwrap(), &path).unwrap();

    let restored = MemoryStore::new();
    assert_eq!(load_snapshot(&restored, &path).unwrap(), 1);
    assert_eq!(restored.get_value("bundles").unwrap(), None);
}

#[test]
fn test_header_layout() {
    let dir = TempDir::new().unwrap();
    let path = write_sample(&dir);
    let bytes = fs::read(&path).unwrap();

    assert_eq!(&bytes[0..4], SNAPSHOT_MAGIC);
    assert_eq!(u16::from_le_bytes([bytes[4], bytes[5]]), SNAPSHOT_VERSION);
    let crc = u32::from_le_bytes([bytes[6], bytes[7], bytes[8], bytes[9]]);
    let len = u32::from_le_bytes([bytes[10], bytes[11], bytes[12], bytes[13]]) as usize;
    assert_eq!(bytes.len(), 14 + len);
    assert_eq!(crc32fast::hash(&bytes[14..]), crc);
}

// =============================================================================
// Corruption Tests
// =============================================================================

fn assert_snapshot_error(path: &PathBuf) {
    let store = MemoryStore::from_entries([("untouched", "yes")]).unwrap();
    let before = store.entries();

    match load_snapshot(&store, path) {
        Err(VstorageError::Snapshot(_)) => {}
        other => panic!("expected snapshot error, got {:?}", other),
    }
    assert_eq!(store.entries(), before);
}

#[test]
fn test_bad_magic() {
    let dir = TempDir::new().unwrap();
    let path = write_sample(&dir);
    let mut bytes = fs::read(&path).unwrap();
    bytes[0] = b'X';
    fs::write(&path, &bytes).unwrap();

    assert_snapshot_error(&path);
}

#[test]
fn test_unsupported_version() {
    let dir = TempDir::new().unwrap();
    let path = write_sample(&dir);
    let mut bytes = fs::read(&path).unwrap();
    bytes[4..6].copy_from_slice(&(SNAPSHOT_VERSION + 1).to_le_bytes());
    fs::write(&path, &bytes).unwrap();

    assert_snapshot_error(&path);
}

#[test]
fn test_corrupted_body() {
    let dir = TempDir::new().unwrap();
    let path = write_sample(&dir);
    let mut bytes = fs::read(&path).unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0xFF;
    fs::write(&path, &bytes).unwrap();

    assert_snapshot_error(&path);
}

#[test]
fn test_truncated_body() {
    let dir = TempDir::new().unwrap();
    let path = write_sample(&dir);
    let bytes = fs::read(&path).unwrap();
    fs::write(&path, &bytes[..bytes.len() - 3]).unwrap();

    assert_snapshot_error(&path);
}

#[test]
fn test_truncated_header() {
    let dir = TempDir::new().unwrap();
    let path = snapshot_path(&dir);
    fs::write(&path, b"VSTS\x01").unwrap();

    assert_snapshot_error(&path);
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let result = load_snapshot(&MemoryStore::new(), &dir.path().join("absent.snap"));
    assert!(matches!(result, Err(VstorageError::Io(_))));
}

#[test]
fn test_invalid_path_in_snapshot_loads_nothing() {
    let entries = vec![
        ("good/path".to_string(), "1".to_string()),
        ("bad//path".to_string(), "2".to_string()),
    ];
    let body = bincode::serialize(&entries).unwrap();

    let mut bytes = Vec::new();
    bytes.extend_from_slice(SNAPSHOT_MAGIC);
    bytes.extend_from_slice(&SNAPSHOT_VERSION.to_le_bytes());
    bytes.extend_from_slice(&crc32fast::hash(&body).to_le_bytes());
    bytes.extend_from_slice(&(body.len() as u32).to_le_bytes());
    bytes.extend_from_slice(&body);

    let dir = TempDir::new().unwrap();
    let path = snapshot_path(&dir);
    fs::write(&path, &bytes).unwrap();

    let store = MemoryStore::new();
    assert!(matches!(
        load_snapshot(&store, &path),
        Err(VstorageError::InvalidPath(_))
    ));
    assert!(store.is_empty());
}
