//! Tests for FileStorage
//!
//! These tests verify:
//! - Create / update / lookup semantics and their recoverable outcomes
//! - Keys that are prefixes of each other stay independent
//! - Scan completeness across sharding depths
//! - Reopening a root serves everything previously committed

use std::collections::BTreeSet;

use ctstore::storage::FileStorage;
use ctstore::StoreError;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_storage(depth: usize) -> (TempDir, FileStorage) {
    let temp_dir = TempDir::new().unwrap();
    let storage = FileStorage::open(temp_dir.path(), depth);
    (temp_dir, storage)
}

// =============================================================================
// Basic Operations Tests
// =============================================================================

#[test]
fn test_create_then_lookup() {
    let (_temp, mut storage) = setup_temp_storage(3);

    storage.create_entry(b"1234xyzw", b"unicorn").unwrap();

    assert_eq!(storage.lookup_entry(b"1234xyzw").unwrap(), b"unicorn");
}

#[test]
fn test_lookup_requires_exact_key() {
    let (_temp, mut storage) = setup_temp_storage(3);
    storage.create_entry(b"1234xyzw", b"unicorn").unwrap();

    for probe in [&b"1234xyz"[..], b"1234xyzwq", b"1234xyzv", b"", b"1"] {
        assert!(
            matches!(storage.lookup_entry(probe), Err(StoreError::NotFound)),
            "unexpected hit for {:?}",
            probe
        );
    }
}

#[test]
fn test_create_existing_key_keeps_value() {
    let (_temp, mut storage) = setup_temp_storage(3);
    storage.create_entry(b"1234xyzw", b"unicorn").unwrap();

    let result = storage.create_entry(b"1234xyzw", b"pegasus");

    assert!(matches!(result, Err(StoreError::EntryAlreadyExists)));
    assert_eq!(storage.lookup_entry(b"1234xyzw").unwrap(), b"unicorn");
}

#[test]
fn test_update_replaces_value() {
    let (_temp, mut storage) = setup_temp_storage(3);
    storage.create_entry(b"1245abcd", b"Alice").unwrap();

    storage.update_entry(b"1245abcd", b"Bob").unwrap();

    assert_eq!(storage.lookup_entry(b"1245abcd").unwrap(), b"Bob");
}

#[test]
fn test_update_missing_key_creates_nothing() {
    let (_temp, mut storage) = setup_temp_storage(3);

    let result = storage.update_entry(b"1245abcd", b"Bob");

    assert!(matches!(result, Err(StoreError::NotFound)));
    assert!(matches!(
        storage.lookup_entry(b"1245abcd"),
        Err(StoreError::NotFound)
    ));
    assert!(storage.scan().is_empty());
}

#[test]
fn test_empty_value_is_stored() {
    let (_temp, mut storage) = setup_temp_storage(2);

    storage.create_entry(b"empty", b"").unwrap();

    assert_eq!(storage.lookup_entry(b"empty").unwrap(), Vec::<u8>::new());
    assert!(storage.contains_entry(b"empty"));
}

#[test]
fn test_binary_keys_and_values() {
    let (_temp, mut storage) = setup_temp_storage(2);
    let key = [0x00, 0xff, 0x2f, 0x2e, 0x00];
    let value: Vec<u8> = (0..=255u8).collect();

    storage.create_entry(&key, &value).unwrap();

    assert_eq!(storage.lookup_entry(&key).unwrap(), value);
}

// =============================================================================
// Prefix and Short Key Tests
// =============================================================================

#[test]
fn test_prefix_keys_are_independent() {
    let (_temp, mut storage) = setup_temp_storage(3);
    let keys: [&[u8]; 6] = [b"", b"1", b"12", b"123", b"1234", b"12345"];

    for (i, key) in keys.iter().enumerate() {
        storage.create_entry(key, format!("value-{}", i).as_bytes()).unwrap();
    }

    for (i, key) in keys.iter().enumerate() {
        assert_eq!(
            storage.lookup_entry(key).unwrap(),
            format!("value-{}", i).as_bytes()
        );
    }

    let expected: BTreeSet<Vec<u8>> = keys.iter().map(|k| k.to_vec()).collect();
    assert_eq!(storage.scan(), expected);
}

#[test]
fn test_short_key_created_after_longer_sibling() {
    let (_temp, mut storage) = setup_temp_storage(3);

    storage.create_entry(b"1234xyzw", b"long").unwrap();
    storage.create_entry(b"12", b"short").unwrap();

    assert_eq!(storage.lookup_entry(b"12").unwrap(), b"short");
    assert_eq!(storage.lookup_entry(b"1234xyzw").unwrap(), b"long");
}

#[test]
fn test_empty_key() {
    let (_temp, mut storage) = setup_temp_storage(3);

    storage.create_entry(b"", b"root value").unwrap();

    assert_eq!(storage.lookup_entry(b"").unwrap(), b"root value");
    assert!(matches!(
        storage.create_entry(b"", b"again"),
        Err(StoreError::EntryAlreadyExists)
    ));
    assert_eq!(storage.scan(), BTreeSet::from([Vec::new()]));
}

#[test]
fn test_long_keys() {
    let (_temp, mut storage) = setup_temp_storage(3);
    let long: Vec<u8> = (0..1000u32).map(|i| (i % 251) as u8).collect();
    let longer_sibling = [long.as_slice(), &b"!"[..]].concat();
    let shorter_prefix = long[..600].to_vec();

    storage.create_entry(&long, b"long").unwrap();
    storage.create_entry(&longer_sibling, b"sibling").unwrap();
    storage.create_entry(&shorter_prefix, b"prefix").unwrap();

    assert_eq!(storage.lookup_entry(&long).unwrap(), b"long");
    assert_eq!(storage.lookup_entry(&longer_sibling).unwrap(), b"sibling");
    assert_eq!(storage.lookup_entry(&shorter_prefix).unwrap(), b"prefix");
    assert!(matches!(
        storage.lookup_entry(&long[..999]),
        Err(StoreError::NotFound)
    ));
    assert!(matches!(
        storage.create_entry(&long, b"again"),
        Err(StoreError::EntryAlreadyExists)
    ));

    storage.update_entry(&long, b"updated").unwrap();
    assert_eq!(storage.lookup_entry(&long).unwrap(), b"updated");

    let expected = BTreeSet::from([long, longer_sibling, shorter_prefix]);
    assert_eq!(storage.scan(), expected);
}

// =============================================================================
// Depth Tests
// =============================================================================

#[test]
fn test_depth_zero_keeps_entries_in_root() {
    let (temp, mut storage) = setup_temp_storage(0);

    storage.create_entry(b"ab", b"flat").unwrap();
    storage.create_entry(b"", b"empty").unwrap();

    assert!(temp.path().join("6162").is_file());
    assert!(temp.path().join("_").is_file());
    assert_eq!(storage.lookup_entry(b"ab").unwrap(), b"flat");
    assert_eq!(storage.scan().len(), 2);
}

#[test]
fn test_scan_is_complete_across_depths() {
    let keys: Vec<Vec<u8>> = vec![
        b"".to_vec(),
        b"a".to_vec(),
        b"ab".to_vec(),
        b"abc".to_vec(),
        b"abcd".to_vec(),
        b"abd".to_vec(),
        b"b".to_vec(),
        b"1234xyzw".to_vec(),
        b"1245abcd".to_vec(),
        vec![0x00],
        vec![0xff, 0xfe, 0xfd, 0xfc, 0xfb],
    ];

    for depth in 0..=5 {
        let (_temp, mut storage) = setup_temp_storage(depth);
        for key in &keys {
            storage.create_entry(key, key).unwrap();
        }

        let expected: BTreeSet<Vec<u8>> = keys.iter().cloned().collect();
        assert_eq!(storage.scan(), expected, "depth {}", depth);
    }
}

#[test]
fn test_scan_skips_foreign_files() {
    let (temp, mut storage) = setup_temp_storage(2);
    storage.create_entry(b"key", b"value").unwrap();

    std::fs::write(temp.path().join("README"), b"not an entry").unwrap();
    std::fs::create_dir(temp.path().join("lost+found")).unwrap();
    std::fs::write(temp.path().join("6b").join("65").join("79.tmp"), b"partial").unwrap();

    assert_eq!(storage.scan(), BTreeSet::from([b"key".to_vec()]));
}

#[test]
fn test_scan_counts_directory_listings() {
    let (_temp, mut storage) = setup_temp_storage(2);
    storage.create_entry(b"abc", b"1").unwrap();

    let before = storage.op_count();
    storage.scan();

    // root, 61/, 61/62/
    assert_eq!(storage.op_count() - before, 3);
}

// =============================================================================
// Persistence Tests
// =============================================================================

#[test]
fn test_reopen_serves_committed_entries() {
    let temp_dir = TempDir::new().unwrap();

    {
        let mut storage = FileStorage::open(temp_dir.path(), 3);
        storage.create_entry(b"1234xyzw", b"unicorn").unwrap();
        storage.create_entry(b"1245abcd", b"Alice").unwrap();
        storage.update_entry(b"1245abcd", b"Bob").unwrap();
    }

    let storage = FileStorage::open(temp_dir.path(), 3);
    assert_eq!(storage.lookup_entry(b"1234xyzw").unwrap(), b"unicorn");
    assert_eq!(storage.lookup_entry(b"1245abcd").unwrap(), b"Bob");
    assert_eq!(storage.scan().len(), 2);
}

#[test]
fn test_many_entries() {
    let (_temp, mut storage) = setup_temp_storage(2);

    for i in 0..500u32 {
        storage.create_entry(&i.to_be_bytes(), &i.to_le_bytes()).unwrap();
    }

    for i in 0..500u32 {
        assert_eq!(storage.lookup_entry(&i.to_be_bytes()).unwrap(), i.to_le_bytes());
    }
    assert_eq!(storage.scan().len(), 500);
}
