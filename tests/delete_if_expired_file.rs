//! The expired-entry read policies against the filesystem adapter.

use std::sync::Arc;
use std::thread::sleep;
use std::time::Duration;

use swapcache::{Cache, CacheAdapter, FileAdapter, JsonSerializer, Serializer};
use tempfile::TempDir;

fn file_cache() -> (Cache<Arc<FileAdapter>, JsonSerializer>, Arc<FileAdapter>, TempDir) {
    let dir = TempDir::new().unwrap();
    let adapter = Arc::new(FileAdapter::new(dir.path()).unwrap());
    let cache = Cache::new(Arc::clone(&adapter), JsonSerializer);
    (cache, adapter, dir)
}

#[test]
fn enforcing_read_deletes_expired_file() {
    let (mut cache, adapter, _dir) = file_cache();

    assert!(cache.set_item("test_key_file", &"test_value", Duration::from_secs(1)));
    assert_eq!(
        cache.get_item::<String>("test_key_file").as_deref(),
        Some("test_value")
    );

    let store_key = cache.calculate_store_key("test_key_file");
    sleep(Duration::from_secs(2));

    assert!(adapter.get(&store_key, false).unwrap().is_none());
    assert!(!adapter.exists(&store_key).unwrap());
}

#[test]
fn bypass_read_keeps_expired_file_until_enforced() {
    let (mut cache, adapter, _dir) = file_cache();

    assert!(cache.set_item("test_key_file2", &"test_value2", Duration::from_secs(1)));
    assert_eq!(
        cache.get_item::<String>("test_key_file2").as_deref(),
        Some("test_value2")
    );

    let store_key = cache.calculate_store_key("test_key_file2");
    sleep(Duration::from_secs(2));

    // Bypass read decodes the stale payload and leaves the file on disk.
    let entry = adapter
        .get(&store_key, true)
        .unwrap()
        .expect("stale entry should still be readable with ignore_ttl");
    let value: String = JsonSerializer.unserialize(&entry.payload).unwrap();
    assert_eq!(value, "test_value2");
    assert!(adapter.exists(&store_key).unwrap());

    // An enforcing read then deletes it.
    assert!(adapter.get(&store_key, false).unwrap().is_none());
    assert!(!adapter.exists(&store_key).unwrap());
}

#[test]
fn default_cache_read_deletes_expired_file() {
    let (mut cache, adapter, _dir) = file_cache();

    assert!(cache.set_item("test_key_file3", &"test_value3", Duration::from_secs(1)));
    let store_key = cache.calculate_store_key("test_key_file3");
    sleep(Duration::from_secs(2));

    assert_eq!(cache.get_item::<String>("test_key_file3"), None);
    assert!(!adapter.exists(&store_key).unwrap());
}

#[test]
fn entries_survive_cache_reconstruction_with_same_prefix() {
    let dir = TempDir::new().unwrap();

    {
        let adapter = FileAdapter::new(dir.path()).unwrap();
        let mut cache = Cache::new(adapter, JsonSerializer).with_prefix("app");
        assert!(cache.set_item("persisted", &42_i64, Duration::ZERO));
    }

    // A new cache over a new adapter, same directory and prefix, must
    // derive the same store key and find the entry.
    let adapter = FileAdapter::new(dir.path()).unwrap();
    let mut cache = Cache::new(adapter, JsonSerializer).with_prefix("app");
    assert_eq!(cache.get_item::<i64>("persisted"), Some(42));
}
