use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::adapter::CacheAdapter;
use crate::entry::CacheEntry;
use crate::error::{AdapterError, AdapterResult};

const ENTRY_EXTENSION: &str = "cache";

/// Filesystem adapter storing one bincode-encoded [`CacheEntry`] file per
/// store key.
///
/// Store keys produced by the cache layer are fixed-width hex hashes, so
/// the key doubles as a safe file name and the key→path mapping is pure:
/// a fresh adapter pointed at the same directory finds entries written by
/// an earlier process.
///
/// Writes go to a uuid-named temp file first and are moved into place with
/// `rename`, so racing writers resolve to last-writer-wins and readers
/// never observe a half-written entry.
pub struct FileAdapter {
    cache_directory: PathBuf,
}

impl FileAdapter {
    pub fn new(cache_directory: impl Into<PathBuf>) -> AdapterResult<Self> {
        let cache_directory = cache_directory.into();
        fs::create_dir_all(&cache_directory)?;
        Ok(Self { cache_directory })
    }

    fn entry_path(&self, store_key: &str) -> PathBuf {
        self.cache_directory
            .join(format!("{store_key}.{ENTRY_EXTENSION}"))
    }

    /// Reads and decodes an entry file. A file that exists but cannot be
    /// decoded is corrupt: it is removed and reported as absent.
    fn read_entry(&self, path: &Path) -> AdapterResult<Option<CacheEntry>> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match bincode::deserialize(&bytes) {
            Ok(entry) => Ok(Some(entry)),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "removing corrupt cache file");
                remove_if_present(path)?;
                Ok(None)
            }
        }
    }
}

impl CacheAdapter for FileAdapter {
    fn get(&self, store_key: &str, ignore_ttl: bool) -> AdapterResult<Option<CacheEntry>> {
        let path = self.entry_path(store_key);

        let Some(entry) = self.read_entry(&path)? else {
            return Ok(None);
        };

        if !ignore_ttl && entry.is_expired() {
            remove_if_present(&path)?;
            debug!(store_key, "removed expired entry on read");
            return Ok(None);
        }

        Ok(Some(entry))
    }

    fn exists(&self, store_key: &str) -> AdapterResult<bool> {
        Ok(self.entry_path(store_key).try_exists()?)
    }

    fn put(
        &self,
        store_key: &str,
        payload: Vec<u8>,
        expires_at: Option<DateTime<Utc>>,
    ) -> AdapterResult<()> {
        let entry = CacheEntry::new(payload, expires_at);
        let bytes = bincode::serialize(&entry).map_err(|e| AdapterError::Encode(e.to_string()))?;

        let temp_path = self
            .cache_directory
            .join(format!("{}.tmp", Uuid::new_v4().hyphenated()));
        fs::write(&temp_path, &bytes)?;
        if let Err(e) = fs::rename(&temp_path, self.entry_path(store_key)) {
            let _ = remove_if_present(&temp_path);
            return Err(e.into());
        }

        Ok(())
    }

    fn remove(&self, store_key: &str) -> AdapterResult<bool> {
        remove_if_present(&self.entry_path(store_key))
    }

    fn remove_all(&self) -> AdapterResult<()> {
        for dir_entry in fs::read_dir(&self.cache_directory)? {
            let path = dir_entry?.path();
            if path.extension().map_or(false, |ext| ext == ENTRY_EXTENSION || ext == "tmp") {
                remove_if_present(&path)?;
            }
        }
        Ok(())
    }

    fn get_keys(&self) -> AdapterResult<Vec<String>> {
        let mut keys = Vec::new();
        for dir_entry in fs::read_dir(&self.cache_directory)? {
            let path = dir_entry?.path();
            if path.extension().map_or(false, |ext| ext == ENTRY_EXTENSION) {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    keys.push(stem.to_string());
                }
            }
        }
        Ok(keys)
    }
}

fn remove_if_present(path: &Path) -> AdapterResult<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::tempdir;

    #[test]
    fn put_get_round_trip() {
        let dir = tempdir().unwrap();
        let adapter = FileAdapter::new(dir.path()).unwrap();

        adapter.put("deadbeef", b"blob".to_vec(), None).unwrap();

        let entry = adapter.get("deadbeef", false).unwrap().unwrap();
        assert_eq!(entry.payload, b"blob");
    }

    #[test]
    fn entries_survive_adapter_reconstruction() {
        let dir = tempdir().unwrap();

        {
            let adapter = FileAdapter::new(dir.path()).unwrap();
            adapter.put("deadbeef", b"blob".to_vec(), None).unwrap();
        }

        let adapter = FileAdapter::new(dir.path()).unwrap();
        let entry = adapter.get("deadbeef", false).unwrap().unwrap();
        assert_eq!(entry.payload, b"blob");
    }

    #[test]
    fn enforcing_read_deletes_expired_file() {
        let dir = tempdir().unwrap();
        let adapter = FileAdapter::new(dir.path()).unwrap();
        let past = Utc::now() - Duration::seconds(1);

        adapter.put("deadbeef", b"blob".to_vec(), Some(past)).unwrap();

        assert!(adapter.get("deadbeef", false).unwrap().is_none());
        assert!(!adapter.exists("deadbeef").unwrap());
    }

    #[test]
    fn bypass_read_keeps_expired_file() {
        let dir = tempdir().unwrap();
        let adapter = FileAdapter::new(dir.path()).unwrap();
        let past = Utc::now() - Duration::seconds(1);

        adapter.put("deadbeef", b"blob".to_vec(), Some(past)).unwrap();

        let entry = adapter.get("deadbeef", true).unwrap().unwrap();
        assert_eq!(entry.payload, b"blob");
        assert!(adapter.exists("deadbeef").unwrap());
    }

    #[test]
    fn corrupt_file_is_treated_as_absent_and_removed() {
        let dir = tempdir().unwrap();
        let adapter = FileAdapter::new(dir.path()).unwrap();

        fs::write(dir.path().join("deadbeef.cache"), b"\x00garbage").unwrap();

        assert!(adapter.get("deadbeef", false).unwrap().is_none());
        assert!(!adapter.exists("deadbeef").unwrap());
    }

    #[test]
    fn failed_rename_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        let adapter = FileAdapter::new(dir.path()).unwrap();

        // A directory squatting on the entry path makes the final rename
        // fail after the temp file was written.
        fs::create_dir(dir.path().join("deadbeef.cache")).unwrap();

        assert!(adapter.put("deadbeef", b"blob".to_vec(), None).is_err());

        let leftover_temp = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .any(|e| e.path().extension().map_or(false, |ext| ext == "tmp"));
        assert!(!leftover_temp);
    }

    #[test]
    fn remove_all_clears_only_cache_files() {
        let dir = tempdir().unwrap();
        let adapter = FileAdapter::new(dir.path()).unwrap();

        adapter.put("a1", b"1".to_vec(), None).unwrap();
        adapter.put("b2", b"2".to_vec(), None).unwrap();
        fs::write(dir.path().join("unrelated.txt"), b"keep me").unwrap();

        adapter.remove_all().unwrap();

        assert!(adapter.get_keys().unwrap().is_empty());
        assert!(dir.path().join("unrelated.txt").exists());
    }
}
