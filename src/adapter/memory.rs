use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::adapter::CacheAdapter;
use crate::entry::CacheEntry;
use crate::error::{AdapterError, AdapterResult};

/// Volatile in-process adapter backed by a `HashMap`.
///
/// Mutations are per-key atomic through the internal mutex, so the same
/// instance can be shared across threads (behind an `Arc`) without extra
/// locking at the cache layer.
#[derive(Debug, Default)]
pub struct MemoryAdapter {
    data: Mutex<HashMap<String, CacheEntry>>,
}

impl MemoryAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> AdapterResult<MutexGuard<'_, HashMap<String, CacheEntry>>> {
        self.data.lock().map_err(|_| AdapterError::Poisoned)
    }
}

impl CacheAdapter for MemoryAdapter {
    fn get(&self, store_key: &str, ignore_ttl: bool) -> AdapterResult<Option<CacheEntry>> {
        let mut data = self.lock()?;

        let Some(entry) = data.get(store_key) else {
            return Ok(None);
        };

        if !ignore_ttl && entry.is_expired() {
            data.remove(store_key);
            debug!(store_key, "removed expired entry on read");
            return Ok(None);
        }

        Ok(Some(entry.clone()))
    }

    fn exists(&self, store_key: &str) -> AdapterResult<bool> {
        Ok(self.lock()?.contains_key(store_key))
    }

    fn put(
        &self,
        store_key: &str,
        payload: Vec<u8>,
        expires_at: Option<DateTime<Utc>>,
    ) -> AdapterResult<()> {
        self.lock()?
            .insert(store_key.to_string(), CacheEntry::new(payload, expires_at));
        Ok(())
    }

    fn remove(&self, store_key: &str) -> AdapterResult<bool> {
        Ok(self.lock()?.remove(store_key).is_some())
    }

    fn remove_all(&self) -> AdapterResult<()> {
        self.lock()?.clear();
        Ok(())
    }

    fn get_keys(&self) -> AdapterResult<Vec<String>> {
        Ok(self.lock()?.keys().cloned().collect())
    }
}
