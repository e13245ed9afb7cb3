pub mod file;
pub mod memory;

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::entry::CacheEntry;
use crate::error::AdapterResult;

/// Pluggable storage backend contract consumed by [`Cache`](crate::Cache).
///
/// Adapters persist opaque [`CacheEntry`] values under store keys and know
/// nothing about application-level values beyond honoring the expiry
/// instant embedded in what they store. The expiry policy itself (whether
/// a stale entry counts as a hit, and who deletes it) lives in the cache
/// layer; the only TTL behavior an adapter owns is the `ignore_ttl` read
/// mode below.
///
/// All methods take `&self`: adapters own their thread safety, so a single
/// instance behind an `Arc` may back several cache instances.
pub trait CacheAdapter {
    /// Reads the entry stored under `store_key`.
    ///
    /// With `ignore_ttl == false` (the enforcing mode) an expired entry is
    /// deleted and reported as `None`. With `ignore_ttl == true` the entry
    /// is returned verbatim even when expired, and nothing is deleted.
    fn get(&self, store_key: &str, ignore_ttl: bool) -> AdapterResult<Option<CacheEntry>>;

    /// Raw presence check. Never deletes, never consults the expiry.
    fn exists(&self, store_key: &str) -> AdapterResult<bool>;

    /// Persists an entry, unconditionally replacing whatever was stored
    /// under `store_key` before.
    fn put(
        &self,
        store_key: &str,
        payload: Vec<u8>,
        expires_at: Option<DateTime<Utc>>,
    ) -> AdapterResult<()>;

    /// Removes the entry under `store_key`. Returns whether something
    /// existed; removing an absent key is not an error.
    fn remove(&self, store_key: &str) -> AdapterResult<bool>;

    /// Drops every entry this adapter holds.
    fn remove_all(&self) -> AdapterResult<()>;

    /// Enumerates the store keys currently held.
    fn get_keys(&self) -> AdapterResult<Vec<String>>;
}

impl<T: CacheAdapter + ?Sized> CacheAdapter for Arc<T> {
    fn get(&self, store_key: &str, ignore_ttl: bool) -> AdapterResult<Option<CacheEntry>> {
        (**self).get(store_key, ignore_ttl)
    }

    fn exists(&self, store_key: &str) -> AdapterResult<bool> {
        (**self).exists(store_key)
    }

    fn put(
        &self,
        store_key: &str,
        payload: Vec<u8>,
        expires_at: Option<DateTime<Utc>>,
    ) -> AdapterResult<()> {
        (**self).put(store_key, payload, expires_at)
    }

    fn remove(&self, store_key: &str) -> AdapterResult<bool> {
        (**self).remove(store_key)
    }

    fn remove_all(&self) -> AdapterResult<()> {
        (**self).remove_all()
    }

    fn get_keys(&self) -> AdapterResult<Vec<String>> {
        (**self).get_keys()
    }
}
