use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::adapter::CacheAdapter;
use crate::serializer::Serializer;

/// Reads of one key before its decoded payload is memoized in-process.
pub const DEFAULT_STATIC_HIT_THRESHOLD: u32 = 10;

/// Upper bound on memoized keys; beyond it new keys skip memoization.
pub const DEFAULT_STATIC_CACHE_CAPACITY: usize = 128;

/// Per-store-key bookkeeping for the static read-through layer.
struct StaticSlot {
    hits: u32,
    memo: Option<(Vec<u8>, Option<DateTime<Utc>>)>,
}

/// The caching facade: callers hand it logical keys and serde values, it
/// derives a store key, encodes through the injected [`Serializer`], and
/// persists through the injected [`CacheAdapter`]. All TTL policy lives
/// here.
///
/// Every public operation is recoverable from the caller's point of view:
/// misses and codec failures surface as `None`, backend failures as
/// `false`, and nothing panics.
pub struct Cache<A, S> {
    adapter: A,
    serializer: S,
    prefix: String,
    static_cache: HashMap<String, StaticSlot>,
    static_hit_threshold: u32,
    static_cache_capacity: usize,
}

impl<A: CacheAdapter, S: Serializer> Cache<A, S> {
    pub fn new(adapter: A, serializer: S) -> Self {
        Self {
            adapter,
            serializer,
            prefix: String::new(),
            static_cache: HashMap::new(),
            static_hit_threshold: DEFAULT_STATIC_HIT_THRESHOLD,
            static_cache_capacity: DEFAULT_STATIC_CACHE_CAPACITY,
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.set_prefix(prefix);
        self
    }

    pub fn with_static_hit_threshold(mut self, threshold: u32) -> Self {
        self.static_hit_threshold = threshold.max(1);
        self
    }

    pub fn with_static_cache_capacity(mut self, capacity: usize) -> Self {
        self.static_cache_capacity = capacity;
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Changes the store-key transform for all subsequent operations.
    /// Entries already stored under the old prefix stay where they are.
    pub fn set_prefix(&mut self, prefix: impl Into<String>) {
        self.prefix = prefix.into();
    }

    /// The injected adapter, for callers (and tests) that need to assert
    /// or manipulate storage-level state directly.
    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    /// Deterministic, collision-resistant store key: a fixed-width hex
    /// hash of `prefix + key`. Pure in its inputs, so the same prefix and
    /// key locate the same entry across process restarts.
    pub fn calculate_store_key(&self, key: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.prefix.as_bytes());
        hasher.update(key.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Stores `value` under `key`. `ttl == Duration::ZERO` means the entry
    /// never expires; otherwise it expires `ttl` from now. Overwrites any
    /// existing entry unconditionally, expiry clock included.
    pub fn set_item<V: Serialize>(&mut self, key: &str, value: &V, ttl: Duration) -> bool {
        let expires_at = if ttl.is_zero() {
            None
        } else {
            let expiry = chrono::Duration::from_std(ttl)
                .ok()
                .and_then(|ttl| Utc::now().checked_add_signed(ttl));
            match expiry {
                Some(at) => Some(at),
                None => {
                    warn!(key, ?ttl, "ttl not representable as an expiry instant");
                    return false;
                }
            }
        };

        self.store(key, value, expires_at)
    }

    /// Stores `value` under `key` with a caller-supplied absolute expiry.
    /// A date at or before now is not a valid expiry and is rejected
    /// before anything reaches the adapter.
    pub fn set_item_to_date<V: Serialize>(
        &mut self,
        key: &str,
        value: &V,
        date: DateTime<Utc>,
    ) -> bool {
        if date <= Utc::now() {
            warn!(key, %date, "rejecting expiry date in the past");
            return false;
        }

        self.store(key, value, Some(date))
    }

    /// Default read: enforce expiry and delete entries found expired.
    /// Identical to `get_item_with(key, 0, true)`.
    pub fn get_item<V: DeserializeOwned>(&mut self, key: &str) -> Option<V> {
        self.get_item_with(key, 0, true)
    }

    /// Full read form.
    ///
    /// `delete_if_expired` selects the expired-entry sub-policy: `true`
    /// (the default behavior) deletes an expired entry on discovery,
    /// `false` leaves it in storage untouched. Either way an expired entry
    /// reads as `None`. The flag maps to the adapter's `ignore_ttl` with
    /// inverted polarity; callers depend on that polarity, so it is
    /// preserved here as-is.
    ///
    /// `force_static_hits` raises the static read-through counter floor
    /// for this call. It only affects memoization bookkeeping, never which
    /// value a live read returns.
    pub fn get_item_with<V: DeserializeOwned>(
        &mut self,
        key: &str,
        force_static_hits: u32,
        delete_if_expired: bool,
    ) -> Option<V> {
        let store_key = self.calculate_store_key(key);
        let hits = self.record_static_hit(&store_key, force_static_hits);

        if hits >= self.static_hit_threshold {
            if let Some(value) = self.static_lookup(&store_key) {
                return Some(value);
            }
        }

        let entry = match self.adapter.get(&store_key, !delete_if_expired) {
            Ok(Some(entry)) => entry,
            Ok(None) => return None,
            Err(e) => {
                warn!(key, error = %e, "adapter read failed");
                return None;
            }
        };

        // With deletion disabled the adapter hands back the entry verbatim
        // even when stale; declaring it invalid is this layer's job.
        if !delete_if_expired && entry.is_expired() {
            debug!(key, "entry expired, left in storage");
            return None;
        }

        match self.serializer.unserialize(&entry.payload) {
            Ok(value) => {
                if hits >= self.static_hit_threshold {
                    if let Some(slot) = self.static_cache.get_mut(&store_key) {
                        slot.memo = Some((entry.payload, entry.expires_at));
                    }
                }
                Some(value)
            }
            Err(e) => {
                warn!(key, error = %e, "payload undecodable, treating as miss");
                None
            }
        }
    }

    /// Removes the entry under `key`. Returns `true` when nothing existed
    /// or the deletion succeeded; `false` only on genuine adapter failure.
    pub fn remove_item(&mut self, key: &str) -> bool {
        let store_key = self.calculate_store_key(key);
        self.static_cache.remove(&store_key);

        match self.adapter.remove(&store_key) {
            Ok(_) => true,
            Err(e) => {
                warn!(key, error = %e, "adapter remove failed");
                false
            }
        }
    }

    /// Clears every entry the adapter holds, irrespective of prefix.
    pub fn remove_all(&mut self) -> bool {
        self.static_cache.clear();

        match self.adapter.remove_all() {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "adapter remove_all failed");
                false
            }
        }
    }

    /// Presence check for the entry under `key`. Never deletes anything,
    /// expired or not.
    pub fn exists_item(&self, key: &str) -> bool {
        let store_key = self.calculate_store_key(key);

        match self.adapter.exists(&store_key) {
            Ok(exists) => exists,
            Err(e) => {
                warn!(key, error = %e, "adapter exists failed");
                false
            }
        }
    }

    fn store<V: Serialize>(
        &mut self,
        key: &str,
        value: &V,
        expires_at: Option<DateTime<Utc>>,
    ) -> bool {
        let payload = match self.serializer.serialize(value) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(key, error = %e, "value serialization failed");
                return false;
            }
        };

        let store_key = self.calculate_store_key(key);
        // The write replaces the entry; any memoized payload is stale now.
        self.static_cache.remove(&store_key);

        match self.adapter.put(&store_key, payload, expires_at) {
            Ok(()) => true,
            Err(e) => {
                warn!(key, error = %e, "adapter write failed");
                false
            }
        }
    }

    /// Bumps the read counter for `store_key`, creating a slot when the
    /// bounded map has room, and returns the effective count for this call.
    fn record_static_hit(&mut self, store_key: &str, force: u32) -> u32 {
        match self.static_cache.get_mut(store_key) {
            Some(slot) => {
                slot.hits = slot.hits.saturating_add(1);
                slot.hits.max(force)
            }
            None => {
                if self.static_cache.len() < self.static_cache_capacity {
                    self.static_cache
                        .insert(store_key.to_string(), StaticSlot { hits: 1, memo: None });
                }
                1.max(force)
            }
        }
    }

    /// Serves a memoized payload when one exists and is still fresh.
    /// Expired or undecodable memos are dropped so the read falls through
    /// to the adapter, where the deletion policy applies.
    fn static_lookup<V: DeserializeOwned>(&mut self, store_key: &str) -> Option<V> {
        let slot = self.static_cache.get_mut(store_key)?;
        let (payload, expires_at) = slot.memo.as_ref()?;

        if expires_at.map_or(false, |at| Utc::now() >= at) {
            slot.memo = None;
            return None;
        }

        match self.serializer.unserialize(payload) {
            Ok(value) => Some(value),
            Err(_) => {
                slot.memo = None;
                None
            }
        }
    }
}
