use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The unit persisted by an adapter: the serialized payload together with
/// its absolute expiry instant. `expires_at == None` means the entry never
/// expires.
///
/// The expiry is fixed at write time; a later `set_item` on the same key
/// replaces the whole entry rather than merging into it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub payload: Vec<u8>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl CacheEntry {
    pub fn new(payload: Vec<u8>, expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            payload,
            expires_at,
        }
    }

    /// An entry is expired once the current instant reaches `expires_at`.
    /// The boundary counts as expired: `now >= expires_at`.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub(crate) fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(at) => now >= at,
            None => false,
        }
    }
}
