//! A key/value caching facade with swappable storage adapters.
//!
//! Callers store and retrieve named serde values without knowing which
//! physical backend holds them. The [`Cache`] orchestrator owns key
//! hashing, optional key prefixing, TTL expiry policy, and value
//! serialization; storage itself is a pluggable [`CacheAdapter`]
//! (in-process memory, filesystem, or anything else implementing the
//! contract), and the value codec is a pluggable [`Serializer`].
//!
//! ```no_run
//! use std::time::Duration;
//! use swapcache::{Cache, JsonSerializer, MemoryAdapter};
//!
//! let mut cache = Cache::new(MemoryAdapter::new(), JsonSerializer);
//!
//! cache.set_item("user:42", &"ada", Duration::from_secs(60));
//! let name: Option<String> = cache.get_item("user:42");
//! assert_eq!(name.as_deref(), Some("ada"));
//! ```

pub mod adapter;
pub mod cache;
pub mod entry;
pub mod error;
pub mod serializer;

pub use adapter::file::FileAdapter;
pub use adapter::memory::MemoryAdapter;
pub use adapter::CacheAdapter;
pub use cache::{Cache, DEFAULT_STATIC_CACHE_CAPACITY, DEFAULT_STATIC_HIT_THRESHOLD};
pub use entry::CacheEntry;
pub use error::{AdapterError, AdapterResult, SerializerError};
pub use serializer::{BincodeSerializer, JsonSerializer, Serializer};
