//! Cache provider abstraction for SiteNav.
//!
//! Navigation trees are expensive to build (they walk a whole content
//! repository or taxonomy), so the navigation core never builds one without
//! going through a cache first. This crate defines the contract the core
//! consumes and a few implementations:
//!
//! - [`Cache`]: Factory for named cache regions ("buckets")
//! - [`CacheBucket`]: Key-value store with etag-based invalidation
//! - [`CacheBucketExt`]: Typed JSON helpers, including `get_or_add_json`
//!
//! # Implementations
//!
//! - [`NullCache`] / [`NullCacheBucket`]: No-op implementations (always miss)
//! - [`MemoryCache`]: In-process cache with per-region TTL and single-flight fills
//! - [`FileCache`]: File-based implementation with version validation
//!
//! # Single-flight
//!
//! [`CacheBucket::get_or_insert`] is where an implementation guarantees that
//! at most one factory runs per key at a time. The default method does not
//! provide that guarantee; [`MemoryCache`] does.
//!
//! # Example
//!
//! ```
//! use sitenav_cache::{Cache, NullCache};
//!
//! let cache = NullCache;
//! let bucket = cache.bucket("navigation");
//! bucket.set("en", "v1", b"{}");
//! assert_eq!(bucket.get("en", "v1"), None); // NullCache always misses
//! ```

use std::time::Duration;

mod ext;
mod file;
mod memory;

pub use ext::CacheBucketExt;
pub use file::FileCache;
pub use memory::MemoryCache;

/// A named partition within a [`Cache`] (a cache region).
///
/// Each bucket stores key-value pairs where values are invalidated by an etag.
/// The etag is an opaque string chosen by the caller (e.g., a localization's
/// publish version). A cache hit occurs only when both the key and etag match.
pub trait CacheBucket: Send + Sync {
    /// Retrieve a cached value.
    ///
    /// Returns `Some(value)` if the key exists **and** was stored with the same
    /// `etag`. Returns `None` on cache miss, etag mismatch, or expiry.
    ///
    /// If `etag` is an empty string, etag validation is skipped and the cached
    /// data is returned regardless of the stored etag.
    fn get(&self, key: &str, etag: &str) -> Option<Vec<u8>>;

    /// Store a value in the cache.
    ///
    /// Overwrites any existing entry for the same key, regardless of the
    /// previous etag.
    fn set(&self, key: &str, etag: &str, value: &[u8]);

    /// Remove a single entry. Missing keys are ignored.
    fn remove(&self, key: &str);

    /// Remove every entry in this bucket.
    fn clear(&self);

    /// How long a stored value stays readable, if entries expire at all.
    ///
    /// Callers that keep decoded copies of cached values use this to expire
    /// their copies along with the entry.
    fn ttl(&self) -> Option<Duration> {
        None
    }

    /// Return the cached value for `key`, or run `factory` and store its result.
    ///
    /// `factory` returning `None` means the value could not be produced; nothing
    /// is stored and `None` is returned.
    ///
    /// The default implementation is a plain get-then-set. Implementations that
    /// can serialize concurrent fills for the same key should override it.
    fn get_or_insert(
        &self,
        key: &str,
        etag: &str,
        factory: &mut dyn FnMut() -> Option<Vec<u8>>,
    ) -> Option<Vec<u8>> {
        if let Some(hit) = self.get(key, etag) {
            return Some(hit);
        }
        let value = factory()?;
        self.set(key, etag, &value);
        Some(value)
    }
}

/// Factory for named cache [`CacheBucket`]s.
///
/// A `Cache` produces buckets that are logically isolated from each other.
/// Calling [`Cache::bucket`] repeatedly with the same name returns handles that
/// share the same underlying storage.
pub trait Cache: Send + Sync {
    /// Open or create a named bucket.
    ///
    /// # Arguments
    ///
    /// * `name` - Bucket name (e.g., "navigation-en", "navigation-subtree-en")
    fn bucket(&self, name: &str) -> Box<dyn CacheBucket>;
}

/// No-op [`CacheBucket`] that never stores or retrieves data.
///
/// Every `get` returns `None`; every `set` is silently discarded.
pub struct NullCacheBucket;

impl CacheBucket for NullCacheBucket {
    fn get(&self, _key: &str, _etag: &str) -> Option<Vec<u8>> {
        None
    }

    fn set(&self, _key: &str, _etag: &str, _value: &[u8]) {}

    fn remove(&self, _key: &str) {}

    fn clear(&self) {}
}

/// No-op [`Cache`] that always returns [`NullCacheBucket`]s.
///
/// Use when caching is disabled.
pub struct NullCache;

impl Cache for NullCache {
    fn bucket(&self, _name: &str) -> Box<dyn CacheBucket> {
        Box::new(NullCacheBucket)
    }
}
