//! In-process cache with TTL regions and single-flight fills.
//!
//! [`MemoryCache`] keeps serialized values in memory, grouped by bucket.
//! Each bucket may have its own time-to-live, which lets short-lived entries
//! (e.g. filtered subtrees) live next to long-lived ones (full trees).
//!
//! Concurrent [`CacheBucket::get_or_insert`] calls for the same key are
//! serialized on a per-key lock: the first caller runs the factory, the rest
//! wait and then read the stored value.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};

use crate::{Cache, CacheBucket};

struct Entry {
    etag: String,
    value: Vec<u8>,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// Shared state for one bucket. All handles for the same name point here.
struct BucketState {
    ttl: Option<Duration>,
    entries: RwLock<HashMap<String, Entry>>,
    /// Per-key fill locks for single-flight `get_or_insert`.
    fills: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl BucketState {
    fn new(ttl: Option<Duration>) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
            fills: Mutex::new(HashMap::new()),
        }
    }
}

/// In-memory [`Cache`].
///
/// # Thread Safety
///
/// Buckets are shared through `Arc`; entries live behind an `RwLock` so reads
/// of different keys never block each other.
///
/// # Panics
///
/// Methods panic if an internal lock is poisoned.
pub struct MemoryCache {
    default_ttl: Option<Duration>,
    bucket_ttls: HashMap<String, Duration>,
    buckets: Mutex<HashMap<String, Arc<BucketState>>>,
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCache {
    /// Create a cache whose entries never expire.
    #[must_use]
    pub fn new() -> Self {
        Self {
            default_ttl: None,
            bucket_ttls: HashMap::new(),
            buckets: Mutex::new(HashMap::new()),
        }
    }

    /// Set the TTL applied to buckets without an explicit TTL.
    #[must_use]
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = Some(ttl);
        self
    }

    /// Set the TTL for one named bucket.
    #[must_use]
    pub fn with_bucket_ttl(mut self, name: impl Into<String>, ttl: Duration) -> Self {
        self.bucket_ttls.insert(name.into(), ttl);
        self
    }

    fn state(&self, name: &str) -> Arc<BucketState> {
        let mut buckets = self.buckets.lock().unwrap();
        let state = buckets.entry(name.to_owned()).or_insert_with(|| {
            let ttl = self.bucket_ttls.get(name).copied().or(self.default_ttl);
            Arc::new(BucketState::new(ttl))
        });
        Arc::clone(state)
    }
}

impl Cache for MemoryCache {
    fn bucket(&self, name: &str) -> Box<dyn CacheBucket> {
        Box::new(MemoryCacheBucket {
            state: self.state(name),
        })
    }
}

struct MemoryCacheBucket {
    state: Arc<BucketState>,
}

impl MemoryCacheBucket {
    fn fill_lock(&self, key: &str) -> Arc<Mutex<()>> {
        let mut fills = self.state.fills.lock().unwrap();
        Arc::clone(fills.entry(key.to_owned()).or_default())
    }

    fn release_fill_lock(&self, key: &str, lock: &Arc<Mutex<()>>) {
        let mut fills = self.state.fills.lock().unwrap();
        // Only the map and the releasing caller hold it: nobody is waiting.
        if Arc::strong_count(lock) <= 2 {
            fills.remove(key);
        }
    }
}

impl CacheBucket for MemoryCacheBucket {
    fn get(&self, key: &str, etag: &str) -> Option<Vec<u8>> {
        let now = Instant::now();
        {
            let entries = self.state.entries.read().unwrap();
            let entry = entries.get(key)?;
            if !entry.is_expired(now) {
                if !etag.is_empty() && entry.etag != etag {
                    return None;
                }
                return Some(entry.value.clone());
            }
        }

        // Expired: drop it so the map does not grow with dead entries.
        let mut entries = self.state.entries.write().unwrap();
        if entries.get(key).is_some_and(|e| e.is_expired(now)) {
            entries.remove(key);
        }
        None
    }

    fn set(&self, key: &str, etag: &str, value: &[u8]) {
        let expires_at = self.state.ttl.map(|ttl| Instant::now() + ttl);
        self.state.entries.write().unwrap().insert(
            key.to_owned(),
            Entry {
                etag: etag.to_owned(),
                value: value.to_vec(),
                expires_at,
            },
        );
    }

    fn remove(&self, key: &str) {
        self.state.entries.write().unwrap().remove(key);
    }

    fn clear(&self) {
        self.state.entries.write().unwrap().clear();
    }

    fn ttl(&self) -> Option<Duration> {
        self.state.ttl
    }

    fn get_or_insert(
        &self,
        key: &str,
        etag: &str,
        factory: &mut dyn FnMut() -> Option<Vec<u8>>,
    ) -> Option<Vec<u8>> {
        if let Some(hit) = self.get(key, etag) {
            return Some(hit);
        }

        let lock = self.fill_lock(key);
        let result = {
            let _guard = lock.lock().unwrap();

            // Another caller may have filled the entry while we waited.
            if let Some(hit) = self.get(key, etag) {
                Some(hit)
            } else {
                tracing::debug!(key, "Cache miss, running factory");
                let value = factory();
                if let Some(value) = &value {
                    self.set(key, etag, value);
                }
                value
            }
        };
        self.release_fill_lock(key, &lock);
        result
    }
}
