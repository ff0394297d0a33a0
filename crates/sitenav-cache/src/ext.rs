//! Extension trait for [`CacheBucket`] with typed convenience methods.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::CacheBucket;

/// Typed convenience methods for [`CacheBucket`].
///
/// Values are stored as JSON, so whatever comes back out of the cache is a
/// fresh value reconstructed from bytes. Derived relationships that are not
/// part of the serialized form (such as parent links in a navigation tree)
/// must be rebuilt by the caller after every hit.
///
/// # Example
///
/// ```
/// use sitenav_cache::{Cache, CacheBucketExt, MemoryCache};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize, PartialEq, Debug)]
/// struct Menu { titles: Vec<String> }
///
/// let cache = MemoryCache::new();
/// let bucket = cache.bucket("menus");
///
/// let menu: Result<Menu, std::convert::Infallible> =
///     bucket.get_or_add_json("top", "v1", || Ok(Menu { titles: vec!["Home".into()] }));
/// assert_eq!(menu.unwrap().titles, vec!["Home".to_owned()]);
/// ```
pub trait CacheBucketExt: CacheBucket {
    /// Retrieve a JSON-deserialized value from the cache.
    ///
    /// Returns `None` on cache miss, etag mismatch, or deserialization failure.
    fn get_json<T: DeserializeOwned>(&self, key: &str, etag: &str) -> Option<T> {
        let bytes = self.get(key, etag)?;
        serde_json::from_slice(&bytes).ok()
    }

    /// Store a value as JSON in the cache.
    ///
    /// Silently does nothing if serialization fails.
    fn set_json<T: Serialize>(&self, key: &str, etag: &str, value: &T) {
        match serde_json::to_vec(value) {
            Ok(bytes) => self.set(key, etag, &bytes),
            Err(e) => tracing::debug!(key, error = %e, "Failed to serialize cache value"),
        }
    }

    /// Return the cached value for `key`, or build it with `factory` and cache it.
    ///
    /// Goes through [`CacheBucket::get_or_insert`], so it inherits the
    /// implementation's single-flight behavior. Factory errors are returned
    /// unchanged and nothing is cached. A cached payload that no longer
    /// decodes is replaced by a fresh build.
    fn get_or_add_json<T, E, F>(&self, key: &str, etag: &str, mut factory: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnMut() -> Result<T, E>,
    {
        let mut built: Option<T> = None;
        let mut failure: Option<E> = None;

        let bytes = self.get_or_insert(key, etag, &mut || match factory() {
            Ok(value) => {
                let bytes = serde_json::to_vec(&value).ok();
                built = Some(value);
                bytes
            }
            Err(e) => {
                failure = Some(e);
                None
            }
        });

        if let Some(e) = failure {
            return Err(e);
        }
        if let Some(value) = built {
            return Ok(value);
        }
        if let Some(value) = bytes.and_then(|b| serde_json::from_slice(&b).ok()) {
            return Ok(value);
        }

        tracing::debug!(key, "Cached value failed to decode, rebuilding");
        let value = factory()?;
        self.set_json(key, etag, &value);
        Ok(value)
    }
}

impl<B: CacheBucket + ?Sized> CacheBucketExt for B {}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;

    use super::*;
    use crate::{Cache, MemoryCache, NullCache};

    #[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
    struct Menu {
        titles: Vec<String>,
    }

    fn menu() -> Menu {
        Menu {
            titles: vec!["Home".to_owned(), "Products".to_owned()],
        }
    }

    #[test]
    fn test_json_round_trip() {
        let cache = MemoryCache::new();
        let bucket = cache.bucket("menus");

        bucket.set_json("top", "v1", &menu());

        assert_eq!(bucket.get_json::<Menu>("top", "v1"), Some(menu()));
    }

    #[test]
    fn test_get_json_invalid_payload_returns_none() {
        let cache = MemoryCache::new();
        let bucket = cache.bucket("menus");

        bucket.set("top", "v1", b"not json");

        assert_eq!(bucket.get_json::<Menu>("top", "v1"), None);
    }

    #[test]
    fn test_get_or_add_json_builds_once() {
        let cache = MemoryCache::new();
        let bucket = cache.bucket("menus");
        let mut calls = 0;

        for _ in 0..3 {
            let value: Result<Menu, Infallible> = bucket.get_or_add_json("top", "v1", || {
                calls += 1;
                Ok(menu())
            });
            assert_eq!(value.unwrap(), menu());
        }

        assert_eq!(calls, 1);
    }

    #[test]
    fn test_get_or_add_json_error_not_cached() {
        let cache = MemoryCache::new();
        let bucket = cache.bucket("menus");

        let first: Result<Menu, &str> = bucket.get_or_add_json("top", "v1", || Err("source down"));
        assert_eq!(first.unwrap_err(), "source down");

        let second: Result<Menu, &str> = bucket.get_or_add_json("top", "v1", || Ok(menu()));
        assert_eq!(second.unwrap(), menu());
    }

    #[test]
    fn test_get_or_add_json_replaces_undecodable_payload() {
        let cache = MemoryCache::new();
        let bucket = cache.bucket("menus");
        bucket.set("top", "v1", b"{\"legacy\": true}");

        let value: Result<Menu, Infallible> = bucket.get_or_add_json("top", "v1", || Ok(menu()));

        assert_eq!(value.unwrap(), menu());
        assert_eq!(bucket.get_json::<Menu>("top", "v1"), Some(menu()));
    }

    #[test]
    fn test_get_or_add_json_with_null_cache_always_builds() {
        let bucket = NullCache.bucket("menus");
        let mut calls = 0;

        for _ in 0..2 {
            let _: Result<Menu, Infallible> = bucket.get_or_add_json("top", "v1", || {
                calls += 1;
                Ok(menu())
            });
        }

        assert_eq!(calls, 2);
    }
}
