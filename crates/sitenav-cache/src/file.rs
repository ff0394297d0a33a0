//! File-based cache implementation.
//!
//! [`FileCache`] stores entries as files on disk, one subdirectory per bucket.
//! Each entry is a single file with a binary header followed by the data:
//!
//! ```text
//! [etag_len: u32 LE][etag bytes][data bytes]
//! ```
//!
//! On read, only the header is read first to validate the etag. The full data
//! is read only on cache hit.
//!
//! On construction, [`FileCache`] validates a `VERSION` file in the cache root.
//! If the version mismatches or is missing, the entire cache directory is wiped
//! and recreated, so trees serialized by an older build are never decoded.

use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::{Cache, CacheBucket};

/// File-based [`Cache`] rooted at a directory on disk.
///
/// Directory layout:
/// ```text
/// {root}/
/// +-- VERSION                # contains the cache version string
/// +-- navigation-en/         # bucket "navigation-en"
/// |   +-- model              # cache entry
/// +-- navigation-subtree-en/
///     +-- ...
/// ```
///
/// Entries never expire on their own; they are replaced when the etag changes
/// or removed through [`CacheBucket::remove`] / [`CacheBucket::clear`].
pub struct FileCache {
    root: PathBuf,
}

impl FileCache {
    /// Create a new file-based cache at `root`, validating the cache version.
    ///
    /// Errors during validation are logged but never fatal.
    #[must_use]
    pub fn new(root: PathBuf, version: &str) -> Self {
        validate_version(&root, version);
        Self { root }
    }
}

impl Cache for FileCache {
    fn bucket(&self, name: &str) -> Box<dyn CacheBucket> {
        Box::new(FileCacheBucket {
            dir: self.root.join(name),
        })
    }
}

/// A single bucket backed by a directory on disk.
struct FileCacheBucket {
    dir: PathBuf,
}

impl FileCacheBucket {
    /// File for `key`. Keys that would escape the bucket directory have none.
    fn entry_path(&self, key: &str) -> Option<PathBuf> {
        let valid = !key.is_empty()
            && key != "."
            && key != ".."
            && !key.contains(['/', '\\']);
        if !valid {
            tracing::debug!(key, "Rejected cache key");
            return None;
        }
        Some(self.dir.join(key))
    }
}

impl CacheBucket for FileCacheBucket {
    fn get(&self, key: &str, etag: &str) -> Option<Vec<u8>> {
        let path = self.entry_path(key)?;
        let mut file = File::open(&path).ok()?;

        let mut len_buf = [0u8; 4];
        file.read_exact(&mut len_buf).ok()?;
        let etag_len = u32::from_le_bytes(len_buf) as usize;

        let mut stored_etag = vec![0u8; etag_len];
        file.read_exact(&mut stored_etag).ok()?;

        if !etag.is_empty() && stored_etag != etag.as_bytes() {
            return None;
        }

        let mut data = Vec::new();
        file.read_to_end(&mut data).ok()?;
        Some(data)
    }

    fn set(&self, key: &str, etag: &str, value: &[u8]) {
        // Silently ignore errors - cache is optional
        let Some(path) = self.entry_path(key) else {
            return;
        };
        if let Err(e) = fs::create_dir_all(&self.dir) {
            tracing::debug!(error = %e, "Failed to create cache bucket directory");
            return;
        }

        let etag_bytes = etag.as_bytes();
        let Ok(etag_len) = u32::try_from(etag_bytes.len()) else {
            return;
        };
        let mut buf = Vec::with_capacity(4 + etag_bytes.len() + value.len());
        buf.extend_from_slice(&etag_len.to_le_bytes());
        buf.extend_from_slice(etag_bytes);
        buf.extend_from_slice(value);

        if let Err(e) = fs::write(&path, &buf) {
            tracing::debug!(key, error = %e, "Failed to write cache entry");
        }
    }

    fn remove(&self, key: &str) {
        let Some(path) = self.entry_path(key) else {
            return;
        };
        if path.exists()
            && let Err(e) = fs::remove_file(&path)
        {
            tracing::debug!(key, error = %e, "Failed to remove cache entry");
        }
    }

    fn clear(&self) {
        if self.dir.exists()
            && let Err(e) = fs::remove_dir_all(&self.dir)
        {
            tracing::debug!(error = %e, "Failed to clear cache bucket");
        }
    }
}

/// Validate the cache version, wiping the directory on mismatch.
fn validate_version(root: &Path, version: &str) {
    let version_file = root.join("VERSION");

    match fs::read_to_string(&version_file) {
        Ok(stored) if stored == version => {
            tracing::debug!("cache version matches: {version}");
            return;
        }
        Ok(stored) => {
            tracing::info!(
                "cache version mismatch (stored={stored}, current={version}), wiping cache"
            );
        }
        Err(_) => {
            tracing::info!("no cache VERSION file found, initializing cache");
        }
    }

    if root.exists()
        && let Err(e) = fs::remove_dir_all(root)
    {
        tracing::warn!("failed to remove cache directory: {e}");
    }
    if let Err(e) = fs::create_dir_all(root) {
        tracing::warn!("failed to create cache directory: {e}");
        return;
    }
    if let Err(e) = fs::write(&version_file, version) {
        tracing::warn!("failed to write cache VERSION file: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_bucket_set_and_get() {
        let tmp = TempDir::new().unwrap();
        let cache = FileCache::new(tmp.path().join("cache"), "v1");
        let bucket = cache.bucket("navigation-en");

        bucket.set("model", "epoch-1", b"{\"Title\":\"Home\"}");

        assert_eq!(
            bucket.get("model", "epoch-1"),
            Some(b"{\"Title\":\"Home\"}".to_vec())
        );
    }

    #[test]
    fn test_file_bucket_etag_mismatch_misses() {
        let tmp = TempDir::new().unwrap();
        let cache = FileCache::new(tmp.path().join("cache"), "v1");
        let bucket = cache.bucket("navigation-en");

        bucket.set("model", "epoch-1", b"data");

        assert_eq!(bucket.get("model", "epoch-2"), None);
        assert_eq!(bucket.get("model", ""), Some(b"data".to_vec()));
    }

    #[test]
    fn test_file_bucket_remove() {
        let tmp = TempDir::new().unwrap();
        let cache = FileCache::new(tmp.path().join("cache"), "v1");
        let bucket = cache.bucket("navigation-en");
        bucket.set("model", "e", b"data");

        bucket.remove("model");
        bucket.remove("missing");

        assert_eq!(bucket.get("model", "e"), None);
    }

    #[test]
    fn test_file_bucket_clear_only_affects_own_bucket() {
        let tmp = TempDir::new().unwrap();
        let cache = FileCache::new(tmp.path().join("cache"), "v1");
        let en = cache.bucket("navigation-en");
        let fr = cache.bucket("navigation-fr");
        en.set("model", "e", b"en");
        fr.set("model", "e", b"fr");

        en.clear();

        assert_eq!(en.get("model", "e"), None);
        assert_eq!(fr.get("model", "e"), Some(b"fr".to_vec()));
    }

    #[test]
    fn test_file_bucket_get_or_insert_uses_stored_value() {
        let tmp = TempDir::new().unwrap();
        let cache = FileCache::new(tmp.path().join("cache"), "v1");
        let bucket = cache.bucket("navigation-en");
        bucket.set("model", "e", b"stored");

        let value = bucket.get_or_insert("model", "e", &mut || Some(b"fresh".to_vec()));

        assert_eq!(value, Some(b"stored".to_vec()));
    }

    #[test]
    fn test_file_bucket_rejects_escaping_keys() {
        let tmp = TempDir::new().unwrap();
        let cache = FileCache::new(tmp.path().join("cache"), "v1");
        let bucket = cache.bucket("navigation-en");

        bucket.set("../escape", "e", b"data");
        bucket.set("a/b", "e", b"data");

        assert!(!tmp.path().join("cache/escape").exists());
        assert_eq!(bucket.get("../escape", "e"), None);
        assert_eq!(bucket.get("a/b", "e"), None);
    }

    #[test]
    fn test_version_mismatch_wipes_cache() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("cache");

        let cache = FileCache::new(root.clone(), "v1");
        cache.bucket("navigation-en").set("model", "e", b"stale");

        let cache2 = FileCache::new(root.clone(), "v2");
        assert_eq!(cache2.bucket("navigation-en").get("model", "e"), None);

        let version = fs::read_to_string(root.join("VERSION")).unwrap();
        assert_eq!(version, "v2");
    }

    #[test]
    fn test_version_match_keeps_cache() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("cache");

        let cache = FileCache::new(root.clone(), "v1");
        cache.bucket("navigation-en").set("model", "e", b"kept");

        let cache2 = FileCache::new(root, "v1");
        assert_eq!(
            cache2.bucket("navigation-en").get("model", "e"),
            Some(b"kept".to_vec())
        );
    }

    #[test]
    fn test_nonexistent_root_creates_version() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("deeply/nested/cache");

        let _cache = FileCache::new(root.clone(), "v1");

        assert_eq!(fs::read_to_string(root.join("VERSION")).unwrap(), "v1");
    }
}
