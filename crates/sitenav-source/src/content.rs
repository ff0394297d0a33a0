//! Pre-serialized document access.
//!
//! Provides the [`RawDataProvider`] trait used by the static navigation
//! builder, and [`FsContentProvider`] which serves documents from a published
//! content directory laid out by localization path.

use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::error::{SourceError, SourceErrorKind};
use crate::localization::Localization;

/// Backend identifier for error messages.
const BACKEND: &str = "Fs";

/// Access to raw published documents.
///
/// Implementations must be thread-safe; one provider is shared by every
/// request served by the navigation provider.
pub trait RawDataProvider: Send + Sync {
    /// Read a document relative to the localization's path.
    ///
    /// # Errors
    ///
    /// Returns [`SourceErrorKind::NotFound`] if the document doesn't exist,
    /// [`SourceErrorKind::InvalidPath`] if the path escapes the content root.
    fn get_page_content(
        &self,
        path: &str,
        localization: &Localization,
    ) -> Result<String, SourceError>;
}

/// Filesystem-backed [`RawDataProvider`].
///
/// `get_page_content("navigation.json", fr)` reads
/// `{content_dir}/fr/navigation.json` when the localization path is `/fr`.
///
/// # Example
///
/// ```ignore
/// use std::path::PathBuf;
/// use sitenav_source::{FsContentProvider, Localization, RawDataProvider};
///
/// let provider = FsContentProvider::new(PathBuf::from("content"));
/// let json = provider.get_page_content("navigation.json", &Localization::new("en", "/"))?;
/// ```
pub struct FsContentProvider {
    content_dir: PathBuf,
}

impl FsContentProvider {
    /// Create a provider rooted at `content_dir`.
    #[must_use]
    pub fn new(content_dir: PathBuf) -> Self {
        Self { content_dir }
    }

    /// Root directory documents are read from.
    #[must_use]
    pub fn content_dir(&self) -> &Path {
        &self.content_dir
    }

    /// Reject paths that would escape the content directory.
    fn validate_path(path: &Path) -> Result<(), SourceError> {
        if path.components().any(|c| matches!(c, Component::ParentDir)) {
            return Err(SourceError::new(SourceErrorKind::InvalidPath)
                .with_resource(path.display().to_string())
                .with_backend(BACKEND));
        }
        Ok(())
    }
}

impl RawDataProvider for FsContentProvider {
    fn get_page_content(
        &self,
        path: &str,
        localization: &Localization,
    ) -> Result<String, SourceError> {
        let relative = localization.document_path(path);
        let relative = Path::new(relative.trim_start_matches('/'));
        Self::validate_path(relative)?;

        let full_path = self.content_dir.join(relative);
        tracing::debug!(path = %full_path.display(), "Reading document");
        fs::read_to_string(&full_path).map_err(|e| {
            SourceError::io(e, Some(full_path.display().to_string())).with_backend(BACKEND)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_dir() -> tempfile::TempDir {
        tempfile::tempdir().unwrap()
    }

    #[test]
    fn test_reads_root_localization_document() {
        let temp_dir = create_test_dir();
        fs::write(temp_dir.path().join("navigation.json"), r#"{"Id":"t1"}"#).unwrap();
        let provider = FsContentProvider::new(temp_dir.path().to_path_buf());

        let content = provider
            .get_page_content("navigation.json", &Localization::new("en", "/"))
            .unwrap();

        assert_eq!(content, r#"{"Id":"t1"}"#);
    }

    #[test]
    fn test_reads_under_localization_path() {
        let temp_dir = create_test_dir();
        fs::create_dir(temp_dir.path().join("fr")).unwrap();
        fs::write(temp_dir.path().join("fr/navigation.json"), "{}").unwrap();
        let provider = FsContentProvider::new(temp_dir.path().to_path_buf());

        let content = provider
            .get_page_content("navigation.json", &Localization::new("fr", "/fr"))
            .unwrap();

        assert_eq!(content, "{}");
    }

    #[test]
    fn test_missing_document_is_not_found() {
        let temp_dir = create_test_dir();
        let provider = FsContentProvider::new(temp_dir.path().to_path_buf());

        let err = provider
            .get_page_content("navigation.json", &Localization::new("en", "/"))
            .unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(err.backend, Some("Fs"));
    }

    #[test]
    fn test_rejects_parent_dir_traversal() {
        let temp_dir = create_test_dir();
        let provider = FsContentProvider::new(temp_dir.path().to_path_buf());

        let err = provider
            .get_page_content("../etc/passwd", &Localization::new("en", "/"))
            .unwrap_err();
        assert_eq!(err.kind, SourceErrorKind::InvalidPath);

        let err = provider
            .get_page_content("navigation.json", &Localization::new("x", "/a/../../b"))
            .unwrap_err();
        assert_eq!(err.kind, SourceErrorKind::InvalidPath);
    }
}
