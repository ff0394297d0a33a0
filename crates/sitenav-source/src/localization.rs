//! Localization context.

use crate::tcm::{ItemType, TcmUri};

/// A localized variant of a site.
///
/// Every navigation lookup is scoped to one localization: its `path` prefixes
/// document requests, its publication scopes content-manager URIs, and its
/// `version` invalidates cached navigation when content is republished.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Localization {
    /// Unique identifier, used in cache regions.
    pub id: String,
    /// URL path prefix ("/" for the root localization).
    pub path: String,
    /// Content-manager publication identifier.
    pub publication_id: u32,
    /// Navigation taxonomy identifier, if the site has one.
    pub taxonomy_id: Option<u32>,
    /// Content version; changes whenever the localization is republished.
    pub version: String,
}

impl Localization {
    /// Create a localization with no publication or taxonomy.
    #[must_use]
    pub fn new(id: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            path: path.into(),
            publication_id: 0,
            taxonomy_id: None,
            version: String::new(),
        }
    }

    /// Set the publication identifier.
    #[must_use]
    pub fn with_publication(mut self, publication_id: u32) -> Self {
        self.publication_id = publication_id;
        self
    }

    /// Set the navigation taxonomy identifier.
    #[must_use]
    pub fn with_taxonomy(mut self, taxonomy_id: u32) -> Self {
        self.taxonomy_id = Some(taxonomy_id);
        self
    }

    /// Set the content version.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// URI of the navigation taxonomy, or `None` if none is configured.
    #[must_use]
    pub fn taxonomy_uri(&self) -> Option<TcmUri> {
        self.taxonomy_id
            .map(|id| TcmUri::new(self.publication_id, id, ItemType::Category))
    }

    /// URI of a keyword in this localization's publication.
    #[must_use]
    pub fn keyword_uri(&self, keyword_id: u32) -> TcmUri {
        TcmUri::new(self.publication_id, keyword_id, ItemType::Keyword)
    }

    /// URI of a page in this localization's publication.
    #[must_use]
    pub fn page_uri(&self, page_id: u32) -> TcmUri {
        TcmUri::new(self.publication_id, page_id, ItemType::Page)
    }

    /// Join a document name onto the localization path.
    ///
    /// `"/"` + `"navigation.json"` is `"/navigation.json"`;
    /// `"/fr"` + `"navigation.json"` is `"/fr/navigation.json"`.
    #[must_use]
    pub fn document_path(&self, name: &str) -> String {
        let base = self.path.trim_end_matches('/');
        let name = name.trim_start_matches('/');
        format!("{base}/{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_taxonomy_uri_requires_taxonomy() {
        let loc = Localization::new("en", "/").with_publication(5);
        assert!(loc.taxonomy_uri().is_none());

        let loc = loc.with_taxonomy(3);
        assert_eq!(loc.taxonomy_uri().unwrap().to_string(), "tcm:5-3-512");
    }

    #[test]
    fn test_keyword_and_page_uris() {
        let loc = Localization::new("en", "/").with_publication(5);

        assert_eq!(loc.keyword_uri(12).to_string(), "tcm:5-12-1024");
        assert_eq!(loc.page_uri(40).to_string(), "tcm:5-40-64");
    }

    #[test]
    fn test_document_path() {
        assert_eq!(
            Localization::new("en", "/").document_path("navigation.json"),
            "/navigation.json"
        );
        assert_eq!(
            Localization::new("fr", "/fr/").document_path("/navigation.json"),
            "/fr/navigation.json"
        );
        assert_eq!(
            Localization::new("de", "").document_path("navigation.json"),
            "/navigation.json"
        );
    }
}
