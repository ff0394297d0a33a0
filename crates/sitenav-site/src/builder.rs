//! Full navigation tree builders.
//!
//! A [`NavigationBuilder`] produces the complete, unfiltered navigation tree
//! for a localization from a backing source. Builders don't cache and don't
//! prune invisible nodes; both are the caller's concern.
//!
//! - [`StaticNavigationBuilder`]: parses a pre-serialized JSON document.
//! - [`TaxonomyNavigationBuilder`]: walks a navigation taxonomy.

use std::sync::Arc;

use sitenav_source::{DepthFilter, Localization, RawDataProvider, SourceError, TaxonomyService};

use crate::item::{SitemapItem, UrlRules};
use crate::keywords::KeywordMapper;

/// Default name of the navigation document.
pub const NAVIGATION_DOCUMENT: &str = "navigation.json";

/// Error returned when a full tree can't be built.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// The backing source is missing or unreachable.
    #[error("Navigation source unavailable: {0}")]
    SourceUnavailable(#[source] SourceError),
    /// The backing source returned content that isn't a navigation tree.
    #[error("Malformed navigation document {path}: {source}")]
    Malformed {
        /// Document path.
        path: String,
        /// Parse error.
        #[source]
        source: serde_json::Error,
    },
    /// The localization has no navigation taxonomy.
    #[error("Localization {0} has no navigation taxonomy")]
    NotConfigured(String),
}

impl From<SourceError> for BuildError {
    fn from(e: SourceError) -> Self {
        Self::SourceUnavailable(e)
    }
}

/// Builds the full navigation tree for a localization.
pub trait NavigationBuilder: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Build the full tree.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError`] if the backing source is absent, unreachable or
    /// malformed.
    fn build_full_tree(&self, localization: &Localization) -> Result<SitemapItem, BuildError>;
}

/// Builder reading a pre-serialized navigation document.
pub struct StaticNavigationBuilder {
    provider: Arc<dyn RawDataProvider>,
    document: String,
    rules: UrlRules,
}

impl StaticNavigationBuilder {
    /// Create a builder reading [`NAVIGATION_DOCUMENT`].
    #[must_use]
    pub fn new(provider: Arc<dyn RawDataProvider>, rules: UrlRules) -> Self {
        Self {
            provider,
            document: NAVIGATION_DOCUMENT.to_owned(),
            rules,
        }
    }

    /// Read a differently named document.
    #[must_use]
    pub fn with_document(mut self, document: impl Into<String>) -> Self {
        self.document = document.into();
        self
    }
}

impl NavigationBuilder for StaticNavigationBuilder {
    fn name(&self) -> &'static str {
        "static"
    }

    fn build_full_tree(&self, localization: &Localization) -> Result<SitemapItem, BuildError> {
        let content = self
            .provider
            .get_page_content(&self.document, localization)?;

        let mut root: SitemapItem =
            serde_json::from_str(&content).map_err(|source| BuildError::Malformed {
                path: localization.document_path(&self.document),
                source,
            })?;
        root.normalize_urls(&self.rules);

        tracing::debug!(
            localization = %localization.id,
            nodes = root.count(),
            "Parsed navigation document"
        );
        Ok(root)
    }
}

/// Builder walking a localization's navigation taxonomy.
pub struct TaxonomyNavigationBuilder {
    service: Arc<dyn TaxonomyService>,
    rules: UrlRules,
}

impl TaxonomyNavigationBuilder {
    /// Create a builder over `service`.
    #[must_use]
    pub fn new(service: Arc<dyn TaxonomyService>, rules: UrlRules) -> Self {
        Self { service, rules }
    }
}

impl NavigationBuilder for TaxonomyNavigationBuilder {
    fn name(&self) -> &'static str {
        "taxonomy"
    }

    fn build_full_tree(&self, localization: &Localization) -> Result<SitemapItem, BuildError> {
        let Some(taxonomy_uri) = localization.taxonomy_uri() else {
            return Err(BuildError::NotConfigured(localization.id.clone()));
        };

        let root = self.service.get_keyword(
            &taxonomy_uri,
            DepthFilter::down(DepthFilter::UNLIMITED),
            &taxonomy_uri,
        )?;
        if root.uri.is_empty() {
            return Err(SourceError::malformed(taxonomy_uri.to_string()).into());
        }

        let mapper = KeywordMapper {
            taxonomy_id: taxonomy_uri.item_id,
            rules: &self.rules,
            root_url: &localization.path,
        };
        let item = mapper.keyword_item(&root, None);

        tracing::debug!(
            localization = %localization.id,
            taxonomy = %taxonomy_uri,
            nodes = item.count(),
            "Walked navigation taxonomy"
        );
        Ok(item)
    }
}
