//! Navigation query façade.
//!
//! [`NavigationProvider`] owns the cached navigation model of every
//! localization and answers link and subtree queries against it.
//!
//! # Architecture
//!
//! - Full trees come from an injected primary [`NavigationBuilder`], with an
//!   optional fallback builder used when the primary fails
//! - Built trees go through the external [`Cache`] region
//!   `navigation-{localization}` under the localization's version etag
//! - Every value, fresh or cached, is relinked by [`rebuild_parent_links`]
//!   before it is published
//! - A published snapshot expires with the region's TTL, so a long-lived
//!   provider goes back to the cache (and, on a miss, the builder)
//! - Subtree queries go through an injected [`SubtreeResolver`] when one is
//!   configured, and through the full model otherwise
//!
//! # Thread Safety
//!
//! `NavigationProvider` is designed for concurrent access:
//! - published trees are immutable `Arc<NavigationTree>` snapshots
//! - `navigation_model()` uses double-checked locking, so concurrent readers
//!   never observe a half-linked tree and a localization is rebuilt once
//! - `refresh()` drops the snapshot; readers keep their existing `Arc`
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use sitenav_cache::MemoryCache;
//! use sitenav_site::{NavigationOptions, NavigationProvider, StaticNavigationBuilder, UrlRules};
//! use sitenav_source::{FsContentProvider, Localization};
//!
//! let content = Arc::new(FsContentProvider::new("content".into()));
//! let builder = Arc::new(StaticNavigationBuilder::new(content, UrlRules::default()));
//! let provider = NavigationProvider::new(builder, Arc::new(MemoryCache::new()), NavigationOptions::default());
//!
//! let en = Localization::new("en", "/").with_version("42");
//! let crumbs = provider.breadcrumb_navigation_links("/products/widget.html", &en);
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Instant;

use sitenav_cache::{Cache, CacheBucketExt};
use sitenav_source::Localization;

use crate::builder::{BuildError, NavigationBuilder};
use crate::id::SitemapItemId;
use crate::item::{SitemapItem, UrlRules};
use crate::links::{self, NavigationLinks};
use crate::subtree::{NavigationFilter, ResolveError, SubtreeResolver, subtree_from_tree};
use crate::tree::{NavigationTree, SiblingOrder, rebuild_parent_links};

/// Cache key of the full model inside a localization's region.
const MODEL_KEY: &str = "model";

/// Convert Duration to milliseconds as f64.
fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

/// Error returned by model and subtree queries.
#[derive(Debug, thiserror::Error)]
pub enum NavigationError {
    /// No builder could produce the full tree.
    #[error(transparent)]
    Build(#[from] BuildError),
    /// The subtree query was invalid or its source failed.
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

/// Settings shared by every query.
#[derive(Clone, Debug)]
pub struct NavigationOptions {
    /// URL normalization applied to request paths.
    pub rules: UrlRules,
    /// Title of the child that top navigation collapses onto its parent.
    pub index_title: String,
    /// Order of every child list.
    pub order: SiblingOrder,
}

impl Default for NavigationOptions {
    fn default() -> Self {
        Self {
            rules: UrlRules::default(),
            index_title: "Index".to_owned(),
            order: SiblingOrder::default(),
        }
    }
}

/// Published model of one localization.
struct Snapshot {
    version: String,
    tree: Arc<NavigationTree>,
    /// End of the region TTL, if the region expires entries.
    expires_at: Option<Instant>,
}

impl Snapshot {
    fn is_current(&self, version: &str, now: Instant) -> bool {
        self.version == version && self.expires_at.is_none_or(|at| now < at)
    }
}

/// Navigation query façade.
pub struct NavigationProvider {
    primary: Arc<dyn NavigationBuilder>,
    fallback: Option<Arc<dyn NavigationBuilder>>,
    resolver: Option<Arc<dyn SubtreeResolver>>,
    cache: Arc<dyn Cache>,
    options: NavigationOptions,
    /// Mutex for serializing model reloads.
    reload_lock: Mutex<()>,
    /// Published models by localization id.
    snapshots: RwLock<HashMap<String, Snapshot>>,
}

impl NavigationProvider {
    /// Create a provider building full trees with `primary`.
    ///
    /// # Arguments
    ///
    /// * `primary` - Builder for full navigation trees
    /// * `cache` - External cache for built trees and subtrees
    /// * `options` - Query settings
    #[must_use]
    pub fn new(
        primary: Arc<dyn NavigationBuilder>,
        cache: Arc<dyn Cache>,
        options: NavigationOptions,
    ) -> Self {
        Self {
            primary,
            fallback: None,
            resolver: None,
            cache,
            options,
            reload_lock: Mutex::new(()),
            snapshots: RwLock::new(HashMap::new()),
        }
    }

    /// Use `fallback` when the primary builder fails.
    #[must_use]
    pub fn with_fallback(mut self, fallback: Arc<dyn NavigationBuilder>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Answer subtree queries with `resolver` instead of the full model.
    #[must_use]
    pub fn with_subtree_resolver(mut self, resolver: Arc<dyn SubtreeResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Query settings.
    #[must_use]
    pub fn options(&self) -> &NavigationOptions {
        &self.options
    }

    fn region(localization: &Localization) -> String {
        format!("navigation-{}", localization.id)
    }

    fn subtree_region(localization: &Localization) -> String {
        format!("navigation-subtree-{}", localization.id)
    }

    fn snapshot(&self, localization: &Localization) -> Option<Arc<NavigationTree>> {
        self.snapshots
            .read()
            .unwrap()
            .get(&localization.id)
            .filter(|s| s.is_current(&localization.version, Instant::now()))
            .map(|s| Arc::clone(&s.tree))
    }

    fn build_with_fallback(&self, localization: &Localization) -> Result<SitemapItem, BuildError> {
        let err = match self.primary.build_full_tree(localization) {
            Ok(root) => return Ok(root),
            Err(e) => e,
        };
        let Some(fallback) = &self.fallback else {
            return Err(err);
        };

        tracing::warn!(
            localization = %localization.id,
            builder = self.primary.name(),
            fallback = fallback.name(),
            error = %err,
            "Navigation build failed, using fallback"
        );
        fallback.build_full_tree(localization)
    }

    /// Full navigation model of a localization.
    ///
    /// Returns the published snapshot when its version matches the
    /// localization's and the region TTL hasn't run out. Otherwise reads the
    /// cache region (building on a miss), relinks the result and publishes it.
    ///
    /// # Errors
    ///
    /// Returns [`NavigationError::Build`] if neither the cache nor any builder
    /// can produce the tree.
    ///
    /// # Panics
    ///
    /// Panics if internal locks are poisoned.
    pub fn navigation_model(
        &self,
        localization: &Localization,
    ) -> Result<Arc<NavigationTree>, NavigationError> {
        let start = Instant::now();

        // Fast path: published snapshot
        if let Some(tree) = self.snapshot(localization) {
            return Ok(tree);
        }

        // Slow path: acquire reload lock
        let _guard = self.reload_lock.lock().unwrap();

        // Double-check after acquiring lock
        if let Some(tree) = self.snapshot(localization) {
            return Ok(tree);
        }

        let mut built = false;
        let bucket = self.cache.bucket(&Self::region(localization));
        let root: SitemapItem =
            bucket.get_or_add_json(MODEL_KEY, &localization.version, || {
                built = true;
                self.build_with_fallback(localization)
            })?;

        let tree = Arc::new(rebuild_parent_links(root, self.options.order));
        self.snapshots.write().unwrap().insert(
            localization.id.clone(),
            Snapshot {
                version: localization.version.clone(),
                tree: Arc::clone(&tree),
                expires_at: bucket.ttl().map(|ttl| Instant::now() + ttl),
            },
        );

        tracing::info!(
            localization = %localization.id,
            version = %localization.version,
            source = if built { "builder" } else { "cache" },
            node_count = tree.len(),
            elapsed_ms = elapsed_ms(start),
            "Navigation model loaded"
        );
        Ok(tree)
    }

    /// Run a link query, degrading to no links when the model is unavailable.
    fn links_with(
        &self,
        query: &'static str,
        localization: &Localization,
        f: impl FnOnce(&NavigationTree) -> NavigationLinks,
    ) -> NavigationLinks {
        match self.navigation_model(localization) {
            Ok(tree) => f(&tree),
            Err(e) => {
                tracing::warn!(
                    localization = %localization.id,
                    query,
                    error = %e,
                    "Navigation model unavailable, returning no links"
                );
                NavigationLinks::default()
            }
        }
    }

    /// Links for the top-level menu.
    ///
    /// `_path` is accepted for symmetry with the other link queries; the top
    /// menu is the same on every page.
    pub fn top_navigation_links(&self, _path: &str, localization: &Localization) -> NavigationLinks {
        self.links_with("top", localization, |tree| {
            links::top_links(tree, &self.options.index_title)
        })
    }

    /// Links for the section containing `path`.
    pub fn context_navigation_links(
        &self,
        path: &str,
        localization: &Localization,
    ) -> NavigationLinks {
        self.links_with("context", localization, |tree| {
            links::context_links(tree, path, &self.options.rules)
        })
    }

    /// Breadcrumb trail for `path`.
    pub fn breadcrumb_navigation_links(
        &self,
        path: &str,
        localization: &Localization,
    ) -> NavigationLinks {
        self.links_with("breadcrumb", localization, |tree| {
            links::breadcrumb_links(tree, path, &self.options.rules)
        })
    }

    /// Bounded subtree for `id` (or the root level when `None`).
    ///
    /// The id and filter are validated before any source or cache access.
    /// Results are cached per localization under the version etag and relinked
    /// like the full model. An id that doesn't resolve gives an empty tree.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::InvalidId`] or [`ResolveError::InvalidFilter`]
    /// for bad input, and other [`NavigationError`]s for source failures.
    pub fn navigation_subtree(
        &self,
        id: Option<&str>,
        filter: &NavigationFilter,
        localization: &Localization,
    ) -> Result<NavigationTree, NavigationError> {
        let id = id.map(SitemapItemId::parse).transpose().map_err(ResolveError::from)?;
        let levels = filter.levels()?;

        let key = format!(
            "{}_a{}_l{levels}",
            id.as_ref().map_or_else(|| "root".to_owned(), ToString::to_string),
            u8::from(filter.include_ancestors),
        );
        let bucket = self.cache.bucket(&Self::subtree_region(localization));
        let result: Result<Vec<SitemapItem>, NavigationError> =
            bucket.get_or_add_json(&key, &localization.version, || {
                self.resolve_subtree(id.as_ref(), filter, localization)
            });

        match result {
            Ok(items) => Ok(NavigationTree::from_items(items, self.options.order)),
            Err(NavigationError::Resolve(ResolveError::NotFound(missing))) => {
                tracing::warn!(
                    localization = %localization.id,
                    id = %missing,
                    "Sitemap item not found, returning empty subtree"
                );
                Ok(NavigationTree::empty(self.options.order))
            }
            Err(e) => Err(e),
        }
    }

    fn resolve_subtree(
        &self,
        id: Option<&SitemapItemId>,
        filter: &NavigationFilter,
        localization: &Localization,
    ) -> Result<Vec<SitemapItem>, NavigationError> {
        match &self.resolver {
            Some(resolver) => Ok(resolver.resolve(id, filter, localization)?),
            None => {
                let tree = self.navigation_model(localization)?;
                Ok(subtree_from_tree(&tree, id, filter)?)
            }
        }
    }

    /// Drop everything cached for a localization.
    ///
    /// Removes the published snapshot, the cached model and the cached
    /// subtrees. Readers holding a snapshot keep using it.
    ///
    /// # Panics
    ///
    /// Panics if internal locks are poisoned.
    pub fn refresh(&self, localization: &Localization) {
        let _guard = self.reload_lock.lock().unwrap();
        self.snapshots.write().unwrap().remove(&localization.id);
        self.cache.bucket(&Self::region(localization)).remove(MODEL_KEY);
        self.cache.bucket(&Self::subtree_region(localization)).clear();
        tracing::debug!(localization = %localization.id, "Navigation refreshed");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use pretty_assertions::assert_eq;
    use sitenav_cache::{MemoryCache, NullCache};
    use sitenav_source::SourceError;

    use super::*;
    use crate::item::NodeKind;

    static_assertions::assert_impl_all!(NavigationProvider: Send, Sync);

    /// Builder returning a fixed tree, or failing, and counting calls.
    struct FixedBuilder {
        root: Option<SitemapItem>,
        calls: AtomicUsize,
    }

    impl FixedBuilder {
        fn new(root: Option<SitemapItem>) -> Arc<Self> {
            Arc::new(Self {
                root,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl NavigationBuilder for FixedBuilder {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn build_full_tree(&self, _localization: &Localization) -> Result<SitemapItem, BuildError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.root
                .clone()
                .ok_or_else(|| SourceError::not_found("/navigation.json").into())
        }
    }

    fn site(home: &str) -> SitemapItem {
        let rules = UrlRules::default();
        SitemapItem::new("t1", home, NodeKind::StructureGroup)
            .with_url("/", &rules)
            .with_visible(true)
            .with_items(vec![
                SitemapItem::new("t1-k2", "Products", NodeKind::StructureGroup)
                    .with_url("/products", &rules)
                    .with_visible(true)
                    .with_items(vec![
                        SitemapItem::new("t1-p3", "Widget", NodeKind::Page)
                            .with_url("/products/widget.html", &rules)
                            .with_visible(true),
                    ]),
            ])
    }

    fn localization() -> Localization {
        Localization::new("en", "/").with_version("1")
    }

    fn provider(builder: &Arc<FixedBuilder>, cache: Arc<dyn Cache>) -> NavigationProvider {
        NavigationProvider::new(
            Arc::clone(builder) as Arc<dyn NavigationBuilder>,
            cache,
            NavigationOptions::default(),
        )
    }

    #[test]
    fn test_model_is_built_once_and_linked() {
        let builder = FixedBuilder::new(Some(site("Home")));
        let provider = provider(&builder, Arc::new(MemoryCache::new()));

        let first = provider.navigation_model(&localization()).unwrap();
        let second = provider.navigation_model(&localization()).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(builder.calls(), 1);
        let widget = first.find_by_id("t1-p3").unwrap();
        let parent = first.parent(widget).unwrap();
        assert_eq!(first.node(parent).id, "t1-k2");
    }

    #[test]
    fn test_cache_hit_is_relinked_without_building() {
        let cache: Arc<dyn Cache> = Arc::new(MemoryCache::new());
        let warm = FixedBuilder::new(Some(site("Home")));
        provider(&warm, Arc::clone(&cache))
            .navigation_model(&localization())
            .unwrap();

        let cold = FixedBuilder::new(None);
        let tree = provider(&cold, cache)
            .navigation_model(&localization())
            .unwrap();

        assert_eq!(cold.calls(), 0);
        let widget = tree.find_by_id("t1-p3").unwrap();
        assert_eq!(tree.depth(widget), 2);
    }

    #[test]
    fn test_new_version_rebuilds() {
        let builder = FixedBuilder::new(Some(site("Home")));
        let provider = provider(&builder, Arc::new(MemoryCache::new()));

        provider.navigation_model(&localization()).unwrap();
        provider
            .navigation_model(&localization().with_version("2"))
            .unwrap();

        assert_eq!(builder.calls(), 2);
    }

    #[test]
    fn test_snapshot_expires_with_region_ttl() {
        let builder = FixedBuilder::new(Some(site("Home")));
        let cache = MemoryCache::new().with_bucket_ttl("navigation-en", Duration::from_millis(10));
        let provider = provider(&builder, Arc::new(cache));

        let first = provider.navigation_model(&localization()).unwrap();
        std::thread::sleep(Duration::from_millis(50));
        let second = provider.navigation_model(&localization()).unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(builder.calls(), 2);
    }

    #[test]
    fn test_snapshot_outlives_other_regions_ttl() {
        let builder = FixedBuilder::new(Some(site("Home")));
        let cache = MemoryCache::new().with_bucket_ttl("navigation-fr", Duration::ZERO);
        let provider = provider(&builder, Arc::new(cache));

        provider.navigation_model(&localization()).unwrap();
        provider.navigation_model(&localization()).unwrap();

        assert_eq!(builder.calls(), 1);
    }

    #[test]
    fn test_fallback_builder() {
        let primary = FixedBuilder::new(None);
        let fallback = FixedBuilder::new(Some(site("Fallback")));
        let provider = provider(&primary, Arc::new(NullCache))
            .with_fallback(Arc::clone(&fallback) as Arc<dyn NavigationBuilder>);

        let tree = provider.navigation_model(&localization()).unwrap();

        let root = tree.root().unwrap();
        assert_eq!(tree.node(root).title, "Fallback");
        assert_eq!((primary.calls(), fallback.calls()), (1, 1));
    }

    #[test]
    fn test_failure_is_surfaced_by_model_and_soft_in_links() {
        let builder = FixedBuilder::new(None);
        let provider = provider(&builder, Arc::new(NullCache));

        let err = provider.navigation_model(&localization()).unwrap_err();
        assert!(matches!(err, NavigationError::Build(BuildError::SourceUnavailable(_))));

        assert!(provider.top_navigation_links("/", &localization()).is_empty());
        assert!(
            provider
                .breadcrumb_navigation_links("/products", &localization())
                .is_empty()
        );
    }

    #[test]
    fn test_refresh_rebuilds() {
        let builder = FixedBuilder::new(Some(site("Home")));
        let provider = provider(&builder, Arc::new(MemoryCache::new()));

        provider.navigation_model(&localization()).unwrap();
        provider.refresh(&localization());
        provider.navigation_model(&localization()).unwrap();

        assert_eq!(builder.calls(), 2);
    }

    #[test]
    fn test_subtree_from_model() {
        let builder = FixedBuilder::new(Some(site("Home")));
        let provider = provider(&builder, Arc::new(MemoryCache::new()));
        let filter = NavigationFilter {
            include_ancestors: true,
            descendant_levels: 0,
        };

        let tree = provider
            .navigation_subtree(Some("t1-p3"), &filter, &localization())
            .unwrap();

        assert_eq!(tree.len(), 3);
        let widget = tree.find_by_id("t1-p3").unwrap();
        let ids: Vec<_> = tree
            .ancestors(widget)
            .into_iter()
            .map(|i| tree.node(i).id.as_str())
            .collect();
        assert_eq!(ids, vec!["t1", "t1-k2"]);
    }

    #[test]
    fn test_subtree_invalid_id_touches_nothing() {
        let builder = FixedBuilder::new(Some(site("Home")));
        let provider = provider(&builder, Arc::new(MemoryCache::new()));

        let err = provider
            .navigation_subtree(Some("bogus-id"), &NavigationFilter::default(), &localization())
            .unwrap_err();

        assert!(matches!(err, NavigationError::Resolve(ResolveError::InvalidId(_))));
        assert_eq!(builder.calls(), 0);
    }

    #[test]
    fn test_subtree_unknown_id_is_empty() {
        let builder = FixedBuilder::new(Some(site("Home")));
        let provider = provider(&builder, Arc::new(MemoryCache::new()));

        let tree = provider
            .navigation_subtree(Some("t1-k99"), &NavigationFilter::default(), &localization())
            .unwrap();

        assert!(tree.is_empty());
    }
}
