//! On-demand subtree resolution.
//!
//! A subtree query asks for one node (or the root level) expanded to a
//! bounded depth, optionally wrapped in its ancestor chain. Resolvers answer
//! it through the backing source's native lookups so that a shallow query
//! never pays for building the whole tree.
//!
//! Result shapes, for `descendant_levels = L`:
//! - no id: the root's children, each expanded `L` further levels
//! - an id: `[node]` expanded `L` levels (`0` gives the node with no items)
//! - an id with `include_ancestors`: `[root]`, where every ancestor holds
//!   only the single child on the path down to the node

use std::sync::Arc;

use sitenav_source::{
    DepthFilter, ItemType, Keyword, Localization, SourceError, TaxonomyService, TcmUri,
};

use crate::id::{InvalidIdError, SitemapItemId};
use crate::item::{SitemapItem, UrlRules};
use crate::keywords::KeywordMapper;
use crate::tree::NavigationTree;

/// Shape of a subtree query.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NavigationFilter {
    /// Wrap the result in its ancestor chain.
    pub include_ancestors: bool,
    /// Levels of descendants to materialize. Negative values are invalid.
    pub descendant_levels: i32,
}

impl Default for NavigationFilter {
    fn default() -> Self {
        Self {
            include_ancestors: false,
            descendant_levels: 1,
        }
    }
}

impl NavigationFilter {
    /// Validated level count.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::InvalidFilter`] for negative levels.
    pub fn levels(&self) -> Result<usize, ResolveError> {
        usize::try_from(self.descendant_levels)
            .map_err(|_| ResolveError::InvalidFilter(self.descendant_levels))
    }
}

/// Error returned when a subtree can't be resolved.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// The id doesn't match the id format.
    #[error(transparent)]
    InvalidId(#[from] InvalidIdError),
    /// The filter asks for a negative depth.
    #[error("Invalid descendant levels: {0}")]
    InvalidFilter(i32),
    /// No node has the requested id.
    #[error("Sitemap item not found: {0}")]
    NotFound(String),
    /// The localization has no navigation taxonomy.
    #[error("Localization {0} has no navigation taxonomy")]
    NotConfigured(String),
    /// The backing source failed.
    #[error("Subtree source error: {0}")]
    Source(#[from] SourceError),
}

/// Resolves bounded subtrees.
pub trait SubtreeResolver: Send + Sync {
    /// Resolve the subtree for `id` (or the root level when `None`).
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::NotFound`] if the id doesn't resolve, and other
    /// [`ResolveError`] variants for invalid filters or source failures.
    fn resolve(
        &self,
        id: Option<&SitemapItemId>,
        filter: &NavigationFilter,
        localization: &Localization,
    ) -> Result<Vec<SitemapItem>, ResolveError>;
}

/// Wrap `item` in copies of `ancestors` (root first), each holding one child.
fn wrap_in_ancestors(item: SitemapItem, ancestors: Vec<SitemapItem>) -> SitemapItem {
    ancestors
        .into_iter()
        .rev()
        .fold(item, |child, ancestor| ancestor.with_items(vec![child]))
}

/// Resolve a subtree against an already built tree.
///
/// Used for document-backed navigation, where the full tree is the only
/// source of truth. Ids are matched in their canonical form.
///
/// # Errors
///
/// Returns [`ResolveError::NotFound`] if no node has the id.
pub fn subtree_from_tree(
    tree: &NavigationTree,
    id: Option<&SitemapItemId>,
    filter: &NavigationFilter,
) -> Result<Vec<SitemapItem>, ResolveError> {
    let levels = filter.levels()?;

    let Some(id) = id else {
        let Some(root) = tree.root() else {
            return Ok(Vec::new());
        };
        return Ok(tree
            .children(root)
            .iter()
            .map(|&child| tree.to_item_limited(child, Some(levels)))
            .collect());
    };

    let key = id.to_string();
    let idx = tree
        .find_by_id(&key)
        .ok_or(ResolveError::NotFound(key))?;
    let item = tree.to_item_limited(idx, Some(levels));

    if !filter.include_ancestors {
        return Ok(vec![item]);
    }
    let ancestors = tree
        .ancestors(idx)
        .into_iter()
        .map(|i| tree.to_item_limited(i, Some(0)))
        .collect();
    Ok(vec![wrap_in_ancestors(item, ancestors)])
}

/// Subtree resolver backed by taxonomy lookups.
///
/// Descendants come from a downward depth-filtered keyword lookup, ancestors
/// from an upward one. Page ids without a keyword component are located
/// through the page's classifications.
pub struct TaxonomySubtreeResolver {
    service: Arc<dyn TaxonomyService>,
    rules: UrlRules,
}

impl TaxonomySubtreeResolver {
    /// Create a resolver over `service`.
    #[must_use]
    pub fn new(service: Arc<dyn TaxonomyService>, rules: UrlRules) -> Self {
        Self { service, rules }
    }

    fn mapper<'a>(
        &'a self,
        taxonomy_id: u32,
        localization: &'a Localization,
    ) -> KeywordMapper<'a> {
        KeywordMapper {
            taxonomy_id,
            rules: &self.rules,
            root_url: &localization.path,
        }
    }

    /// Look up `keyword_uri` (`levels` levels down), mapping not-found to `id`.
    fn keyword(
        &self,
        taxonomy_uri: &TcmUri,
        filter: DepthFilter,
        keyword_uri: &TcmUri,
        id: &SitemapItemId,
    ) -> Result<Keyword, ResolveError> {
        self.service
            .get_keyword(taxonomy_uri, filter, keyword_uri)
            .map_err(|e| {
                if e.is_not_found() {
                    ResolveError::NotFound(id.to_string())
                } else {
                    ResolveError::Source(e)
                }
            })
    }

    /// Ancestor items of `keyword_uri`, root first, without children.
    fn ancestors(
        &self,
        taxonomy_uri: &TcmUri,
        keyword_uri: &TcmUri,
        id: &SitemapItemId,
        localization: &Localization,
    ) -> Result<Vec<SitemapItem>, ResolveError> {
        let keyword = self.keyword(
            taxonomy_uri,
            DepthFilter::up(DepthFilter::UNLIMITED),
            keyword_uri,
            id,
        )?;
        let mapper = self.mapper(taxonomy_uri.item_id, localization);

        let mut chain = Vec::new();
        let mut current = keyword.parent.as_deref();
        while let Some(parent) = current {
            chain.push(mapper.keyword_node(parent));
            current = parent.parent.as_deref();
        }
        chain.reverse();
        Ok(chain)
    }

    fn resolve_root_level(
        &self,
        taxonomy_uri: &TcmUri,
        levels: usize,
        localization: &Localization,
    ) -> Result<Vec<SitemapItem>, ResolveError> {
        let depth = i32::try_from(levels + 1).unwrap_or(DepthFilter::UNLIMITED);
        let root = self
            .service
            .get_keyword(taxonomy_uri, DepthFilter::down(depth), taxonomy_uri)
            .map_err(|e| {
                if e.is_not_found() {
                    ResolveError::NotConfigured(localization.id.clone())
                } else {
                    ResolveError::Source(e)
                }
            })?;
        let item = self
            .mapper(taxonomy_uri.item_id, localization)
            .keyword_item(&root, Some(levels + 1));
        Ok(item.items)
    }

    fn resolve_keyword(
        &self,
        taxonomy_uri: &TcmUri,
        keyword_uri: &TcmUri,
        id: &SitemapItemId,
        filter: &NavigationFilter,
        levels: usize,
        localization: &Localization,
    ) -> Result<SitemapItem, ResolveError> {
        let depth = i32::try_from(levels).unwrap_or(DepthFilter::UNLIMITED);
        let keyword = self.keyword(taxonomy_uri, DepthFilter::down(depth), keyword_uri, id)?;
        let item = self
            .mapper(taxonomy_uri.item_id, localization)
            .keyword_item(&keyword, Some(levels));

        if !filter.include_ancestors {
            return Ok(item);
        }
        let ancestors = self.ancestors(taxonomy_uri, keyword_uri, id, localization)?;
        Ok(wrap_in_ancestors(item, ancestors))
    }

    fn resolve_page(
        &self,
        taxonomy_uri: &TcmUri,
        page_id: u32,
        id: &SitemapItemId,
        filter: &NavigationFilter,
        localization: &Localization,
    ) -> Result<SitemapItem, ResolveError> {
        let publication_id = taxonomy_uri.publication_id;
        let page_uri = TcmUri::new(publication_id, page_id, ItemType::Page);

        let keyword_uri = match id.keyword_id {
            Some(keyword_id) => TcmUri::new(publication_id, keyword_id, ItemType::Keyword),
            None => {
                let keywords = self.service.get_page_keywords(taxonomy_uri, &page_uri)?;
                keywords
                    .iter()
                    .find_map(|uri| uri.parse::<TcmUri>().ok())
                    .ok_or_else(|| ResolveError::NotFound(id.to_string()))?
            }
        };

        let keyword = self.keyword(taxonomy_uri, DepthFilter::down(0), &keyword_uri, id)?;
        let page_uri = page_uri.to_string();
        let page = keyword
            .pages
            .iter()
            .find(|p| p.uri == page_uri)
            .ok_or_else(|| ResolveError::NotFound(id.to_string()))?;
        let mapper = self.mapper(taxonomy_uri.item_id, localization);
        let item = mapper.page_item(page);

        if !filter.include_ancestors {
            return Ok(item);
        }
        let mut ancestors = self.ancestors(taxonomy_uri, &keyword_uri, id, localization)?;
        ancestors.push(mapper.keyword_node(&keyword));
        Ok(wrap_in_ancestors(item, ancestors))
    }
}

impl SubtreeResolver for TaxonomySubtreeResolver {
    fn resolve(
        &self,
        id: Option<&SitemapItemId>,
        filter: &NavigationFilter,
        localization: &Localization,
    ) -> Result<Vec<SitemapItem>, ResolveError> {
        let levels = filter.levels()?;

        let Some(id) = id else {
            let taxonomy_uri = localization
                .taxonomy_uri()
                .ok_or_else(|| ResolveError::NotConfigured(localization.id.clone()))?;
            return self.resolve_root_level(&taxonomy_uri, levels, localization);
        };

        let taxonomy_uri = TcmUri::new(
            localization.publication_id,
            id.taxonomy_id,
            ItemType::Category,
        );
        let item = match (id.page_id, id.keyword_id) {
            (Some(page_id), _) => {
                self.resolve_page(&taxonomy_uri, page_id, id, filter, localization)?
            }
            (None, Some(keyword_id)) => {
                let keyword_uri =
                    TcmUri::new(localization.publication_id, keyword_id, ItemType::Keyword);
                self.resolve_keyword(
                    &taxonomy_uri,
                    &keyword_uri,
                    id,
                    filter,
                    levels,
                    localization,
                )?
            }
            (None, None) => self.resolve_keyword(
                &taxonomy_uri,
                &taxonomy_uri,
                id,
                filter,
                levels,
                localization,
            )?,
        };

        tracing::debug!(
            id = %id,
            levels,
            include_ancestors = filter.include_ancestors,
            nodes = item.count(),
            "Resolved subtree"
        );
        Ok(vec![item])
    }
}
