//! Mock sources for testing.
//!
//! Provides [`MockContentProvider`] and [`MockTaxonomyService`] for unit
//! testing without filesystem or network access. Both count calls so tests
//! can assert that a code path never reached the backing source.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::content::RawDataProvider;
use crate::error::{SourceError, SourceErrorKind};
use crate::localization::Localization;
use crate::taxonomy::{DepthDirection, DepthFilter, Keyword, TaxonomyService};
use crate::tcm::TcmUri;

/// Backend identifier for error messages.
const BACKEND: &str = "Mock";

/// In-memory [`RawDataProvider`].
///
/// Documents are keyed by their full path (localization path joined with the
/// document name), e.g. `/navigation.json` or `/fr/navigation.json`.
///
/// # Example
///
/// ```ignore
/// use sitenav_source::{Localization, MockContentProvider, RawDataProvider};
///
/// let provider = MockContentProvider::new().with_document("/navigation.json", "{}");
/// let json = provider.get_page_content("navigation.json", &Localization::new("en", "/"))?;
/// assert_eq!(provider.call_count(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MockContentProvider {
    documents: RwLock<HashMap<String, String>>,
    failure: RwLock<Option<SourceErrorKind>>,
    calls: AtomicUsize,
}

impl MockContentProvider {
    /// Create a provider with no documents.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document at `path`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_document(self, path: impl Into<String>, content: impl Into<String>) -> Self {
        self.set_document(path, content);
        self
    }

    /// Replace or add a document at `path`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn set_document(&self, path: impl Into<String>, content: impl Into<String>) {
        self.documents
            .write()
            .unwrap()
            .insert(path.into(), content.into());
    }

    /// Make every subsequent call fail with `kind`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn fail_with(&self, kind: SourceErrorKind) {
        *self.failure.write().unwrap() = Some(kind);
    }

    /// Number of `get_page_content` calls so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl RawDataProvider for MockContentProvider {
    fn get_page_content(
        &self,
        path: &str,
        localization: &Localization,
    ) -> Result<String, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let full_path = localization.document_path(path);

        if let Some(kind) = *self.failure.read().unwrap() {
            return Err(SourceError::new(kind)
                .with_resource(full_path)
                .with_backend(BACKEND));
        }

        self.documents
            .read()
            .unwrap()
            .get(&full_path)
            .cloned()
            .ok_or_else(|| SourceError::not_found(full_path).with_backend(BACKEND))
    }
}

/// In-memory [`TaxonomyService`] holding whole taxonomies.
///
/// Each taxonomy is registered as its fully expanded root keyword. Lookups
/// prune the stored hierarchy to the requested depth, and upward lookups
/// attach the parent chain, the way a real taxonomy service would.
#[derive(Debug, Default)]
pub struct MockTaxonomyService {
    taxonomies: RwLock<HashMap<String, Keyword>>,
    failure: RwLock<Option<SourceErrorKind>>,
    calls: AtomicUsize,
}

impl MockTaxonomyService {
    /// Create a service with no taxonomies.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a taxonomy by its root keyword (whose `uri` is the taxonomy URI).
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_taxonomy(self, root: Keyword) -> Self {
        self.taxonomies
            .write()
            .unwrap()
            .insert(root.uri.clone(), root);
        self
    }

    /// Make every subsequent call fail with `kind`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn fail_with(&self, kind: SourceErrorKind) {
        *self.failure.write().unwrap() = Some(kind);
    }

    /// Number of service calls so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn enter(&self, resource: &str) -> Result<(), SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match *self.failure.read().unwrap() {
            Some(kind) => Err(SourceError::new(kind)
                .with_resource(resource)
                .with_backend(BACKEND)),
            None => Ok(()),
        }
    }
}

/// Find `uri` below `node`, returning the path of keywords from `node` to it.
fn find_path<'a>(node: &'a Keyword, uri: &str, path: &mut Vec<&'a Keyword>) -> bool {
    path.push(node);
    if node.uri == uri {
        return true;
    }
    for child in &node.children {
        if find_path(child, uri, path) {
            return true;
        }
    }
    path.pop();
    false
}

/// Copy of `keyword` with children kept down to `filter` levels.
fn prune(keyword: &Keyword, filter: DepthFilter, depth: i32) -> Keyword {
    let children = if filter.allows(depth + 1) {
        keyword
            .children
            .iter()
            .map(|child| prune(child, filter, depth + 1))
            .collect()
    } else {
        Vec::new()
    };
    Keyword {
        children,
        parent: None,
        has_children: !keyword.children.is_empty(),
        ..keyword.clone()
    }
}

/// Copy of `keyword` without children or parent.
fn detached(keyword: &Keyword) -> Keyword {
    prune(keyword, DepthFilter::down(0), 0)
}

impl TaxonomyService for MockTaxonomyService {
    fn get_keyword(
        &self,
        taxonomy_uri: &TcmUri,
        filter: DepthFilter,
        keyword_uri: &TcmUri,
    ) -> Result<Keyword, SourceError> {
        let keyword_uri = keyword_uri.to_string();
        self.enter(&keyword_uri)?;

        let taxonomies = self.taxonomies.read().unwrap();
        let root = taxonomies
            .get(&taxonomy_uri.to_string())
            .ok_or_else(|| SourceError::not_found(taxonomy_uri.to_string()).with_backend(BACKEND))?;

        let mut path = Vec::new();
        if !find_path(root, &keyword_uri, &mut path) {
            return Err(SourceError::not_found(keyword_uri).with_backend(BACKEND));
        }
        let Some((target, ancestors)) = path.split_last() else {
            return Err(SourceError::not_found(keyword_uri).with_backend(BACKEND));
        };

        match filter.direction {
            DepthDirection::Down => Ok(prune(target, filter, 0)),
            DepthDirection::Up => {
                // Chain parents nearest-first, stopping at the level limit.
                let mut parent: Option<Box<Keyword>> = None;
                for (level, ancestor) in ancestors.iter().enumerate() {
                    let distance = i32::try_from(ancestors.len() - level).unwrap_or(i32::MAX);
                    if !filter.allows(distance) {
                        continue;
                    }
                    let mut node = detached(ancestor);
                    node.parent = parent.take();
                    parent = Some(Box::new(node));
                }
                let mut result = detached(target);
                result.parent = parent;
                Ok(result)
            }
        }
    }

    fn get_page_keywords(
        &self,
        taxonomy_uri: &TcmUri,
        page_uri: &TcmUri,
    ) -> Result<Vec<String>, SourceError> {
        let page_uri = page_uri.to_string();
        self.enter(&page_uri)?;

        let taxonomies = self.taxonomies.read().unwrap();
        let Some(root) = taxonomies.get(&taxonomy_uri.to_string()) else {
            return Ok(Vec::new());
        };

        let mut found = Vec::new();
        let mut stack = vec![root];
        while let Some(keyword) = stack.pop() {
            if keyword.pages.iter().any(|p| p.uri == page_uri) {
                found.push(keyword.uri.clone());
            }
            stack.extend(keyword.children.iter().rev());
        }
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::ClassifiedPage;
    use crate::tcm::ItemType;

    fn keyword(id: u32, title: &str, children: Vec<Keyword>) -> Keyword {
        Keyword {
            uri: TcmUri::new(5, id, ItemType::Keyword).to_string(),
            title: title.to_owned(),
            has_children: !children.is_empty(),
            children,
            ..Keyword::default()
        }
    }

    fn taxonomy() -> Keyword {
        let mut widget = keyword(13, "010 Widgets", vec![keyword(14, "010 Small", vec![])]);
        widget.pages.push(ClassifiedPage {
            uri: "tcm:5-40-64".to_owned(),
            title: "Widget".to_owned(),
            url: "/products/widgets/index.html".to_owned(),
        });
        Keyword {
            uri: TcmUri::new(5, 3, ItemType::Category).to_string(),
            title: "Site".to_owned(),
            children: vec![keyword(12, "010 Products", vec![widget])],
            has_children: true,
            ..Keyword::default()
        }
    }

    fn tax_uri() -> TcmUri {
        TcmUri::new(5, 3, ItemType::Category)
    }

    #[test]
    fn test_content_provider_by_localization_path() {
        let provider = MockContentProvider::new().with_document("/fr/navigation.json", "{}");

        let fr = Localization::new("fr", "/fr");
        assert_eq!(provider.get_page_content("navigation.json", &fr).unwrap(), "{}");

        let en = Localization::new("en", "/");
        assert!(provider
            .get_page_content("navigation.json", &en)
            .unwrap_err()
            .is_not_found());
        assert_eq!(provider.call_count(), 2);
    }

    #[test]
    fn test_content_provider_failure_injection() {
        let provider = MockContentProvider::new().with_document("/navigation.json", "{}");
        provider.fail_with(SourceErrorKind::Unavailable);

        let err = provider
            .get_page_content("navigation.json", &Localization::new("en", "/"))
            .unwrap_err();

        assert_eq!(err.kind, SourceErrorKind::Unavailable);
    }

    #[test]
    fn test_get_keyword_prunes_depth() {
        let service = MockTaxonomyService::new().with_taxonomy(taxonomy());
        let products = TcmUri::new(5, 12, ItemType::Keyword);

        let zero = service
            .get_keyword(&tax_uri(), DepthFilter::down(0), &products)
            .unwrap();
        assert!(zero.children.is_empty());
        assert!(zero.has_children);

        let one = service
            .get_keyword(&tax_uri(), DepthFilter::down(1), &products)
            .unwrap();
        assert_eq!(one.children.len(), 1);
        assert!(one.children[0].children.is_empty());

        let all = service
            .get_keyword(&tax_uri(), DepthFilter::down(DepthFilter::UNLIMITED), &tax_uri())
            .unwrap();
        assert_eq!(all.children[0].children[0].children.len(), 1);
        assert_eq!(service.call_count(), 3);
    }

    #[test]
    fn test_get_keyword_up_chains_parents() {
        let service = MockTaxonomyService::new().with_taxonomy(taxonomy());
        let small = TcmUri::new(5, 14, ItemType::Keyword);

        let result = service
            .get_keyword(&tax_uri(), DepthFilter::up(DepthFilter::UNLIMITED), &small)
            .unwrap();

        let parent = result.parent.as_deref().unwrap();
        assert_eq!(parent.item_id(), Some(13));
        let grandparent = parent.parent.as_deref().unwrap();
        assert_eq!(grandparent.item_id(), Some(12));
        let root = grandparent.parent.as_deref().unwrap();
        assert_eq!(root.uri, "tcm:5-3-512");
        assert!(root.parent.is_none());
        assert!(root.children.is_empty());
    }

    #[test]
    fn test_get_keyword_up_respects_levels() {
        let service = MockTaxonomyService::new().with_taxonomy(taxonomy());
        let small = TcmUri::new(5, 14, ItemType::Keyword);

        let result = service
            .get_keyword(&tax_uri(), DepthFilter::up(1), &small)
            .unwrap();

        let parent = result.parent.as_deref().unwrap();
        assert_eq!(parent.item_id(), Some(13));
        assert!(parent.parent.is_none());
    }

    #[test]
    fn test_get_keyword_unknown() {
        let service = MockTaxonomyService::new().with_taxonomy(taxonomy());
        let missing = TcmUri::new(5, 99, ItemType::Keyword);

        let err = service
            .get_keyword(&tax_uri(), DepthFilter::down(0), &missing)
            .unwrap_err();

        assert!(err.is_not_found());
    }

    #[test]
    fn test_get_page_keywords() {
        let service = MockTaxonomyService::new().with_taxonomy(taxonomy());
        let page = TcmUri::new(5, 40, ItemType::Page);

        let keywords = service.get_page_keywords(&tax_uri(), &page).unwrap();

        assert_eq!(keywords, vec!["tcm:5-13-1024".to_owned()]);
    }
}
