//! Sitemap item model.
//!
//! [`SitemapItem`] is the nested, serializable form of a navigation node: it is
//! what builders produce, what resolvers return and what goes into the cache.
//! It deliberately has no parent field. Parent relationships only exist in a
//! [`NavigationTree`](crate::NavigationTree), which is rebuilt from items.
//!
//! # Document format
//!
//! Items (de)serialize with PascalCase keys:
//!
//! ```json
//! {
//!     "Id": "t1-k2",
//!     "Title": "Products",
//!     "OriginalTitle": "010 Products",
//!     "Url": "/products",
//!     "Type": "StructureGroup",
//!     "Visible": true,
//!     "Items": []
//! }
//! ```
//!
//! Missing keys default. A document without `OriginalTitle` uses the raw
//! `Title` as the original title and strips any sequence prefix for display.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static SEQUENCE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{3}\s+(.+)$").unwrap());

/// Type name of structure group nodes.
const STRUCTURE_GROUP: &str = "StructureGroup";
/// Type name of page nodes.
const PAGE: &str = "Page";
/// Type name of taxonomy nodes.
const TAXONOMY_NODE: &str = "TaxonomyNode";

/// Split a three-digit sequence prefix off a title.
///
/// Returns the display title and whether a prefix was present:
/// `"010 Products"` gives `("Products", true)`, `"Products"` gives
/// `("Products", false)`.
#[must_use]
pub fn split_sequence_prefix(title: &str) -> (&str, bool) {
    match SEQUENCE_PREFIX.captures(title).and_then(|c| c.get(1)) {
        Some(rest) => (rest.as_str(), true),
        None => (title, false),
    }
}

/// URL normalization rules.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UrlRules {
    /// Extension stripped from URLs (e.g. ".html").
    pub default_extension: String,
    /// Default page name stripped from the last segment (e.g. "index").
    pub default_page: String,
}

impl Default for UrlRules {
    fn default() -> Self {
        Self {
            default_extension: ".html".to_owned(),
            default_page: "index".to_owned(),
        }
    }
}

/// Strip `suffix` from `s` ignoring ASCII case.
pub(crate) fn strip_suffix_ignore_case<'a>(s: &'a str, suffix: &str) -> Option<&'a str> {
    if suffix.is_empty() || s.len() < suffix.len() {
        return None;
    }
    let split = s.len() - suffix.len();
    let (head, tail) = (s.get(..split)?, s.get(split..)?);
    tail.eq_ignore_ascii_case(suffix).then_some(head)
}

impl UrlRules {
    /// Normalize a site-relative URL.
    ///
    /// Strips the default extension, a trailing default-page segment and a
    /// trailing slash (except on the root), repeating until nothing changes:
    /// `/products/index.html` becomes `/products`, `/index.html` becomes `/`.
    /// The result never ends with the default extension.
    #[must_use]
    pub fn normalize(&self, url: &str) -> String {
        let mut current = url.trim();
        loop {
            let before = current.len();

            if current.len() > 1 {
                current = current.trim_end_matches('/');
                if current.is_empty() {
                    current = "/";
                }
            }
            if let Some(rest) = strip_suffix_ignore_case(current, &self.default_extension) {
                current = rest;
            }
            if let Some(rest) = strip_suffix_ignore_case(current, &self.default_page)
                && rest.ends_with('/')
            {
                current = rest;
            }

            if current.len() == before {
                break;
            }
        }
        current.to_owned()
    }
}

/// Extra data carried by taxonomy-derived nodes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TaxonomyNodeInfo {
    /// Keyword key.
    pub key: String,
    /// Keyword description.
    pub description: String,
    /// Abstract keywords classify no content themselves.
    pub is_abstract: bool,
    /// Whether the keyword has child keywords or classified pages.
    pub has_child_nodes: bool,
    /// Number of items classified under the keyword.
    pub classified_items_count: u32,
}

/// Node kind discriminator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// Folder-like grouping node.
    StructureGroup,
    /// Leaf page.
    Page,
    /// Keyword from a taxonomy.
    TaxonomyNode(TaxonomyNodeInfo),
    /// Any other type name found in a document.
    Other(String),
}

impl NodeKind {
    /// Type name as written in documents.
    #[must_use]
    pub fn type_name(&self) -> &str {
        match self {
            Self::StructureGroup => STRUCTURE_GROUP,
            Self::Page => PAGE,
            Self::TaxonomyNode(_) => TAXONOMY_NODE,
            Self::Other(name) => name,
        }
    }

    /// Whether context navigation may descend into this node.
    ///
    /// Taxonomy keywords group pages the way structure groups do.
    #[must_use]
    pub fn is_section(&self) -> bool {
        matches!(self, Self::StructureGroup | Self::TaxonomyNode(_))
    }

    /// Taxonomy data, for taxonomy nodes.
    #[must_use]
    pub fn taxonomy(&self) -> Option<&TaxonomyNodeInfo> {
        match self {
            Self::TaxonomyNode(info) => Some(info),
            _ => None,
        }
    }
}

/// A node in a navigation tree, with its children nested.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(from = "ItemDocument")]
pub struct SitemapItem {
    /// Identifier, unique within a localization.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Raw title used for sibling ordering.
    pub original_title: String,
    /// Normalized site-relative URL.
    pub url: Option<String>,
    /// Node kind.
    pub kind: NodeKind,
    /// Whether rendered navigation shows the node.
    pub visible: bool,
    /// Child nodes.
    pub items: Vec<SitemapItem>,
}

impl SitemapItem {
    /// Create an item from a raw title.
    ///
    /// The sequence prefix, if any, is stripped for the display title and kept
    /// in the original title.
    #[must_use]
    pub fn new(id: impl Into<String>, raw_title: &str, kind: NodeKind) -> Self {
        let (title, _) = split_sequence_prefix(raw_title);
        Self {
            id: id.into(),
            title: title.to_owned(),
            original_title: raw_title.to_owned(),
            url: None,
            kind,
            visible: false,
            items: Vec::new(),
        }
    }

    /// Set the URL, normalizing it.
    #[must_use]
    pub fn with_url(mut self, url: &str, rules: &UrlRules) -> Self {
        self.set_url(url, rules);
        self
    }

    /// Set visibility.
    #[must_use]
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Set children.
    #[must_use]
    pub fn with_items(mut self, items: Vec<SitemapItem>) -> Self {
        self.items = items;
        self
    }

    /// Assign a normalized URL. Empty URLs clear it.
    pub fn set_url(&mut self, url: &str, rules: &UrlRules) {
        let normalized = rules.normalize(url);
        self.url = (!normalized.is_empty()).then_some(normalized);
    }

    /// Normalize the URLs of this item and all descendants.
    pub fn normalize_urls(&mut self, rules: &UrlRules) {
        if let Some(url) = self.url.take() {
            self.set_url(&url, rules);
        }
        for child in &mut self.items {
            child.normalize_urls(rules);
        }
    }

    /// Number of items in this subtree, including this one.
    #[must_use]
    pub fn count(&self) -> usize {
        1 + self.items.iter().map(SitemapItem::count).sum::<usize>()
    }
}

/// Wire form of an item.
#[derive(Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct ItemDocument {
    id: String,
    title: String,
    original_title: Option<String>,
    url: Option<String>,
    #[serde(rename = "Type")]
    kind: Option<String>,
    visible: bool,
    items: Vec<SitemapItem>,
    key: String,
    description: String,
    is_abstract: bool,
    has_child_nodes: bool,
    classified_items_count: u32,
}

impl From<ItemDocument> for SitemapItem {
    fn from(doc: ItemDocument) -> Self {
        let kind = match doc.kind.as_deref() {
            None | Some(PAGE) => NodeKind::Page,
            Some(STRUCTURE_GROUP) => NodeKind::StructureGroup,
            Some(TAXONOMY_NODE) => NodeKind::TaxonomyNode(TaxonomyNodeInfo {
                key: doc.key,
                description: doc.description,
                is_abstract: doc.is_abstract,
                has_child_nodes: doc.has_child_nodes,
                classified_items_count: doc.classified_items_count,
            }),
            Some(other) => NodeKind::Other(other.to_owned()),
        };

        let (title, original_title) = match doc.original_title {
            Some(original) => (doc.title, original),
            None => (split_sequence_prefix(&doc.title).0.to_owned(), doc.title),
        };

        Self {
            id: doc.id,
            title,
            original_title,
            url: doc.url.filter(|u| !u.is_empty()),
            kind,
            visible: doc.visible,
            items: doc.items,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct ItemDocumentRef<'a> {
    id: &'a str,
    title: &'a str,
    original_title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<&'a str>,
    #[serde(rename = "Type")]
    kind: &'a str,
    visible: bool,
    #[serde(flatten)]
    taxonomy: Option<&'a TaxonomyNodeInfo>,
    items: &'a [SitemapItem],
}

impl Serialize for SitemapItem {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ItemDocumentRef {
            id: &self.id,
            title: &self.title,
            original_title: &self.original_title,
            url: self.url.as_deref(),
            kind: self.kind.type_name(),
            visible: self.visible,
            taxonomy: self.kind.taxonomy(),
            items: &self.items,
        }
        .serialize(serializer)
    }
}
