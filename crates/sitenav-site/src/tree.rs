//! Navigation tree with parent index.
//!
//! [`NavigationTree`] is the immutable, linked form of a set of
//! [`SitemapItem`]s. Nodes are stored in a flat `Vec` with parent/children
//! relationships tracked by indices, so there is no shared mutable parent
//! pointer to race on:
//! - O(1) id lookups via `id_index` `HashMap`
//! - O(1) parent lookups via the `parents` vector
//! - O(d) ancestor chains where d is the node depth
//!
//! Trees are built by [`rebuild_parent_links`] or [`NavigationTree::from_items`],
//! which assign every parent index and sort every child list by the tree's
//! [`SiblingOrder`]. Rebuilding from [`NavigationTree::to_items`] yields an
//! identical tree.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::id::SitemapItemId;
use crate::item::{NodeKind, SitemapItem};

/// Ordering applied to every child list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SiblingOrder {
    /// Ordinal, case-sensitive comparison of original titles.
    #[default]
    OriginalTitle,
    /// Numeric comparison of the two id components, for compound ids.
    ///
    /// Items whose ids don't parse sort after those that do; ties fall back to
    /// original titles.
    NumericId,
}

impl SiblingOrder {
    /// Compare two items.
    #[must_use]
    pub fn compare(self, a: &SitemapItem, b: &SitemapItem) -> Ordering {
        match self {
            Self::OriginalTitle => a.original_title.cmp(&b.original_title),
            Self::NumericId => {
                let key = |item: &SitemapItem| {
                    SitemapItemId::parse(&item.id)
                        .ok()
                        .map(|id| id.numeric_pair())
                };
                match (key(a), key(b)) {
                    (Some(x), Some(y)) => x.cmp(&y),
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => Ordering::Equal,
                }
                .then_with(|| a.original_title.cmp(&b.original_title))
            }
        }
    }
}

/// Node data without children.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavigationNode {
    /// Identifier.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Raw title used for ordering.
    pub original_title: String,
    /// Normalized URL.
    pub url: Option<String>,
    /// Node kind.
    pub kind: NodeKind,
    /// Whether rendered navigation shows the node.
    pub visible: bool,
}

impl NavigationNode {
    fn split(item: SitemapItem) -> (Self, Vec<SitemapItem>) {
        let SitemapItem {
            id,
            title,
            original_title,
            url,
            kind,
            visible,
            items,
        } = item;
        (
            Self {
                id,
                title,
                original_title,
                url,
                kind,
                visible,
            },
            items,
        )
    }

    fn to_item(&self, items: Vec<SitemapItem>) -> SitemapItem {
        SitemapItem {
            id: self.id.clone(),
            title: self.title.clone(),
            original_title: self.original_title.clone(),
            url: self.url.clone(),
            kind: self.kind.clone(),
            visible: self.visible,
            items,
        }
    }

    /// Whether the node's URL equals `url`, ignoring ASCII case.
    #[must_use]
    pub fn url_eq(&self, url: &str) -> bool {
        self.url.as_deref().is_some_and(|u| u.eq_ignore_ascii_case(url))
    }
}

/// Immutable navigation forest with a parent index.
///
/// A full navigation model has exactly one root. Subtree results may have
/// any number of roots.
#[derive(Debug, Default)]
pub struct NavigationTree {
    nodes: Vec<NavigationNode>,
    children: Vec<Vec<usize>>,
    parents: Vec<Option<usize>>,
    roots: Vec<usize>,
    id_index: HashMap<String, usize>,
    order: SiblingOrder,
}

/// Link a tree rooted at `root`, sorting every child list by `order`.
#[must_use]
pub fn rebuild_parent_links(root: SitemapItem, order: SiblingOrder) -> NavigationTree {
    NavigationTree::from_items(vec![root], order)
}

impl NavigationTree {
    /// Create an empty tree.
    #[must_use]
    pub fn empty(order: SiblingOrder) -> Self {
        Self {
            order,
            ..Self::default()
        }
    }

    /// Link a sequence of sibling items under a virtual parent.
    ///
    /// The items become the roots, sorted like any child list. When two nodes
    /// share an id, lookups by id find the first one in pre-order.
    #[must_use]
    pub fn from_items(items: Vec<SitemapItem>, order: SiblingOrder) -> Self {
        let mut tree = Self::empty(order);
        let mut items = items;
        items.sort_by(|a, b| order.compare(a, b));
        for item in items {
            let idx = tree.push(item, None);
            tree.roots.push(idx);
        }
        tree
    }

    /// Add `item` and its descendants in pre-order, returning its index.
    fn push(&mut self, item: SitemapItem, parent: Option<usize>) -> usize {
        let (node, mut items) = NavigationNode::split(item);
        let idx = self.nodes.len();

        self.id_index.entry(node.id.clone()).or_insert(idx);
        self.nodes.push(node);
        self.children.push(Vec::new());
        self.parents.push(parent);

        let order = self.order;
        items.sort_by(|a, b| order.compare(a, b));
        for child in items {
            let child_idx = self.push(child, Some(idx));
            self.children[idx].push(child_idx);
        }

        idx
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Ordering applied to child lists.
    #[must_use]
    pub fn order(&self) -> SiblingOrder {
        self.order
    }

    /// Root indices.
    #[must_use]
    pub fn roots(&self) -> &[usize] {
        &self.roots
    }

    /// The first root, for single-rooted trees.
    #[must_use]
    pub fn root(&self) -> Option<usize> {
        self.roots.first().copied()
    }

    /// Node at `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is out of bounds.
    #[must_use]
    pub fn node(&self, idx: usize) -> &NavigationNode {
        &self.nodes[idx]
    }

    /// Child indices of `idx`, in sibling order.
    #[must_use]
    pub fn children(&self, idx: usize) -> &[usize] {
        &self.children[idx]
    }

    /// Parent index of `idx`, `None` for roots.
    #[must_use]
    pub fn parent(&self, idx: usize) -> Option<usize> {
        self.parents[idx]
    }

    /// Ancestors of `idx`, root first, excluding `idx` itself.
    #[must_use]
    pub fn ancestors(&self, idx: usize) -> Vec<usize> {
        let mut chain = Vec::new();
        let mut current = self.parents[idx];
        while let Some(i) = current {
            chain.push(i);
            current = self.parents[i];
        }
        chain.reverse();
        chain
    }

    /// Depth of `idx` (roots are at depth 0).
    #[must_use]
    pub fn depth(&self, idx: usize) -> usize {
        self.ancestors(idx).len()
    }

    /// Find a node by id.
    #[must_use]
    pub fn find_by_id(&self, id: &str) -> Option<usize> {
        self.id_index.get(id).copied()
    }

    /// Find the first node in pre-order whose URL equals `url`, ignoring ASCII case.
    #[must_use]
    pub fn find_by_url(&self, url: &str) -> Option<usize> {
        self.nodes.iter().position(|node| node.url_eq(url))
    }

    /// Nested item for `idx` with all descendants.
    #[must_use]
    pub fn to_item(&self, idx: usize) -> SitemapItem {
        self.to_item_limited(idx, None)
    }

    /// Nested item for `idx` with descendants down to `levels` levels.
    ///
    /// `Some(0)` yields the node with no items; `None` means no limit.
    #[must_use]
    pub fn to_item_limited(&self, idx: usize, levels: Option<usize>) -> SitemapItem {
        let items = match levels {
            Some(0) => Vec::new(),
            _ => {
                let next = levels.map(|l| l - 1);
                self.children[idx]
                    .iter()
                    .map(|&child| self.to_item_limited(child, next))
                    .collect()
            }
        };
        self.nodes[idx].to_item(items)
    }

    /// All roots as nested items. Parent links are dropped.
    #[must_use]
    pub fn to_items(&self) -> Vec<SitemapItem> {
        self.roots.iter().map(|&root| self.to_item(root)).collect()
    }
}
