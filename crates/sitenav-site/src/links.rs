//! Link derivations over a navigation tree.
//!
//! All three queries walk a linked [`NavigationTree`] and never touch a
//! backing source. URL matching is a case-insensitive prefix test against
//! the normalized request path, and the first matching child in sibling
//! order wins, even when a later sibling would match a longer prefix.

use serde::Serialize;

use crate::item::UrlRules;
use crate::tree::{NavigationNode, NavigationTree};

/// A navigation link.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Link {
    /// Target URL.
    pub url: String,
    /// Text to display.
    pub link_text: String,
}

impl Link {
    fn from_node(node: &NavigationNode) -> Self {
        Self {
            url: node.url.clone().unwrap_or_default(),
            link_text: node.title.clone(),
        }
    }
}

/// An ordered list of links.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct NavigationLinks {
    /// Links in display order.
    pub items: Vec<Link>,
}

impl NavigationLinks {
    /// Number of links.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether there are no links.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Whether `node`'s URL is a case-insensitive prefix of `path`.
fn url_matches(node: &NavigationNode, path: &str) -> bool {
    node.url.as_deref().is_some_and(|url| {
        path.get(..url.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(url))
    })
}

/// Links shown in the top-level menu.
///
/// Visible children of the root that have a URL. A child whose title equals
/// `index_title` (ignoring case) links to the root's URL and title instead
/// of its own.
#[must_use]
pub fn top_links(tree: &NavigationTree, index_title: &str) -> NavigationLinks {
    let Some(root) = tree.root() else {
        return NavigationLinks::default();
    };
    let root_node = tree.node(root);

    let items = tree
        .children(root)
        .iter()
        .map(|&child| tree.node(child))
        .filter(|node| node.visible)
        .filter_map(|node| {
            if node.title.eq_ignore_ascii_case(index_title) {
                root_node.url.as_ref().map(|_| Link::from_node(root_node))
            } else {
                node.url.as_ref().map(|_| Link::from_node(node))
            }
        })
        .collect();

    NavigationLinks { items }
}

/// Links for the section containing `path`.
///
/// Descends from the root through section children (structure groups and
/// taxonomy keywords) whose URL prefixes the path and returns the visible children (with a URL) of the
/// deepest match, or of the root when nothing matches.
#[must_use]
pub fn context_links(tree: &NavigationTree, path: &str, rules: &UrlRules) -> NavigationLinks {
    let Some(mut current) = tree.root() else {
        return NavigationLinks::default();
    };
    let path = rules.normalize(path);

    while let Some(&next) = tree.children(current).iter().find(|&&child| {
        let node = tree.node(child);
        node.kind.is_section() && url_matches(node, &path)
    }) {
        current = next;
    }

    let items = tree
        .children(current)
        .iter()
        .map(|&child| tree.node(child))
        .filter(|node| node.visible && node.url.is_some())
        .map(Link::from_node)
        .collect();

    NavigationLinks { items }
}

/// Breadcrumb trail from the root to the node matching `path`.
///
/// Same descent as [`context_links`] but over children of any kind, with
/// every matched node appended. A child whose URL equals its parent's (a
/// section's index page) doesn't advance the descent, so a node at depth
/// `d` yields exactly `d + 1` links.
#[must_use]
pub fn breadcrumb_links(tree: &NavigationTree, path: &str, rules: &UrlRules) -> NavigationLinks {
    let Some(mut current) = tree.root() else {
        return NavigationLinks::default();
    };
    let path = rules.normalize(path);
    let mut items = vec![Link::from_node(tree.node(current))];

    loop {
        let parent = tree.node(current);
        let next = tree.children(current).iter().copied().find(|&child| {
            let node = tree.node(child);
            url_matches(node, &path)
                && !parent.url.as_deref().is_some_and(|url| node.url_eq(url))
        });
        let Some(next) = next else {
            break;
        };
        items.push(Link::from_node(tree.node(next)));
        current = next;
    }

    NavigationLinks { items }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::item::{NodeKind, SitemapItem, TaxonomyNodeInfo};
    use crate::tree::{SiblingOrder, rebuild_parent_links};

    fn node(title: &str, url: &str, kind: NodeKind, children: Vec<SitemapItem>) -> SitemapItem {
        SitemapItem::new(title.to_lowercase(), title, kind)
            .with_url(url, &UrlRules::default())
            .with_visible(true)
            .with_items(children)
    }

    fn sg(title: &str, url: &str, children: Vec<SitemapItem>) -> SitemapItem {
        node(title, url, NodeKind::StructureGroup, children)
    }

    fn page(title: &str, url: &str) -> SitemapItem {
        node(title, url, NodeKind::Page, vec![])
    }

    fn urls(links: &NavigationLinks) -> Vec<&str> {
        links.items.iter().map(|l| l.url.as_str()).collect()
    }

    fn site() -> NavigationTree {
        rebuild_parent_links(
            sg(
                "Home",
                "/",
                vec![
                    page("Index", "/index.html"),
                    sg(
                        "Products",
                        "/products",
                        vec![
                            page("Index", "/products/index.html"),
                            page("Widget", "/products/widget.html"),
                            page("Hidden", "/products/hidden.html").with_visible(false),
                        ],
                    ),
                    sg("About", "/about", vec![page("Team", "/about/team.html")]),
                    page("Contact", "/contact.html").with_visible(false),
                ],
            ),
            SiblingOrder::OriginalTitle,
        )
    }

    #[test]
    fn test_top_links_collapses_index() {
        let links = top_links(&site(), "Index");

        assert_eq!(urls(&links), vec!["/about", "/", "/products"]);
        assert_eq!(links.items[1].link_text, "Home");
    }

    #[test]
    fn test_top_links_index_title_ignores_case() {
        let links = top_links(&site(), "INDEX");

        assert_eq!(links.items[1].url, "/");
    }

    #[test]
    fn test_context_links_deepest_structure_group() {
        let tree = rebuild_parent_links(
            sg(
                "Root",
                "/",
                vec![sg("Products", "/products", vec![page("Widget", "/products/widget")])],
            ),
            SiblingOrder::OriginalTitle,
        );

        let links = context_links(&tree, "/products/widget", &UrlRules::default());

        assert_eq!(urls(&links), vec!["/products/widget"]);
    }

    #[test]
    fn test_context_links_skips_hidden_and_normalizes_path() {
        let links = context_links(&site(), "/Products/Widget.html", &UrlRules::default());

        assert_eq!(urls(&links), vec!["/products", "/products/widget"]);
    }

    #[test]
    fn test_context_links_no_match_returns_root_children() {
        let links = context_links(&site(), "/unknown", &UrlRules::default());

        assert_eq!(urls(&links), vec!["/about", "/", "/products"]);
    }

    #[test]
    fn test_context_links_descends_into_keywords() {
        let keyword = |title: &str, url: &str, children: Vec<SitemapItem>| {
            node(title, url, NodeKind::TaxonomyNode(TaxonomyNodeInfo::default()), children)
        };
        let tree = rebuild_parent_links(
            keyword(
                "Navigation",
                "/",
                vec![
                    keyword(
                        "010 Products",
                        "/products",
                        vec![
                            page("010 Index", "/products/index.html"),
                            page("020 Widget", "/products/widget.html"),
                        ],
                    ),
                    keyword("020 About", "/about", vec![]),
                ],
            ),
            SiblingOrder::OriginalTitle,
        );

        let links = context_links(&tree, "/products/widget", &UrlRules::default());

        assert_eq!(urls(&links), vec!["/products", "/products/widget"]);
    }

    #[test]
    fn test_context_links_first_match_wins() {
        let tree = rebuild_parent_links(
            sg(
                "Root",
                "/",
                vec![
                    sg("A Prod", "/prod", vec![page("P", "/prod/p")]),
                    sg("B Product", "/product", vec![page("Q", "/product/q")]),
                ],
            ),
            SiblingOrder::OriginalTitle,
        );

        let links = context_links(&tree, "/product/q", &UrlRules::default());

        assert_eq!(urls(&links), vec!["/prod/p"]);
    }

    #[test]
    fn test_breadcrumb_depth_plus_one() {
        let tree = site();
        let links = breadcrumb_links(&tree, "/products/widget", &UrlRules::default());

        assert_eq!(urls(&links), vec!["/", "/products", "/products/widget"]);
        let widget = tree.find_by_url("/products/widget").unwrap();
        assert_eq!(links.len(), tree.depth(widget) + 1);
    }

    #[test]
    fn test_breadcrumb_skips_redundant_index() {
        let links = breadcrumb_links(&site(), "/products/index.html", &UrlRules::default());

        assert_eq!(urls(&links), vec!["/", "/products"]);
        assert_eq!(links.items[1].link_text, "Products");
    }

    #[test]
    fn test_breadcrumb_root_only() {
        let links = breadcrumb_links(&site(), "/", &UrlRules::default());

        assert_eq!(urls(&links), vec!["/"]);
    }

    #[test]
    fn test_empty_tree() {
        let tree = NavigationTree::empty(SiblingOrder::OriginalTitle);

        assert!(top_links(&tree, "Index").is_empty());
        assert!(context_links(&tree, "/", &UrlRules::default()).is_empty());
        assert!(breadcrumb_links(&tree, "/", &UrlRules::default()).is_empty());
    }
}
