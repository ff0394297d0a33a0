//! Navigation trees, subtrees and links for SiteNav.
//!
//! This crate provides:
//! - [`SitemapItem`]: the nested navigation node, as stored and cached
//! - [`NavigationTree`]: the linked, immutable form with a parent index
//! - [`NavigationBuilder`]s for full trees from a JSON document or a taxonomy
//! - [`SubtreeResolver`]s for bounded, on-demand subtrees
//! - [`NavigationProvider`]: the query façade (top, context and breadcrumb
//!   links, subtrees) with caching and builder fallback
//!
//! # Quick Start
//!
//! ```no_run
//! use std::path::PathBuf;
//! use std::sync::Arc;
//! use sitenav_cache::MemoryCache;
//! use sitenav_site::{NavigationOptions, NavigationProvider, StaticNavigationBuilder, UrlRules};
//! use sitenav_source::{FsContentProvider, Localization};
//!
//! let content = Arc::new(FsContentProvider::new(PathBuf::from("content")));
//! let builder = Arc::new(StaticNavigationBuilder::new(content, UrlRules::default()));
//! let cache = Arc::new(MemoryCache::new());
//! let provider = NavigationProvider::new(builder, cache, NavigationOptions::default());
//!
//! let en = Localization::new("en", "/").with_version("1");
//! let links = provider.context_navigation_links("/products/widget.html", &en);
//! ```

mod builder;
mod id;
mod item;
mod keywords;
mod links;
mod provider;
mod subtree;
mod tree;

pub use builder::{
    BuildError, NAVIGATION_DOCUMENT, NavigationBuilder, StaticNavigationBuilder,
    TaxonomyNavigationBuilder,
};
pub use id::{InvalidIdError, SitemapItemId};
pub use item::{NodeKind, SitemapItem, TaxonomyNodeInfo, UrlRules, split_sequence_prefix};
pub use links::{Link, NavigationLinks, breadcrumb_links, context_links, top_links};
pub use provider::{NavigationError, NavigationOptions, NavigationProvider};
pub use subtree::{
    NavigationFilter, ResolveError, SubtreeResolver, TaxonomySubtreeResolver, subtree_from_tree,
};
pub use tree::{NavigationNode, NavigationTree, SiblingOrder, rebuild_parent_links};
