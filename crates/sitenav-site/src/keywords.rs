//! Keyword to sitemap item conversion.
//!
//! Shared by the taxonomy builder and the taxonomy subtree resolver so that a
//! node looks the same whether it came from a full build or a partial lookup.

use sitenav_source::{ClassifiedPage, ItemType, Keyword, TcmUri};

use crate::id::SitemapItemId;
use crate::item::{
    NodeKind, SitemapItem, TaxonomyNodeInfo, UrlRules, split_sequence_prefix,
    strip_suffix_ignore_case,
};

/// Maps taxonomy keywords and classified pages onto sitemap items.
pub(crate) struct KeywordMapper<'a> {
    pub(crate) taxonomy_id: u32,
    pub(crate) rules: &'a UrlRules,
    /// URL of the taxonomy root when no default page is classified under it.
    pub(crate) root_url: &'a str,
}

impl KeywordMapper<'_> {
    /// Whether a page is the default page of its keyword.
    fn is_default_page(&self, page: &ClassifiedPage) -> bool {
        let url = page.url.trim_end_matches('/');
        let url = strip_suffix_ignore_case(url, &self.rules.default_extension).unwrap_or(url);
        let last = url.rsplit('/').next().unwrap_or_default();
        last.eq_ignore_ascii_case(&self.rules.default_page)
    }

    fn is_root(keyword: &Keyword) -> bool {
        keyword
            .tcm_uri()
            .is_none_or(|uri| uri.item_type == ItemType::Category)
    }

    /// Item id for a keyword; the taxonomy root gets the bare taxonomy id.
    fn keyword_id(&self, keyword: &Keyword) -> String {
        match keyword.tcm_uri() {
            Some(uri) if !Self::is_root(keyword) => {
                SitemapItemId::keyword(self.taxonomy_id, uri.item_id).to_string()
            }
            _ => SitemapItemId::taxonomy(self.taxonomy_id).to_string(),
        }
    }

    /// Item for a classified page.
    pub(crate) fn page_item(&self, page: &ClassifiedPage) -> SitemapItem {
        let page_id = page
            .uri
            .parse::<TcmUri>()
            .map_or(0, |uri| uri.item_id);
        let (_, sequenced) = split_sequence_prefix(&page.title);
        SitemapItem::new(
            SitemapItemId::page(self.taxonomy_id, page_id).to_string(),
            &page.title,
            NodeKind::Page,
        )
        .with_url(&page.url, self.rules)
        .with_visible(sequenced)
    }

    /// Item for a keyword without children.
    ///
    /// A keyword's URL is the URL of its classified default page, if any. The
    /// taxonomy root falls back to `root_url`.
    pub(crate) fn keyword_node(&self, keyword: &Keyword) -> SitemapItem {
        let (_, sequenced) = split_sequence_prefix(&keyword.title);
        let info = TaxonomyNodeInfo {
            key: keyword.key.clone(),
            description: keyword.description.clone(),
            is_abstract: keyword.is_abstract,
            has_child_nodes: keyword.has_children || !keyword.pages.is_empty(),
            classified_items_count: keyword.referenced_content_count,
        };
        let mut item = SitemapItem::new(
            self.keyword_id(keyword),
            &keyword.title,
            NodeKind::TaxonomyNode(info),
        )
        .with_visible(sequenced);

        if let Some(index) = keyword.pages.iter().find(|p| self.is_default_page(p)) {
            item.set_url(&index.url, self.rules);
        } else if Self::is_root(keyword) {
            item.set_url(self.root_url, self.rules);
        }
        item
    }

    /// Item for a keyword with children and pages, down to `levels` levels.
    ///
    /// `Some(0)` yields the keyword alone; `None` follows whatever the lookup
    /// returned.
    pub(crate) fn keyword_item(&self, keyword: &Keyword, levels: Option<usize>) -> SitemapItem {
        let item = self.keyword_node(keyword);
        if levels == Some(0) {
            return item;
        }

        let next = levels.map(|l| l - 1);
        let mut items: Vec<SitemapItem> = keyword
            .children
            .iter()
            .map(|child| self.keyword_item(child, next))
            .collect();
        items.extend(keyword.pages.iter().map(|page| self.page_item(page)));
        item.with_items(items)
    }
}
