//! Sitemap item identifiers.
//!
//! Taxonomy-backed items are identified as `t<taxonomy>`, `t<taxonomy>-k<keyword>`,
//! `t<taxonomy>-p<page>` or `t<taxonomy>-k<keyword>-p<page>`.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

static ITEM_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^t(\d+)(?:-k(\d+))?(?:-p(\d+))?$").unwrap());

/// Error returned for an identifier that doesn't match the id format.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid sitemap item id: {0:?}")]
pub struct InvalidIdError(pub String);

/// A parsed sitemap item identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SitemapItemId {
    /// Taxonomy the item belongs to.
    pub taxonomy_id: u32,
    /// Keyword component.
    pub keyword_id: Option<u32>,
    /// Page component.
    pub page_id: Option<u32>,
}

impl SitemapItemId {
    /// Parse and validate an identifier.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidIdError`] if `id` doesn't match the format or a numeric
    /// component overflows.
    pub fn parse(id: &str) -> Result<Self, InvalidIdError> {
        let invalid = || InvalidIdError(id.to_owned());
        let caps = ITEM_ID.captures(id).ok_or_else(invalid)?;

        let number = |i: usize| -> Result<Option<u32>, InvalidIdError> {
            caps.get(i)
                .map(|m| m.as_str().parse::<u32>().map_err(|_| invalid()))
                .transpose()
        };

        Ok(Self {
            taxonomy_id: number(1)?.ok_or_else(invalid)?,
            keyword_id: number(2)?,
            page_id: number(3)?,
        })
    }

    /// Identifier of a taxonomy root.
    #[must_use]
    pub fn taxonomy(taxonomy_id: u32) -> Self {
        Self {
            taxonomy_id,
            keyword_id: None,
            page_id: None,
        }
    }

    /// Identifier of a keyword.
    #[must_use]
    pub fn keyword(taxonomy_id: u32, keyword_id: u32) -> Self {
        Self {
            keyword_id: Some(keyword_id),
            ..Self::taxonomy(taxonomy_id)
        }
    }

    /// Identifier of a page.
    #[must_use]
    pub fn page(taxonomy_id: u32, page_id: u32) -> Self {
        Self {
            page_id: Some(page_id),
            ..Self::taxonomy(taxonomy_id)
        }
    }

    /// The two numeric components used for numeric sibling ordering.
    ///
    /// The taxonomy id paired with the page id if present, else the keyword id,
    /// else zero.
    #[must_use]
    pub fn numeric_pair(&self) -> (u32, u32) {
        (
            self.taxonomy_id,
            self.page_id.or(self.keyword_id).unwrap_or(0),
        )
    }
}

impl fmt::Display for SitemapItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.taxonomy_id)?;
        if let Some(keyword) = self.keyword_id {
            write!(f, "-k{keyword}")?;
        }
        if let Some(page) = self.page_id {
            write!(f, "-p{page}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_forms() {
        assert_eq!(SitemapItemId::parse("t5").unwrap(), SitemapItemId::taxonomy(5));
        assert_eq!(
            SitemapItemId::parse("t5-k12").unwrap(),
            SitemapItemId::keyword(5, 12)
        );
        assert_eq!(SitemapItemId::parse("t5-p40").unwrap(), SitemapItemId::page(5, 40));

        let full = SitemapItemId::parse("t5-k12-p40").unwrap();
        assert_eq!(full.keyword_id, Some(12));
        assert_eq!(full.page_id, Some(40));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for id in ["bogus-id", "", "t", "5-k12", "t5-p40-k12", "t5-k", "T5", " t5", "t5-k12-", "t99999999999"] {
            assert_eq!(
                SitemapItemId::parse(id),
                Err(InvalidIdError(id.to_owned())),
                "{id:?}"
            );
        }
    }

    #[test]
    fn test_display_round_trips() {
        for id in ["t5", "t5-k12", "t5-p40", "t5-k12-p40"] {
            assert_eq!(SitemapItemId::parse(id).unwrap().to_string(), id);
        }
    }

    #[test]
    fn test_numeric_pair() {
        assert_eq!(SitemapItemId::keyword(5, 12).numeric_pair(), (5, 12));
        assert_eq!(SitemapItemId::page(5, 40).numeric_pair(), (5, 40));
        assert_eq!(SitemapItemId::taxonomy(5).numeric_pair(), (5, 0));
    }
}
