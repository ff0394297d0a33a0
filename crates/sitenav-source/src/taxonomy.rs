//! Taxonomy service abstraction.
//!
//! A taxonomy is a keyword hierarchy; pages are classified under keywords.
//! Lookups take a [`DepthFilter`] so callers can fetch a bounded slice of the
//! hierarchy (N levels of children, or the chain of parents) instead of the
//! whole taxonomy.

use serde::{Deserialize, Serialize};

use crate::error::SourceError;
use crate::tcm::TcmUri;

/// Direction of a depth-filtered lookup.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DepthDirection {
    /// Towards children.
    #[default]
    Down,
    /// Towards the taxonomy root.
    Up,
}

impl DepthDirection {
    /// Query-string form.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Down => "down",
            Self::Up => "up",
        }
    }
}

/// How much of the hierarchy a lookup materializes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DepthFilter {
    /// Number of levels to follow; [`DepthFilter::UNLIMITED`] for all.
    pub levels: i32,
    /// Which way to follow.
    pub direction: DepthDirection,
}

impl DepthFilter {
    /// Level count meaning "no limit".
    pub const UNLIMITED: i32 = -1;

    /// Follow `levels` levels of children.
    #[must_use]
    pub fn down(levels: i32) -> Self {
        Self {
            levels,
            direction: DepthDirection::Down,
        }
    }

    /// Follow `levels` levels of parents.
    #[must_use]
    pub fn up(levels: i32) -> Self {
        Self {
            levels,
            direction: DepthDirection::Up,
        }
    }

    /// Whether `depth` levels away from the start are still inside the filter.
    #[must_use]
    pub fn allows(self, depth: i32) -> bool {
        self.levels < 0 || depth <= self.levels
    }
}

/// A page classified under a keyword.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClassifiedPage {
    /// Page URI (`tcm:{pub}-{id}-64`).
    pub uri: String,
    /// Raw page title, possibly with a sequence prefix.
    pub title: String,
    /// Published URL.
    pub url: String,
}

/// A keyword returned by a taxonomy lookup.
///
/// `children` and `parent` are only populated as far as the lookup's depth
/// filter reached; `has_children` reports whether children exist at all.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Keyword {
    /// Keyword URI (`tcm:{pub}-{id}-1024`, or `-512` for the taxonomy root).
    pub uri: String,
    /// Raw keyword title, possibly with a sequence prefix.
    pub title: String,
    /// Keyword key.
    pub key: String,
    /// Free-text description.
    pub description: String,
    /// Abstract keywords cannot classify content.
    pub is_abstract: bool,
    /// Whether the keyword has child keywords.
    pub has_children: bool,
    /// Number of items classified under the keyword.
    pub referenced_content_count: u32,
    /// Child keywords, as far as the depth filter reached.
    pub children: Vec<Keyword>,
    /// Parent keyword, for upward lookups.
    pub parent: Option<Box<Keyword>>,
    /// Pages classified under this keyword.
    pub pages: Vec<ClassifiedPage>,
}

impl Keyword {
    /// Parsed keyword URI.
    #[must_use]
    pub fn tcm_uri(&self) -> Option<TcmUri> {
        self.uri.parse().ok()
    }

    /// Numeric item id from the URI.
    #[must_use]
    pub fn item_id(&self) -> Option<u32> {
        self.tcm_uri().map(|uri| uri.item_id)
    }
}

/// Keyword hierarchy lookups.
///
/// Implementations must be thread-safe.
pub trait TaxonomyService: Send + Sync {
    /// Look up a keyword, materializing the hierarchy around it per `filter`.
    ///
    /// Passing the taxonomy URI as `keyword_uri` returns the taxonomy root.
    ///
    /// # Errors
    ///
    /// Returns a not found error if the keyword doesn't exist in the taxonomy,
    /// or a backend error if the service can't be reached.
    fn get_keyword(
        &self,
        taxonomy_uri: &TcmUri,
        filter: DepthFilter,
        keyword_uri: &TcmUri,
    ) -> Result<Keyword, SourceError>;

    /// URIs of the keywords a page is classified under.
    ///
    /// # Errors
    ///
    /// Returns a backend error if the service can't be reached.
    fn get_page_keywords(
        &self,
        taxonomy_uri: &TcmUri,
        page_uri: &TcmUri,
    ) -> Result<Vec<String>, SourceError>;
}
