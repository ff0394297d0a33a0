//! Content-manager URIs.
//!
//! Items in the content manager are addressed as `tcm:{publication}-{id}` for
//! components, or `tcm:{publication}-{id}-{type}` for everything else.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

static TCM_URI: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^tcm:(\d+)-(\d+)(?:-(\d+))?$").unwrap());

/// Item type codes used in URIs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ItemType {
    /// Component (type code 16, omitted when formatting).
    Component,
    /// Page (64).
    Page,
    /// Category, i.e. a taxonomy root (512).
    Category,
    /// Keyword inside a taxonomy (1024).
    Keyword,
}

impl ItemType {
    /// Numeric type code.
    #[must_use]
    pub fn code(self) -> u32 {
        match self {
            Self::Component => 16,
            Self::Page => 64,
            Self::Category => 512,
            Self::Keyword => 1024,
        }
    }

    fn from_code(code: u32) -> Option<Self> {
        match code {
            16 => Some(Self::Component),
            64 => Some(Self::Page),
            512 => Some(Self::Category),
            1024 => Some(Self::Keyword),
            _ => None,
        }
    }
}

/// Error returned when a string is not a valid URI.
#[derive(Debug, thiserror::Error)]
#[error("Invalid TCM URI: {0}")]
pub struct TcmUriError(pub String);

/// A content-manager URI.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TcmUri {
    /// Publication identifier.
    pub publication_id: u32,
    /// Item identifier within the publication.
    pub item_id: u32,
    /// Item type.
    pub item_type: ItemType,
}

impl TcmUri {
    /// Create a URI.
    #[must_use]
    pub fn new(publication_id: u32, item_id: u32, item_type: ItemType) -> Self {
        Self {
            publication_id,
            item_id,
            item_type,
        }
    }
}

impl fmt::Display for TcmUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.item_type {
            ItemType::Component => write!(f, "tcm:{}-{}", self.publication_id, self.item_id),
            other => write!(
                f,
                "tcm:{}-{}-{}",
                self.publication_id,
                self.item_id,
                other.code()
            ),
        }
    }
}

impl FromStr for TcmUri {
    type Err = TcmUriError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TcmUriError(s.to_owned());
        let caps = TCM_URI.captures(s).ok_or_else(invalid)?;

        let publication_id = caps[1].parse().map_err(|_| invalid())?;
        let item_id = caps[2].parse().map_err(|_| invalid())?;
        let item_type = match caps.get(3) {
            None => ItemType::Component,
            Some(code) => {
                let code = code.as_str().parse().map_err(|_| invalid())?;
                ItemType::from_code(code).ok_or_else(invalid)?
            }
        };

        Ok(Self::new(publication_id, item_id, item_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_formats() {
        assert_eq!(
            TcmUri::new(5, 3, ItemType::Category).to_string(),
            "tcm:5-3-512"
        );
        assert_eq!(
            TcmUri::new(5, 12, ItemType::Keyword).to_string(),
            "tcm:5-12-1024"
        );
        assert_eq!(TcmUri::new(5, 40, ItemType::Page).to_string(), "tcm:5-40-64");
        assert_eq!(TcmUri::new(5, 7, ItemType::Component).to_string(), "tcm:5-7");
    }

    #[test]
    fn test_parse() {
        let uri: TcmUri = "tcm:5-12-1024".parse().unwrap();
        assert_eq!(uri, TcmUri::new(5, 12, ItemType::Keyword));

        let uri: TcmUri = "tcm:1-2".parse().unwrap();
        assert_eq!(uri.item_type, ItemType::Component);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("tcm:5-12-999".parse::<TcmUri>().is_err());
        assert!("tcm:a-b".parse::<TcmUri>().is_err());
        assert!("5-12-1024".parse::<TcmUri>().is_err());
        assert!("tcm:99999999999-1".parse::<TcmUri>().is_err());
    }
}
