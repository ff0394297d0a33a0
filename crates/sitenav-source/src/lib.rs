//! Backing sources for SiteNav navigation trees.
//!
//! Navigation is built from one of two external collaborators:
//!
//! - a [`RawDataProvider`] serving pre-serialized documents (the static
//!   `navigation.json` written at publish time), and
//! - a [`TaxonomyService`] exposing a keyword hierarchy with depth-filtered
//!   lookups, used for dynamic navigation.
//!
//! Both are traits so the navigation core can be tested without I/O and so a
//! deployment can swap backends.
//!
//! # Architecture
//!
//! The crate provides:
//! - [`Localization`]: the per-site context every lookup is scoped to
//! - [`TcmUri`]: content-manager URIs for taxonomies, keywords and pages
//! - [`FsContentProvider`]: reads documents from a published content directory
//! - [`HttpTaxonomyService`]: taxonomy lookups over HTTP
//! - [`MockContentProvider`] / [`MockTaxonomyService`] for testing (behind the
//!   `mock` feature flag), both counting their calls
//!
//! # Example
//!
//! ```ignore
//! use std::path::PathBuf;
//! use sitenav_source::{FsContentProvider, Localization, RawDataProvider};
//!
//! let provider = FsContentProvider::new(PathBuf::from("content"));
//! let localization = Localization::new("en", "/");
//! let json = provider.get_page_content("navigation.json", &localization)?;
//! ```

mod content;
mod error;
mod http;
mod localization;
#[cfg(feature = "mock")]
mod mock;
mod taxonomy;
mod tcm;

pub use content::{FsContentProvider, RawDataProvider};
pub use error::{SourceError, SourceErrorKind};
pub use http::HttpTaxonomyService;
pub use localization::Localization;
#[cfg(feature = "mock")]
pub use mock::{MockContentProvider, MockTaxonomyService};
pub use taxonomy::{ClassifiedPage, DepthDirection, DepthFilter, Keyword, TaxonomyService};
pub use tcm::{ItemType, TcmUri, TcmUriError};
