//! HTTP taxonomy client.
//!
//! Talks to a content-delivery taxonomy endpoint:
//!
//! - `GET {base}/taxonomies/{taxonomy}/keywords/{keyword}?depth=N&direction=down|up`
//!   returns a [`Keyword`] JSON object.
//! - `GET {base}/taxonomies/{taxonomy}/pages/{page}/keywords` returns a JSON
//!   array of keyword URIs.

use std::time::Duration;

use ureq::Agent;

use crate::error::{SourceError, SourceErrorKind};
use crate::taxonomy::{DepthFilter, Keyword, TaxonomyService};
use crate::tcm::TcmUri;

/// Backend identifier for error messages.
const BACKEND: &str = "Http";

/// [`TaxonomyService`] over HTTP.
pub struct HttpTaxonomyService {
    agent: Agent,
    base_url: String,
}

impl HttpTaxonomyService {
    /// Create a client for `base_url` with a global per-request timeout.
    #[must_use]
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    fn keyword_url(&self, taxonomy_uri: &TcmUri, filter: DepthFilter, keyword_uri: &TcmUri) -> String {
        format!(
            "{}/taxonomies/{taxonomy_uri}/keywords/{keyword_uri}?depth={}&direction={}",
            self.base_url,
            filter.levels,
            filter.direction.as_str()
        )
    }

    fn page_keywords_url(&self, taxonomy_uri: &TcmUri, page_uri: &TcmUri) -> String {
        format!(
            "{}/taxonomies/{taxonomy_uri}/pages/{page_uri}/keywords",
            self.base_url
        )
    }

    fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, SourceError> {
        tracing::debug!(url, "Taxonomy request");

        let response = self
            .agent
            .get(url)
            .header("Accept", "application/json")
            .call()
            .map_err(|e| request_error(e, url))?;

        let status = response.status().as_u16();
        if status >= 400 {
            return Err(SourceError::http_status(status, url).with_backend(BACKEND));
        }

        response.into_body().read_json().map_err(|e| {
            SourceError::malformed(url)
                .with_backend(BACKEND)
                .with_source(e)
        })
    }
}

/// Map a transport failure to a source error.
fn request_error(err: ureq::Error, url: &str) -> SourceError {
    let kind = match &err {
        ureq::Error::Timeout(_) => SourceErrorKind::Timeout,
        ureq::Error::HostNotFound | ureq::Error::ConnectionFailed | ureq::Error::Io(_) => {
            SourceErrorKind::Unavailable
        }
        _ => SourceErrorKind::Other,
    };
    SourceError::new(kind)
        .with_resource(url)
        .with_backend(BACKEND)
        .with_source(err)
}

impl TaxonomyService for HttpTaxonomyService {
    fn get_keyword(
        &self,
        taxonomy_uri: &TcmUri,
        filter: DepthFilter,
        keyword_uri: &TcmUri,
    ) -> Result<Keyword, SourceError> {
        self.get_json(&self.keyword_url(taxonomy_uri, filter, keyword_uri))
    }

    fn get_page_keywords(
        &self,
        taxonomy_uri: &TcmUri,
        page_uri: &TcmUri,
    ) -> Result<Vec<String>, SourceError> {
        self.get_json(&self.page_keywords_url(taxonomy_uri, page_uri))
    }
}
