//! HTTP executor for the document search API.

use std::time::Duration;

use async_trait::async_trait;
use lectern_core::{
    EndpointId, EndpointRequest, Error, ResultRecord, Result, SearchExecutor, SearchOutcome,
};
use serde::Deserialize;
use tracing::debug;

use crate::html::html_to_text;

/// Longest response body kept in an [`Error::HttpStatus`].
const MAX_ERROR_BODY: usize = 512;

/// Path of `endpoint` relative to the API base URL.
pub fn endpoint_path(endpoint: EndpointId) -> String {
    match endpoint {
        EndpointId::ConferenceTalks => "/search/conference".to_string(),
        EndpointId::ScriptureVerses => "/search/scriptures".to_string(),
        EndpointId::Archive => "/search/archive".to_string(),
        EndpointId::MultiType => "/search/all".to_string(),
        EndpointId::MagazineArticles => "/search/magazines".to_string(),
        EndpointId::ManualFiltered(family) => format!("/search/manuals/{}", family.slug()),
        EndpointId::MediaFiltered(kind) => format!("/search/media/{}", kind.slug()),
    }
}

/// Executor that calls the document API over HTTP.
#[derive(Debug, Clone)]
pub struct HttpExecutor {
    base_url: String,
    client: reqwest::Client,
}

impl HttpExecutor {
    /// Creates an executor for the API at `base_url`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - API root, e.g. `https://api.example.org`
    /// * `user_agent` - sent with every request
    /// * `timeout` - transport-level timeout per request
    pub fn new(
        base_url: impl Into<String>,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| Error::transport_with_source("Failed to build HTTP client", e))?;
        Ok(Self::with_client(base_url, client))
    }

    /// Creates an executor around an existing client.
    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    /// The API root this executor talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL for `endpoint`.
    pub fn url_for(&self, endpoint: EndpointId) -> String {
        format!("{}{}", self.base_url, endpoint_path(endpoint))
    }

    /// Check that the API answers at all.
    ///
    /// Any HTTP response counts as reachable; the status is returned so the
    /// caller can report it.
    pub async fn health_check(&self) -> Result<u16> {
        let response = self
            .client
            .get(&self.base_url)
            .send()
            .await
            .map_err(|e| {
                Error::transport_with_source(format!("API at {} unreachable", self.base_url), e)
            })?;
        let status = response.status().as_u16();
        debug!(url = %self.base_url, status, "Health check");
        Ok(status)
    }
}

#[async_trait]
impl SearchExecutor for HttpExecutor {
    async fn execute(&self, request: &EndpointRequest) -> Result<SearchOutcome> {
        let url = self.url_for(request.endpoint);
        let mut query = vec![
            ("q", request.query.clone()),
            ("limit", request.limit.to_string()),
        ];
        query.extend(request.params.to_query_pairs());

        debug!(url = %url, params = query.len(), "Sending search request");
        let response = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|e| Error::transport_with_source(format!("Request to {url} failed"), e))?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            if body.len() > MAX_ERROR_BODY {
                let cut = (0..=MAX_ERROR_BODY)
                    .rev()
                    .find(|i| body.is_char_boundary(*i))
                    .unwrap_or(0);
                body.truncate(cut);
            }
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::transport_with_source("Failed to read response body", e))?;
        decode_body(&body)
    }

    fn name(&self) -> &str {
        "http"
    }
}

// ============================================================================
// Response decoding
// ============================================================================

#[derive(Debug, Deserialize)]
struct WireResponse {
    #[serde(alias = "items", alias = "hits")]
    results: Option<Vec<WireRecord>>,
    #[serde(alias = "totalCount")]
    total: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct WireRecord {
    #[serde(default)]
    title: String,
    #[serde(alias = "uri", alias = "link", default)]
    url: String,
    #[serde(alias = "summary", alias = "excerpt")]
    snippet: Option<String>,
}

impl From<WireRecord> for ResultRecord {
    fn from(wire: WireRecord) -> Self {
        let title = html_to_text(&wire.title);
        let title = if title.is_empty() {
            "(untitled)".to_string()
        } else {
            title
        };
        let record = ResultRecord::new(title, wire.url);
        match wire.snippet.map(|s| html_to_text(&s)) {
            Some(snippet) if !snippet.is_empty() => record.with_snippet(snippet),
            _ => record,
        }
    }
}

/// Decode a search response body.
///
/// Accepts `{ "results" | "items" | "hits": [...], "total" | "totalCount": n }`;
/// an empty list is [`SearchOutcome::NoResults`].
pub fn decode_body(body: &str) -> Result<SearchOutcome> {
    let wire: WireResponse = serde_json::from_str(body)
        .map_err(|e| Error::decode(format!("Invalid search response: {e}")))?;
    let records = wire
        .results
        .ok_or_else(|| Error::decode("Search response has no results array"))?
        .into_iter()
        .map(ResultRecord::from)
        .collect();
    Ok(SearchOutcome::from_records(records, wire.total))
}
