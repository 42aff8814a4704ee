//! HTTP utilities for making requests to image search APIs

use crate::error::{SearchError, SearchResult};
use crate::types::Params;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_LENGTH};
use reqwest::{Client, Response};
use std::time::Duration;
use url::Url;

const USER_AGENT: &str = concat!("imagesearch-rust/", env!("CARGO_PKG_VERSION"));

/// HTTP client wrapper with search-specific response validation
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    default_timeout: Duration,
}

impl HttpClient {
    /// Create a new HTTP client with the default 15 second timeout
    pub fn new() -> SearchResult<Self> {
        Self::with_timeout(crate::config::DEFAULT_TIMEOUT_MS)
    }

    /// Create a new HTTP client with custom timeout
    pub fn with_timeout(timeout_ms: u64) -> SearchResult<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| SearchError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            default_timeout: Duration::from_millis(timeout_ms),
        })
    }

    pub fn timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Make a GET request with query parameters and headers and parse the
    /// JSON body.
    ///
    /// The body is only parsed after the status is 2xx and a non-zero
    /// `content-length` header is present.
    pub async fn get_json(
        &self,
        base_url: &str,
        query: &Params,
        headers: &HeaderMap,
    ) -> SearchResult<serde_json::Value> {
        let url = build_url(base_url, query)?;

        let request = self
            .client
            .get(url)
            .timeout(self.default_timeout)
            .headers(headers.clone());

        log::debug!("GET {}", strip_query(base_url));
        let response = request.send().await?;
        self.handle_response_json(response).await
    }

    /// Handle HTTP response and deserialize as JSON
    async fn handle_response_json(&self, response: Response) -> SearchResult<serde_json::Value> {
        let status = response.status();

        if !status.is_success() {
            let status_code = status.as_u16();
            let response_body = response.text().await.ok();

            return Err(SearchError::Request {
                message: format!("Request failed with status: {status}"),
                status_code: Some(status_code),
                response_body,
            });
        }

        validate_content_length(response.headers())?;

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

/// Require a present, non-zero `content-length` header
pub fn validate_content_length(headers: &HeaderMap) -> SearchResult<u64> {
    let length = headers
        .get(CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok());

    match length {
        Some(length) if length > 0 => Ok(length),
        _ => Err(SearchError::Request {
            message: "invalid content-length".to_string(),
            status_code: None,
            response_body: None,
        }),
    }
}

/// Build request headers from `layers`, later layers replacing earlier ones.
///
/// Header names compare case-insensitively, so `x-key` in a later layer
/// replaces `X-Key` from an earlier one instead of sending both.
pub fn build_headers(layers: &[&Params]) -> SearchResult<HeaderMap> {
    let mut headers = HeaderMap::new();

    for layer in layers {
        for (name, value) in *layer {
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                SearchError::InvalidInput(format!("invalid header name '{name}': {e}"))
            })?;
            let header_value = HeaderValue::from_str(value).map_err(|e| {
                SearchError::InvalidInput(format!("invalid value for header '{name}': {e}"))
            })?;
            headers.insert(header_name, header_value);
        }
    }

    Ok(headers)
}

/// Build a URL with query parameters
pub fn build_url(base_url: &str, params: &Params) -> SearchResult<Url> {
    let mut url = Url::parse(base_url)?;

    if !params.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in params {
            pairs.append_pair(key, value);
        }
    }

    Ok(url)
}

/// Drop the query string so credentials never reach the logs
pub fn strip_query(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}
