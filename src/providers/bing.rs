//! Bing Image Search API provider
//!
//! Bing pages with a zero-based `offset` plus a `count`. Results live under the
//! top-level `value` array, and `contentSize` arrives either as an integer or
//! as a string such as `"12345 B"`.

use crate::{
    config::ProviderConfig,
    error::{SearchError, SearchResult},
    types::{ImageRecord, Params, ProviderId, SearchProvider},
    utils::http::HttpClient,
};
use serde::Deserialize;

/// Bing Image Search response types
#[derive(Debug, Deserialize)]
struct BingImagesResponse {
    value: Vec<BingImage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BingImage {
    content_url: String,
    width: u32,
    height: u32,
    content_size: ContentSize,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ContentSize {
    Bytes(u64),
    Text(String),
}

impl ContentSize {
    fn to_bytes(&self) -> SearchResult<u64> {
        match self {
            ContentSize::Bytes(bytes) => Ok(*bytes),
            ContentSize::Text(text) => parse_byte_size(text),
        }
    }
}

/// Parse Bing's `"<number> B"` size strings. Any unit other than plain bytes
/// is rejected.
pub fn parse_byte_size(text: &str) -> SearchResult<u64> {
    text.trim()
        .strip_suffix('B')
        .map(str::trim_end)
        .and_then(|number| number.parse::<u64>().ok())
        .ok_or_else(|| {
            SearchError::MalformedResponse(format!("unrecognised Bing contentSize '{text}'"))
        })
}

/// Convert a raw Bing response body into records
pub fn convert_response(body: &serde_json::Value) -> SearchResult<Vec<ImageRecord>> {
    let response = BingImagesResponse::deserialize(body)
        .map_err(|e| SearchError::MalformedResponse(format!("Bing response: {e}")))?;

    response
        .value
        .into_iter()
        .map(|item| {
            Ok(ImageRecord::new(
                ProviderId::Bing,
                &item.content_url,
                item.width,
                item.height,
                item.content_size.to_bytes()?,
            ))
        })
        .collect()
}

/// Bing Image Search provider
#[derive(Debug)]
pub struct BingProvider {
    config: ProviderConfig,
    http_client: HttpClient,
}

impl BingProvider {
    /// Create a provider with the default HTTP client
    pub fn new(config: ProviderConfig) -> SearchResult<Self> {
        Self::with_http_client(config, HttpClient::new()?)
    }

    /// Create a provider sharing an existing HTTP client
    pub fn with_http_client(config: ProviderConfig, http_client: HttpClient) -> SearchResult<Self> {
        config.validate()?;

        Ok(Self {
            config,
            http_client,
        })
    }
}

#[async_trait::async_trait]
impl SearchProvider for BingProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Bing
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn http_client(&self) -> &HttpClient {
        &self.http_client
    }

    fn paging_params(&self, offset: u64, count: u64) -> Params {
        let mut params = Params::new();
        params.insert("offset".to_string(), offset.to_string());
        params.insert("count".to_string(), count.to_string());
        params
    }

    fn convert(&self, body: &serde_json::Value) -> SearchResult<Vec<ImageRecord>> {
        convert_response(body)
    }
}
