//! Google Custom Search API provider (image search mode)
//!
//! Google pages with a one-based `start` plus `num`, so the first page starts
//! at 1 rather than 0. Results live under the top-level `items` array with
//! dimensions and size nested in an `image` object.

use crate::{
    config::ProviderConfig,
    error::{SearchError, SearchResult},
    types::{ImageRecord, Params, ProviderId, SearchProvider},
    utils::http::HttpClient,
};
use serde::Deserialize;

/// Google Custom Search response types
#[derive(Debug, Deserialize)]
struct GoogleSearchResponse {
    items: Vec<GoogleSearchItem>,
}

#[derive(Debug, Deserialize)]
struct GoogleSearchItem {
    link: String,
    image: GoogleImage,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleImage {
    width: u32,
    height: u32,
    byte_size: u64,
}

/// Convert a raw Google response body into records
pub fn convert_response(body: &serde_json::Value) -> SearchResult<Vec<ImageRecord>> {
    let response = GoogleSearchResponse::deserialize(body)
        .map_err(|e| SearchError::MalformedResponse(format!("Google response: {e}")))?;

    Ok(response
        .items
        .into_iter()
        .map(|item| {
            ImageRecord::new(
                ProviderId::Google,
                &item.link,
                item.image.width,
                item.image.height,
                item.image.byte_size,
            )
        })
        .collect())
}

/// Google Custom Search provider
#[derive(Debug)]
pub struct GoogleProvider {
    config: ProviderConfig,
    http_client: HttpClient,
}

impl GoogleProvider {
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
impl SearchProvider for GoogleProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Google
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn http_client(&self) -> &HttpClient {
        &self.http_client
    }

    fn paging_params(&self, offset: u64, count: u64) -> Params {
        let mut params = Params::new();
        params.insert("start".to_string(), (offset + 1).to_string());
        params.insert("num".to_string(), count.to_string());
        params
    }

    fn convert(&self, body: &serde_json::Value) -> SearchResult<Vec<ImageRecord>> {
        convert_response(body)
    }
}
