//! Core types and traits for the image search aggregator

use crate::config::ProviderConfig;
use crate::error::SearchResult;
use crate::utils::http::HttpClient;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Ordered name → value mapping used for query parameters and headers
pub type Params = BTreeMap<String, String>;

/// Identifies which upstream API produced a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Bing,
    Google,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::Bing => "bing",
            ProviderId::Google => "google",
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One image result, normalized from a single provider item
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageRecord {
    provider_id: ProviderId,
    url: String,
    width: u32,
    height: u32,
    byte_size: u64,
}

impl ImageRecord {
    /// Build a record. Whitespace embedded in `url` (providers send URLs with
    /// stray newlines and spaces) is removed.
    pub fn new(provider_id: ProviderId, url: &str, width: u32, height: u32, byte_size: u64) -> Self {
        Self {
            provider_id,
            url: url.chars().filter(|c| !c.is_whitespace()).collect(),
            width,
            height,
            byte_size,
        }
    }

    pub fn provider_id(&self) -> ProviderId {
        self.provider_id
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn byte_size(&self) -> u64 {
        self.byte_size
    }

    /// Render as one LTSV (labeled tab-separated values) line, without newline
    pub fn to_ltsv(&self) -> String {
        format!(
            "provider_id:{}\turl:{}\twidth:{}\theight:{}\tbyte_size:{}",
            self.provider_id, self.url, self.width, self.height, self.byte_size
        )
    }
}

impl fmt::Display for ImageRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "url: {}", self.url)?;
        writeln!(f, "width: {}", self.width)?;
        writeln!(f, "height: {}", self.height)?;
        write!(f, "byteSize: {}", self.byte_size)
    }
}

/// Caller-supplied query parameters and headers for one provider.
///
/// These are merged over the provider's fixed parameters on every request;
/// on a name collision the caller's value wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtraParams {
    pub query: Params,
    pub headers: Params,
}

impl ExtraParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_query(mut self, name: &str, value: &str) -> Self {
        self.query.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_string(), value.to_string());
        self
    }
}

/// Returns a fresh map holding `base` overlaid with `overrides`.
pub fn merge_params(base: &Params, overrides: &Params) -> Params {
    let mut merged = base.clone();
    merged.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged
}

/// Contract every image search provider satisfies.
///
/// Implementors supply the provider-specific pieces (paging field names and
/// the response converter); the pagination loop in [`SearchProvider::search`]
/// is shared.
#[async_trait::async_trait]
pub trait SearchProvider: Send + Sync + fmt::Debug {
    /// Which provider this is
    fn id(&self) -> ProviderId;

    /// Name of the search provider
    fn name(&self) -> &str {
        self.id().as_str()
    }

    /// Immutable configuration established at startup
    fn config(&self) -> &ProviderConfig;

    /// HTTP client used for page requests
    fn http_client(&self) -> &HttpClient;

    /// Paging query fields selecting `count` results starting at the 0-based `offset`
    fn paging_params(&self, offset: u64, count: u64) -> Params;

    /// Convert one raw response body into records, preserving item order
    fn convert(&self, body: &serde_json::Value) -> SearchResult<Vec<ImageRecord>>;

    /// Fetch `total` records for `keyword`, paging as needed
    async fn search(
        &self,
        keyword: &str,
        total: u64,
        extra: &ExtraParams,
    ) -> SearchResult<Vec<ImageRecord>> {
        crate::paging::paginated_search(self, keyword, total, extra).await
    }

    /// Configuration summary with credentials hidden (for logging/listing)
    fn describe(&self) -> BTreeMap<String, String> {
        let config = self.config();
        let mut described = BTreeMap::new();
        described.insert("base_url".to_string(), config.base_url.clone());
        described.insert("page_size".to_string(), config.page_size.to_string());
        described.insert(
            "keyword_param".to_string(),
            config.keyword_param_name.clone(),
        );
        for (name, value) in &config.base_query {
            let shown = if ProviderConfig::is_secret(name) { "***" } else { value.as_str() };
            described.insert(format!("query.{name}"), shown.to_string());
        }
        for name in config.base_header.keys() {
            described.insert(format!("header.{name}"), "***".to_string());
        }
        described
    }
}
