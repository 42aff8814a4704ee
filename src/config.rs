//! Provider configuration loading
//!
//! The configuration is a YAML document read once at startup. Each provider
//! section is validated and turned into an immutable [`ProviderConfig`];
//! any missing or malformed key is a [`SearchError::Config`].

use crate::error::{SearchError, SearchResult};
use crate::types::Params;
use serde::Deserialize;
use std::path::Path;
use url::Url;

pub const DEFAULT_CONFIG_PATH: &str = "config.yml";
pub const DEFAULT_TIMEOUT_MS: u64 = 15000;
pub const DEFAULT_KEYWORD_PARAM: &str = "q";
pub const BING_DEFAULT_PAGE_SIZE: u64 = 150;
pub const GOOGLE_DEFAULT_PAGE_SIZE: u64 = 10;

// Query parameters whose values are credentials.
const SECRET_QUERY_PARAMS: &[&str] = &["key", "api_key", "apikey"];

/// Everything one provider client needs, fixed at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    /// Endpoint every page request is sent to
    pub base_url: String,
    /// Headers applied to every request (credentials)
    pub base_header: Params,
    /// Query parameters applied to every request (credentials, fixed options)
    pub base_query: Params,
    /// Maximum results obtainable from one request; always at least 1
    pub page_size: u64,
    /// Query parameter carrying the search keyword
    pub keyword_param_name: String,
}

impl ProviderConfig {
    pub fn new(base_url: &str, page_size: u64) -> Self {
        Self {
            base_url: base_url.to_string(),
            base_header: Params::new(),
            base_query: Params::new(),
            page_size,
            keyword_param_name: DEFAULT_KEYWORD_PARAM.to_string(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.base_header.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_query(mut self, name: &str, value: &str) -> Self {
        self.base_query.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_keyword_param(mut self, name: &str) -> Self {
        self.keyword_param_name = name.to_string();
        self
    }

    /// Reject configurations no client could run with
    pub fn validate(&self) -> SearchResult<()> {
        Url::parse(&self.base_url)?;
        if self.page_size == 0 {
            return Err(SearchError::Config(
                "page_size must be at least 1".to_string(),
            ));
        }
        if self.keyword_param_name.is_empty() {
            return Err(SearchError::Config(
                "keyword parameter name is required".to_string(),
            ));
        }
        Ok(())
    }

    pub fn is_secret(query_param: &str) -> bool {
        SECRET_QUERY_PARAMS.contains(&query_param)
    }
}

/// Per-provider section of the configuration document
pub trait ProviderSection {
    /// Check that every required key is present and usable
    fn validate(&self) -> SearchResult<()>;

    /// Build the client configuration from a validated section
    fn to_provider_config(&self) -> ProviderConfig;
}

/// `Bing:` section
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BingSection {
    pub base_url: String,
    pub auth_header: String,
    pub subscription_keys: Vec<String>,
    #[serde(default = "bing_default_page_size")]
    pub page_size: u64,
    #[serde(default = "default_keyword_param")]
    pub keyword_param: String,
}

/// `Google:` section
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GoogleSection {
    pub base_url: String,
    pub api_key: String,
    pub engine_id: String,
    pub search_type: String,
    #[serde(default = "google_default_page_size")]
    pub page_size: u64,
    #[serde(default = "default_keyword_param")]
    pub keyword_param: String,
}

fn bing_default_page_size() -> u64 {
    BING_DEFAULT_PAGE_SIZE
}

fn google_default_page_size() -> u64 {
    GOOGLE_DEFAULT_PAGE_SIZE
}

fn default_keyword_param() -> String {
    DEFAULT_KEYWORD_PARAM.to_string()
}

fn require(section: &str, key: &str, value: &str) -> SearchResult<()> {
    if value.trim().is_empty() {
        return Err(SearchError::Config(format!("{section}.{key} is required")));
    }
    Ok(())
}

impl ProviderSection for BingSection {
    fn validate(&self) -> SearchResult<()> {
        require("Bing", "base_url", &self.base_url)?;
        require("Bing", "auth_header", &self.auth_header)?;
        match self.subscription_keys.first() {
            Some(key) => require("Bing", "subscription_keys[0]", key)?,
            None => {
                return Err(SearchError::Config(
                    "Bing.subscription_keys must contain at least one key".to_string(),
                ))
            }
        }
        self.to_provider_config()
            .validate()
            .map_err(|e| SearchError::Config(format!("Bing: {e}")))
    }

    fn to_provider_config(&self) -> ProviderConfig {
        let mut config = ProviderConfig::new(&self.base_url, self.page_size)
            .with_keyword_param(&self.keyword_param);
        if let Some(key) = self.subscription_keys.first() {
            config = config.with_header(&self.auth_header, key);
        }
        config
    }
}

impl ProviderSection for GoogleSection {
    fn validate(&self) -> SearchResult<()> {
        require("Google", "base_url", &self.base_url)?;
        require("Google", "api_key", &self.api_key)?;
        require("Google", "engine_id", &self.engine_id)?;
        require("Google", "search_type", &self.search_type)?;
        self.to_provider_config()
            .validate()
            .map_err(|e| SearchError::Config(format!("Google: {e}")))
    }

    fn to_provider_config(&self) -> ProviderConfig {
        ProviderConfig::new(&self.base_url, self.page_size)
            .with_keyword_param(&self.keyword_param)
            .with_query("key", &self.api_key)
            .with_query("cx", &self.engine_id)
            .with_query("searchType", &self.search_type)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(rename = "Bing")]
    bing: BingSection,
    #[serde(rename = "Google")]
    google: GoogleSection,
    #[serde(default)]
    timeout_ms: Option<u64>,
}

/// Fully validated configuration for every provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub bing: ProviderConfig,
    pub google: ProviderConfig,
    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,
}

impl Config {
    /// Read and validate the YAML document at `path`
    pub fn from_path(path: impl AsRef<Path>) -> SearchResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            SearchError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        log::debug!("Loaded configuration from {}", path.display());
        Self::from_yaml_str(&contents)
    }

    /// Parse and validate a YAML document
    pub fn from_yaml_str(contents: &str) -> SearchResult<Self> {
        let file: ConfigFile = serde_yaml::from_str(contents)?;

        file.bing.validate()?;
        file.google.validate()?;

        let timeout_ms = file.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS);
        if timeout_ms == 0 {
            return Err(SearchError::Config(
                "timeout_ms must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            bing: file.bing.to_provider_config(),
            google: file.google.to_provider_config(),
            timeout_ms,
        })
    }
}
