//! Multi-provider aggregation

use crate::{
    config::Config,
    error::{SearchError, SearchResult},
    providers::{BingProvider, GoogleProvider},
    types::{ExtraParams, ImageRecord, ProviderId, SearchProvider},
    utils::http::HttpClient,
};
use std::collections::HashMap;

/// Caller-supplied extras keyed by provider; providers without an entry get none
pub type ProviderParams = HashMap<ProviderId, ExtraParams>;

/// Runs the same search against every configured provider and concatenates
/// the results in provider order.
///
/// Providers are queried one after another. Results are neither sorted nor
/// deduplicated, and the first failing provider fails the whole search.
#[derive(Debug, Default)]
pub struct Aggregator {
    providers: Vec<Box<dyn SearchProvider>>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the Bing and Google providers, in that order, from a loaded configuration
    pub fn from_config(config: &Config) -> SearchResult<Self> {
        let http_client = HttpClient::with_timeout(config.timeout_ms)?;

        let bing = BingProvider::with_http_client(config.bing.clone(), http_client.clone())?;
        let google = GoogleProvider::with_http_client(config.google.clone(), http_client)?;

        Ok(Self::new()
            .add_provider(Box::new(bing))
            .add_provider(Box::new(google)))
    }

    pub fn add_provider(mut self, provider: Box<dyn SearchProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn providers(&self) -> &[Box<dyn SearchProvider>] {
        &self.providers
    }

    /// Search every provider for `count` records of `keyword`
    pub async fn search(
        &self,
        keyword: &str,
        count: u64,
        extras: &ProviderParams,
    ) -> SearchResult<Vec<ImageRecord>> {
        if keyword.trim().is_empty() {
            return Err(SearchError::InvalidInput(
                "A search keyword is required".to_string(),
            ));
        }
        if self.providers.is_empty() {
            return Err(SearchError::Config("No providers configured".to_string()));
        }

        let no_extras = ExtraParams::default();
        let mut merged_results = Vec::new();

        for provider in &self.providers {
            let extra = extras.get(&provider.id()).unwrap_or(&no_extras);

            match provider.search(keyword, count, extra).await {
                Ok(mut provider_results) => merged_results.append(&mut provider_results),
                Err(err) => {
                    log::warn!("{} search for '{keyword}' failed: {err}", provider.name());
                    return Err(err);
                }
            }
        }

        log::info!(
            "Aggregated {} records from {} providers",
            merged_results.len(),
            self.providers.len()
        );

        Ok(merged_results)
    }
}
