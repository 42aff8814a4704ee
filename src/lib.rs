//! # imagesearch
//!
//! Image search across several providers through one call.
//!
//! Each provider (Bing Image Search, Google Custom Search) is paged until the
//! requested number of results is collected, and every result is normalized
//! into an [`ImageRecord`]. The [`Aggregator`] runs the same search against
//! every configured provider and concatenates the results in provider order.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use imagesearch::{aggregate_search, initialize, ProviderParams};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Load credentials and build the Bing and Google clients
//!     let aggregator = initialize("config.yml")?;
//!
//!     let records = aggregate_search(&aggregator, "cats", 25, &ProviderParams::new()).await?;
//!
//!     for record in records {
//!         println!("{}", record.to_ltsv());
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod aggregate;
pub mod config;
pub mod error;
pub mod paging;
pub mod providers;
pub mod types;
pub mod utils;

// Re-export common types
pub use aggregate::{Aggregator, ProviderParams};
pub use config::{Config, ProviderConfig};
pub use error::{SearchError, SearchResult as Result};
pub use types::{ExtraParams, ImageRecord, ProviderId, SearchProvider};

use std::path::Path;

/// Load the configuration at `path` and build an aggregator over every
/// provider it configures.
///
/// Call once at startup. A missing, unreadable or incomplete configuration is
/// returned as [`SearchError::Config`]; deciding whether to exit is left to
/// the caller.
pub fn initialize(path: impl AsRef<Path>) -> Result<Aggregator> {
    let config = Config::from_path(path)?;
    Aggregator::from_config(&config)
}

/// Search every provider of `aggregator` for `count_per_provider` records of
/// `keyword` and return them concatenated in provider order.
///
/// # Examples
///
/// ```rust,no_run
/// use imagesearch::{aggregate_search, initialize, ExtraParams, ProviderId, ProviderParams};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let aggregator = initialize("config.yml")?;
/// let mut extras = ProviderParams::new();
/// extras.insert(ProviderId::Bing, ExtraParams::new().with_query("mkt", "ja-JP"));
///
/// let records = aggregate_search(&aggregator, "sunset", 10, &extras).await?;
/// # Ok(())
/// # }
/// ```
pub async fn aggregate_search(
    aggregator: &Aggregator,
    keyword: &str,
    count_per_provider: u64,
    extras: &ProviderParams,
) -> Result<Vec<ImageRecord>> {
    log::debug!("Searching '{keyword}' for {count_per_provider} records per provider");
    aggregator.search(keyword, count_per_provider, extras).await
}
