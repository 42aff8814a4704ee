//! Image search provider implementations

pub mod bing;
pub mod google;

// Re-export providers for convenience
pub use bing::BingProvider;
pub use google::GoogleProvider;
