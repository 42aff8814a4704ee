//! Utility functions for the image search aggregator

pub mod http;
pub mod query;
