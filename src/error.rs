//! Error types for the image search aggregator

use thiserror::Error;

/// Result type alias for search operations
pub type SearchResult<T> = std::result::Result<T, SearchError>;

/// Every failure the library surfaces to its callers.
///
/// None of these are retried or recovered from locally. A failing page aborts
/// the provider's search and a failing provider aborts the aggregated search.
#[derive(Error, Debug, Clone)]
pub enum SearchError {
    /// Configuration missing, unreadable or malformed
    #[error("Configuration error: {0}")]
    Config(String),

    /// Upstream request failed: transport error, non-2xx status or empty body
    #[error("Request failed: {message}")]
    Request {
        message: String,
        status_code: Option<u16>,
        response_body: Option<String>,
    },

    /// Response body lacks the provider's expected shape
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Invalid caller-supplied parameters
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl SearchError {
    /// HTTP status attached to a request failure, if any
    pub fn status_code(&self) -> Option<u16> {
        match self {
            SearchError::Request { status_code, .. } => *status_code,
            _ => None,
        }
    }

    /// Likely cause of the failure, for display next to the error
    pub fn troubleshooting(&self) -> Option<&'static str> {
        match self {
            SearchError::Request {
                status_code: Some(401 | 403),
                ..
            } => Some("This is likely an authentication issue. Check the API keys in the configuration file."),
            SearchError::Request {
                status_code: Some(400),
                ..
            } => Some("This is likely due to invalid request parameters. Check the extra query parameters."),
            SearchError::Request {
                status_code: Some(429),
                ..
            } => Some("The provider's rate limit was exceeded. Try again later or request fewer results."),
            SearchError::Request {
                status_code: Some(500..=599),
                ..
            } => Some("The search provider is experiencing server issues. Try again later."),
            SearchError::Config(_) => Some("Check the configuration file path and its Bing/Google sections."),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for SearchError {
    fn from(error: reqwest::Error) -> Self {
        let message = if error.is_timeout() {
            format!("request timed out: {error}")
        } else {
            error.to_string()
        };

        SearchError::Request {
            message,
            status_code: error.status().map(|s| s.as_u16()),
            response_body: None,
        }
    }
}

impl From<serde_json::Error> for SearchError {
    fn from(error: serde_json::Error) -> Self {
        SearchError::MalformedResponse(format!("JSON parsing failed: {error}"))
    }
}

impl From<serde_yaml::Error> for SearchError {
    fn from(error: serde_yaml::Error) -> Self {
        SearchError::Config(format!("YAML parsing failed: {error}"))
    }
}

impl From<url::ParseError> for SearchError {
    fn from(error: url::ParseError) -> Self {
        SearchError::Config(format!("Invalid URL: {error}"))
    }
}

// Only the configuration loader touches the filesystem.
impl From<std::io::Error> for SearchError {
    fn from(error: std::io::Error) -> Self {
        SearchError::Config(format!("IO error: {error}"))
    }
}
