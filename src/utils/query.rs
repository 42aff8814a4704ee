//! Helpers for turning loose `key=value` text into parameter maps

use crate::error::{SearchError, SearchResult};
use crate::types::Params;

/// Parse a comma separated list of `key=value` pairs.
///
/// Spaces are ignored, so `"mkt=ja-jp, offset=10"` yields
/// `{mkt: "ja-jp", offset: "10"}`. Empty input yields an empty map.
pub fn parse_query_pairs(input: &str) -> SearchResult<Params> {
    let compact: String = input.chars().filter(|c| *c != ' ').collect();
    let mut params = Params::new();

    if compact.is_empty() {
        return Ok(params);
    }

    for pair in compact.split(',') {
        let mut parts = pair.split('=');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(key), Some(value), None) if !key.is_empty() => {
                params.insert(key.to_string(), value.to_string());
            }
            _ => {
                return Err(SearchError::InvalidInput(format!(
                    "expected key=value, got '{pair}'"
                )))
            }
        }
    }

    Ok(params)
}

/// Select the entries whose key contains `prefix`, with the prefix removed.
///
/// Used to split a flat `bing_mkt=..&google_safe=..` bag into per-provider maps.
pub fn extract_prefixed<'a, I>(pairs: I, prefix: &str) -> Params
where
    I: IntoIterator<Item = (&'a String, &'a String)>,
{
    pairs
        .into_iter()
        .filter(|(key, _)| key.contains(prefix))
        .map(|(key, value)| (key.replacen(prefix, "", 1), value.clone()))
        .collect()
}
