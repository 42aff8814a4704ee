//! Step planning and the shared paginated fetch loop

use crate::error::{SearchError, SearchResult};
use crate::types::{merge_params, ExtraParams, ImageRecord, SearchProvider};
use crate::utils::http::build_headers;

/// One page request: `count` results starting at the 0-based `offset`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub index: u64,
    pub offset: u64,
    pub count: u64,
}

/// Number of requests needed to collect `total` results, `ceil(total / page_size)`.
/// A zero page size plans nothing.
pub fn step_count(total: u64, page_size: u64) -> u64 {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size)
}

/// Split `total` into page requests. Every step asks for a full page except
/// possibly the last, and the counts sum to `total`. Steps are produced
/// lazily, one per request.
pub fn plan_steps(total: u64, page_size: u64) -> impl Iterator<Item = Step> {
    (0..step_count(total, page_size))
        .map(move |index| {
            let offset = index * page_size;
            Step {
                index,
                offset,
                count: page_size.min(total - offset),
            }
        })
}

/// Run one provider's search: plan the steps, request each page in order and
/// concatenate the converted records.
///
/// Query precedence, lowest first: the provider's fixed query, the caller's
/// extra query, the keyword, the paging fields. Headers are the provider's
/// fixed headers overlaid with the caller's. Any failing page aborts the whole
/// search and no partial result is returned.
pub async fn paginated_search<P>(
    provider: &P,
    keyword: &str,
    total: u64,
    extra: &ExtraParams,
) -> SearchResult<Vec<ImageRecord>>
where
    P: SearchProvider + ?Sized,
{
    let config = provider.config();
    if config.page_size == 0 {
        return Err(SearchError::Config(format!(
            "{}: page_size must be at least 1",
            provider.name()
        )));
    }

    let headers = build_headers(&[&config.base_header, &extra.headers])?;
    let mut query = merge_params(&config.base_query, &extra.query);
    query.insert(config.keyword_param_name.clone(), keyword.to_string());

    let steps = step_count(total, config.page_size);
    let mut records = Vec::new();

    for step in plan_steps(total, config.page_size) {
        let page_query = merge_params(&query, &provider.paging_params(step.offset, step.count));

        log::debug!(
            "{} step {}/{}: offset={} count={}",
            provider.name(),
            step.index + 1,
            steps,
            step.offset,
            step.count
        );

        let body = provider
            .http_client()
            .get_json(&config.base_url, &page_query, &headers)
            .await?;
        let mut page = provider.convert(&body)?;

        log::debug!("{} step {} returned {} records", provider.name(), step.index + 1, page.len());
        records.append(&mut page);
    }

    log::info!(
        "{} returned {} records in {} requests",
        provider.name(),
        records.len(),
        steps
    );

    Ok(records)
}
