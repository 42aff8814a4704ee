//! Pagination, validation and aggregation tests against mock provider APIs

use imagesearch::{
    providers::{BingProvider, GoogleProvider},
    utils::http::HttpClient,
    Aggregator, ExtraParams, ProviderConfig, ProviderId, ProviderParams, SearchError,
    SearchProvider,
};
use serde_json::json;
use std::time::Duration;
use wiremock::{
    matchers::{header, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

const BING_PATH: &str = "/bing/v7.0/images/search";
const GOOGLE_PATH: &str = "/customsearch/v1";

fn bing_page(first: u64, count: u64) -> serde_json::Value {
    let items: Vec<_> = (first..first + count)
        .map(|i| {
            json!({
                "contentUrl": format!("https://bing.img/{i}.jpg"),
                "width": 100 + i,
                "height": 200 + i,
                "contentSize": format!("{} B", 1000 + i)
            })
        })
        .collect();
    json!({ "_type": "Images", "value": items })
}

fn google_page(first: u64, count: u64) -> serde_json::Value {
    let items: Vec<_> = (first..first + count)
        .map(|i| {
            json!({
                "link": format!("https://google.img/{i}.jpg"),
                "image": { "width": 10 + i, "height": 20 + i, "byteSize": 3000 + i }
            })
        })
        .collect();
    json!({ "kind": "customsearch#search", "items": items })
}

fn http_client() -> HttpClient {
    HttpClient::with_timeout(2000).unwrap()
}

fn bing_provider(server: &MockServer, page_size: u64) -> BingProvider {
    let config = ProviderConfig::new(&format!("{}{BING_PATH}", server.uri()), page_size)
        .with_header("Ocp-Apim-Subscription-Key", "bing-key");
    BingProvider::with_http_client(config, http_client()).unwrap()
}

fn google_provider(server: &MockServer, page_size: u64) -> GoogleProvider {
    let config = ProviderConfig::new(&format!("{}{GOOGLE_PATH}", server.uri()), page_size)
        .with_query("key", "google-key")
        .with_query("cx", "engine-id")
        .with_query("searchType", "image");
    GoogleProvider::with_http_client(config, http_client()).unwrap()
}

async fn mount_bing_page(server: &MockServer, offset: u64, count: u64) {
    Mock::given(method("GET"))
        .and(path(BING_PATH))
        .and(query_param("q", "cats"))
        .and(query_param("offset", offset.to_string()))
        .and(query_param("count", count.to_string()))
        .and(header("Ocp-Apim-Subscription-Key", "bing-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(bing_page(offset, count)))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_google_page(server: &MockServer, start: u64, num: u64) {
    Mock::given(method("GET"))
        .and(path(GOOGLE_PATH))
        .and(query_param("q", "cats"))
        .and(query_param("start", start.to_string()))
        .and(query_param("num", num.to_string()))
        .and(query_param("key", "google-key"))
        .and(query_param("cx", "engine-id"))
        .and(query_param("searchType", "image"))
        .respond_with(ResponseTemplate::new(200).set_body_json(google_page(start - 1, num)))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_bing_paginates_with_zero_based_offsets() {
    let server = MockServer::start().await;
    mount_bing_page(&server, 0, 10).await;
    mount_bing_page(&server, 10, 10).await;
    mount_bing_page(&server, 20, 5).await;

    let provider = bing_provider(&server, 10);
    let records = provider
        .search("cats", 25, &ExtraParams::default())
        .await
        .unwrap();

    assert_eq!(records.len(), 25);
    for (i, record) in records.iter().enumerate() {
        assert_eq!(record.url(), format!("https://bing.img/{i}.jpg"));
        assert_eq!(record.byte_size(), 1000 + i as u64);
        assert_eq!(record.width(), 100 + i as u32);
        assert_eq!(record.provider_id(), ProviderId::Bing);
    }

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);
}

#[tokio::test]
async fn test_google_paginates_with_one_based_start() {
    let server = MockServer::start().await;
    mount_google_page(&server, 1, 10).await;
    mount_google_page(&server, 11, 10).await;
    mount_google_page(&server, 21, 5).await;

    let provider = google_provider(&server, 10);
    let records = provider
        .search("cats", 25, &ExtraParams::default())
        .await
        .unwrap();

    assert_eq!(records.len(), 25);
    for (i, record) in records.iter().enumerate() {
        assert_eq!(record.url(), format!("https://google.img/{i}.jpg"));
        assert_eq!(record.byte_size(), 3000 + i as u64);
        assert_eq!(record.provider_id(), ProviderId::Google);
    }

    let starts: Vec<String> = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter_map(|r| {
            r.url
                .query_pairs()
                .find(|(k, _)| k == "start")
                .map(|(_, v)| v.into_owned())
        })
        .collect();
    assert_eq!(starts, vec!["1", "11", "21"]);
}

#[tokio::test]
async fn test_zero_total_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(bing_page(0, 1)))
        .expect(0)
        .mount(&server)
        .await;

    let records = bing_provider(&server, 10)
        .search("cats", 0, &ExtraParams::default())
        .await
        .unwrap();

    assert!(records.is_empty());
}

#[tokio::test]
async fn test_server_error_stops_paging() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(bing_page(10, 10)))
        .expect(0)
        .mount(&server)
        .await;

    let err = bing_provider(&server, 10)
        .search("cats", 25, &ExtraParams::default())
        .await
        .unwrap_err();

    match err {
        SearchError::Request {
            status_code,
            response_body,
            ..
        } => {
            assert_eq!(status_code, Some(500));
            assert_eq!(response_body.as_deref(), Some("upstream exploded"));
        }
        other => panic!("Expected Request error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_failure_on_later_page_returns_no_partial_results() {
    let server = MockServer::start().await;
    mount_google_page(&server, 1, 10).await;
    Mock::given(method("GET"))
        .and(query_param("start", "11"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    let result = google_provider(&server, 10)
        .search("cats", 25, &ExtraParams::default())
        .await;

    assert!(matches!(
        result,
        Err(SearchError::Request {
            status_code: Some(403),
            ..
        })
    ));
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_empty_body_is_request_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let err = bing_provider(&server, 10)
        .search("cats", 5, &ExtraParams::default())
        .await
        .unwrap_err();

    match err {
        SearchError::Request { message, .. } => assert!(message.contains("content-length")),
        other => panic!("Expected Request error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unexpected_shape_is_malformed_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
        .mount(&server)
        .await;

    let err = google_provider(&server, 10)
        .search("cats", 5, &ExtraParams::default())
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_non_json_body_is_malformed_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>nope</html>"))
        .mount(&server)
        .await;

    let err = bing_provider(&server, 10)
        .search("cats", 5, &ExtraParams::default())
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_caller_params_override_base_params() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(GOOGLE_PATH))
        .and(query_param("key", "caller-key"))
        .and(query_param("cx", "engine-id"))
        .and(query_param("safe", "active"))
        .and(query_param("q", "cats"))
        .and(header("X-Trace", "abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(google_page(0, 3)))
        .expect(1)
        .mount(&server)
        .await;

    let extra = ExtraParams::new()
        .with_query("key", "caller-key")
        .with_query("safe", "active")
        .with_header("X-Trace", "abc");

    let records = google_provider(&server, 10)
        .search("cats", 3, &extra)
        .await
        .unwrap();
    assert_eq!(records.len(), 3);

    // the caller's map is left as it was
    assert_eq!(extra.query.len(), 2);
    assert_eq!(extra.headers.len(), 1);
}

#[tokio::test]
async fn test_caller_header_overrides_base_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("Ocp-Apim-Subscription-Key", "caller-key"))
        .and(header("Accept-Language", "ja"))
        .and(query_param("mkt", "ja-JP"))
        .respond_with(ResponseTemplate::new(200).set_body_json(bing_page(0, 2)))
        .expect(1)
        .mount(&server)
        .await;

    let extra = ExtraParams::new()
        .with_header("Ocp-Apim-Subscription-Key", "caller-key")
        .with_header("Accept-Language", "ja")
        .with_query("mkt", "ja-JP");

    let records = bing_provider(&server, 10)
        .search("cats", 2, &extra)
        .await
        .unwrap();
    assert_eq!(records.len(), 2);
}

#[tokio::test]
async fn test_caller_header_replaces_base_header_ignoring_case() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(BING_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(bing_page(0, 2)))
        .expect(1)
        .mount(&server)
        .await;

    let extra = ExtraParams::new().with_header("ocp-apim-subscription-key", "caller-key");

    let records = bing_provider(&server, 10)
        .search("cats", 2, &extra)
        .await
        .unwrap();
    assert_eq!(records.len(), 2);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let sent: Vec<String> = requests[0]
        .headers
        .iter()
        .filter(|(name, _)| name.as_str().eq_ignore_ascii_case("Ocp-Apim-Subscription-Key"))
        .flat_map(|(_, values)| values.iter().map(|v| v.as_str().to_string()))
        .collect();
    assert_eq!(sent, vec!["caller-key".to_string()]);
}

#[tokio::test]
async fn test_paging_fields_win_over_caller_params() {
    let server = MockServer::start().await;
    mount_bing_page(&server, 0, 4).await;

    let extra = ExtraParams::new()
        .with_query("offset", "999")
        .with_query("count", "1");

    let records = bing_provider(&server, 10)
        .search("cats", 4, &extra)
        .await
        .unwrap();
    assert_eq!(records.len(), 4);
}

#[tokio::test]
async fn test_custom_keyword_param_name() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("query", "cats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(bing_page(0, 1)))
        .expect(1)
        .mount(&server)
        .await;

    let config = ProviderConfig::new(&format!("{}{BING_PATH}", server.uri()), 10)
        .with_keyword_param("query");
    let provider = BingProvider::with_http_client(config, http_client()).unwrap();

    let records = provider
        .search("cats", 1, &ExtraParams::default())
        .await
        .unwrap();
    assert_eq!(records.len(), 1);
}

#[tokio::test]
async fn test_slow_provider_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(bing_page(0, 1))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let config = ProviderConfig::new(&format!("{}{BING_PATH}", server.uri()), 10);
    let provider =
        BingProvider::with_http_client(config, HttpClient::with_timeout(200).unwrap()).unwrap();

    let err = provider
        .search("cats", 1, &ExtraParams::default())
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::Request { status_code: None, .. }));
}

#[tokio::test]
async fn test_aggregator_concatenates_bing_then_google() {
    let server = MockServer::start().await;
    mount_bing_page(&server, 0, 5).await;
    mount_google_page(&server, 1, 5).await;

    let aggregator = Aggregator::new()
        .add_provider(Box::new(bing_provider(&server, 150)))
        .add_provider(Box::new(google_provider(&server, 10)));

    let records = aggregator
        .search("cats", 5, &ProviderParams::new())
        .await
        .unwrap();

    assert_eq!(records.len(), 10);
    for (i, record) in records[..5].iter().enumerate() {
        assert_eq!(record.provider_id(), ProviderId::Bing);
        assert_eq!(record.url(), format!("https://bing.img/{i}.jpg"));
    }
    for (i, record) in records[5..].iter().enumerate() {
        assert_eq!(record.provider_id(), ProviderId::Google);
        assert_eq!(record.url(), format!("https://google.img/{i}.jpg"));
    }
}

#[tokio::test]
async fn test_aggregator_applies_extras_to_matching_provider_only() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(BING_PATH))
        .and(query_param("mkt", "en-US"))
        .respond_with(ResponseTemplate::new(200).set_body_json(bing_page(0, 2)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(GOOGLE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(google_page(0, 2)))
        .expect(1)
        .mount(&server)
        .await;

    let aggregator = Aggregator::new()
        .add_provider(Box::new(bing_provider(&server, 150)))
        .add_provider(Box::new(google_provider(&server, 10)));

    let mut extras = ProviderParams::new();
    extras.insert(ProviderId::Bing, ExtraParams::new().with_query("mkt", "en-US"));

    let records = aggregator.search("cats", 2, &extras).await.unwrap();
    assert_eq!(records.len(), 4);

    let requests = server.received_requests().await.unwrap();
    let google_request = requests
        .iter()
        .find(|r| r.url.path() == GOOGLE_PATH)
        .unwrap();
    assert!(!google_request.url.query_pairs().any(|(k, _)| k == "mkt"));
}

#[tokio::test]
async fn test_aggregator_fails_when_any_provider_fails() {
    let server = MockServer::start().await;
    mount_bing_page(&server, 0, 5).await;
    Mock::given(method("GET"))
        .and(path(GOOGLE_PATH))
        .respond_with(ResponseTemplate::new(429))
        .expect(1)
        .mount(&server)
        .await;

    let aggregator = Aggregator::new()
        .add_provider(Box::new(bing_provider(&server, 150)))
        .add_provider(Box::new(google_provider(&server, 10)));

    let err = aggregator
        .search("cats", 5, &ProviderParams::new())
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), Some(429));
}
