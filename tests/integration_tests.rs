//! Integration tests using mock HTTP server
//!
//! Tests the full end-to-end flow: built-in operation definition → paged
//! HTTP requests → items

use futures::StreamExt;
use pagewalk::catalog::Catalog;
use pagewalk::config::ClientConfig;
use pagewalk::pagination::{CancelToken, FetchPhase, ListFetcher, PagingOptions};
use pagewalk::service::JsonPageSource;
use pagewalk::Error;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use wiremock::matchers::{
    body_json, header, method, path, query_param, query_param_is_missing,
};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Helpers
// ============================================================================

fn test_config(server: &MockServer) -> ClientConfig {
    let mut config = ClientConfig::new()
        .with_region("us-east-1")
        .with_endpoint_url(server.uri());
    config.http.rate_limit = None;
    config.http.max_retries = 1;
    config.http.retry_backoff.initial_ms = 1;
    config
}

fn source(config: &ClientConfig, service: &str, operation: &str) -> JsonPageSource {
    let catalog = Catalog::builtin().unwrap();
    let (service, op) = catalog.find_operation(service, operation).unwrap();
    JsonPageSource::new(config, service, op).unwrap()
}

fn clusters(start: usize, count: usize) -> Vec<Value> {
    (start..start + count)
        .map(|i| json!({"CacheClusterId": format!("c-{i}")}))
        .collect()
}

// ============================================================================
// ElastiCache (POST, Marker/MaxRecords)
// ============================================================================

#[tokio::test]
async fn test_describe_cache_clusters_limit_respects_page_granularity() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/"))
        .and(header("X-Amz-Target", "AmazonElastiCacheV9.DescribeCacheClusters"))
        .and(header("content-type", "application/x-amz-json-1.0"))
        .and(body_json(json!({"MaxRecords": 25})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "CacheClusters": clusters(0, 20),
            "Marker": "m-1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    // Remaining budget is 5, raised to the service minimum of 20
    Mock::given(method("POST"))
        .and(body_json(json!({"Marker": "m-1", "MaxRecords": 20})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "CacheClusters": clusters(20, 20),
            "Marker": ""
        })))
        .expect(1)
        .mount(&server)
        .await;

    let source = source(&test_config(&server), "elasticache", "describe-cache-clusters");
    let bounds = source.bounds();
    let template = source.request::<&str>(&[]).unwrap();

    let outcome = ListFetcher::with_bounds(
        source,
        template,
        PagingOptions::new().with_emit_limit(25),
        bounds,
    )
    .unwrap()
    .collect()
    .await;

    assert!(outcome.is_complete());
    assert_eq!(outcome.pages_fetched, 2);
    assert_eq!(outcome.items, clusters(0, 40));
}

#[tokio::test]
async fn test_describe_events_manual_paging() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(header("X-Amz-Target", "AmazonElastiCacheV9.DescribeEvents"))
        .and(body_json(json!({
            "SourceType": "cache-cluster",
            "StartTime": "2024-05-01T00:00:00Z",
            "MaxRecords": 20
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Events": [{"Message": "Cache cluster created"}],
            "Marker": "ev-2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let source = source(&test_config(&server), "elasticache", "describe-events");
    let bounds = source.bounds();
    let template = source
        .request(&["SourceType=cache-cluster", "StartTime=2024-05-01"])
        .unwrap();

    let mut fetcher = ListFetcher::with_bounds(
        source,
        template,
        PagingOptions::new().with_page_size(20).manual(),
        bounds,
    )
    .unwrap();

    let page = fetcher.next_page().await.unwrap().unwrap();
    assert_eq!(page.len(), 1);
    assert!(fetcher.next_page().await.unwrap().is_none());

    assert_eq!(fetcher.phase(), FetchPhase::Exhausted);
    assert_eq!(fetcher.manual_next_cursor().map(|c| c.as_str()), Some("ev-2"));
}

#[tokio::test]
async fn test_page_size_below_minimum_fails_before_fetch() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let source = source(&test_config(&server), "elasticache", "describe-snapshots");
    let bounds = source.bounds();
    let template = source.request::<&str>(&[]).unwrap();

    let err = ListFetcher::with_bounds(
        source,
        template,
        PagingOptions::new().with_page_size(5),
        bounds,
    )
    .unwrap_err();

    assert!(err.is_caller_misuse());
}

// ============================================================================
// Internet Monitor (GET, NextToken/MaxResults)
// ============================================================================

#[tokio::test]
async fn test_list_health_events_streams_across_empty_page() {
    let server = MockServer::start().await;
    let events_path = "/v20210603/Monitors/prod-monitor/HealthEvents";

    Mock::given(method("GET"))
        .and(path(events_path))
        .and(query_param("EventStatus", "ACTIVE"))
        .and(query_param_is_missing("NextToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "HealthEvents": [{"EventId": "e-1"}, {"EventId": "e-2"}],
            "NextToken": "n-1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(events_path))
        .and(query_param("NextToken", "n-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "HealthEvents": [],
            "NextToken": "n-2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(events_path))
        .and(query_param("NextToken", "n-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "HealthEvents": [{"EventId": "e-3"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let source = source(&test_config(&server), "internetmonitor", "list-health-events");
    let template = source
        .request(&["MonitorName=prod-monitor", "EventStatus=ACTIVE"])
        .unwrap();

    let items: Vec<Value> = ListFetcher::new(source, template, PagingOptions::new())
        .unwrap()
        .into_stream()
        .map(|item| item.unwrap())
        .collect()
        .await;

    let ids: Vec<&str> = items
        .iter()
        .filter_map(|e| e["EventId"].as_str())
        .collect();
    assert_eq!(ids, vec!["e-1", "e-2", "e-3"]);
}

#[tokio::test]
async fn test_failure_mid_stream_keeps_earlier_items() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v20210603/Monitors"))
        .and(query_param_is_missing("NextToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Monitors": [{"MonitorName": "a"}, {"MonitorName": "b"}],
            "NextToken": "n-1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    // One transport retry, then the failure ends the listing
    Mock::given(method("GET"))
        .and(path("/v20210603/Monitors"))
        .and(query_param("NextToken", "n-1"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal failure"))
        .expect(2)
        .mount(&server)
        .await;

    let source = source(&test_config(&server), "internetmonitor", "list-monitors");
    let template = source.request::<&str>(&[]).unwrap();

    let results: Vec<_> = ListFetcher::new(source, template, PagingOptions::new())
        .unwrap()
        .into_stream()
        .collect()
        .await;

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].as_ref().unwrap()["MonitorName"], "a");
    assert_eq!(results[1].as_ref().unwrap()["MonitorName"], "b");
    assert!(matches!(
        results[2],
        Err(Error::HttpStatus { status: 500, .. })
    ));
}

#[tokio::test]
async fn test_bearer_token_from_environment() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v20210603/InternetEvents"))
        .and(header("Authorization", "Bearer env-secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "InternetEvents": [{"EventId": "i-1"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = test_config(&server).with_env_from(|key| {
        (key == "PAGEWALK_TOKEN").then(|| "env-secret".to_string())
    });
    let source = source(&config, "internetmonitor", "list-internet-events");
    let template = source.request::<&str>(&[]).unwrap();

    let (items, next) = ListFetcher::new(source, template, PagingOptions::new())
        .unwrap()
        .collect()
        .await
        .into_result()
        .unwrap();

    assert_eq!(items.len(), 1);
    assert!(next.is_none());
}

#[tokio::test]
async fn test_cancellation_between_pages() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v20210603/Monitors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Monitors": [{"MonitorName": "a"}],
            "NextToken": "more"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let source = source(&test_config(&server), "internetmonitor", "list-monitors");
    let template = source.request::<&str>(&[]).unwrap();
    let cancel = CancelToken::new();

    let mut fetcher = ListFetcher::new(source, template, PagingOptions::new())
        .unwrap()
        .with_cancel_token(cancel.clone());

    assert!(fetcher.next_page().await.unwrap().is_some());
    cancel.cancel();

    let err = fetcher.next_page().await.unwrap_err();
    assert!(matches!(err, Error::Cancelled { pages_fetched: 1 }));
    assert_eq!(fetcher.phase(), FetchPhase::Failed);
}
