//! Tests for the HTTP transport

use super::client::classify_error_body;
use super::*;
use crate::credentials::Credentials;
use crate::error::Error;
use crate::types::BackoffType;
use pretty_assertions::assert_eq;
use reqwest::Method;
use serde_json::json;
use std::collections::HashMap;
use std::time::Duration;
use test_case::test_case;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Helpers
// ============================================================================

fn quick_retries(max_retries: u32) -> RetryPolicy {
    RetryPolicy {
        max_retries,
        backoff: BackoffType::Constant,
        initial_delay: Duration::from_millis(5),
        max_delay: Duration::from_millis(50),
    }
}

fn client_for(server: &MockServer, max_retries: u32) -> HttpClient {
    HttpClient::new(HttpClientConfig {
        base_url: server.uri(),
        timeout: Duration::from_secs(5),
        connect_timeout: Duration::from_secs(1),
        retry: quick_retries(max_retries),
        rate_limit: None,
        credentials: Credentials::None,
    })
    .unwrap()
}

fn get(path: &str) -> JsonRequest {
    JsonRequest {
        method: Method::GET,
        path: path.to_string(),
        query: Vec::new(),
        headers: HashMap::new(),
        body: None,
    }
}

// ============================================================================
// Requests
// ============================================================================

#[tokio::test]
async fn test_get_sends_query_and_headers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v20210603/Monitors"))
        .and(query_param("NextToken", "n-1"))
        .and(query_param("MaxResults", "10"))
        .and(header("X-Trace", "t-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Monitors": []})))
        .expect(1)
        .mount(&server)
        .await;

    let mut request = get("v20210603/Monitors");
    request.query = vec![
        ("NextToken".to_string(), "n-1".to_string()),
        ("MaxResults".to_string(), "10".to_string()),
    ];
    request.headers.insert("X-Trace".to_string(), "t-1".to_string());

    let body = client_for(&server, 0).request_json(&request).await.unwrap();
    assert_eq!(body, json!({"Monitors": []}));
}

#[tokio::test]
async fn test_post_keeps_declared_content_type() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/"))
        .and(header("content-type", "application/x-amz-json-1.0"))
        .and(body_json(json!({"Marker": "m-1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"CacheClusters": []})))
        .expect(1)
        .mount(&server)
        .await;

    let request = JsonRequest {
        method: Method::POST,
        path: "/".to_string(),
        query: Vec::new(),
        headers: HashMap::from([(
            "Content-Type".to_string(),
            "application/x-amz-json-1.0".to_string(),
        )]),
        body: Some(json!({"Marker": "m-1"})),
    };

    client_for(&server, 0).request_json(&request).await.unwrap();
}

#[tokio::test]
async fn test_credentials_on_every_attempt() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(header("X-Api-Key", "k-1"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(header("X-Api-Key", "k-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpClient::new(HttpClientConfig {
        base_url: server.uri(),
        timeout: Duration::from_secs(5),
        connect_timeout: Duration::from_secs(1),
        retry: quick_retries(1),
        rate_limit: None,
        credentials: Credentials::api_key("X-Api-Key", "k-1"),
    })
    .unwrap();

    assert_eq!(client.request_json(&get("/")).await.unwrap(), json!({"ok": true}));
}

#[tokio::test]
async fn test_empty_body_is_empty_object() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let body = client_for(&server, 0).request_json(&get("/")).await.unwrap();
    assert_eq!(body, json!({}));
}

#[tokio::test]
async fn test_non_json_body_is_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let err = client_for(&server, 2).request_json(&get("/")).await.unwrap_err();
    assert!(matches!(err, Error::Decode { .. }));
}

// ============================================================================
// Error Mapping
// ============================================================================

#[tokio::test]
async fn test_service_error_body_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v20210603/Monitors/nope/HealthEvents"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "__type": "com.amazonaws.internetmonitor#ResourceNotFoundException",
            "message": "Monitor nope does not exist"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = client_for(&server, 3)
        .request_json(&get("/v20210603/Monitors/nope/HealthEvents"))
        .await
        .unwrap_err();

    match err {
        Error::Service {
            status,
            code,
            message,
        } => {
            assert_eq!(status, 404);
            assert_eq!(code, "ResourceNotFoundException");
            assert_eq!(message, "Monitor nope does not exist");
        }
        other => panic!("Expected service error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_plain_client_error_keeps_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_string("MaxRecords out of range"))
        .expect(1)
        .mount(&server)
        .await;

    let mut request = get("/");
    request.method = Method::POST;
    request.body = Some(json!({"MaxRecords": 5}));

    let err = client_for(&server, 3).request_json(&request).await.unwrap_err();
    assert!(matches!(
        err,
        Error::HttpStatus { status: 400, ref body } if body == "MaxRecords out of range"
    ));
}

#[test]
fn test_classify_error_body_variants() {
    let body = r#"{"Code":"InvalidParameterValue","Message":"bad"}"#;
    match classify_error_body(400, body.into()) {
        Error::Service { code, message, .. } => {
            assert_eq!(code, "InvalidParameterValue");
            assert_eq!(message, "bad");
        }
        other => panic!("Expected service error, got {other:?}"),
    }

    let err = classify_error_body(400, r#"{"detail":"no code here"}"#.into());
    assert!(matches!(err, Error::HttpStatus { status: 400, .. }));

    let err = classify_error_body(502, "Bad gateway".into());
    assert!(matches!(err, Error::HttpStatus { status: 502, .. }));
}

// ============================================================================
// Retry Budget
// ============================================================================

#[tokio::test]
async fn test_retry_budget_is_per_call() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"page": 1})))
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(&server, 2);

    // First page spends the whole budget, the second starts fresh
    client.request_json(&get("/")).await.unwrap();
    client.request_json(&get("/")).await.unwrap();
}

#[tokio::test]
async fn test_retries_exhausted_returns_last_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Server error"))
        .expect(3)
        .mount(&server)
        .await;

    let err = client_for(&server, 2).request_json(&get("/")).await.unwrap_err();
    assert!(matches!(err, Error::HttpStatus { status: 500, .. }));
}

#[tokio::test]
async fn test_throttled_request_waits_and_retries() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let body = client_for(&server, 1).request_json(&get("/")).await.unwrap();
    assert_eq!(body, json!({"ok": true}));
}

#[tokio::test]
async fn test_throttled_without_budget() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "7"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client_for(&server, 0).request_json(&get("/")).await.unwrap_err();
    assert!(matches!(
        err,
        Error::RateLimited {
            retry_after_seconds: 7
        }
    ));
}

#[test_case(BackoffType::Constant, [100, 100, 100] ; "constant")]
#[test_case(BackoffType::Linear, [100, 200, 300] ; "linear")]
#[test_case(BackoffType::Exponential, [100, 200, 400] ; "exponential")]
fn test_retry_delay_curve(backoff: BackoffType, expected_ms: [u64; 3]) {
    let policy = RetryPolicy {
        backoff,
        initial_delay: Duration::from_millis(100),
        max_delay: Duration::from_secs(1),
        ..RetryPolicy::default()
    };
    let error = Error::http_status(503, "");

    let delays: Vec<u64> = (0..3)
        .map(|attempt| policy.delay_before_retry(&error, attempt).as_millis() as u64)
        .collect();
    assert_eq!(delays, expected_ms.to_vec());
}

#[test]
fn test_retry_delay_capped_and_retry_after_wins() {
    let policy = RetryPolicy {
        initial_delay: Duration::from_secs(1),
        max_delay: Duration::from_secs(5),
        ..RetryPolicy::default()
    };

    assert_eq!(
        policy.delay_before_retry(&Error::http_status(500, ""), 10),
        Duration::from_secs(5)
    );
    assert_eq!(
        policy.delay_before_retry(
            &Error::RateLimited {
                retry_after_seconds: 9
            },
            0
        ),
        Duration::from_secs(9)
    );
}

#[test]
fn test_retry_only_transient_errors() {
    let policy = quick_retries(2);

    assert!(policy.allows_retry(&Error::http_status(502, ""), 0));
    assert!(policy.allows_retry(&Error::Timeout { timeout_ms: 10 }, 1));
    assert!(!policy.allows_retry(&Error::http_status(502, ""), 2));
    assert!(!policy.allows_retry(&Error::service(400, "InvalidParameterValue", ""), 0));
    assert!(!policy.allows_retry(&Error::decode("bad"), 0));
}

#[test]
fn test_client_debug_redacts_credentials() {
    let client = HttpClient::new(HttpClientConfig {
        base_url: "https://elasticache.us-east-1.amazonaws.com".to_string(),
        timeout: Duration::from_secs(5),
        connect_timeout: Duration::from_secs(1),
        retry: RetryPolicy::default(),
        rate_limit: Some(RateLimiterConfig::default()),
        credentials: Credentials::bearer("secret-token"),
    })
    .unwrap();

    let debug = format!("{client:?}");
    assert!(debug.contains("elasticache.us-east-1"));
    assert!(!debug.contains("secret-token"));
}
