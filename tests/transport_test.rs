//! Integration tests for [`ReqwestTransport`] against a mock HTTP server.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use herald::{Herald, HeraldError, ReqwestTransport, Requester, Transport, TransportError};

// =============================================================================
// Transport
// =============================================================================

#[tokio::test]
async fn success_returns_parsed_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [1, 2]})))
        .expect(1)
        .mount(&server)
        .await;

    let transport = ReqwestTransport::new().unwrap();
    let body = transport
        .get(&format!("{}/users", server.uri()))
        .await
        .unwrap();
    assert_eq!(body, json!({"data": [1, 2]}));
}

#[tokio::test]
async fn empty_success_body_is_null() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/empty"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let transport = ReqwestTransport::new().unwrap();
    let body = transport
        .get(&format!("{}/empty", server.uri()))
        .await
        .unwrap();
    assert_eq!(body, json!(null));
}

#[tokio::test]
async fn error_status_carries_reason_and_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "no such user"})))
        .mount(&server)
        .await;

    let transport = ReqwestTransport::new().unwrap();
    let err = transport
        .get(&format!("{}/missing", server.uri()))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        TransportError::status(404, Some("Not Found"), json!({"error": "no such user"}))
    );
    assert_eq!(err.into_error().to_string(), "404 Not Found - no such user");
}

#[tokio::test]
async fn error_status_with_text_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let transport = ReqwestTransport::new().unwrap();
    let err: HeraldError = transport
        .get(&format!("{}/down", server.uri()))
        .await
        .unwrap_err()
        .into();
    assert_eq!(err.to_string(), "503 Service Unavailable - maintenance");
    assert_eq!(err.status(), Some(503));
}

#[tokio::test]
async fn malformed_json_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/garbage"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
        .mount(&server)
        .await;

    let transport = ReqwestTransport::new().unwrap();
    let err = transport
        .get(&format!("{}/garbage", server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(err, TransportError::Decode(_)));
}

#[tokio::test]
async fn slow_server_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let transport = ReqwestTransport::with_timeout(Duration::from_millis(100)).unwrap();
    let err = transport
        .get(&format!("{}/slow", server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(err, TransportError::Network(_)));
}

// =============================================================================
// End to end through the orchestrator
// =============================================================================

#[tokio::test]
async fn cached_requests_hit_the_server_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/settings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"theme": "dark"}})))
        .expect(1)
        .mount(&server)
        .await;

    let herald = Herald::builder()
        .transport(Arc::new(ReqwestTransport::new().unwrap()))
        .build()
        .unwrap();
    let url = format!("{}/settings", server.uri());

    let a = herald.get_cached(&url).first().await.unwrap();
    let b = herald.get_cached(&url).first().await.unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(a.requester, Requester::GetCached);
    assert_eq!(a.data, json!({"theme": "dark"}));
}

#[tokio::test]
async fn default_transport_reports_server_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/teapot"))
        .respond_with(ResponseTemplate::new(418).set_body_json(json!({"reason": "short and stout"})))
        .mount(&server)
        .await;

    let herald = Herald::builder().build().unwrap();
    let err = herald
        .get(&format!("{}/teapot", server.uri()))
        .first()
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        r#"418 I'm a teapot - {"reason":"short and stout"}"#
    );
}
