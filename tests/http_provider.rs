use httpmock::prelude::*;
use serde_json::json;
use std::time::Duration;

use rust_quran_portal::sms::{HttpSmsProvider, SmsProvider};

fn provider(server: &MockServer, api_key: &str) -> HttpSmsProvider {
    HttpSmsProvider::new(
        server.url("/messages"),
        api_key,
        "QuranPortal",
        Duration::from_secs(5),
    )
    .unwrap()
}

#[tokio::test]
async fn posts_json_with_bearer_token() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/messages")
                .header("authorization", "Bearer secret-key")
                .json_body(json!({
                    "to": "+447700900001",
                    "from": "QuranPortal",
                    "body": "Assalamu alaikum"
                }));
            then.status(200)
                .json_body(json!({ "success": true, "message_id": "m-123" }));
        })
        .await;

    let receipt = provider(&server, "secret-key")
        .send("+447700900001", "Assalamu alaikum")
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(receipt.message_id.as_deref(), Some("m-123"));
}

#[tokio::test]
async fn success_false_is_a_failure() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/messages");
            then.status(200)
                .json_body(json!({ "success": false, "error": "Invalid destination" }));
        })
        .await;

    let err = provider(&server, "")
        .send("+447700900001", "hello")
        .await
        .unwrap_err();

    assert_eq!(err.code(), "E021");
    assert_eq!(err.message(), "Invalid destination");
}

#[tokio::test]
async fn non_2xx_reports_status_and_body() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/messages");
            then.status(503).body("gateway overloaded");
        })
        .await;

    let err = provider(&server, "key")
        .send("+447700900001", "hello")
        .await
        .unwrap_err();

    assert_eq!(err.code(), "E021");
    assert_eq!(err.message(), "HTTP 503: gateway overloaded");
}

#[tokio::test]
async fn plain_text_2xx_is_accepted_without_id() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/messages");
            then.status(202).body("queued");
        })
        .await;

    let receipt = provider(&server, "")
        .send("+447700900001", "hello")
        .await
        .unwrap();
    assert_eq!(receipt.message_id, None);
}

#[tokio::test]
async fn unreachable_gateway_is_a_transport_error() {
    // 端口 9 (discard) 上没有服务
    let provider = HttpSmsProvider::new(
        "http://127.0.0.1:9/messages",
        "",
        "QuranPortal",
        Duration::from_secs(2),
    )
    .unwrap();

    let err = provider.send("+447700900001", "hello").await.unwrap_err();
    assert_eq!(err.code(), "E022");
}
