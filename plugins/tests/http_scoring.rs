//! HTTP scoring client against a mock scoring service.

use std::time::Duration;

use mockito::Matcher;
use phishshield_core::api::{ScoringClient, ScoringError, Verdict};
use phishshield_plugins::scoring::HttpScoringClient;
use pretty_assertions::assert_eq;
use serde_json::json;

const PATH: &str = "/api/v1/score";

fn client(server: &mockito::ServerGuard) -> HttpScoringClient {
    HttpScoringClient::new(format!("{}{}", server.url(), PATH), 2_000).unwrap()
}

#[tokio::test]
async fn posts_url_and_parses_phishing_verdict() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", PATH)
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(json!({"url": "https://evil-example.com/login"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"is_phishing": true, "score": 0.93, "reasons": ["typosquat", "no TLS cert match"]}"#,
        )
        .expect(1)
        .create_async()
        .await;

    let verdict = client(&server)
        .score("https://evil-example.com/login")
        .await
        .unwrap();

    assert_eq!(
        verdict,
        Verdict::phishing(0.93, ["typosquat", "no TLS cert match"])
    );
    mock.assert_async().await;
}

#[tokio::test]
async fn accepts_backend_response_shape() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", PATH)
        .with_status(200)
        .with_body(
            r#"{"url":"https://example.com","phishing_probability":0.02,"is_phishing":false,"reasons":[],"request_id":"550e8400-e29b-41d4-a716-446655440000"}"#,
        )
        .create_async()
        .await;

    let verdict = client(&server).score("https://example.com").await.unwrap();
    assert_eq!(verdict, Verdict::benign(0.02));
}

#[tokio::test]
async fn non_success_status_is_service_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", PATH)
        .with_status(500)
        .with_body(r#"{"detail":"Error scanning URL: model not loaded"}"#)
        .create_async()
        .await;

    let err = client(&server).score("https://example.com").await.unwrap_err();
    match err {
        ScoringError::Service {
            status,
            body_snippet,
        } => {
            assert_eq!(status, 500);
            assert!(body_snippet.contains("model not loaded"));
        }
        other => panic!("expected service error, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_payload_is_parse_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", PATH)
        .with_status(200)
        .with_body(r#"{"score": 0.4}"#)
        .create_async()
        .await;

    let err = client(&server).score("https://example.com").await.unwrap_err();
    assert_eq!(err.kind(), "parse");
}

#[tokio::test]
async fn connection_refused_is_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = HttpScoringClient::new(format!("http://{addr}{PATH}"), 2_000).unwrap();
    let err = client.score("https://example.com").await.unwrap_err();
    assert_eq!(err.kind(), "network");
    assert!(!err.is_timeout());
}

#[tokio::test]
async fn slow_service_times_out_as_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        // accept and never answer
        if let Ok((socket, _)) = listener.accept().await {
            tokio::time::sleep(Duration::from_secs(5)).await;
            drop(socket);
        }
    });

    let client = HttpScoringClient::new(format!("http://{addr}{PATH}"), 100).unwrap();
    let err = client.score("https://example.com").await.unwrap_err();
    assert!(err.is_timeout(), "{err:?}");
}
