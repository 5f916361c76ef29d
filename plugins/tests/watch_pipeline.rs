//! Bridge → gatekeeper → HTTP scorer → redirect command, end to end.

use std::sync::Arc;

use mockito::Matcher;
use phishshield_core::api::AppConfig;
use phishshield_plugins::factory::build_gatekeeper;
use phishshield_plugins::host::{run_stdio_bridge, StdioHost};
use pretty_assertions::assert_eq;
use serde_json::json;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

#[tokio::test]
async fn phishing_navigation_produces_one_redirect_command() {
    let mut server = mockito::Server::new_async().await;
    let evil = server
        .mock("POST", "/api/v1/score")
        .match_body(Matcher::Json(json!({"url": "https://evil-example.com/login"})))
        .with_status(200)
        .with_body(r#"{"is_phishing":true,"score":0.93,"reasons":["typosquat","no TLS cert match"]}"#)
        .expect(1)
        .create_async()
        .await;
    let safe = server
        .mock("POST", "/api/v1/score")
        .match_body(Matcher::Json(json!({"url": "https://example.com"})))
        .with_status(200)
        .with_body(r#"{"is_phishing":false,"score":0.02,"reasons":[]}"#)
        .expect(1)
        .create_async()
        .await;

    let mut cfg = AppConfig::default();
    cfg.scoring.endpoint = format!("{}/api/v1/score", server.url());
    cfg.gatekeeper.block_page_url = "block.html".into();

    let (out_client, out_server) = tokio::io::duplex(4096);
    let host = Arc::new(StdioHost::new(out_client));
    let gatekeeper = build_gatekeeper(&cfg, host.clone(), None, "pipeline-test").unwrap();

    let (tx, rx) = mpsc::channel(16);
    let handle = gatekeeper.start(rx);

    let input = concat!(
        "{\"type\":\"beforeNavigate\",\"tabId\":1,\"frameId\":0,\"url\":\"https://example.com\"}\n",
        "{\"type\":\"beforeNavigate\",\"tabId\":2,\"frameId\":0,\"url\":\"https://evil-example.com/login\"}\n",
        "{\"type\":\"beforeNavigate\",\"tabId\":2,\"frameId\":3,\"url\":\"https://evil-example.com/frame\"}\n",
    );
    let summary = run_stdio_bridge(BufReader::new(input.as_bytes()), host.clone(), tx)
        .await
        .unwrap();
    assert_eq!(summary.events, 3);

    let stats = handle.join().await;
    assert_eq!(stats.navigations, 3);
    assert_eq!(stats.scoring_requests, 2);
    assert_eq!(stats.redirects, 1);

    let mut lines = BufReader::new(out_server).lines();
    let line = lines.next_line().await.unwrap().unwrap();
    assert_eq!(
        line,
        "{\"type\":\"redirect\",\"tabId\":2,\"url\":\"block.html?url=https%3A%2F%2Fevil-example.com%2Flogin&reason=typosquat%2C%20no%20TLS%20cert%20match\"}"
    );

    evil.assert_async().await;
    safe.assert_async().await;
}
