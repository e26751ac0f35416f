// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Control-Plane Client Tests
 * HttpScannerClient against a mock scanner control plane
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use std::time::Duration;

use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use luotsi_orchestrator::client::ScannerClient;
use luotsi_orchestrator::config::ControlPlaneConfig;
use luotsi_orchestrator::control_plane::HttpScannerClient;
use luotsi_orchestrator::errors::TransportError;

fn client_for(server: &MockServer) -> HttpScannerClient {
    let config = ControlPlaneConfig {
        base_url: server.uri(),
        api_key: None,
        request_timeout: Duration::from_secs(5),
    };
    HttpScannerClient::new(&config).unwrap()
}

#[tokio::test]
async fn version_probe_parses_the_scanner_version() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/version"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "version": "2.17.0"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert_eq!(client.version().await.unwrap(), "2.17.0");
}

#[tokio::test]
async fn start_crawl_returns_the_assigned_scan_id() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/crawl/start"))
        .and(query_param("url", "https://app.example.fi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "scanId": "17"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let scan_id = client.start_crawl("https://app.example.fi").await.unwrap();
    assert_eq!(scan_id, "17");
}

#[tokio::test]
async fn crawl_status_clamps_out_of_range_progress() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/crawl/status"))
        .and(query_param("scanId", "17"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "progress": 250
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert_eq!(client.crawl_status("17").await.unwrap(), 100);
}

#[tokio::test]
async fn pending_passive_records_reads_the_backlog() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/passive/pending"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "recordsToScan": 12
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert_eq!(client.pending_passive_records().await.unwrap(), 12);
}

#[tokio::test]
async fn findings_parse_into_raw_records() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/findings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "findings": [
                {
                    "name": "SQL Injection",
                    "risk": "High",
                    "description": "Injectable parameter",
                    "url": "https://app.example.fi/search",
                    "solution": "Use parameterized queries"
                },
                {
                    "name": "Server banner",
                    "risk": "Informational"
                }
            ]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let findings = client.list_findings().await.unwrap();

    assert_eq!(findings.len(), 2);
    assert_eq!(findings[0].name, "SQL Injection");
    assert_eq!(findings[0].risk, "High");
    assert_eq!(findings[0].solution, "Use parameterized queries");

    // Missing fields default to empty rather than failing the parse.
    assert_eq!(findings[1].name, "Server banner");
    assert!(findings[1].url.is_empty());
    assert!(findings[1].solution.is_empty());
}

#[tokio::test]
async fn error_status_maps_to_unexpected_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/session/reset"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client.reset_session().await;

    match result {
        Err(TransportError::UnexpectedStatus { operation, status }) => {
            assert_eq!(operation, "session reset");
            assert_eq!(status, 500);
        }
        other => panic!("expected UnexpectedStatus, got {:?}", other),
    }
}

#[tokio::test]
async fn malformed_body_maps_to_malformed_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/active/status"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client.active_scan_status("9").await;

    assert!(matches!(
        result,
        Err(TransportError::Malformed {
            operation: "active scan status",
            ..
        })
    ));
}

#[tokio::test]
async fn api_key_is_sent_with_every_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/scope/include"))
        .and(query_param("pattern", "*.example.fi"))
        .and(header("X-Api-Key", "sekret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&server)
        .await;

    let config = ControlPlaneConfig {
        base_url: server.uri(),
        api_key: Some("sekret".to_string()),
        request_timeout: Duration::from_secs(5),
    };
    let client = HttpScannerClient::new(&config).unwrap();

    client.include_host("*.example.fi").await.unwrap();
}
