//! HTTP-level tests for the FOFA client.

use fofa_client::{ClientOptions, FofaApiErrorKind, FofaClient, SearchBackend, SearchRequest};
use httpmock::prelude::*;
use serde_json::json;
use std::time::Duration;

fn client_for(server: &MockServer) -> FofaClient {
    let options = ClientOptions::builder()
        .base_url(server.base_url())
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap();
    FofaClient::with_options("test-key", &options).unwrap()
}

fn nginx_request(full: bool) -> SearchRequest {
    SearchRequest::builder()
        .query("app=\"nginx\"")
        .size(10000usize)
        .full(full)
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_search_sends_encoded_query() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/v1/search/all")
                .query_param("key", "test-key")
                .query_param("qbase64", "YXBwPSJuZ2lueCI=")
                .query_param("page", "1")
                .query_param("size", "10000")
                .query_param("fields", "host")
                .query_param("full", "true");
            then.status(200).json_body(json!({
                "error": false,
                "size": 1234,
                "page": 1,
                "mode": "extended",
                "query": "app=\"nginx\"",
                "results": ["1.1.1.1:80", "https://example.com"]
            }));
        })
        .await;

    let client = client_for(&server);
    let result = client.search(&nginx_request(true)).await.unwrap();

    mock.assert_async().await;
    assert_eq!(*result.total(), 1234);
    assert_eq!(result.rows(), &vec!["1.1.1.1:80".to_string(), "https://example.com".to_string()]);
    assert_eq!(result.query(), "app=\"nginx\"");
}

#[tokio::test]
async fn test_search_joins_multi_field_rows() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/v1/search/all")
                .query_param("qbase64", "aG9zdD0iZXhhbXBsZS5jb20i")
                .query_param("fields", "ip,port,protocol,title,server");
            then.status(200).json_body(json!({
                "error": false,
                "size": 2,
                "results": [
                    ["93.184.216.34", "443", "https", "Example Domain", "ECS"],
                    ["93.184.216.34", "80", "http", "", null]
                ]
            }));
        })
        .await;

    let request = SearchRequest::builder()
        .query("host=\"example.com\"")
        .fields("ip,port,protocol,title,server")
        .build()
        .unwrap();
    let result = client_for(&server).search(&request).await.unwrap();

    assert_eq!(
        result.into_rows(),
        vec![
            "93.184.216.34,443,https,Example Domain,ECS".to_string(),
            "93.184.216.34,80,http,,".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_null_results_read_as_empty() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v1/search/all");
            then.status(200).json_body(json!({
                "error": false,
                "size": 0,
                "page": 1,
                "mode": "extended",
                "query": "app=\"nginx\"",
                "results": null
            }));
        })
        .await;

    let client = client_for(&server);
    let result = client.search(&nginx_request(false)).await.unwrap();

    assert_eq!(*result.total(), 0);
    assert!(result.rows().is_empty());
}

#[tokio::test]
async fn test_remote_error_maps_to_api_kind() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v1/search/all");
            then.status(200).json_body(json!({
                "error": true,
                "errmsg": "[820031] F点余额不足"
            }));
        })
        .await;

    let err = client_for(&server)
        .search(&nginx_request(false))
        .await
        .unwrap_err();

    assert_eq!(err.kind, FofaApiErrorKind::Api("[820031] F点余额不足".to_string()));
    assert!(err.kind.is_remote_rejection());
}

#[tokio::test]
async fn test_http_status_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v1/search/all");
            then.status(502).body("bad gateway");
        })
        .await;

    let err = client_for(&server)
        .search(&nginx_request(false))
        .await
        .unwrap_err();

    assert!(matches!(
        err.kind,
        FofaApiErrorKind::Status { status_code: 502, .. }
    ));
}

#[tokio::test]
async fn test_undecodable_body() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v1/search/all");
            then.status(200).body("<html>maintenance</html>");
        })
        .await;

    let err = client_for(&server)
        .search(&nginx_request(false))
        .await
        .unwrap_err();

    assert!(matches!(err.kind, FofaApiErrorKind::Decode(_)));
}

#[tokio::test]
async fn test_unreachable_host_is_transport_error() {
    let options = ClientOptions::builder()
        .base_url("http://127.0.0.1:9")
        .timeout(Duration::from_secs(2))
        .build()
        .unwrap();
    let client = FofaClient::with_options("test-key", &options).unwrap();

    let err = client.search(&nginx_request(false)).await.unwrap_err();
    assert!(matches!(err.kind, FofaApiErrorKind::Transport(_)));
}

#[tokio::test]
async fn test_account_info_through_backend_trait() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/v1/info/my")
                .query_param("key", "test-key");
            then.status(200).json_body(json!({
                "error": false,
                "email": "ops@example.com",
                "username": "ops",
                "isvip": true,
                "vip_level": 3,
                "fcoin": 42
            }));
        })
        .await;

    let backend: Box<dyn SearchBackend> = Box::new(client_for(&server));
    let info = backend.account_info().await.unwrap();

    assert_eq!(info.email(), "ops@example.com");
    assert_eq!(*info.vip_level(), 3);
}

#[tokio::test]
async fn test_verify_key_reports_invalid_key() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v1/info/my");
            then.status(401).json_body(json!({
                "error": true,
                "errmsg": "[-700] Account Invalid"
            }));
        })
        .await;

    let options = ClientOptions::builder()
        .base_url(server.base_url())
        .build()
        .unwrap();
    let err = FofaClient::verify_key("bad-key", &options).await.unwrap_err();

    assert!(err.kind.is_remote_rejection());
}
