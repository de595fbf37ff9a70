//! Remote status client against mock authorities.

use std::time::Duration;
use url::Url;

use state_gate::status::{FetchError, RemoteStatusClient, Status};

mod common;

fn client_for(addr: std::net::SocketAddr) -> RemoteStatusClient {
    let endpoint = Url::parse(&format!("http://{}/api/v1/policy/state", addr)).unwrap();
    RemoteStatusClient::with_http_client(endpoint, common::test_client())
}

#[tokio::test]
async fn test_fetch_ok_with_message() {
    let addr = common::start_mock_authority(r#"{"status":"OK","message":"licensed until 2030"}"#).await;

    let resp = client_for(addr).fetch_status().await.unwrap();
    assert_eq!(resp.status, Status::Allowed);
    assert_eq!(resp.message.as_deref(), Some("licensed until 2030"));
}

#[tokio::test]
async fn test_fetch_accepts_alternate_field_names() {
    let addr = common::start_mock_authority(r#"{"license_status":"SOFT_LOCK"}"#).await;
    assert_eq!(client_for(addr).fetch_status().await.unwrap().status, Status::ReadOnly);

    let addr = common::start_mock_authority(r#"{"state":"HARD_LOCK"}"#).await;
    assert_eq!(client_for(addr).fetch_status().await.unwrap().status, Status::Blocked);
}

#[tokio::test]
async fn test_requests_configured_path() {
    let addr = common::start_programmable_backend(|method, target| async move {
        if method == "GET" && target == "/api/v1/policy/state" {
            (200, r#"{"status":"OK"}"#.to_string())
        } else {
            (404, "{}".to_string())
        }
    })
    .await;

    assert_eq!(client_for(addr).fetch_status().await.unwrap().status, Status::Allowed);
}

#[tokio::test]
async fn test_non_200_is_an_error() {
    let addr = common::start_programmable_backend(|_, _| async { (500, r#"{"status":"OK"}"#.to_string()) }).await;

    let err = client_for(addr).fetch_status().await.unwrap_err();
    assert!(matches!(err, FetchError::UnexpectedStatus(500)), "{err}");
}

#[tokio::test]
async fn test_malformed_body_is_an_error() {
    let addr = common::start_mock_authority("<html>oops</html>").await;

    let err = client_for(addr).fetch_status().await.unwrap_err();
    assert!(matches!(err, FetchError::Decode(_)), "{err}");
}

#[tokio::test]
async fn test_unknown_status_is_an_error() {
    let addr = common::start_mock_authority(r#"{"status":"GREEN"}"#).await;

    let err = client_for(addr).fetch_status().await.unwrap_err();
    assert!(matches!(err, FetchError::UnknownStatus(_)), "{err}");
}

#[tokio::test]
async fn test_unreachable_is_an_error() {
    let addr = common::unreachable_addr();

    let err = client_for(addr).fetch_status().await.unwrap_err();
    assert!(matches!(err, FetchError::Request(_)), "{err}");
}

#[tokio::test]
async fn test_slow_authority_times_out() {
    let addr = common::start_programmable_backend(|_, _| async {
        tokio::time::sleep(Duration::from_secs(3)).await;
        (200, r#"{"status":"OK"}"#.to_string())
    })
    .await;

    let endpoint = Url::parse(&format!("http://{}/state", addr)).unwrap();
    let http = reqwest::Client::builder()
        .no_proxy()
        .timeout(Duration::from_millis(200))
        .build()
        .unwrap();
    let client = RemoteStatusClient::with_http_client(endpoint, http);

    match client.fetch_status().await {
        Err(FetchError::Request(e)) => assert!(e.is_timeout()),
        other => panic!("expected timeout, got {:?}", other),
    }
}
