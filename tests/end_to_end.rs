//! End-to-end: mock authority → status gate → gateway → mock upstream.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use state_gate::config::GateConfig;
use state_gate::http::HttpServer;
use state_gate::lifecycle::Shutdown;
use state_gate::status::{RemoteStatusClient, Status, StatusGate};

mod common;

struct Harness {
    gate: StatusGate,
    gateway: SocketAddr,
    shutdown: Shutdown,
}

impl Harness {
    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.gateway, path)
    }
}

async fn start_gateway(authority: SocketAddr, upstream: SocketAddr, schedule: &str) -> Harness {
    let mut config = GateConfig::default();
    config.authority.endpoint = Some(format!("http://{}/api/v1/policy/state", authority));
    config.authority.schedule = schedule.to_string();
    config.authority.timeout_secs = 2;
    config.upstream.address = upstream.to_string();
    config.observability.metrics_enabled = false;

    let client = RemoteStatusClient::with_http_client(
        config.authority.endpoint_url().unwrap(),
        common::test_client(),
    );
    let gate = StatusGate::with_client(&config.authority, client).unwrap();
    gate.start().await.unwrap();

    let server = HttpServer::new(config, gate.store()).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let gateway = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    Harness { gate, gateway, shutdown }
}

/// Upstream that echoes method and path and counts hits.
async fn start_upstream(hits: Arc<AtomicUsize>) -> SocketAddr {
    common::start_programmable_backend(move |method, target| {
        let hits = hits.clone();
        async move {
            hits.fetch_add(1, Ordering::SeqCst);
            let status = if method == "POST" { 201 } else { 200 };
            (status, format!(r#"{{"method":"{}","path":"{}"}}"#, method, target))
        }
    })
    .await
}

#[tokio::test]
async fn test_ok_forwards_writes_unmodified() {
    let authority = common::start_mock_authority(r#"{"status":"OK"}"#).await;
    let hits = Arc::new(AtomicUsize::new(0));
    let upstream = start_upstream(hits.clone()).await;
    let h = start_gateway(authority, upstream, "@every 1h").await;

    assert_eq!(h.gate.current_status(), Status::Allowed);

    let client = common::test_client();
    let res = client.post(h.url("/orders?id=7")).body("{}").send().await.unwrap();
    assert_eq!(res.status(), 201);
    assert!(res.headers().contains_key("x-request-id"));
    assert_eq!(res.text().await.unwrap(), r#"{"method":"POST","path":"/orders?id=7"}"#);
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    h.shutdown.trigger();
    h.gate.stop().await;
}

#[tokio::test]
async fn test_soft_lock_allows_reads_only() {
    let authority = common::start_mock_authority(r#"{"status":"SOFT_LOCK"}"#).await;
    let hits = Arc::new(AtomicUsize::new(0));
    let upstream = start_upstream(hits.clone()).await;
    let h = start_gateway(authority, upstream, "@every 1h").await;

    let client = common::test_client();
    let res = client.get(h.url("/orders")).send().await.unwrap();
    assert_eq!(res.status(), 200);

    let res = client.post(h.url("/orders")).body("{}").send().await.unwrap();
    assert_eq!(res.status(), 403);
    let body = res.text().await.unwrap();
    assert!(body.contains(r#""state":"SOFT_LOCK""#), "{body}");
    assert!(body.contains(r#""error":"#), "{body}");

    assert_eq!(hits.load(Ordering::SeqCst), 1);

    h.shutdown.trigger();
    h.gate.stop().await;
}

#[tokio::test]
async fn test_unreachable_authority_blocks_everything() {
    let hits = Arc::new(AtomicUsize::new(0));
    let upstream = start_upstream(hits.clone()).await;
    let h = start_gateway(common::unreachable_addr(), upstream, "@every 1h").await;

    assert_eq!(h.gate.current_status(), Status::Blocked);

    let client = common::test_client();
    let res = client.get(h.url("/orders")).send().await.unwrap();
    assert_eq!(res.status(), 503);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["state"], "HARD_LOCK");

    let res = client.get(h.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), 200);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["state"], "HARD_LOCK");

    assert_eq!(hits.load(Ordering::SeqCst), 0);

    h.shutdown.trigger();
    h.gate.stop().await;
}

#[tokio::test]
async fn test_authority_outage_fails_closed() {
    let healthy = Arc::new(AtomicBool::new(true));
    let flag = healthy.clone();
    let authority = common::start_programmable_backend(move |_, _| {
        let flag = flag.clone();
        async move {
            if flag.load(Ordering::SeqCst) {
                (200, r#"{"status":"OK","message":"all good"}"#.to_string())
            } else {
                (503, "{}".to_string())
            }
        }
    })
    .await;
    let hits = Arc::new(AtomicUsize::new(0));
    let upstream = start_upstream(hits.clone()).await;
    let h = start_gateway(authority, upstream, "@every 100ms").await;

    let client = common::test_client();
    let res = client.get(h.url("/health")).send().await.unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["state"], "OK");
    assert_eq!(body["message"], "all good");

    assert_eq!(client.delete(h.url("/orders/1")).send().await.unwrap().status(), 200);

    healthy.store(false, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(500)).await;

    assert_eq!(h.gate.current_status(), Status::Blocked);
    assert_eq!(client.delete(h.url("/orders/1")).send().await.unwrap().status(), 503);
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    h.shutdown.trigger();
    h.gate.stop().await;
}

#[tokio::test]
async fn test_no_fetches_after_stop() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let authority = common::start_programmable_backend(move |_, _| {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            (200, r#"{"status":"OK"}"#.to_string())
        }
    })
    .await;
    let upstream = start_upstream(Arc::new(AtomicUsize::new(0))).await;
    let h = start_gateway(authority, upstream, "@every 50ms").await;

    assert!(calls.load(Ordering::SeqCst) >= 1);
    assert!(h.gate.is_running().await);
    tokio::time::sleep(Duration::from_millis(200)).await;

    h.gate.stop().await;
    h.gate.stop().await;
    assert!(!h.gate.is_running().await);

    let after_stop = calls.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(250)).await;
    assert_eq!(calls.load(Ordering::SeqCst), after_stop);

    h.shutdown.trigger();
}
