//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router: health route + gated forwarding handler
//! - Wire up middleware (request ID, trace, timeout)
//! - Forward admitted requests to the protected upstream
//! - Serve until the shutdown signal fires

use axum::{
    body::Body,
    extract::{Request, State},
    http::{
        uri::{Authority, PathAndQuery, Scheme},
        StatusCode, Uri, Version,
    },
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{check_health_path, ConfigError, GateConfig, ValidationError};
use crate::http::health::health_router;
use crate::http::middleware::protect;
use crate::http::request::UuidRequestId;
use crate::status::StatusStore;

/// State for the forwarding handler.
#[derive(Clone)]
pub struct ProxyState {
    pub client: Client<HttpConnector, Body>,
    pub upstream: Authority,
}

/// HTTP server fronting the upstream with the status gate.
pub struct HttpServer {
    router: Router,
    config: GateConfig,
}

impl HttpServer {
    /// Create a server reading enforcement decisions from `store`.
    pub fn new(config: GateConfig, store: Arc<StatusStore>) -> Result<Self, ConfigError> {
        check_health_path(&config.listener.health_path)?;
        let upstream = Authority::from_str(&config.upstream.address)
            .map_err(|_| ValidationError::UpstreamAddress(config.upstream.address.clone()))?;

        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        let state = ProxyState { client, upstream };
        let router = Self::build_router(&config, state, store);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GateConfig, state: ProxyState, store: Arc<StatusStore>) -> Router {
        let forward = Router::new()
            .route("/", any(proxy_handler))
            .route("/{*path}", any(proxy_handler))
            .with_state(state);

        protect(forward, store.clone())
            .merge(health_router(&config.listener.health_path, store))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    /// The fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener, mut shutdown: broadcast::Receiver<()>) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.address,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }
}

/// Forward an admitted request to the upstream and relay its response.
async fn proxy_handler(State(state): State<ProxyState>, request: Request) -> Response {
    let (mut parts, body) = request.into_parts();

    let mut uri_parts = parts.uri.clone().into_parts();
    uri_parts.scheme = Some(Scheme::HTTP);
    uri_parts.authority = Some(state.upstream.clone());
    if uri_parts.path_and_query.is_none() {
        uri_parts.path_and_query = Some(PathAndQuery::from_static("/"));
    }
    parts.uri = match Uri::from_parts(uri_parts) {
        Ok(uri) => uri,
        Err(e) => {
            tracing::warn!(error = %e, "Could not rewrite request URI");
            return (StatusCode::BAD_REQUEST, "Invalid request URI").into_response();
        }
    };
    parts.version = Version::HTTP_11;

    let method = parts.method.clone();
    let uri = parts.uri.clone();

    match state.client.request(Request::from_parts(parts, body)).await {
        Ok(response) => {
            let (parts, body) = response.into_parts();
            Response::from_parts(parts, Body::new(body))
        }
        Err(e) => {
            tracing::error!(method = %method, uri = %uri, error = %e, "Upstream error");
            (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
        }
    }
}
