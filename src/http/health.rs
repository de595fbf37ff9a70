//! Health route.
//!
//! Always answers 200 with the current status, even under HARD_LOCK, so
//! liveness probes are never blocked by the gate they observe.

use axum::{extract::State, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::status::{Status, StatusStore};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthReport {
    pub status: String,
    pub state: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

pub async fn health_handler(State(store): State<Arc<StatusStore>>) -> Json<HealthReport> {
    let snapshot = store.snapshot();
    Json(HealthReport {
        status: "healthy".to_string(),
        state: snapshot.status,
        message: snapshot.message,
    })
}

/// Router serving only the health route at `path`. Merge it next to, not
/// inside, a router wrapped with `protect`.
pub fn health_router(path: &str, store: Arc<StatusStore>) -> Router {
    Router::new().route(path, get(health_handler)).with_state(store)
}
