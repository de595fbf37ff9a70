//! Status-gate middleware.
//! Enforces the remote status on every wrapped route.

use axum::{
    extract::{Request, State},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;

use crate::observability::metrics;
use crate::status::{admit, Admission, Status, StatusStore};

/// Body returned when a request is rejected.
#[derive(Debug, Serialize)]
pub struct DenialBody {
    pub error: &'static str,
    pub state: Status,
}

/// Reads the store, evaluates the policy and either forwards the request
/// untouched or answers with a JSON denial.
pub async fn enforce_status(
    State(store): State<Arc<StatusStore>>,
    request: Request,
    next: Next,
) -> Response {
    let status = store.read();

    tracing::debug!(
        method = %request.method(),
        uri = %request.uri(),
        state = %status,
        "Checking status"
    );

    match admit(status, request.method()) {
        Admission::Allow => {
            metrics::record_decision(true, status);
            next.run(request).await
        }
        Admission::Deny(denial) => {
            tracing::warn!(
                method = %request.method(),
                uri = %request.uri(),
                state = %status,
                code = denial.code.as_u16(),
                "Request rejected by status gate"
            );
            metrics::record_decision(false, status);
            (
                denial.code,
                Json(DenialBody {
                    error: denial.message,
                    state: denial.status,
                }),
            )
                .into_response()
        }
    }
}

/// Wrap every route of `router` (fallback included) in the status gate.
pub fn protect(router: Router, store: Arc<StatusStore>) -> Router {
    router.layer(middleware::from_fn_with_state(store, enforce_status))
}
