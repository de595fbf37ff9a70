//! Admission policy.
//!
//! Pure mapping from (status, method) to allow/deny. Independent of any
//! router; the axum adapter lives in `http::middleware`.

use axum::http::{Method, StatusCode};

use crate::status::types::Status;

/// Methods that never mutate state on the protected service.
fn is_read_only(method: &Method) -> bool {
    *method == Method::GET || *method == Method::HEAD || *method == Method::OPTIONS
}

/// Whether a request with `method` may proceed under `status`.
///
/// Extension methods are treated as mutating.
pub fn is_allowed(status: Status, method: &Method) -> bool {
    match status {
        Status::Allowed => true,
        Status::ReadOnly => is_read_only(method),
        Status::Blocked => false,
    }
}

/// Why a request was rejected and how to report it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Denial {
    pub status: Status,
    pub code: StatusCode,
    pub message: &'static str,
}

/// Outcome of evaluating the policy for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    Allow,
    Deny(Denial),
}

/// Evaluate the policy and, on rejection, pick the response code.
///
/// A read-only rejection is the caller's doing (403); a hard lock is global
/// and not request-specific (503).
pub fn admit(status: Status, method: &Method) -> Admission {
    match status {
        Status::Allowed => Admission::Allow,
        Status::ReadOnly if is_read_only(method) => Admission::Allow,
        Status::ReadOnly => Admission::Deny(Denial {
            status,
            code: StatusCode::FORBIDDEN,
            message: "Service is in SOFT_LOCK mode. Only read operations are allowed.",
        }),
        Status::Blocked => Admission::Deny(Denial {
            status,
            code: StatusCode::SERVICE_UNAVAILABLE,
            message: "Service is in HARD_LOCK mode. All operations are blocked.",
        }),
    }
}
