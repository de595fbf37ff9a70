//! Status values, wire payloads and error definitions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Tri-state access-control flag published by the remote authority.
///
/// Variants are declared in order of restrictiveness, so the derived `Ord`
/// gives `Allowed < ReadOnly < Blocked`.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Status {
    /// All operations are allowed.
    #[serde(rename = "OK")]
    Allowed = 0,
    /// Only read operations (GET, HEAD, OPTIONS) are allowed.
    #[serde(rename = "SOFT_LOCK")]
    ReadOnly = 1,
    /// Every operation is rejected.
    #[serde(rename = "HARD_LOCK")]
    Blocked = 2,
}

impl Status {
    /// Wire name used by the authority and in responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Allowed => "OK",
            Status::ReadOnly => "SOFT_LOCK",
            Status::Blocked => "HARD_LOCK",
        }
    }

    /// The most restrictive variant, used whenever the current state is unknown.
    pub const fn most_restrictive() -> Self {
        Status::Blocked
    }
}

impl Default for Status {
    fn default() -> Self {
        Status::most_restrictive()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A status string outside the three recognized wire names.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown status value: {0:?}")]
pub struct UnknownStatusValue(pub String);

impl FromStr for Status {
    type Err = UnknownStatusValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OK" => Ok(Status::Allowed),
            "SOFT_LOCK" => Ok(Status::ReadOnly),
            "HARD_LOCK" => Ok(Status::Blocked),
            other => Err(UnknownStatusValue(other.to_string())),
        }
    }
}

/// Decoded response from the remote status endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteStatusResponse {
    pub status: Status,
    /// Informational only, never affects enforcement.
    pub message: Option<String>,
}

/// Raw body as sent by the authority. Both source services name the status
/// field differently, so all known names are accepted.
#[derive(Debug, Deserialize)]
struct WirePayload {
    #[serde(alias = "license_status", alias = "state")]
    status: String,
    #[serde(default)]
    message: Option<String>,
}

impl RemoteStatusResponse {
    /// Decode a response body. Unknown status values are an error, not a default.
    pub fn from_json(body: &[u8]) -> Result<Self, FetchError> {
        let payload: WirePayload = serde_json::from_slice(body).map_err(FetchError::Decode)?;
        let status = payload.status.parse()?;
        Ok(Self {
            status,
            message: payload.message.filter(|m| !m.is_empty()),
        })
    }
}

/// Errors from a single fetch against the remote authority.
///
/// These never reach request handlers; the scheduler absorbs them and
/// commits `Status::Blocked`.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection failure, timeout or other transport error.
    #[error("request to status endpoint failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The fetch did not finish within the scheduler's deadline.
    #[error("status fetch timed out after {0:?}")]
    Timeout(Duration),

    /// The endpoint answered with something other than 200.
    #[error("unexpected status code: {0}")]
    UnexpectedStatus(u16),

    /// The body was not the expected JSON shape.
    #[error("failed to decode response: {0}")]
    Decode(#[source] serde_json::Error),

    /// The status field held an unrecognized value.
    #[error(transparent)]
    UnknownStatus(#[from] UnknownStatusValue),
}
