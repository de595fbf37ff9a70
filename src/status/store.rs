//! Single-slot status cache.
//!
//! # Responsibilities
//! - Hold the last committed status (plus the authority's message)
//! - Serve unbounded concurrent readers without blocking
//! - Report the previous value on write for transition detection
//!
//! # Design Decisions
//! - `ArcSwap` snapshot: readers never see a torn value
//! - Defaults to HARD_LOCK until the first refresh commits

use arc_swap::ArcSwap;
use serde::Serialize;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::status::types::Status;

/// Everything known about the last committed status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusSnapshot {
    pub status: Status,
    /// Informational message from the authority, if any.
    pub message: Option<String>,
    /// Seconds since epoch of the commit, `None` before the first write.
    pub updated_at: Option<u64>,
}

/// Concurrency-safe holder of the current status.
#[derive(Debug)]
pub struct StatusStore {
    slot: ArcSwap<StatusSnapshot>,
}

impl StatusStore {
    /// Create a store holding `initial` until the first write.
    pub fn new(initial: Status) -> Self {
        Self {
            slot: ArcSwap::from_pointee(StatusSnapshot {
                status: initial,
                message: None,
                updated_at: None,
            }),
        }
    }

    /// Current status.
    pub fn read(&self) -> Status {
        self.slot.load().status
    }

    /// Current snapshot including message and commit time.
    pub fn snapshot(&self) -> StatusSnapshot {
        self.slot.load_full().as_ref().clone()
    }

    /// Replace the status, returning the previous one.
    pub fn write(&self, status: Status) -> Status {
        self.write_with_message(status, None)
    }

    /// Replace the status and message, returning the previous status.
    pub fn write_with_message(&self, status: Status, message: Option<String>) -> Status {
        let updated_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        let previous = self.slot.swap(Arc::new(StatusSnapshot {
            status,
            message,
            updated_at: Some(updated_at),
        }));
        previous.status
    }
}

impl Default for StatusStore {
    fn default() -> Self {
        Self::new(Status::most_restrictive())
    }
}
