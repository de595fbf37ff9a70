//! Remote status synchronization subsystem.
//!
//! # Data Flow
//! ```text
//! Remote authority (GET <endpoint>)
//!     → client.rs (fetch + decode, bounded timeout)
//!     → scheduler.rs (immediate + periodic refresh, fail-secure on error)
//!     → store.rs (single-slot, lock-free reads)
//!     → policy.rs (status × method → allow/deny)
//!     → http::middleware (short-circuit denied requests)
//! ```
//!
//! # Design Decisions
//! - Exactly one writer (the scheduler), any number of readers
//! - Fail closed: unreachable authority or unknown value means HARD_LOCK
//! - Request handlers never touch the network
//! - No globals: the store is injected as `Arc<StatusStore>`

pub mod client;
pub mod gate;
pub mod policy;
pub mod scheduler;
pub mod store;
pub mod types;

pub use client::{RemoteStatusClient, StatusSource};
pub use gate::StatusGate;
pub use policy::{admit, is_allowed, Admission, Denial};
pub use scheduler::{ChangeCallback, RefreshScheduler, SchedulerError, SchedulerState};
pub use store::{StatusSnapshot, StatusStore};
pub use types::{FetchError, RemoteStatusResponse, Status, UnknownStatusValue};
