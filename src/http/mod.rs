//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, trace, timeout)
//!     → health.rs (health route, never gated)
//!     → middleware.rs (status gate: read store, allow or deny)
//!     → server.rs (forward admitted request to upstream)
//!     → Send to client
//! ```

pub mod health;
pub mod middleware;
pub mod request;
pub mod server;

pub use health::{health_handler, health_router, HealthReport};
pub use middleware::{enforce_status, protect, DenialBody};
pub use request::{UuidRequestId, X_REQUEST_ID};
pub use server::HttpServer;
