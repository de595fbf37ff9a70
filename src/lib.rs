//! Status gate library.
//!
//! Gates HTTP request handling on a tri-state flag (OK / SOFT_LOCK /
//! HARD_LOCK) that is periodically synchronized from a remote authority.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod status;

pub use config::schema::GateConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use status::{Status, StatusGate, StatusStore};
