//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Start status gate (one fetch) → Start listener
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Stop refresh task → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - The listener starts only after the first status fetch has committed
//! - Long-running tasks subscribe to a shared broadcast channel

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
pub use signals::wait_for_signal;
