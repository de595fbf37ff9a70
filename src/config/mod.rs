//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks, endpoint resolution)
//!     → schedule.rs (schedule expression → fixed period or cron schedule)
//!     → GateConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Every config problem surfaces before the scheduler starts

pub mod loader;
pub mod schedule;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schedule::{parse_duration, parse_schedule, RefreshSchedule};
pub use schema::{AuthorityConfig, GateConfig, ListenerConfig, LogFormat, ObservabilityConfig, UpstreamConfig};
pub use validation::{check_health_path, validate_config, ValidationError};
