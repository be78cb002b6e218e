//! Structured logging for Wayfinder.
//!
//! Resolution emits `tracing` spans and events; this crate installs a
//! `tracing-subscriber` registry to render them as JSON, pretty or compact
//! text, filtered with an [`EnvFilter`](tracing_subscriber::EnvFilter).
//!
//! # Example
//!
//! ```rust
//! use wayfinder_telemetry::{init_logging, LogConfig, LogFormat};
//!
//! let config = LogConfig {
//!     level: "wayfinder=debug".to_string(),
//!     format: LogFormat::Compact,
//!     ..LogConfig::default()
//! };
//!
//! // A second call in the same process reports `LoggingInit`.
//! let _ = init_logging(&config);
//! tracing::debug!(request_id = "r-1", "resolving");
//! ```

#![doc(html_root_url = "https://docs.rs/wayfinder-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, init_logging, LogConfig, LogFormat};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
