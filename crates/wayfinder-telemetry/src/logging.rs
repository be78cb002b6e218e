//! Structured logging for Wayfinder.
//!
//! # Features
//!
//! - JSON, pretty or compact output
//! - `EnvFilter` directives (`"info"`, `"wayfinder=debug,warn"`)
//! - Optional capture through the libtest writer so logs appear only for
//!   failing tests
//!
//! # Example
//!
//! ```rust,ignore
//! use wayfinder_telemetry::logging::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::test())?;
//! tracing::debug!(http.path = "/users/5", "resolving route");
//! ```

use serde::{Deserialize, Serialize};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::error::TelemetryError;
use crate::TelemetryResult;

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per event.
    Json,
    /// Multi-line, human-readable.
    Pretty,
    /// Single-line, human-readable.
    #[default]
    Compact,
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Whether logging is enabled.
    pub enabled: bool,

    /// Filter directives (e.g., "info", "wayfinder=debug").
    pub level: String,

    /// Output format.
    pub format: LogFormat,

    /// Whether to include span events (new, close).
    pub span_events: bool,

    /// Whether to include file/line info.
    pub file_line_info: bool,

    /// Whether to include thread IDs.
    pub thread_ids: bool,

    /// Whether to include target (module path).
    pub include_target: bool,

    /// Write through the libtest capture instead of straight to stdout.
    pub test_writer: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            format: LogFormat::Compact,
            span_events: false,
            file_line_info: false,
            thread_ids: false,
            include_target: true,
            test_writer: false,
        }
    }
}

impl LogConfig {
    /// Configuration for test runs: debug level for wayfinder crates,
    /// captured by the test harness.
    #[must_use]
    pub fn test() -> Self {
        Self {
            level: "warn,wayfinder=debug".to_string(),
            test_writer: true,
            ..Self::default()
        }
    }

    /// Configuration for machine-readable output in CI.
    #[must_use]
    pub fn json() -> Self {
        Self {
            format: LogFormat::Json,
            ..Self::default()
        }
    }

    /// Configuration for local debugging with span timings.
    #[must_use]
    pub fn development() -> Self {
        Self {
            level: "debug".to_string(),
            format: LogFormat::Pretty,
            span_events: true,
            file_line_info: true,
            ..Self::default()
        }
    }
}

/// Initializes the global logging subscriber.
///
/// Does nothing when `config.enabled` is false.
///
/// # Errors
///
/// Returns `TelemetryError::LoggingInit` if the filter is invalid or a global
/// subscriber is already installed.
pub fn init_logging(config: &LogConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let filter = create_env_filter(&config.level)?;

    let span_events = if config.span_events {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let base = tracing_subscriber::fmt::layer()
        .with_span_events(span_events)
        .with_file(config.file_line_info)
        .with_line_number(config.file_line_info)
        .with_thread_ids(config.thread_ids)
        .with_target(config.include_target);

    let layer = match (config.format, config.test_writer) {
        (LogFormat::Json, false) => base.json().with_filter(filter).boxed(),
        (LogFormat::Json, true) => base.json().with_test_writer().with_filter(filter).boxed(),
        (LogFormat::Pretty, false) => base.pretty().with_filter(filter).boxed(),
        (LogFormat::Pretty, true) => base.pretty().with_test_writer().with_filter(filter).boxed(),
        (LogFormat::Compact, false) => base.compact().with_filter(filter).boxed(),
        (LogFormat::Compact, true) => base
            .compact()
            .with_test_writer()
            .with_filter(filter)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(layer)
        .try_init()
        .map_err(|e| TelemetryError::LoggingInit(e.to_string()))
}

/// Creates an env filter from a directive string.
///
/// # Errors
///
/// Returns `TelemetryError::InvalidConfig` for an empty string and
/// `TelemetryError::LoggingInit` if the directives do not parse.
pub fn create_env_filter(filter: &str) -> TelemetryResult<EnvFilter> {
    if filter.trim().is_empty() {
        return Err(TelemetryError::InvalidConfig(
            "log level must not be empty".to_string(),
        ));
    }
    EnvFilter::try_new(filter)
        .map_err(|e| TelemetryError::LoggingInit(format!("Invalid log level: {e}")))
}
