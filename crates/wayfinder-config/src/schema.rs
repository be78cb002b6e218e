//! Configuration section types.

use serde::{Deserialize, Serialize};
use wayfinder_telemetry::{LogConfig, LogFormat};

fn default_true() -> bool {
    true
}

fn default_level() -> String {
    "warn".to_string()
}

fn default_max_model_errors() -> usize {
    200
}

/// Logging section.
///
/// # Example
///
/// ```
/// use wayfinder_config::LoggingConfig;
///
/// let logging = LoggingConfig::default();
/// assert_eq!(logging.level, "warn");
/// assert!(logging.to_log_config().test_writer);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Filter directives.
    #[serde(default = "default_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include the event target (module path).
    #[serde(default = "default_true")]
    pub include_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_level(),
            format: LogFormat::default(),
            include_target: true,
        }
    }
}

impl LoggingConfig {
    /// Converts to a subscriber configuration writing through the test capture.
    #[must_use]
    pub fn to_log_config(&self) -> LogConfig {
        LogConfig {
            enabled: self.enabled,
            level: self.level.clone(),
            format: self.format,
            include_target: self.include_target,
            test_writer: true,
            ..LogConfig::default()
        }
    }
}

/// Routing section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoutingConfig {
    /// Compare literal path segments case-sensitively.
    #[serde(default)]
    pub case_sensitive: bool,

    /// Percent-decode path segments before matching.
    #[serde(default = "default_true")]
    pub decode_values: bool,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            case_sensitive: false,
            decode_values: true,
        }
    }
}

/// Argument-binding section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BindingConfig {
    /// Cap on model-state errors recorded per invocation.
    #[serde(default = "default_max_model_errors")]
    pub max_model_errors: usize,
}

impl Default for BindingConfig {
    fn default() -> Self {
        Self {
            max_model_errors: default_max_model_errors(),
        }
    }
}
