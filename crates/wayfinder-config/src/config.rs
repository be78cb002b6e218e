//! Main configuration types.
//!
//! This module provides the top-level [`HarnessConfig`] struct and its builder.

use serde::{Deserialize, Serialize};
use wayfinder_telemetry::LogFormat;

use crate::{BindingConfig, LoggingConfig, RoutingConfig};

/// Complete harness configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load it from files and
/// environment variables.
///
/// # Example
///
/// ```
/// use wayfinder_config::HarnessConfig;
///
/// let config = HarnessConfig::default();
/// assert_eq!(config.binding.max_model_errors, 200);
/// assert!(!config.routing.case_sensitive);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct HarnessConfig {
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Route matching configuration.
    #[serde(default)]
    pub routing: RoutingConfig,

    /// Argument binding configuration.
    #[serde(default)]
    pub binding: BindingConfig,
}

impl HarnessConfig {
    /// Create a new configuration builder.
    ///
    /// # Example
    ///
    /// ```
    /// use wayfinder_config::{BindingConfig, HarnessConfig};
    ///
    /// let config = HarnessConfig::builder()
    ///     .binding(BindingConfig { max_model_errors: 5 })
    ///     .build();
    ///
    /// assert_eq!(config.binding.max_model_errors, 5);
    /// ```
    #[must_use]
    pub fn builder() -> HarnessConfigBuilder {
        HarnessConfigBuilder::new()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - logging is enabled with an empty level
    /// - `binding.max_model_errors` is zero
    pub fn validate(&self) -> Result<(), crate::ConfigError> {
        if self.logging.enabled && self.logging.level.trim().is_empty() {
            return Err(crate::ConfigError::invalid_value(
                "logging.level",
                "must not be empty when logging is enabled",
            ));
        }

        if self.binding.max_model_errors == 0 {
            return Err(crate::ConfigError::invalid_value(
                "binding.max_model_errors",
                "must be at least 1",
            ));
        }

        Ok(())
    }

    /// Preset for debugging a failing resolution: debug-level pretty logs.
    ///
    /// # Example
    ///
    /// ```
    /// use wayfinder_config::HarnessConfig;
    ///
    /// let config = HarnessConfig::verbose();
    /// assert_eq!(config.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn verbose() -> Self {
        Self {
            logging: LoggingConfig {
                level: "debug".to_string(),
                format: LogFormat::Pretty,
                ..LoggingConfig::default()
            },
            ..Self::default()
        }
    }

    /// Preset with logging disabled.
    #[must_use]
    pub fn quiet() -> Self {
        Self {
            logging: LoggingConfig {
                enabled: false,
                ..LoggingConfig::default()
            },
            ..Self::default()
        }
    }
}

/// Builder for [`HarnessConfig`].
#[derive(Debug, Default)]
pub struct HarnessConfigBuilder {
    logging: Option<LoggingConfig>,
    routing: Option<RoutingConfig>,
    binding: Option<BindingConfig>,
}

impl HarnessConfigBuilder {
    /// Create a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the logging section.
    #[must_use]
    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = Some(logging);
        self
    }

    /// Set the routing section.
    #[must_use]
    pub fn routing(mut self, routing: RoutingConfig) -> Self {
        self.routing = Some(routing);
        self
    }

    /// Set the binding section.
    #[must_use]
    pub fn binding(mut self, binding: BindingConfig) -> Self {
        self.binding = Some(binding);
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> HarnessConfig {
        HarnessConfig {
            logging: self.logging.unwrap_or_default(),
            routing: self.routing.unwrap_or_default(),
            binding: self.binding.unwrap_or_default(),
        }
    }

    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if validation fails.
    pub fn build_validated(self) -> Result<HarnessConfig, crate::ConfigError> {
        let config = self.build();
        config.validate()?;
        Ok(config)
    }
}
