//! Typed configuration for the Wayfinder harness.
//!
//! - TOML and JSON configuration files
//! - Environment variable overrides (`WAYFINDER__SECTION__KEY`)
//! - Strict validation (fails on unknown fields)
//! - Layered configuration (defaults → file → env)
//!
//! # Example
//!
//! ```no_run
//! use wayfinder_config::{ConfigLoader, DEFAULT_ENV_PREFIX};
//!
//! # fn main() -> Result<(), wayfinder_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_dotenv()?
//!     .with_optional_file("wayfinder.toml")?
//!     .with_env_prefix(DEFAULT_ENV_PREFIX)
//!     .load()?;
//!
//! println!("model error cap: {}", config.binding.max_model_errors);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [logging]
//! enabled = true
//! level = "warn,wayfinder=debug"
//! format = "compact"
//! include_target = true
//!
//! [routing]
//! case_sensitive = false
//! decode_values = true
//!
//! [binding]
//! max_model_errors = 200
//! ```

#![doc(html_root_url = "https://docs.rs/wayfinder-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::{HarnessConfig, HarnessConfigBuilder};
pub use error::ConfigError;
pub use loader::{ConfigLoader, DEFAULT_ENV_PREFIX};
pub use schema::{BindingConfig, LoggingConfig, RoutingConfig};
pub use wayfinder_telemetry::LogFormat;
