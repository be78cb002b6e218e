//! Errors that abort a test instead of being asserted against.

use thiserror::Error;
use wayfinder_config::ConfigError;
use wayfinder_core::{ConfigurationError, LocatorError};
use wayfinder_router::TemplateError;

/// A fatal failure of [`resolve`](crate::resolve).
///
/// These mean the test environment is misconfigured. Resolvable outcomes
/// (no match, selection or binding faults) are returned as
/// [`ResolvedRoute::Unresolved`](crate::ResolvedRoute::Unresolved) instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The registry was not established, or a required capability is missing.
    #[error(transparent)]
    Locator(#[from] LocatorError),

    /// The selected handler or produced invoker is of an unsupported kind.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

/// Errors building a [`TestApplication`](crate::TestApplication).
#[derive(Debug, Error)]
pub enum HarnessError {
    /// The harness configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A route template did not parse.
    #[error(transparent)]
    Template(#[from] TemplateError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_error_is_transparent() {
        let err: ResolveError = LocatorError::RegistryNotInitialized.into();
        assert_eq!(err.to_string(), LocatorError::RegistryNotInitialized.to_string());

        let err: ResolveError = ConfigurationError::UnsupportedDescriptor {
            display_name: "GET /health".to_string(),
        }
        .into();
        assert!(err.to_string().contains("only controller actions"));
    }

    #[test]
    fn test_harness_error_from_template() {
        let err: HarnessError = TemplateError::EmptyParameterName {
            template: "{}".to_string(),
        }
        .into();
        assert!(matches!(err, HarnessError::Template(_)));
    }
}
