//! Error types for Wayfinder.
//!
//! Two failure classes exist in the harness:
//!
//! | Class | Type | Delivered as |
//! |---|---|---|
//! | Resolvable (no match, selection or binding fault) | `anyhow::Error` from a capability | reason string inside an unresolved result |
//! | Fatal (registry not established, missing collaborator, unsupported kind) | [`LocatorError`], [`ConfigurationError`] | `Err` to the caller |
//!
//! Fatal errors mean the test environment itself is broken and are never
//! folded into a resolution result.

use thiserror::Error;

/// Result type alias for service locator lookups.
pub type LocatorResult<T> = Result<T, LocatorError>;

/// Errors raised by the [`ServiceLocator`](crate::ServiceLocator).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocatorError {
    /// A lookup was attempted before any service registry was established.
    #[error("service registry has not been established; configure the test application before resolving services")]
    RegistryNotInitialized,

    /// The registry is established but holds no binding for the requested type.
    #[error("no service registered for {type_name}")]
    ServiceMissing {
        /// The type name that could not be resolved.
        type_name: &'static str,
    },
}

impl LocatorError {
    /// Creates a missing-service error for `T`.
    pub fn missing<T: ?Sized>() -> Self {
        Self::ServiceMissing {
            type_name: std::any::type_name::<T>(),
        }
    }
}

/// Misconfiguration of the resolution environment.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// The selected handler descriptor is not controller-style.
    #[error("only controller actions are supported by route resolution; selected handler was '{display_name}'")]
    UnsupportedDescriptor {
        /// Display name of the rejected descriptor.
        display_name: String,
    },

    /// The invoker factory produced no invoker, or one without argument binding.
    #[error("route resolution requires the invoker factory to produce an argument-binding invoker for '{action}'")]
    UnsupportedInvoker {
        /// Display name of the action the invoker was requested for.
        action: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Selector;

    #[test]
    fn test_missing_service_names_type() {
        let err = LocatorError::missing::<Selector>();
        assert!(err.to_string().contains("Selector"));
    }

    #[test]
    fn test_missing_service_trait_object() {
        let err = LocatorError::missing::<dyn std::fmt::Debug + Send + Sync>();
        assert!(err.to_string().contains("Debug"));
    }

    #[test]
    fn test_registry_not_initialized_display() {
        let msg = LocatorError::RegistryNotInitialized.to_string();
        assert!(msg.contains("not been established"));
    }

    #[test]
    fn test_configuration_error_display() {
        let err = ConfigurationError::UnsupportedDescriptor {
            display_name: "GET /health".to_string(),
        };
        assert!(err.to_string().contains("only controller actions"));
        assert!(err.to_string().contains("GET /health"));

        let err = ConfigurationError::UnsupportedInvoker {
            action: "Users.Get".to_string(),
        };
        assert!(err.to_string().contains("Users.Get"));
    }
}
