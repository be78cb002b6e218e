//! Typed access to the service registry.
//!
//! The [`ServiceLocator`] is the single gate through which the harness reaches
//! its collaborators. It is an explicitly owned value: resolution code takes
//! `&ServiceLocator` and never reaches for a process-wide instance. Only the
//! outermost fixture may use [`ServiceLocator::global`].
//!
//! | Operation | Uninitialized | Missing binding |
//! |---|---|---|
//! | [`require_service`](ServiceLocator::require_service) | `Err(RegistryNotInitialized)` | `Err(ServiceMissing)` |
//! | [`get_service`](ServiceLocator::get_service) | `Err(RegistryNotInitialized)` | `Ok(None)` |
//! | [`get_services`](ServiceLocator::get_services) | `Err(RegistryNotInitialized)` | `Ok(vec![])` |
//! | [`try_get_service`](ServiceLocator::try_get_service) | `None` | `None` |
//! | [`try_create_instance`](ServiceLocator::try_create_instance) | `None` | `None` |

use crate::activator::Activator;
use crate::di::ServiceProvider;
use crate::error::{LocatorError, LocatorResult};
use parking_lot::RwLock;
use std::any::TypeId;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, OnceLock};

/// Lazily established, replaceable handle to a [`ServiceProvider`].
///
/// Replacing the provider is expected only between test groups, never while
/// a resolution is in flight.
///
/// # Example
///
/// ```rust
/// use wayfinder_core::{LocatorError, ServiceLocator};
/// use wayfinder_core::di::ServiceCollection;
/// use std::sync::Arc;
///
/// #[derive(Debug)]
/// struct Settings;
///
/// let locator = ServiceLocator::new();
/// assert_eq!(
///     locator.require_service::<Settings>().unwrap_err(),
///     LocatorError::RegistryNotInitialized
/// );
///
/// let mut services = ServiceCollection::new();
/// services.add_instance(Arc::new(Settings));
/// locator.establish(services.build());
///
/// assert!(locator.require_service::<Settings>().is_ok());
/// ```
#[derive(Debug, Default)]
pub struct ServiceLocator {
    provider: RwLock<Option<Arc<ServiceProvider>>>,
}

impl ServiceLocator {
    /// Creates a locator with no registry established.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a locator already established with `provider`.
    #[must_use]
    pub fn with_provider(provider: ServiceProvider) -> Self {
        let locator = Self::new();
        locator.establish(provider);
        locator
    }

    /// Process-lifetime locator for the outermost test-fixture boundary.
    pub fn global() -> &'static Self {
        static GLOBAL: OnceLock<ServiceLocator> = OnceLock::new();
        GLOBAL.get_or_init(Self::new)
    }

    /// Establishes (or replaces) the registry and returns the shared provider.
    pub fn establish(&self, provider: ServiceProvider) -> Arc<ServiceProvider> {
        self.establish_shared(Arc::new(provider))
    }

    /// Establishes (or replaces) the registry with an already-shared provider.
    pub fn establish_shared(&self, provider: Arc<ServiceProvider>) -> Arc<ServiceProvider> {
        let previous = self.provider.write().replace(Arc::clone(&provider));
        tracing::debug!(
            replaced = previous.is_some(),
            service_count = provider.len(),
            "service registry established"
        );
        provider
    }

    /// Drops the registry, returning the locator to its uninitialized state.
    pub fn reset(&self) {
        self.provider.write().take();
    }

    /// Returns `true` once a registry has been established.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.provider.read().is_some()
    }

    /// Returns the established provider.
    pub fn provider(&self) -> LocatorResult<Arc<ServiceProvider>> {
        self.provider
            .read()
            .clone()
            .ok_or(LocatorError::RegistryNotInitialized)
    }

    /// Returns the binding for `T`, failing if it is absent.
    pub fn require_service<T>(&self) -> LocatorResult<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.get_service::<T>()?.ok_or_else(LocatorError::missing::<T>)
    }

    /// Returns the binding for `T`, or `None` if it is absent.
    pub fn get_service<T>(&self) -> LocatorResult<Option<Arc<T>>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        Ok(self.provider()?.get::<T>())
    }

    /// Returns every binding for `T` in registration order.
    pub fn get_services<T>(&self) -> LocatorResult<Vec<Arc<T>>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        Ok(self.provider()?.get_all::<T>())
    }

    /// Returns the binding for `T`; never fails.
    #[must_use]
    pub fn try_get_service<T>(&self) -> Option<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.provider.read().as_ref().and_then(|p| p.get::<T>())
    }

    /// Attempts to construct `T` through the registered [`Activator`].
    ///
    /// Every failure, including a panicking constructor, yields `None`.
    #[must_use]
    pub fn try_create_instance<T: Send + 'static>(&self) -> Option<T> {
        let type_name = std::any::type_name::<T>();
        let attempt = std::panic::catch_unwind(AssertUnwindSafe(|| -> anyhow::Result<T> {
            let provider = self.provider()?;
            let activator = self.require_service::<dyn Activator>()?;
            let created = activator.create(TypeId::of::<T>(), type_name, &provider)?;
            created
                .downcast::<T>()
                .map(|boxed| *boxed)
                .map_err(|_| anyhow::anyhow!("activator produced a different type for {type_name}"))
        }));

        match attempt {
            Ok(Ok(instance)) => Some(instance),
            Ok(Err(error)) => {
                tracing::debug!(type_name, error = %error, "instance creation failed");
                None
            }
            Err(_) => {
                tracing::debug!(type_name, "instance constructor panicked");
                None
            }
        }
    }
}
