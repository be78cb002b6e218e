//! Best-effort construction of concrete types.
//!
//! The harness never reflects over types. Construction strategies are
//! registered up front with a [`TypeActivator`] (or any other [`Activator`])
//! and looked up by `TypeId` when a test asks for an instance.

use crate::di::ServiceProvider;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Creates instances of registered types using services from a provider.
pub trait Activator: Send + Sync {
    /// Creates an instance of the type identified by `target`.
    ///
    /// The returned box must hold a value of exactly that type.
    fn create(
        &self,
        target: TypeId,
        type_name: &'static str,
        services: &ServiceProvider,
    ) -> anyhow::Result<Box<dyn Any + Send>>;
}

type Constructor =
    Arc<dyn Fn(&ServiceProvider) -> anyhow::Result<Box<dyn Any + Send>> + Send + Sync>;

/// Constructor registry keyed by type.
///
/// # Example
///
/// ```rust
/// use wayfinder_core::{Activator, TypeActivator};
/// use wayfinder_core::di::ServiceCollection;
/// use std::any::TypeId;
///
/// struct UsersController {
///     page_size: usize,
/// }
///
/// let activator = TypeActivator::new()
///     .register(|_services| Ok(UsersController { page_size: 20 }));
///
/// let provider = ServiceCollection::new().build();
/// let created = activator
///     .create(TypeId::of::<UsersController>(), "UsersController", &provider)
///     .unwrap();
/// assert_eq!(created.downcast::<UsersController>().unwrap().page_size, 20);
/// ```
#[derive(Default, Clone)]
pub struct TypeActivator {
    constructors: HashMap<TypeId, Constructor>,
}

impl TypeActivator {
    /// Creates an activator with no constructors.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the constructor for `T`, replacing any previous one.
    #[must_use]
    pub fn register<T, F>(mut self, constructor: F) -> Self
    where
        T: Send + 'static,
        F: Fn(&ServiceProvider) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        let erased: Constructor = Arc::new(move |services| {
            constructor(services).map(|value| Box::new(value) as Box<dyn Any + Send>)
        });
        self.constructors.insert(TypeId::of::<T>(), erased);
        self
    }

    /// Checks if a constructor for `T` is registered.
    #[must_use]
    pub fn contains<T: 'static>(&self) -> bool {
        self.constructors.contains_key(&TypeId::of::<T>())
    }
}

impl Activator for TypeActivator {
    fn create(
        &self,
        target: TypeId,
        type_name: &'static str,
        services: &ServiceProvider,
    ) -> anyhow::Result<Box<dyn Any + Send>> {
        let constructor = self
            .constructors
            .get(&target)
            .ok_or_else(|| anyhow::anyhow!("no constructor registered for {type_name}"))?;
        constructor(services)
    }
}

impl fmt::Debug for TypeActivator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeActivator")
            .field("constructor_count", &self.constructors.len())
            .finish()
    }
}
