//! Service registry.
//!
//! Services are registered into a [`ServiceCollection`] while a test fixture is
//! configured, then frozen into an immutable [`ServiceProvider`]. Bindings are
//! keyed by type, so capability traits are registered as trait objects:
//!
//! ```rust
//! use wayfinder_core::di::ServiceCollection;
//! use std::sync::Arc;
//!
//! trait Clock: Send + Sync {
//!     fn now(&self) -> u64;
//! }
//!
//! struct FixedClock(u64);
//!
//! impl Clock for FixedClock {
//!     fn now(&self) -> u64 {
//!         self.0
//!     }
//! }
//!
//! let mut services = ServiceCollection::new();
//! services.add_instance::<dyn Clock>(Arc::new(FixedClock(42)));
//!
//! let provider = services.build();
//! let clock = provider.get::<dyn Clock>().unwrap();
//! assert_eq!(clock.now(), 42);
//! ```

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

type Factory<T> = Arc<dyn Fn(&ServiceProvider) -> Arc<T> + Send + Sync>;

/// A single registration. The payload is an `Arc<T>` or a `Factory<T>`
/// erased behind `Any`, so `T` may be unsized.
enum Binding {
    Instance(Box<dyn Any + Send + Sync>),
    Factory(Box<dyn Any + Send + Sync>),
}

impl Binding {
    fn resolve<T: ?Sized + Send + Sync + 'static>(
        &self,
        provider: &ServiceProvider,
    ) -> Option<Arc<T>> {
        match self {
            Self::Instance(any) => any.downcast_ref::<Arc<T>>().cloned(),
            Self::Factory(any) => any
                .downcast_ref::<Factory<T>>()
                .map(|factory| factory(provider)),
        }
    }
}

/// Mutable set of service bindings used while configuring a fixture.
///
/// Registering the same type more than once keeps every binding in order:
/// single lookups return the last one, [`ServiceProvider::get_all`] returns
/// all of them.
#[derive(Default)]
pub struct ServiceCollection {
    bindings: HashMap<TypeId, Vec<Binding>>,
    type_names: HashMap<TypeId, &'static str>,
}

impl ServiceCollection {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a shared instance of `T`.
    pub fn add_instance<T>(&mut self, service: Arc<T>) -> &mut Self
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.push::<T>(Binding::Instance(Box::new(service)));
        self
    }

    /// Registers a transient factory for `T`, invoked on every lookup.
    pub fn add_factory<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&ServiceProvider) -> Arc<T> + Send + Sync + 'static,
    {
        let factory: Factory<T> = Arc::new(factory);
        self.push::<T>(Binding::Factory(Box::new(factory)));
        self
    }

    /// Registers an instance only if `T` has no binding yet.
    pub fn try_add_instance<T>(&mut self, service: Arc<T>) -> &mut Self
    where
        T: ?Sized + Send + Sync + 'static,
    {
        if !self.contains::<T>() {
            self.add_instance(service);
        }
        self
    }

    /// Removes every binding for `T`.
    pub fn remove_all<T: ?Sized + 'static>(&mut self) -> &mut Self {
        self.bindings.remove(&TypeId::of::<T>());
        self.type_names.remove(&TypeId::of::<T>());
        self
    }

    /// Checks if `T` has at least one binding.
    #[must_use]
    pub fn contains<T: ?Sized + 'static>(&self) -> bool {
        self.bindings.contains_key(&TypeId::of::<T>())
    }

    /// Returns the number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Freezes the collection into a provider.
    #[must_use]
    pub fn build(self) -> ServiceProvider {
        ServiceProvider {
            bindings: self.bindings,
            type_names: self.type_names,
        }
    }

    fn push<T: ?Sized + 'static>(&mut self, binding: Binding) {
        let id = TypeId::of::<T>();
        self.bindings.entry(id).or_default().push(binding);
        self.type_names.insert(id, std::any::type_name::<T>());
    }
}

impl fmt::Debug for ServiceCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceCollection")
            .field("services", &self.type_names.values().collect::<Vec<_>>())
            .finish()
    }
}

/// Immutable, thread-safe registry of configured services.
pub struct ServiceProvider {
    bindings: HashMap<TypeId, Vec<Binding>>,
    type_names: HashMap<TypeId, &'static str>,
}

impl ServiceProvider {
    /// Returns the last binding registered for `T`.
    #[must_use]
    pub fn get<T: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.bindings
            .get(&TypeId::of::<T>())
            .and_then(|list| list.last())
            .and_then(|binding| binding.resolve::<T>(self))
    }

    /// Returns every binding for `T` in registration order.
    #[must_use]
    pub fn get_all<T: ?Sized + Send + Sync + 'static>(&self) -> Vec<Arc<T>> {
        self.bindings
            .get(&TypeId::of::<T>())
            .map(|list| {
                list.iter()
                    .filter_map(|binding| binding.resolve::<T>(self))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Checks if `T` is registered.
    #[must_use]
    pub fn contains<T: ?Sized + 'static>(&self) -> bool {
        self.bindings.contains_key(&TypeId::of::<T>())
    }

    /// Returns the number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl fmt::Debug for ServiceProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceProvider")
            .field("service_count", &self.bindings.len())
            .field("services", &self.type_names.values().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    trait Greeter: Send + Sync {
        fn greet(&self) -> String;
    }

    struct English;
    struct French;

    impl Greeter for English {
        fn greet(&self) -> String {
            "hello".to_string()
        }
    }

    impl Greeter for French {
        fn greet(&self) -> String {
            "bonjour".to_string()
        }
    }

    #[derive(Debug)]
    struct Settings {
        value: String,
    }

    #[test]
    fn test_empty_collection() {
        let services = ServiceCollection::new();
        assert!(services.is_empty());
        assert_eq!(services.build().len(), 0);
    }

    #[test]
    fn test_concrete_instance() {
        let mut services = ServiceCollection::new();
        services.add_instance(Arc::new(Settings {
            value: "on".to_string(),
        }));

        let provider = services.build();
        assert_eq!(provider.get::<Settings>().unwrap().value, "on");
        assert!(provider.contains::<Settings>());
    }

    #[test]
    fn test_trait_object_instance() {
        let mut services = ServiceCollection::new();
        services.add_instance::<dyn Greeter>(Arc::new(English));

        let provider = services.build();
        assert_eq!(provider.get::<dyn Greeter>().unwrap().greet(), "hello");
        assert!(provider.get::<Settings>().is_none());
    }

    #[test]
    fn test_last_registration_wins_and_all_are_kept() {
        let mut services = ServiceCollection::new();
        services
            .add_instance::<dyn Greeter>(Arc::new(English))
            .add_instance::<dyn Greeter>(Arc::new(French));

        let provider = services.build();
        assert_eq!(provider.get::<dyn Greeter>().unwrap().greet(), "bonjour");

        let all: Vec<String> = provider
            .get_all::<dyn Greeter>()
            .iter()
            .map(|g| g.greet())
            .collect();
        assert_eq!(all, vec!["hello", "bonjour"]);
    }

    #[test]
    fn test_get_all_missing_is_empty() {
        let provider = ServiceCollection::new().build();
        assert!(provider.get_all::<dyn Greeter>().is_empty());
    }

    #[test]
    fn test_factory_is_transient() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let mut services = ServiceCollection::new();
        services.add_factory::<Settings, _>(move |_| {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            Arc::new(Settings {
                value: format!("call-{n}"),
            })
        });

        let provider = services.build();
        assert_eq!(provider.get::<Settings>().unwrap().value, "call-0");
        assert_eq!(provider.get::<Settings>().unwrap().value, "call-1");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_factory_can_resolve_dependencies() {
        let mut services = ServiceCollection::new();
        services.add_instance(Arc::new(Settings {
            value: "fr".to_string(),
        }));
        services.add_factory::<dyn Greeter, _>(|provider| {
            let settings = provider.get::<Settings>();
            let greeter: Arc<dyn Greeter> = if settings.is_some_and(|s| s.value == "fr") {
                Arc::new(French)
            } else {
                Arc::new(English)
            };
            greeter
        });

        let provider = services.build();
        assert_eq!(provider.get::<dyn Greeter>().unwrap().greet(), "bonjour");
    }

    #[test]
    fn test_try_add_and_remove() {
        let mut services = ServiceCollection::new();
        services.try_add_instance::<dyn Greeter>(Arc::new(English));
        services.try_add_instance::<dyn Greeter>(Arc::new(French));
        assert_eq!(services.len(), 1);

        services.remove_all::<dyn Greeter>();
        assert!(!services.contains::<dyn Greeter>());
    }

    #[test]
    fn test_provider_debug_lists_services() {
        let mut services = ServiceCollection::new();
        services.add_instance::<dyn Greeter>(Arc::new(English));
        let debug = format!("{:?}", services.build());
        assert!(debug.contains("service_count"));
        assert!(debug.contains("Greeter"));
    }
}
