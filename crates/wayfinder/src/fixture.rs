//! The outermost test-fixture boundary.
//!
//! A [`TestApplication`] owns everything one group of tests resolves
//! against: the router, the controller catalog, a built service registry and
//! the [`ServiceLocator`] over it. Tests share an application by reference;
//! nothing below this type reaches for process-wide state.

use std::fmt;
use std::sync::{Arc, Once};

use wayfinder_config::HarnessConfig;
use wayfinder_core::di::{ServiceCollection, ServiceProvider};
use wayfinder_core::{
    ActionSelector, Activator, ControllerDescriptor, EndpointDescriptor, InvokerFactory,
    RequestContext, RouteData, Router, ServiceLocator, TypeActivator,
};
use wayfinder_router::{RouteTable, RoutingOptions, TemplateError};

use crate::binding::BindingInvokerFactory;
use crate::error::{HarnessError, ResolveError};
use crate::resolver;
use crate::result::ResolvedRoute;
use crate::selection::{CatalogActionSelector, ControllerCatalog};

static LOGGING: Once = Once::new();

type RouteSetup = Box<dyn FnOnce(&mut RouteTable) -> Result<(), TemplateError>>;
type ServiceSetup = Box<dyn FnOnce(&mut ServiceCollection)>;

/// A configured application under test.
///
/// # Example
///
/// ```rust
/// use http::Method;
/// use wayfinder::prelude::*;
///
/// struct UsersController;
///
/// let app = TestApplication::builder()
///     .config(HarnessConfig::quiet())
///     .routes(|routes| {
///         routes.map(Method::GET, "users/{id:int}", "Users", "Get")?;
///         Ok(())
///     })
///     .controller(
///         ControllerDescriptor::new::<UsersController>("Get")
///             .method(Method::GET)
///             .parameter(ParameterDescriptor::route("id", ParameterKind::Int)),
///     )
///     .build()
///     .unwrap();
///
/// let action = app
///     .resolve(&RequestContext::get("/users/5"))
///     .unwrap()
///     .into_action()
///     .unwrap();
/// assert_eq!(action.handler_name(), "UsersController");
/// assert_eq!(action.argument("id"), Some(&serde_json::json!(5)));
/// ```
pub struct TestApplication {
    config: HarnessConfig,
    router: Arc<dyn Router>,
    catalog: Arc<ControllerCatalog>,
    services: Arc<ServiceProvider>,
    locator: ServiceLocator,
}

impl TestApplication {
    /// Starts building an application.
    #[must_use]
    pub fn builder() -> TestApplicationBuilder {
        TestApplicationBuilder::new()
    }

    /// Resolves `request` against this application.
    ///
    /// See [`resolve`](crate::resolve).
    pub fn resolve(&self, request: &RequestContext) -> Result<ResolvedRoute, ResolveError> {
        resolver::resolve(&self.locator, self.router.as_ref(), request)
    }

    /// Matches `request` against this application's router.
    ///
    /// See [`resolve_route_data`](crate::resolve_route_data).
    pub fn resolve_route_data<'r>(
        &self,
        request: &'r RequestContext,
    ) -> anyhow::Result<Option<&'r RouteData>> {
        resolver::resolve_route_data(self.router.as_ref(), request)
    }

    /// Publishes this application's registry through
    /// [`ServiceLocator::global`] for code that cannot be handed a locator.
    pub fn install_global(&self) -> &'static ServiceLocator {
        let global = ServiceLocator::global();
        global.establish_shared(Arc::clone(&self.services));
        tracing::debug!("test application installed as the global service registry");
        global
    }

    /// The locator over this application's registry.
    #[must_use]
    pub fn locator(&self) -> &ServiceLocator {
        &self.locator
    }

    /// The built service registry.
    #[must_use]
    pub fn services(&self) -> &Arc<ServiceProvider> {
        &self.services
    }

    /// The router requests are matched against.
    #[must_use]
    pub fn router(&self) -> &dyn Router {
        self.router.as_ref()
    }

    /// The controller actions known to the default selector.
    #[must_use]
    pub fn catalog(&self) -> &ControllerCatalog {
        &self.catalog
    }

    /// The configuration the application was built with.
    #[must_use]
    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }
}

impl fmt::Debug for TestApplication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestApplication")
            .field("config", &self.config)
            .field("catalog", &self.catalog)
            .field("services", &self.services)
            .finish_non_exhaustive()
    }
}

/// Builder for [`TestApplication`].
#[derive(Default)]
pub struct TestApplicationBuilder {
    config: HarnessConfig,
    routes: Vec<RouteSetup>,
    router: Option<Arc<dyn Router>>,
    catalog: ControllerCatalog,
    services: Vec<ServiceSetup>,
}

impl TestApplicationBuilder {
    /// Creates a builder with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the harness configuration.
    #[must_use]
    pub fn config(mut self, config: HarnessConfig) -> Self {
        self.config = config;
        self
    }

    /// Adds routes to the built-in [`RouteTable`].
    ///
    /// The table is created with the configured routing options. Ignored if
    /// a custom [`router`](Self::router) is set.
    #[must_use]
    pub fn routes<F>(mut self, setup: F) -> Self
    where
        F: FnOnce(&mut RouteTable) -> Result<(), TemplateError> + 'static,
    {
        self.routes.push(Box::new(setup));
        self
    }

    /// Uses a custom router instead of the built-in route table.
    #[must_use]
    pub fn router(mut self, router: Arc<dyn Router>) -> Self {
        self.router = Some(router);
        self
    }

    /// Registers a controller action with the default selector.
    #[must_use]
    pub fn controller(mut self, action: ControllerDescriptor) -> Self {
        self.catalog.add(action);
        self
    }

    /// Maps a route name to a non-controller endpoint.
    #[must_use]
    pub fn endpoint(mut self, route_name: impl Into<String>, endpoint: EndpointDescriptor) -> Self {
        self.catalog.add_endpoint(route_name, endpoint);
        self
    }

    /// Adds service registrations.
    ///
    /// Runs after the defaults are registered, so a registration here
    /// replaces the default selector, invoker factory or activator.
    #[must_use]
    pub fn configure_services<F>(mut self, configure: F) -> Self
    where
        F: FnOnce(&mut ServiceCollection) + 'static,
    {
        self.services.push(Box::new(configure));
        self
    }

    /// Builds the application.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Config`] for an invalid configuration and
    /// [`HarnessError::Template`] for a malformed route template.
    pub fn build(self) -> Result<TestApplication, HarnessError> {
        self.config.validate()?;
        init_logging_once(&self.config);

        let router = match self.router {
            Some(router) => router,
            None => {
                let mut table = RouteTable::with_options(RoutingOptions {
                    case_sensitive: self.config.routing.case_sensitive,
                    decode_values: self.config.routing.decode_values,
                });
                for setup in self.routes {
                    setup(&mut table)?;
                }
                Arc::new(table)
            }
        };

        let catalog = Arc::new(self.catalog);
        let mut services = ServiceCollection::new();
        services
            .add_instance::<dyn ActionSelector>(Arc::new(CatalogActionSelector::new(Arc::clone(
                &catalog,
            ))))
            .add_instance::<dyn InvokerFactory>(Arc::new(BindingInvokerFactory::new(
                self.config.binding.max_model_errors,
            )))
            .add_instance::<dyn Activator>(Arc::new(TypeActivator::new()));
        for configure in self.services {
            configure(&mut services);
        }

        let services = Arc::new(services.build());
        let locator = ServiceLocator::new();
        locator.establish_shared(Arc::clone(&services));

        tracing::debug!(
            actions = catalog.len(),
            services = services.len(),
            "test application built"
        );

        Ok(TestApplication {
            config: self.config,
            router,
            catalog,
            services,
            locator,
        })
    }
}

impl fmt::Debug for TestApplicationBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestApplicationBuilder")
            .field("config", &self.config)
            .field("routes", &self.routes.len())
            .field("custom_router", &self.router.is_some())
            .field("catalog", &self.catalog)
            .field("service_setups", &self.services.len())
            .finish()
    }
}

// The first application's logging settings win for the whole test binary.
fn init_logging_once(config: &HarnessConfig) {
    LOGGING.call_once(|| {
        if let Err(error) = wayfinder_telemetry::init_logging(&config.logging.to_log_config()) {
            tracing::debug!(error = %error, "logging not initialized by the harness");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;
    use wayfinder_config::BindingConfig;
    use wayfinder_core::{LocatorError, ParameterDescriptor, ParameterKind};

    struct UsersController;

    fn users_app() -> TestApplicationBuilder {
        TestApplication::builder()
            .config(HarnessConfig::quiet())
            .routes(|routes| {
                routes.map(Method::GET, "users/{id:int}", "Users", "Get")?;
                Ok(())
            })
            .controller(
                ControllerDescriptor::new::<UsersController>("Get")
                    .method(Method::GET)
                    .parameter(ParameterDescriptor::route("id", ParameterKind::Int)),
            )
    }

    #[test]
    fn test_defaults_are_registered() {
        let app = users_app().build().unwrap();
        assert!(app.locator().require_service::<dyn ActionSelector>().is_ok());
        assert!(app.locator().require_service::<dyn InvokerFactory>().is_ok());
        assert!(app.locator().require_service::<dyn Activator>().is_ok());
        assert_eq!(app.catalog().len(), 1);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = HarnessConfig::builder()
            .binding(BindingConfig { max_model_errors: 0 })
            .build();
        let err = users_app().config(config).build().unwrap_err();
        assert!(matches!(err, HarnessError::Config(_)));
    }

    #[test]
    fn test_malformed_template_is_rejected() {
        let err = TestApplication::builder()
            .config(HarnessConfig::quiet())
            .routes(|routes| {
                routes.map(Method::GET, "users/{id:int}/{id}", "Users", "Get")?;
                Ok(())
            })
            .build()
            .unwrap_err();
        assert!(matches!(err, HarnessError::Template(_)));
    }

    #[test]
    fn test_user_registrations_replace_defaults() {
        let app = users_app()
            .configure_services(|services| {
                services.remove_all::<dyn InvokerFactory>();
            })
            .build()
            .unwrap();

        let err = app.resolve(&RequestContext::get("/users/5")).unwrap_err();
        assert!(matches!(
            err,
            ResolveError::Locator(LocatorError::ServiceMissing { .. })
        ));
    }

    #[test]
    fn test_routing_options_follow_config() {
        let mut config = HarnessConfig::quiet();
        config.routing.case_sensitive = true;
        let app = users_app().config(config).build().unwrap();

        let request = RequestContext::get("/USERS/5");
        let data = app.resolve_route_data(&request).unwrap().unwrap();
        assert!(!data.is_match());
    }

    #[test]
    fn test_applications_are_isolated() {
        let first = users_app().build().unwrap();
        let second = TestApplication::builder()
            .config(HarnessConfig::quiet())
            .build()
            .unwrap();

        assert!(first.resolve(&RequestContext::get("/users/5")).unwrap().is_resolved());
        let result = second.resolve(&RequestContext::get("/users/5")).unwrap();
        assert_eq!(result.reason(), Some("action could not be matched"));
    }

    #[test]
    fn test_install_global_shares_the_registry() {
        let app = users_app().build().unwrap();
        let global = app.install_global();
        assert!(Arc::ptr_eq(&global.provider().unwrap(), app.services()));
    }
}
