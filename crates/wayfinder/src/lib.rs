//! # Wayfinder
//!
//! **Test-time request resolution without a server**
//!
//! Wayfinder answers "which action would handle this request, and with what
//! arguments?" at unit-test speed. It replays the dispatch pipeline against an
//! application's router, action selector and invoker factory:
//!
//! - **Route data** – match the path and attach the route values to the request
//! - **Action selection** – pick the controller action for those route values
//! - **Argument binding** – bind the action's parameters and record model state
//!
//! Each stage's failure comes back as an assertable
//! [`ResolvedRoute::Unresolved`] naming the stage. A misconfigured test
//! environment is a [`ResolveError`] instead.
//!
//! ## Quick Start
//!
//! ```rust
//! use http::Method;
//! use wayfinder::prelude::*;
//!
//! struct UsersController;
//!
//! let app = TestApplication::builder()
//!     .config(HarnessConfig::quiet())
//!     .routes(|routes| {
//!         routes.map(Method::GET, "users/{id:int}", "Users", "Get")?;
//!         Ok(())
//!     })
//!     .controller(
//!         ControllerDescriptor::new::<UsersController>("Get")
//!             .method(Method::GET)
//!             .parameter(ParameterDescriptor::route("id", ParameterKind::Int)),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let result = app.resolve(&RequestContext::get("/users/5")).unwrap();
//! let action = result.action().unwrap();
//! assert_eq!(action.handler_name(), "UsersController");
//! assert_eq!(action.action_name, "Get");
//!
//! let result = app.resolve(&RequestContext::get("/nope")).unwrap();
//! assert_eq!(result.reason(), Some("action could not be matched"));
//! ```
//!
//! ## Pipeline
//!
//! ```text
//! RequestContext → Router → ActionSelector → InvokerFactory → bind_and_invoke → ResolvedRoute
//!                    ↓            ↓                                  ↓
//!                Unresolved   Unresolved                        Unresolved
//! ```

#![doc(html_root_url = "https://docs.rs/wayfinder/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod binding;
mod error;
mod fixture;
mod resolver;
mod result;
mod selection;

pub use binding::{ArgumentBindingInvoker, BindingInvokerFactory};
pub use error::{HarnessError, ResolveError};
pub use fixture::{TestApplication, TestApplicationBuilder};
pub use resolver::{resolve, resolve_route_data, resolve_route_data_http};
pub use result::{FailureStage, ResolvedAction, ResolvedRoute, UnresolvedRoute};
pub use selection::{CatalogActionSelector, ControllerCatalog, ACTION_KEY, CONTROLLER_KEY};

// Re-export the component crates
pub use wayfinder_config as config;
pub use wayfinder_core as core;
pub use wayfinder_router as router;
pub use wayfinder_telemetry as telemetry;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use wayfinder::prelude::*;
///
/// let request = RequestContext::get("/users/5");
/// assert!(request.has_path());
/// ```
pub mod prelude {
    pub use crate::{
        resolve, resolve_route_data, FailureStage, HarnessError, ResolveError, ResolvedAction,
        ResolvedRoute, TestApplication, UnresolvedRoute,
    };

    // Data model and capabilities
    pub use wayfinder_core::di::{ServiceCollection, ServiceProvider};
    pub use wayfinder_core::{
        ActionInvoker, ActionSelector, BindingSource, ConfigurationError, ControllerDescriptor,
        EndpointDescriptor, HandlerDescriptor, InvocationContext, InvokerFactory, LocatorError,
        ModelBindingInvoker, ModelState, ParameterDescriptor, ParameterKind, RequestContext,
        RouteData, Router, ServiceLocator,
    };

    // Routing
    pub use wayfinder_router::{RouteEntry, RouteTable, RoutingOptions};

    // Configuration
    pub use wayfinder_config::{ConfigLoader, HarnessConfig};
}
