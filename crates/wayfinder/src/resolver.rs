//! Route data resolution and the resolve → select → bind pipeline.
//!
//! Both entry points are blocking: asynchronous capability operations are
//! driven to completion with [`futures_executor::block_on`] before the call
//! returns, so they can be used from plain `#[test]` functions as well as
//! from inside an async test body.
//!
//! | Stage | Fault | Outcome |
//! |---|---|---|
//! | Route data | router error | `Unresolved` (`route_data`) |
//! | Services | registry missing or incomplete | `Err(ResolveError::Locator)` |
//! | Selection | selector error | `Unresolved` (`action_selection`) |
//! | Selection | nothing selected | `Unresolved` (`no_action_matched`) |
//! | Invocation context | non-controller handler | `Err(ResolveError::Configuration)` |
//! | Invoker | no argument-binding invoker | `Err(ResolveError::Configuration)` |
//! | Binding | invoker error | `Unresolved` (`argument_binding`) |

use std::sync::Arc;

use bytes::Bytes;
use futures_executor::block_on;
use wayfinder_core::{
    ActionSelector, ConfigurationError, InvocationContext, InvokerFactory, LocatorError,
    RequestContext, RouteData, Router, ServiceLocator,
};

use crate::error::ResolveError;
use crate::result::{ResolvedAction, ResolvedRoute, UnresolvedRoute};

/// Matches `request` against `router` and attaches the result to it.
///
/// Returns `Ok(None)` without consulting the router when the request has no
/// path. Router errors are returned as-is.
///
/// # Example
///
/// ```rust
/// use wayfinder::resolve_route_data;
/// use wayfinder_core::RequestContext;
/// use wayfinder_router::RouteTable;
/// use http::Method;
///
/// let mut routes = RouteTable::new();
/// routes.map(Method::GET, "users/{id:int}", "Users", "Get").unwrap();
///
/// let request = RequestContext::get("/users/5");
/// let data = resolve_route_data(&routes, &request).unwrap().unwrap();
/// assert_eq!(data.value("id"), Some("5"));
/// assert!(request.route_data().is_some());
///
/// let empty = RequestContext::get("");
/// assert!(resolve_route_data(&routes, &empty).unwrap().is_none());
/// ```
pub fn resolve_route_data<'r>(
    router: &dyn Router,
    request: &'r RequestContext,
) -> anyhow::Result<Option<&'r RouteData>> {
    if !request.has_path() {
        tracing::debug!(request_id = %request.request_id(), "request has no path; skipping route matching");
        return Ok(None);
    }

    let data = block_on(router.route(request))?;
    tracing::debug!(
        request_id = %request.request_id(),
        matched = data.is_match(),
        route.name = data.entry().map(|entry| entry.name.as_str()),
        "route data resolved"
    );
    Ok(Some(request.attach_route_data(data)))
}

/// [`resolve_route_data`] for a raw [`http::Request`].
pub fn resolve_route_data_http(
    router: &dyn Router,
    request: http::Request<Bytes>,
) -> anyhow::Result<Option<RouteData>> {
    let request = RequestContext::from(request);
    resolve_route_data(router, &request).map(|data| data.cloned())
}

/// Resolves `request` to a controller action and binds its arguments.
///
/// The selector and invoker factory are taken from the request's own service
/// scope when it registers them, otherwise from `locator`; `router` is passed
/// directly. The registry behind `locator` must be established either way.
/// Resolvable failures come back as [`ResolvedRoute::Unresolved`]; a
/// misconfigured environment is an `Err`.
///
/// # Panics
///
/// Panics raised by the router, selector, invoker factory or invoker are not
/// caught. They unwind out of `resolve` and fail the calling test.
pub fn resolve(
    locator: &ServiceLocator,
    router: &dyn Router,
    request: &RequestContext,
) -> Result<ResolvedRoute, ResolveError> {
    let span = tracing::debug_span!(
        "resolve_route",
        request_id = %request.request_id(),
        http.method = %request.method(),
        http.path = request.path().unwrap_or_default(),
    );
    let _guard = span.enter();

    let route_data = match resolve_route_data(router, request) {
        Ok(data) => data,
        Err(error) => return Ok(unresolved(UnresolvedRoute::route_data(&error))),
    };

    let selector = require_scoped::<dyn ActionSelector>(locator, request)?;
    let factory = require_scoped::<dyn InvokerFactory>(locator, request)?;

    let descriptor = match selector.select(request) {
        Ok(Some(descriptor)) => descriptor,
        Ok(None) => return Ok(unresolved(UnresolvedRoute::no_action_matched())),
        Err(error) => return Ok(unresolved(UnresolvedRoute::action_selection(&error))),
    };
    tracing::debug!(action = %descriptor.display_name(), "action selected");

    let empty = RouteData::unmatched();
    let route_data = route_data.unwrap_or(&empty);
    let context = InvocationContext::new(request, route_data, &descriptor).map_err(fatal)?;

    let action = context.descriptor().display_name();
    let Some(mut invoker) = factory.create_invoker(context) else {
        return Err(fatal(ConfigurationError::UnsupportedInvoker { action }));
    };
    let Some(binding) = invoker.as_model_binding() else {
        return Err(fatal(ConfigurationError::UnsupportedInvoker { action }));
    };

    if let Err(error) = block_on(binding.bind_and_invoke()) {
        return Ok(unresolved(UnresolvedRoute::argument_binding(&error)));
    }

    let context = binding.context();
    let resolved = ResolvedAction::new(
        context.descriptor(),
        binding.bound_arguments().clone(),
        context.route_data().clone(),
        context.model_state().clone(),
    );
    tracing::debug!(
        action = %action,
        arguments = resolved.arguments.len(),
        model_valid = resolved.model_state.is_valid(),
        "route resolved"
    );
    Ok(resolved.into())
}

// request scope first, then the registry
fn require_scoped<T>(locator: &ServiceLocator, request: &RequestContext) -> Result<Arc<T>, ResolveError>
where
    T: ?Sized + Send + Sync + 'static,
{
    let registry = locator.provider().map_err(fatal)?;
    request
        .services()
        .and_then(|scope| scope.get::<T>())
        .or_else(|| registry.get::<T>())
        .ok_or_else(|| fatal(LocatorError::missing::<T>()))
}

fn unresolved(unresolved: UnresolvedRoute) -> ResolvedRoute {
    tracing::warn!(
        stage = %unresolved.stage,
        reason = %unresolved.reason,
        "route resolution stopped"
    );
    unresolved.into()
}

fn fatal(error: impl Into<ResolveError>) -> ResolveError {
    let error = error.into();
    tracing::error!(error = %error, "route resolution environment is misconfigured");
    error
}
