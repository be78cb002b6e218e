//! Capabilities the resolution engine consumes from its environment.
//!
//! The engine treats routing, selection and invocation as black boxes. Each
//! is a trait registered in the service registry (or passed directly, for the
//! router). Operations that are asynchronous in a real server return a
//! [`BoxFuture`]; the engine waits on them so that a resolution call returns
//! only once the whole pipeline has settled.

use crate::context::RequestContext;
use crate::descriptor::HandlerDescriptor;
use crate::invocation::InvocationContext;
use crate::model_state::BoundArguments;
use crate::route_data::RouteData;
use futures_util::future::BoxFuture;

/// Matches a request path against configured routes.
pub trait Router: Send + Sync {
    /// Matches `request`, returning empty route data when nothing matches.
    ///
    /// # Errors
    ///
    /// Any error is a routing fault (e.g. a malformed path the router rejects).
    fn route<'a>(&'a self, request: &'a RequestContext) -> BoxFuture<'a, anyhow::Result<RouteData>>;
}

/// Picks the handler for a routed request.
pub trait ActionSelector: Send + Sync {
    /// Selects a handler from the request and its attached route data.
    ///
    /// Returns `Ok(None)` when no handler matches.
    ///
    /// # Errors
    ///
    /// Any error is a selection fault (e.g. an ambiguous match).
    fn select(&self, request: &RequestContext) -> anyhow::Result<Option<HandlerDescriptor>>;
}

/// Produces invokers for controller actions.
pub trait InvokerFactory: Send + Sync {
    /// Creates an invoker owning `context`, or `None` if this factory cannot
    /// handle it.
    fn create_invoker<'a>(
        &self,
        context: InvocationContext<'a>,
    ) -> Option<Box<dyn ActionInvoker<'a> + 'a>>;
}

/// Runs a controller action.
pub trait ActionInvoker<'a>: Send {
    /// Runs the action.
    fn invoke(&mut self) -> BoxFuture<'_, anyhow::Result<()>>;

    /// Returns the argument-binding view of this invoker, if it has one.
    fn as_model_binding(&mut self) -> Option<&mut dyn ModelBindingInvoker<'a>> {
        None
    }
}

/// An invoker that exposes the arguments it bound.
pub trait ModelBindingInvoker<'a>: Send {
    /// Binds the action arguments and runs the bind-time pipeline.
    fn bind_and_invoke(&mut self) -> BoxFuture<'_, anyhow::Result<()>>;

    /// Arguments bound by the last [`bind_and_invoke`](Self::bind_and_invoke).
    fn bound_arguments(&self) -> &BoundArguments;

    /// The invocation context this invoker owns.
    fn context(&self) -> &InvocationContext<'a>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::ControllerDescriptor;
    use crate::route_data::{RouteEntryId, RouteValues};
    use futures_util::FutureExt;

    struct StaticRouter;

    impl Router for StaticRouter {
        fn route<'a>(
            &'a self,
            request: &'a RequestContext,
        ) -> BoxFuture<'a, anyhow::Result<RouteData>> {
            async move {
                if request.path() == Some("/ping") {
                    let values: RouteValues = [("action", "Ping")].into_iter().collect();
                    Ok(RouteData::matched(
                        values,
                        RouteEntryId {
                            name: "ping".to_string(),
                            template: "ping".to_string(),
                        },
                    ))
                } else {
                    Ok(RouteData::unmatched())
                }
            }
            .boxed()
        }
    }

    struct PlainInvoker;

    impl<'a> ActionInvoker<'a> for PlainInvoker {
        fn invoke(&mut self) -> BoxFuture<'_, anyhow::Result<()>> {
            async { Ok(()) }.boxed()
        }
    }

    struct NullFactory;

    impl InvokerFactory for NullFactory {
        fn create_invoker<'a>(
            &self,
            _context: InvocationContext<'a>,
        ) -> Option<Box<dyn ActionInvoker<'a> + 'a>> {
            Some(Box::new(PlainInvoker))
        }
    }

    struct PingController;

    #[test]
    fn test_router_is_object_safe() {
        let router: Box<dyn Router> = Box::new(StaticRouter);
        let request = RequestContext::get("/ping");
        let data = futures_executor::block_on(router.route(&request)).unwrap();
        assert_eq!(data.value("action"), Some("Ping"));

        let other = RequestContext::get("/pong");
        let data = futures_executor::block_on(router.route(&other)).unwrap();
        assert!(!data.is_match());
    }

    #[test]
    fn test_plain_invoker_has_no_binding_view() {
        let factory: Box<dyn InvokerFactory> = Box::new(NullFactory);
        let request = RequestContext::get("/ping");
        let route_data = RouteData::unmatched();
        let descriptor = ControllerDescriptor::new::<PingController>("Ping");
        let context = InvocationContext::for_controller(&request, &route_data, &descriptor);

        let mut invoker = factory.create_invoker(context).unwrap();
        assert!(invoker.as_model_binding().is_none());
        assert!(futures_executor::block_on(invoker.invoke()).is_ok());
    }
}
