//! Handler invocation context.
//!
//! The [`InvocationContext`] bundles everything an invoker needs for one
//! controller action: the request, its matched route data, the selected
//! descriptor, and the model state the binder fills in. It is created by the
//! resolution engine, handed to the invoker factory by value, and dropped when
//! the resolution call returns.

use crate::context::RequestContext;
use crate::descriptor::{ControllerDescriptor, HandlerDescriptor};
use crate::error::ConfigurationError;
use crate::model_state::ModelState;
use crate::route_data::RouteData;

/// Complete context for binding and invoking one controller action.
///
/// # Example
///
/// ```rust
/// use wayfinder_core::{
///     ControllerDescriptor, HandlerDescriptor, InvocationContext, RequestContext, RouteData,
/// };
///
/// struct UsersController;
///
/// let request = RequestContext::get("/users/5");
/// let route_data = RouteData::unmatched();
/// let descriptor: HandlerDescriptor = ControllerDescriptor::new::<UsersController>("Get").into();
///
/// let ctx = InvocationContext::new(&request, &route_data, &descriptor).unwrap();
/// assert_eq!(ctx.descriptor().action_name, "Get");
/// assert!(ctx.model_state().is_valid());
/// ```
#[derive(Debug)]
pub struct InvocationContext<'a> {
    request: &'a RequestContext,
    route_data: &'a RouteData,
    descriptor: &'a ControllerDescriptor,
    model_state: ModelState,
}

impl<'a> InvocationContext<'a> {
    /// Creates an invocation context for a selected handler.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::UnsupportedDescriptor`] if the handler is
    /// not a controller action.
    pub fn new(
        request: &'a RequestContext,
        route_data: &'a RouteData,
        descriptor: &'a HandlerDescriptor,
    ) -> Result<Self, ConfigurationError> {
        let controller =
            descriptor
                .as_controller()
                .ok_or_else(|| ConfigurationError::UnsupportedDescriptor {
                    display_name: descriptor.display_name(),
                })?;
        Ok(Self::for_controller(request, route_data, controller))
    }

    /// Creates an invocation context for a controller action directly.
    #[must_use]
    pub fn for_controller(
        request: &'a RequestContext,
        route_data: &'a RouteData,
        descriptor: &'a ControllerDescriptor,
    ) -> Self {
        Self {
            request,
            route_data,
            descriptor,
            model_state: ModelState::new(),
        }
    }

    /// Replaces the model state (e.g. to apply a configured error cap).
    #[must_use]
    pub fn with_model_state(mut self, model_state: ModelState) -> Self {
        self.model_state = model_state;
        self
    }

    /// Returns the request under test.
    #[must_use]
    pub fn request(&self) -> &'a RequestContext {
        self.request
    }

    /// Returns the matched route data.
    #[must_use]
    pub fn route_data(&self) -> &'a RouteData {
        self.route_data
    }

    /// Returns the selected controller action.
    #[must_use]
    pub fn descriptor(&self) -> &'a ControllerDescriptor {
        self.descriptor
    }

    /// Returns the accumulated model state.
    #[must_use]
    pub fn model_state(&self) -> &ModelState {
        &self.model_state
    }

    /// Returns the model state for mutation by a binder.
    pub fn model_state_mut(&mut self) -> &mut ModelState {
        &mut self.model_state
    }
}
