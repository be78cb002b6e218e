//! # Wayfinder Core
//!
//! Core types and traits for the Wayfinder route-resolution harness.
//!
//! This crate provides the foundational types used throughout Wayfinder:
//!
//! - [`RequestContext`] - One synthetic request under test, with its write-once route data
//! - [`RouteData`] / [`RouteValues`] - The result of path matching
//! - [`HandlerDescriptor`] - Identity of the selected handler
//! - [`InvocationContext`] / [`ModelState`] - Per-invocation binding state
//! - [`Router`], [`ActionSelector`], [`InvokerFactory`] - Capabilities consumed by the engine
//! - [`ServiceLocator`] - Typed, validated access to the service registry

#![doc(html_root_url = "https://docs.rs/wayfinder-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod activator;
mod capability;
mod context;
mod descriptor;
pub mod di;
mod error;
mod invocation;
mod locator;
mod model_state;
mod route_data;

pub use activator::{Activator, TypeActivator};
pub use capability::{ActionInvoker, ActionSelector, InvokerFactory, ModelBindingInvoker, Router};
pub use context::{RequestContext, RequestContextBuilder, RequestId};
pub use descriptor::{
    BindingSource, ControllerDescriptor, EndpointDescriptor, HandlerDescriptor, HandlerType,
    ParameterDescriptor, ParameterKind,
};
pub use error::{ConfigurationError, LocatorError, LocatorResult};
pub use invocation::InvocationContext;
pub use locator::ServiceLocator;
pub use model_state::{
    BoundArguments, ModelState, ModelStateEntry, DEFAULT_MAX_MODEL_ERRORS, MAX_ERRORS_REACHED,
};
pub use route_data::{RouteData, RouteEntryId, RouteValues};
