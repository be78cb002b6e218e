//! Handler descriptors.
//!
//! A [`HandlerDescriptor`] is the immutable identity of the handler a selector
//! picked for a request. Only [`HandlerDescriptor::Controller`] can be bound
//! and invoked by the harness; any other kind is a configuration fault.

use http::Method;
use serde::Serialize;
use std::any::TypeId;
use std::fmt;

/// Identity of the concrete type declaring a handler.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerType {
    id: TypeId,
    full_name: &'static str,
}

impl HandlerType {
    /// Captures the identity of `T`.
    #[must_use]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            full_name: std::any::type_name::<T>(),
        }
    }

    /// Returns the `TypeId` of the declaring type.
    #[must_use]
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Returns the fully qualified type name.
    #[must_use]
    pub fn full_name(&self) -> &'static str {
        self.full_name
    }

    /// Returns the type name without its module path or generic arguments.
    #[must_use]
    pub fn name(&self) -> &'static str {
        let base = self.full_name.split('<').next().unwrap_or(self.full_name);
        base.rsplit("::").next().unwrap_or(base)
    }

    /// Returns true if this is the identity of `T`.
    #[must_use]
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl fmt::Debug for HandlerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("HandlerType").field(&self.full_name).finish()
    }
}

impl fmt::Display for HandlerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for HandlerType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.full_name)
    }
}

/// Where a parameter value is read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingSource {
    /// Route values.
    Route,
    /// Query string.
    Query,
    /// JSON request body.
    Body,
    /// A named request header.
    Header(String),
    /// Route values first, then the query string.
    Default,
}

/// Target type of a bound parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterKind {
    /// Raw string.
    String,
    /// 32-bit signed integer.
    Int,
    /// 64-bit signed integer.
    Long,
    /// 64-bit float.
    Float,
    /// `true` / `false`.
    Bool,
    /// UUID in any standard textual form.
    Uuid,
    /// Arbitrary JSON (bodies, complex types).
    Json,
}

/// One parameter of a controller action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterDescriptor {
    /// Parameter name, also the lookup key in its source.
    pub name: String,
    /// Where the value comes from.
    pub source: BindingSource,
    /// Target type.
    pub kind: ParameterKind,
    /// A missing value is a model-state error.
    pub required: bool,
}

impl ParameterDescriptor {
    /// Creates an optional parameter bound from the default source.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: ParameterKind) -> Self {
        Self {
            name: name.into(),
            source: BindingSource::Default,
            kind,
            required: false,
        }
    }

    /// Parameter read from route values.
    #[must_use]
    pub fn route(name: impl Into<String>, kind: ParameterKind) -> Self {
        Self::new(name, kind).from_source(BindingSource::Route)
    }

    /// Parameter read from the query string.
    #[must_use]
    pub fn query(name: impl Into<String>, kind: ParameterKind) -> Self {
        Self::new(name, kind).from_source(BindingSource::Query)
    }

    /// Parameter read from the JSON body.
    #[must_use]
    pub fn body(name: impl Into<String>) -> Self {
        Self::new(name, ParameterKind::Json).from_source(BindingSource::Body)
    }

    /// Parameter read from a request header.
    #[must_use]
    pub fn header(name: impl Into<String>, header: impl Into<String>, kind: ParameterKind) -> Self {
        Self::new(name, kind).from_source(BindingSource::Header(header.into()))
    }

    /// Sets the binding source.
    #[must_use]
    pub fn from_source(mut self, source: BindingSource) -> Self {
        self.source = source;
        self
    }

    /// Marks the parameter as required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// A controller action: the only handler kind the harness can bind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControllerDescriptor {
    /// Declaring controller type.
    pub handler_type: HandlerType,
    /// Controller (group) name, e.g. `Users`.
    pub controller_name: String,
    /// Action name, e.g. `Get`.
    pub action_name: String,
    /// Accepted HTTP methods; empty accepts any method.
    #[serde(serialize_with = "serialize_methods")]
    pub methods: Vec<Method>,
    /// Ordered action parameters.
    pub parameters: Vec<ParameterDescriptor>,
}

impl ControllerDescriptor {
    /// Creates a descriptor for an action on controller type `T`.
    ///
    /// The controller name defaults to the type name without a
    /// `Controller` suffix.
    #[must_use]
    pub fn new<T: 'static>(action_name: impl Into<String>) -> Self {
        let handler_type = HandlerType::of::<T>();
        let type_name = handler_type.name();
        let controller_name = type_name
            .strip_suffix("Controller")
            .filter(|s| !s.is_empty())
            .unwrap_or(type_name)
            .to_string();
        Self {
            handler_type,
            controller_name,
            action_name: action_name.into(),
            methods: Vec::new(),
            parameters: Vec::new(),
        }
    }

    /// Overrides the controller name.
    #[must_use]
    pub fn controller_name(mut self, name: impl Into<String>) -> Self {
        self.controller_name = name.into();
        self
    }

    /// Restricts the action to an HTTP method.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.methods.push(method);
        self
    }

    /// Appends a parameter.
    #[must_use]
    pub fn parameter(mut self, parameter: ParameterDescriptor) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Returns true if the action accepts `method`.
    #[must_use]
    pub fn accepts(&self, method: &Method) -> bool {
        self.methods.is_empty() || self.methods.contains(method)
    }

    /// Returns `Controller.Action`.
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{}.{}", self.controller_name, self.action_name)
    }
}

#[allow(clippy::ptr_arg)]
fn serialize_methods<S: serde::Serializer>(
    methods: &Vec<Method>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(methods.iter().map(Method::as_str))
}

/// A handler that is not a controller action (e.g. a bare endpoint delegate).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EndpointDescriptor {
    /// Human-readable name.
    pub display_name: String,
}

/// Identity of the handler selected for a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HandlerDescriptor {
    /// A controller action.
    Controller(ControllerDescriptor),
    /// Any other handler kind.
    Endpoint(EndpointDescriptor),
}

impl HandlerDescriptor {
    /// Returns the controller descriptor, if this is one.
    #[must_use]
    pub fn as_controller(&self) -> Option<&ControllerDescriptor> {
        match self {
            Self::Controller(descriptor) => Some(descriptor),
            Self::Endpoint(_) => None,
        }
    }

    /// Returns a human-readable name for logs and errors.
    #[must_use]
    pub fn display_name(&self) -> String {
        match self {
            Self::Controller(descriptor) => descriptor.display_name(),
            Self::Endpoint(endpoint) => endpoint.display_name.clone(),
        }
    }
}

impl From<ControllerDescriptor> for HandlerDescriptor {
    fn from(descriptor: ControllerDescriptor) -> Self {
        Self::Controller(descriptor)
    }
}
