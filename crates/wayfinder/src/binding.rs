//! Argument binding for controller actions.
//!
//! [`ArgumentBindingInvoker`] reads each declared parameter from its binding
//! source, converts it to the declared kind, and records the outcome in the
//! invocation's model state. Conversion problems are validation errors, not
//! faults: they leave the request resolvable with an invalid model state.
//! Only a body the binder cannot read at all (wrong content type) is a fault.

use futures_util::future::{self, BoxFuture, FutureExt};
use serde_json::Value;
use wayfinder_core::{
    ActionInvoker, BindingSource, BoundArguments, InvocationContext, InvokerFactory, ModelBindingInvoker,
    ModelState, ParameterDescriptor, ParameterKind, DEFAULT_MAX_MODEL_ERRORS,
};

/// [`InvokerFactory`] producing [`ArgumentBindingInvoker`]s.
#[derive(Debug, Clone, Copy)]
pub struct BindingInvokerFactory {
    max_model_errors: usize,
}

impl Default for BindingInvokerFactory {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_MODEL_ERRORS)
    }
}

impl BindingInvokerFactory {
    /// Creates a factory whose invokers cap model errors at `max_model_errors`.
    #[must_use]
    pub fn new(max_model_errors: usize) -> Self {
        Self { max_model_errors }
    }
}

impl InvokerFactory for BindingInvokerFactory {
    fn create_invoker<'a>(
        &self,
        context: InvocationContext<'a>,
    ) -> Option<Box<dyn ActionInvoker<'a> + 'a>> {
        let context = context.with_model_state(ModelState::with_max_errors(self.max_model_errors));
        Some(Box::new(ArgumentBindingInvoker::new(context)))
    }
}

/// Binds a controller action's arguments from the request.
#[derive(Debug)]
pub struct ArgumentBindingInvoker<'a> {
    context: InvocationContext<'a>,
    arguments: BoundArguments,
}

impl<'a> ArgumentBindingInvoker<'a> {
    /// Creates an invoker owning `context`.
    #[must_use]
    pub fn new(context: InvocationContext<'a>) -> Self {
        Self {
            context,
            arguments: BoundArguments::new(),
        }
    }

    fn bind(&mut self) -> anyhow::Result<()> {
        self.arguments.clear();
        let descriptor = self.context.descriptor();

        for parameter in &descriptor.parameters {
            let raw = match &parameter.source {
                BindingSource::Body => self.read_body(parameter)?,
                source => self.read_value(parameter, source),
            };

            let Some(raw) = raw else {
                if parameter.required {
                    self.context
                        .model_state_mut()
                        .add_error(&parameter.name, format!("The {} field is required.", parameter.name));
                }
                continue;
            };

            let converted = match parameter.source {
                BindingSource::Body => convert_body(&raw, parameter),
                _ => convert(&raw, parameter),
            };
            let model_state = self.context.model_state_mut();
            match converted {
                Ok(value) => {
                    model_state.set_attempted_value(&parameter.name, raw);
                    self.arguments.insert(parameter.name.clone(), value);
                }
                Err(message) => {
                    model_state.set_attempted_value(&parameter.name, raw);
                    model_state.add_error(&parameter.name, message);
                }
            }
        }

        tracing::debug!(
            action = %descriptor.display_name(),
            bound = self.arguments.len(),
            model_errors = self.context.model_state().error_count(),
            "action arguments bound"
        );
        Ok(())
    }

    fn read_value(&self, parameter: &ParameterDescriptor, source: &BindingSource) -> Option<String> {
        let request = self.context.request();
        let route = || self.context.route_data().value(&parameter.name).map(String::from);
        match source {
            BindingSource::Route => route(),
            BindingSource::Query => request.query_value(&parameter.name),
            BindingSource::Header(header) => request.header(header).map(String::from),
            BindingSource::Default => route().or_else(|| request.query_value(&parameter.name)),
            BindingSource::Body => None,
        }
    }

    fn read_body(&self, parameter: &ParameterDescriptor) -> anyhow::Result<Option<String>> {
        let request = self.context.request();
        if request.body().is_empty() {
            return Ok(None);
        }

        match request.content_type() {
            Some(content_type) if is_json(&content_type) => {}
            Some(content_type) => anyhow::bail!(
                "unsupported content type '{content_type}' for body parameter '{}'",
                parameter.name
            ),
            None => anyhow::bail!(
                "missing content type for body parameter '{}'",
                parameter.name
            ),
        }

        Ok(Some(String::from_utf8_lossy(request.body()).into_owned()))
    }
}

impl<'a> ActionInvoker<'a> for ArgumentBindingInvoker<'a> {
    fn invoke(&mut self) -> BoxFuture<'_, anyhow::Result<()>> {
        self.bind_and_invoke()
    }

    fn as_model_binding(&mut self) -> Option<&mut dyn ModelBindingInvoker<'a>> {
        Some(self)
    }
}

impl<'a> ModelBindingInvoker<'a> for ArgumentBindingInvoker<'a> {
    fn bind_and_invoke(&mut self) -> BoxFuture<'_, anyhow::Result<()>> {
        future::ready(self.bind()).boxed()
    }

    fn bound_arguments(&self) -> &BoundArguments {
        &self.arguments
    }

    fn context(&self) -> &InvocationContext<'a> {
        &self.context
    }
}

fn is_json(content_type: &str) -> bool {
    content_type == "application/json" || content_type.ends_with("+json")
}

// A string body is a JSON string literal, not the raw payload.
fn convert_body(raw: &str, parameter: &ParameterDescriptor) -> Result<Value, String> {
    match parameter.kind {
        ParameterKind::String => serde_json::from_str::<String>(raw)
            .map(Value::String)
            .map_err(|e| e.to_string()),
        _ => convert(raw, parameter),
    }
}

fn convert(raw: &str, parameter: &ParameterDescriptor) -> Result<Value, String> {
    let value = match parameter.kind {
        ParameterKind::String => Some(Value::String(raw.to_string())),
        ParameterKind::Int => raw.parse::<i32>().ok().map(Value::from),
        ParameterKind::Long => raw.parse::<i64>().ok().map(Value::from),
        ParameterKind::Float => raw
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number),
        ParameterKind::Bool => {
            if raw.eq_ignore_ascii_case("true") {
                Some(Value::Bool(true))
            } else if raw.eq_ignore_ascii_case("false") {
                Some(Value::Bool(false))
            } else {
                None
            }
        }
        ParameterKind::Uuid => uuid::Uuid::parse_str(raw)
            .ok()
            .map(|id| Value::String(id.to_string())),
        // JSON errors carry their own position information
        ParameterKind::Json => return serde_json::from_str(raw).map_err(|e| e.to_string()),
    };
    value.ok_or_else(|| format!("The value '{raw}' is not valid for {}.", parameter.name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;
    use serde_json::json;
    use wayfinder_core::{ControllerDescriptor, RequestContext, RouteData, RouteEntryId, RouteValues};

    struct UsersController;

    fn route_data(values: &[(&str, &str)]) -> RouteData {
        let values: RouteValues = values.iter().copied().collect();
        RouteData::matched(
            values,
            RouteEntryId {
                name: "Users.Get".to_string(),
                template: "users/{id}".to_string(),
            },
        )
    }

    fn bind(
        request: &RequestContext,
        route_data: &RouteData,
        descriptor: &ControllerDescriptor,
    ) -> (anyhow::Result<()>, BoundArguments, ModelState) {
        let context = InvocationContext::for_controller(request, route_data, descriptor);
        let mut invoker = BindingInvokerFactory::default().create_invoker(context).unwrap();
        let binding = invoker.as_model_binding().unwrap();
        let result = futures_executor::block_on(binding.bind_and_invoke());
        let arguments = binding.bound_arguments().clone();
        let model_state = binding.context().model_state().clone();
        (result, arguments, model_state)
    }

    #[test]
    fn test_binds_route_int() {
        let request = RequestContext::get("/users/5");
        let data = route_data(&[("id", "5")]);
        let descriptor = ControllerDescriptor::new::<UsersController>("Get")
            .parameter(ParameterDescriptor::route("id", ParameterKind::Int));

        let (result, arguments, model_state) = bind(&request, &data, &descriptor);
        assert!(result.is_ok());
        assert_eq!(arguments.get("id"), Some(&json!(5)));
        assert!(model_state.is_valid());
        assert_eq!(model_state.get("id").unwrap().attempted_value.as_deref(), Some("5"));
    }

    #[test]
    fn test_conversion_failure_is_a_model_error() {
        let request = RequestContext::get("/users/abc");
        let data = route_data(&[("id", "abc")]);
        let descriptor = ControllerDescriptor::new::<UsersController>("Get")
            .parameter(ParameterDescriptor::route("id", ParameterKind::Int));

        let (result, arguments, model_state) = bind(&request, &data, &descriptor);
        assert!(result.is_ok());
        assert!(arguments.is_empty());
        assert_eq!(model_state.errors("id"), ["The value 'abc' is not valid for id."]);
    }

    #[test]
    fn test_required_parameter_missing() {
        let request = RequestContext::get("/users");
        let data = route_data(&[]);
        let descriptor = ControllerDescriptor::new::<UsersController>("List")
            .parameter(ParameterDescriptor::query("page", ParameterKind::Int).required())
            .parameter(ParameterDescriptor::query("size", ParameterKind::Int));

        let (_, arguments, model_state) = bind(&request, &data, &descriptor);
        assert!(arguments.is_empty());
        assert_eq!(model_state.errors("page"), ["The page field is required."]);
        assert!(model_state.get("size").is_none());
    }

    #[test]
    fn test_default_source_prefers_route_then_query() {
        let request = RequestContext::builder()
            .path("/users/5?id=9&verbose=TRUE")
            .build();
        let data = route_data(&[("id", "5")]);
        let descriptor = ControllerDescriptor::new::<UsersController>("Get")
            .parameter(ParameterDescriptor::new("id", ParameterKind::Long))
            .parameter(ParameterDescriptor::new("verbose", ParameterKind::Bool));

        let (_, arguments, _) = bind(&request, &data, &descriptor);
        assert_eq!(arguments.get("id"), Some(&json!(5)));
        assert_eq!(arguments.get("verbose"), Some(&json!(true)));
        let order: Vec<_> = arguments.keys().map(String::as_str).collect();
        assert_eq!(order, vec!["id", "verbose"]);
    }

    #[test]
    fn test_header_and_uuid() {
        let request = RequestContext::builder()
            .path("/users")
            .header("x-tenant", "67E55044-10B1-426F-9247-BB680E5FE0C8")
            .build();
        let data = route_data(&[]);
        let descriptor = ControllerDescriptor::new::<UsersController>("List").parameter(
            ParameterDescriptor::header("tenant", "x-tenant", ParameterKind::Uuid),
        );

        let (_, arguments, _) = bind(&request, &data, &descriptor);
        assert_eq!(
            arguments.get("tenant"),
            Some(&json!("67e55044-10b1-426f-9247-bb680e5fe0c8"))
        );
    }

    #[test]
    fn test_json_body() {
        let request = RequestContext::post("/users")
            .json(&json!({"name": "Ada"}))
            .build();
        let data = route_data(&[]);
        let descriptor = ControllerDescriptor::new::<UsersController>("Create")
            .method(Method::POST)
            .parameter(ParameterDescriptor::body("user").required());

        let (result, arguments, model_state) = bind(&request, &data, &descriptor);
        assert!(result.is_ok());
        assert_eq!(arguments.get("user"), Some(&json!({"name": "Ada"})));
        assert!(model_state.is_valid());
    }

    #[test]
    fn test_string_body_is_decoded() {
        let request = RequestContext::post("/users/rename")
            .json(&json!("bob"))
            .build();
        let data = route_data(&[]);
        let descriptor = ControllerDescriptor::new::<UsersController>("Rename").parameter(
            ParameterDescriptor::new("name", ParameterKind::String).from_source(BindingSource::Body),
        );

        let (result, arguments, model_state) = bind(&request, &data, &descriptor);
        assert!(result.is_ok());
        assert_eq!(arguments.get("name"), Some(&json!("bob")));
        assert!(model_state.is_valid());
        assert_eq!(
            model_state.get("name").unwrap().attempted_value.as_deref(),
            Some("\"bob\"")
        );
    }

    #[test]
    fn test_non_string_json_for_string_body_is_a_model_error() {
        let request = RequestContext::post("/users/rename")
            .json(&json!({"name": "bob"}))
            .build();
        let data = route_data(&[]);
        let descriptor = ControllerDescriptor::new::<UsersController>("Rename").parameter(
            ParameterDescriptor::new("name", ParameterKind::String).from_source(BindingSource::Body),
        );

        let (result, arguments, model_state) = bind(&request, &data, &descriptor);
        assert!(result.is_ok());
        assert!(arguments.is_empty());
        assert_eq!(model_state.errors("name").len(), 1);
    }

    #[test]
    fn test_malformed_json_body_is_a_model_error() {
        let request = RequestContext::post("/users")
            .header("content-type", "application/json")
            .body("{\"name\":")
            .build();
        let data = route_data(&[]);
        let descriptor = ControllerDescriptor::new::<UsersController>("Create")
            .parameter(ParameterDescriptor::body("user"));

        let (result, arguments, model_state) = bind(&request, &data, &descriptor);
        assert!(result.is_ok());
        assert!(arguments.is_empty());
        assert_eq!(model_state.errors("user").len(), 1);
    }

    #[test]
    fn test_unsupported_content_type_is_a_fault() {
        let request = RequestContext::post("/users")
            .header("content-type", "text/plain; charset=utf-8")
            .body("name=Ada")
            .build();
        let data = route_data(&[]);
        let descriptor = ControllerDescriptor::new::<UsersController>("Create")
            .parameter(ParameterDescriptor::body("user"));

        let (result, _, _) = bind(&request, &data, &descriptor);
        let err = result.unwrap_err();
        assert_eq!(
            err.to_string(),
            "unsupported content type 'text/plain' for body parameter 'user'"
        );
    }

    #[test]
    fn test_factory_applies_error_cap() {
        let request = RequestContext::builder().path("/x?a=x&b=x&c=x").build();
        let data = route_data(&[]);
        let descriptor = ControllerDescriptor::new::<UsersController>("Many")
            .parameter(ParameterDescriptor::query("a", ParameterKind::Int))
            .parameter(ParameterDescriptor::query("b", ParameterKind::Int))
            .parameter(ParameterDescriptor::query("c", ParameterKind::Int));

        let context = InvocationContext::for_controller(&request, &data, &descriptor);
        let mut invoker = BindingInvokerFactory::new(2).create_invoker(context).unwrap();
        futures_executor::block_on(invoker.invoke()).unwrap();

        let binding = invoker.as_model_binding().unwrap();
        let model_state = binding.context().model_state();
        assert!(model_state.has_reached_max_errors());
        assert_eq!(model_state.errors("a").len(), 1);
        assert!(model_state.errors("c").is_empty());
    }

    #[test]
    fn test_rebinding_starts_fresh() {
        let request = RequestContext::get("/users/5");
        let data = route_data(&[("id", "5")]);
        let descriptor = ControllerDescriptor::new::<UsersController>("Get")
            .parameter(ParameterDescriptor::route("id", ParameterKind::Int));

        let context = InvocationContext::for_controller(&request, &data, &descriptor);
        let mut invoker = ArgumentBindingInvoker::new(context);
        futures_executor::block_on(invoker.bind_and_invoke()).unwrap();
        futures_executor::block_on(invoker.bind_and_invoke()).unwrap();
        assert_eq!(invoker.bound_arguments().len(), 1);
    }
}
