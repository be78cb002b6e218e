//! Conventional action selection over a catalog of controller actions.
//!
//! The selector reads the `controller` and `action` route values attached to
//! the request and picks the catalog entry with the same names (compared
//! case-insensitively) whose method filter accepts the request method.
//! Routes that map to a non-controller endpoint are looked up by route name.

use std::sync::Arc;

use http::Method;
use wayfinder_core::{
    ActionSelector, ControllerDescriptor, EndpointDescriptor, HandlerDescriptor, RequestContext,
};

/// Route value holding the controller name.
pub const CONTROLLER_KEY: &str = "controller";

/// Route value holding the action name.
pub const ACTION_KEY: &str = "action";

/// The set of actions known to the application under test.
#[derive(Debug, Clone, Default)]
pub struct ControllerCatalog {
    actions: Vec<ControllerDescriptor>,
    endpoints: Vec<(String, EndpointDescriptor)>,
}

impl ControllerCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a controller action.
    pub fn add(&mut self, action: ControllerDescriptor) -> &mut Self {
        self.actions.push(action);
        self
    }

    /// Maps a route name to a non-controller endpoint.
    pub fn add_endpoint(
        &mut self,
        route_name: impl Into<String>,
        endpoint: EndpointDescriptor,
    ) -> &mut Self {
        self.endpoints.push((route_name.into(), endpoint));
        self
    }

    /// All registered actions.
    #[must_use]
    pub fn actions(&self) -> &[ControllerDescriptor] {
        &self.actions
    }

    /// Number of actions and endpoints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len() + self.endpoints.len()
    }

    /// Returns true if the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Actions named `controller`/`action` that accept `method`.
    pub fn candidates<'c>(
        &'c self,
        controller: &'c str,
        action: &'c str,
        method: &'c Method,
    ) -> impl Iterator<Item = &'c ControllerDescriptor> + 'c {
        self.actions.iter().filter(move |d| {
            d.controller_name.eq_ignore_ascii_case(controller)
                && d.action_name.eq_ignore_ascii_case(action)
                && d.accepts(method)
        })
    }

    fn endpoint(&self, route_name: &str) -> Option<&EndpointDescriptor> {
        self.endpoints
            .iter()
            .find(|(name, _)| name == route_name)
            .map(|(_, endpoint)| endpoint)
    }
}

/// [`ActionSelector`] backed by a [`ControllerCatalog`].
#[derive(Debug, Clone)]
pub struct CatalogActionSelector {
    catalog: Arc<ControllerCatalog>,
}

impl CatalogActionSelector {
    /// Creates a selector over `catalog`.
    #[must_use]
    pub fn new(catalog: Arc<ControllerCatalog>) -> Self {
        Self { catalog }
    }

    /// The underlying catalog.
    #[must_use]
    pub fn catalog(&self) -> &ControllerCatalog {
        &self.catalog
    }
}

impl ActionSelector for CatalogActionSelector {
    fn select(&self, request: &RequestContext) -> anyhow::Result<Option<HandlerDescriptor>> {
        let Some(route_data) = request.route_data() else {
            return Ok(None);
        };

        if let Some(endpoint) = route_data
            .entry()
            .and_then(|entry| self.catalog.endpoint(&entry.name))
        {
            return Ok(Some(HandlerDescriptor::Endpoint(endpoint.clone())));
        }

        let (Some(controller), Some(action)) =
            (route_data.value(CONTROLLER_KEY), route_data.value(ACTION_KEY))
        else {
            return Ok(None);
        };

        let candidates: Vec<_> = self
            .catalog
            .candidates(controller, action, request.method())
            .collect();

        match candidates.as_slice() {
            [] => Ok(None),
            [only] => Ok(Some(HandlerDescriptor::Controller((*only).clone()))),
            many => {
                let names: Vec<String> = many
                    .iter()
                    .map(|d| format!("{} ({})", d.display_name(), d.handler_type.full_name()))
                    .collect();
                Err(anyhow::anyhow!(
                    "multiple actions matched the route data: {}",
                    names.join(", ")
                ))
            }
        }
    }
}
