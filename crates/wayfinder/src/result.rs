//! The outcome of one resolution attempt.

use std::fmt;

use serde::Serialize;
use wayfinder_core::{BoundArguments, ControllerDescriptor, HandlerType, ModelState, RouteData};

/// The pipeline stage at which resolution stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    /// The router raised while matching the path.
    RouteData,
    /// The action selector raised.
    ActionSelection,
    /// The action selector found nothing.
    NoActionMatched,
    /// Argument binding raised.
    ArgumentBinding,
}

impl FailureStage {
    /// Stable lowercase name, used as a log field.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RouteData => "route_data",
            Self::ActionSelection => "action_selection",
            Self::NoActionMatched => "no_action_matched",
            Self::ArgumentBinding => "argument_binding",
        }
    }
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolution that stopped at a resolvable failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedRoute {
    /// Where the pipeline stopped.
    pub stage: FailureStage,
    /// Human-readable reason.
    pub reason: String,
}

impl UnresolvedRoute {
    /// The router raised `error`.
    #[must_use]
    pub fn route_data(error: &anyhow::Error) -> Self {
        Self::from_fault(FailureStage::RouteData, "resolve route data", error)
    }

    /// The selector raised `error`.
    #[must_use]
    pub fn action_selection(error: &anyhow::Error) -> Self {
        Self::from_fault(FailureStage::ActionSelection, "select an action", error)
    }

    /// The selector matched nothing.
    #[must_use]
    pub fn no_action_matched() -> Self {
        Self {
            stage: FailureStage::NoActionMatched,
            reason: "action could not be matched".to_string(),
        }
    }

    /// Binding raised `error`.
    #[must_use]
    pub fn argument_binding(error: &anyhow::Error) -> Self {
        Self::from_fault(FailureStage::ArgumentBinding, "bind the action arguments", error)
    }

    // only the innermost message is kept
    fn from_fault(stage: FailureStage, step: &str, error: &anyhow::Error) -> Self {
        Self {
            stage,
            reason: format!(
                "exception was thrown when trying to {step}: '{}'",
                error.root_cause()
            ),
        }
    }
}

impl fmt::Display for UnresolvedRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason)
    }
}

/// A fully resolved controller action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedAction {
    /// Declaring controller type.
    pub handler_type: HandlerType,
    /// Controller (group) name.
    pub controller_name: String,
    /// Action name.
    pub action_name: String,
    /// Arguments the invoker bound, in parameter order.
    pub arguments: BoundArguments,
    /// Final route data.
    pub route_data: RouteData,
    /// Binding and validation state.
    pub model_state: ModelState,
}

impl ResolvedAction {
    /// Assembles a result from the selected action and what binding produced.
    #[must_use]
    pub fn new(
        descriptor: &ControllerDescriptor,
        arguments: BoundArguments,
        route_data: RouteData,
        model_state: ModelState,
    ) -> Self {
        Self {
            handler_type: descriptor.handler_type,
            controller_name: descriptor.controller_name.clone(),
            action_name: descriptor.action_name.clone(),
            arguments,
            route_data,
            model_state,
        }
    }

    /// Short handler type name, e.g. `UsersController`.
    #[must_use]
    pub fn handler_name(&self) -> &'static str {
        self.handler_type.name()
    }

    /// Returns the bound value of `name`.
    #[must_use]
    pub fn argument(&self, name: &str) -> Option<&serde_json::Value> {
        self.arguments.get(name)
    }
}

/// The terminal value of [`resolve`](crate::resolve).
///
/// Exactly one shape is populated: either a resolved action or a reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ResolvedRoute {
    /// Every stage succeeded.
    Resolved(ResolvedAction),
    /// A stage failed in an assertable way.
    Unresolved(UnresolvedRoute),
}

impl ResolvedRoute {
    /// Returns true for the resolved shape.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }

    /// The failure reason, if unresolved.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Unresolved(unresolved) => Some(&unresolved.reason),
            Self::Resolved(_) => None,
        }
    }

    /// The failure stage, if unresolved.
    #[must_use]
    pub fn stage(&self) -> Option<FailureStage> {
        match self {
            Self::Unresolved(unresolved) => Some(unresolved.stage),
            Self::Resolved(_) => None,
        }
    }

    /// The resolved action, if resolved.
    #[must_use]
    pub fn action(&self) -> Option<&ResolvedAction> {
        match self {
            Self::Resolved(action) => Some(action),
            Self::Unresolved(_) => None,
        }
    }

    /// Consumes the result, returning the resolved action.
    #[must_use]
    pub fn into_action(self) -> Option<ResolvedAction> {
        match self {
            Self::Resolved(action) => Some(action),
            Self::Unresolved(_) => None,
        }
    }
}

impl From<ResolvedAction> for ResolvedRoute {
    fn from(action: ResolvedAction) -> Self {
        Self::Resolved(action)
    }
}

impl From<UnresolvedRoute> for ResolvedRoute {
    fn from(unresolved: UnresolvedRoute) -> Self {
        Self::Unresolved(unresolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wayfinder_core::RouteValues;

    struct UsersController;

    #[test]
    fn test_reason_uses_innermost_message() {
        let error = anyhow::anyhow!("disk on fire")
            .context("router lookup")
            .context("while matching");
        let unresolved = UnresolvedRoute::route_data(&error);
        assert_eq!(
            unresolved.reason,
            "exception was thrown when trying to resolve route data: 'disk on fire'"
        );
        assert_eq!(unresolved.stage, FailureStage::RouteData);
    }

    #[test]
    fn test_stage_reasons() {
        let error = anyhow::anyhow!("boom");
        assert_eq!(
            UnresolvedRoute::action_selection(&error).reason,
            "exception was thrown when trying to select an action: 'boom'"
        );
        assert_eq!(
            UnresolvedRoute::argument_binding(&error).reason,
            "exception was thrown when trying to bind the action arguments: 'boom'"
        );
        assert_eq!(
            UnresolvedRoute::no_action_matched().reason,
            "action could not be matched"
        );
    }

    #[test]
    fn test_exactly_one_shape() {
        let unresolved: ResolvedRoute = UnresolvedRoute::no_action_matched().into();
        assert!(!unresolved.is_resolved());
        assert!(unresolved.action().is_none());
        assert_eq!(unresolved.stage(), Some(FailureStage::NoActionMatched));

        let descriptor = ControllerDescriptor::new::<UsersController>("Get");
        let mut arguments = BoundArguments::new();
        arguments.insert("id".to_string(), serde_json::json!(5));
        let resolved: ResolvedRoute = ResolvedAction::new(
            &descriptor,
            arguments,
            RouteData::unmatched(),
            ModelState::new(),
        )
        .into();

        assert!(resolved.is_resolved());
        assert!(resolved.reason().is_none());
        let action = resolved.into_action().unwrap();
        assert_eq!(action.handler_name(), "UsersController");
        assert_eq!(action.controller_name, "Users");
        assert_eq!(action.argument("id"), Some(&serde_json::json!(5)));
    }

    #[test]
    fn test_serialized_shape() {
        let values: RouteValues = [("id", "5")].into_iter().collect();
        let descriptor = ControllerDescriptor::new::<UsersController>("Get");
        let resolved = ResolvedRoute::Resolved(ResolvedAction::new(
            &descriptor,
            BoundArguments::new(),
            RouteData::matched(
                values,
                wayfinder_core::RouteEntryId {
                    name: "Users.Get".to_string(),
                    template: "users/{id}".to_string(),
                },
            ),
            ModelState::new(),
        ));
        let json = serde_json::to_value(&resolved).unwrap();
        assert_eq!(json["outcome"], "resolved");
        assert_eq!(json["action_name"], "Get");
        assert_eq!(json["route_data"]["values"]["id"], "5");

        let json = serde_json::to_value(ResolvedRoute::from(UnresolvedRoute::no_action_matched()))
            .unwrap();
        assert_eq!(json["outcome"], "unresolved");
        assert_eq!(json["stage"], "no_action_matched");
    }
}
