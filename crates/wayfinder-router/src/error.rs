//! Router error types.

use thiserror::Error;

/// Errors raised while parsing a route template.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// A parameter has no name (`{}` or `{:int}`).
    #[error("route template '{template}' contains a parameter with an empty name")]
    EmptyParameterName {
        /// The template as written.
        template: String,
    },

    /// The same parameter name appears twice.
    #[error("route template '{template}' declares parameter '{name}' more than once")]
    DuplicateParameter {
        /// The template as written.
        template: String,
        /// The repeated name.
        name: String,
    },

    /// A catch-all parameter is not the last segment.
    #[error("route template '{template}' has a catch-all parameter that is not the last segment")]
    CatchAllNotLast {
        /// The template as written.
        template: String,
    },

    /// A required segment follows an optional parameter.
    #[error("route template '{template}' has a required segment after optional parameter '{name}'")]
    RequiredAfterOptional {
        /// The template as written.
        template: String,
        /// The optional parameter.
        name: String,
    },

    /// A parameter is both optional and has a default.
    #[error("route parameter '{name}' cannot be optional and have a default value")]
    OptionalWithDefault {
        /// The parameter name.
        name: String,
    },

    /// The constraint name is not recognised.
    #[error("route parameter '{name}' uses unknown constraint '{constraint}'")]
    UnknownConstraint {
        /// The parameter name.
        name: String,
        /// The constraint as written.
        constraint: String,
    },

    /// A segment mixes literal text and parameters, or has unbalanced braces.
    #[error("route template '{template}' has an unsupported segment '{segment}'")]
    InvalidSegment {
        /// The template as written.
        template: String,
        /// The offending segment.
        segment: String,
    },
}

/// Errors raised while matching a request path.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RoutingError {
    /// A path segment is not valid percent-encoded UTF-8.
    #[error("path segment '{segment}' is not valid percent-encoded UTF-8")]
    MalformedSegment {
        /// The raw segment.
        segment: String,
    },
}
