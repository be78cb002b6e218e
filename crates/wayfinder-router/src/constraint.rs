//! Inline route-parameter constraints (`{id:int}`).

use std::fmt;

/// A constraint applied to a route parameter's decoded value.
///
/// A segment that fails its constraint does not match, so the router moves on
/// to the next candidate template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteConstraint {
    /// A 32-bit signed integer.
    Int,
    /// A 64-bit signed integer.
    Long,
    /// `true` or `false`, case-insensitive.
    Bool,
    /// One or more ASCII letters.
    Alpha,
    /// A UUID in any of the standard textual forms.
    Guid,
    /// A floating-point number.
    Double,
}

impl RouteConstraint {
    /// Parses a constraint name as written in a template.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "int" => Some(Self::Int),
            "long" => Some(Self::Long),
            "bool" => Some(Self::Bool),
            "alpha" => Some(Self::Alpha),
            "guid" => Some(Self::Guid),
            "double" => Some(Self::Double),
            _ => None,
        }
    }

    /// Returns true if `value` satisfies this constraint.
    #[must_use]
    pub fn accepts(self, value: &str) -> bool {
        match self {
            Self::Int => value.parse::<i32>().is_ok(),
            Self::Long => value.parse::<i64>().is_ok(),
            Self::Bool => {
                value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("false")
            }
            Self::Alpha => !value.is_empty() && value.chars().all(|c| c.is_ascii_alphabetic()),
            Self::Guid => uuid::Uuid::parse_str(value).is_ok(),
            Self::Double => value.parse::<f64>().is_ok_and(f64::is_finite),
        }
    }

    /// The constraint name as written in templates.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Long => "long",
            Self::Bool => "bool",
            Self::Alpha => "alpha",
            Self::Guid => "guid",
            Self::Double => "double",
        }
    }
}

impl fmt::Display for RouteConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
