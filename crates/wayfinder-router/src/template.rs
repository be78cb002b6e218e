//! Route-template parsing and matching.
//!
//! A template is a `/`-separated list of segments. Each segment is one of:
//!
//! - a literal (`users`), compared case-insensitively by default
//! - a parameter (`{id}`), optionally constrained (`{id:int}`), optional
//!   (`{id?}`) or defaulted (`{action=Index}`)
//! - a catch-all (`{*path}` or `*path`), which must be last
//!
//! Empty segments are ignored, so `/users/` and `users` parse the same way.

use std::fmt;

use wayfinder_core::RouteValues;

use crate::constraint::RouteConstraint;
use crate::error::TemplateError;

/// A named route parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// Parameter name.
    pub name: String,
    /// Inline constraint, if any.
    pub constraint: Option<RouteConstraint>,
    /// Whether the segment may be absent.
    pub optional: bool,
    /// Value used when the segment is absent.
    pub default: Option<String>,
}

impl Parameter {
    fn may_be_absent(&self) -> bool {
        self.optional || self.default.is_some()
    }
}

/// One parsed template segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Literal text.
    Literal(String),
    /// A single-segment parameter.
    Parameter(Parameter),
    /// A parameter capturing the rest of the path.
    CatchAll(String),
}

impl Segment {
    /// Rank used to order templates: lower ranks are tried first.
    fn rank(&self) -> u8 {
        match self {
            Self::Literal(_) => 1,
            Self::Parameter(p) if p.may_be_absent() => 4,
            Self::Parameter(p) if p.constraint.is_some() => 2,
            Self::Parameter(_) => 3,
            Self::CatchAll(_) => 5,
        }
    }
}

/// A parsed route template.
///
/// # Example
///
/// ```rust
/// use wayfinder_router::RouteTemplate;
///
/// let template = RouteTemplate::parse("users/{id:int}").unwrap();
/// let path = vec!["users".to_string(), "5".to_string()];
/// let values = template.match_segments(&path, false).unwrap();
/// assert_eq!(values.get("id"), Some("5"));
///
/// let path = vec!["users".to_string(), "abc".to_string()];
/// assert!(template.match_segments(&path, false).is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTemplate {
    text: String,
    segments: Vec<Segment>,
}

impl RouteTemplate {
    /// Parses `template`.
    ///
    /// # Errors
    ///
    /// Returns a [`TemplateError`] for empty or duplicate parameter names,
    /// unknown constraints, misplaced catch-alls, required segments after an
    /// optional one, and segments mixing literal text with parameters.
    pub fn parse(template: &str) -> Result<Self, TemplateError> {
        let trimmed = template.trim_start_matches('~');
        let mut segments = Vec::new();
        for raw in trimmed.split('/').filter(|s| !s.is_empty()) {
            segments.push(parse_segment(template, raw)?);
        }
        validate(template, &segments)?;
        Ok(Self {
            text: template.to_string(),
            segments,
        })
    }

    /// The template as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The parsed segments.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Names of every parameter in declaration order.
    pub fn parameter_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Parameter(p) => Some(p.name.as_str()),
            Segment::CatchAll(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    pub(crate) fn precedence(&self) -> Vec<u8> {
        self.segments.iter().map(Segment::rank).collect()
    }

    /// Matches already-split (and decoded) path segments.
    ///
    /// Returns the captured values, with template defaults filled in for
    /// absent segments, or `None` if the path does not fit.
    #[must_use]
    pub fn match_segments(&self, path: &[String], case_sensitive: bool) -> Option<RouteValues> {
        let mut values = RouteValues::new();
        let mut index = 0;

        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => {
                    let candidate = path.get(index)?;
                    let equal = if case_sensitive {
                        candidate == text
                    } else {
                        candidate.eq_ignore_ascii_case(text)
                    };
                    if !equal {
                        return None;
                    }
                    index += 1;
                }
                Segment::Parameter(param) => match path.get(index) {
                    Some(value) => {
                        if let Some(constraint) = param.constraint {
                            if !constraint.accepts(value) {
                                return None;
                            }
                        }
                        values.insert(param.name.as_str(), value.as_str());
                        index += 1;
                    }
                    None if param.optional => {}
                    None => values.insert(param.name.as_str(), param.default.clone()?),
                },
                Segment::CatchAll(name) => {
                    let rest = path.get(index..).unwrap_or_default();
                    if !rest.is_empty() {
                        values.insert(name.as_str(), rest.join("/"));
                    }
                    index = path.len();
                }
            }
        }

        (index == path.len()).then_some(values)
    }
}

impl fmt::Display for RouteTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

fn parse_segment(template: &str, raw: &str) -> Result<Segment, TemplateError> {
    let invalid = || TemplateError::InvalidSegment {
        template: template.to_string(),
        segment: raw.to_string(),
    };

    if let Some(name) = raw.strip_prefix('*') {
        return catch_all(template, name);
    }

    let Some(inner) = raw.strip_prefix('{').and_then(|s| s.strip_suffix('}')) else {
        if raw.contains(['{', '}']) {
            return Err(invalid());
        }
        return Ok(Segment::Literal(raw.to_string()));
    };
    if inner.contains(['{', '}']) {
        return Err(invalid());
    }
    if let Some(name) = inner.strip_prefix('*') {
        return catch_all(template, name);
    }

    let (head, default) = match inner.split_once('=') {
        Some((head, default)) => (head, Some(default.to_string())),
        None => (inner, None),
    };
    let (head, optional) = match head.strip_suffix('?') {
        Some(head) => (head, true),
        None => (head, false),
    };
    let (name, constraint) = match head.split_once(':') {
        Some((name, constraint)) => (name, Some(constraint)),
        None => (head, None),
    };

    if name.is_empty() {
        return Err(TemplateError::EmptyParameterName {
            template: template.to_string(),
        });
    }
    if optional && default.is_some() {
        return Err(TemplateError::OptionalWithDefault {
            name: name.to_string(),
        });
    }
    let constraint = constraint
        .map(|c| {
            RouteConstraint::parse(c).ok_or_else(|| TemplateError::UnknownConstraint {
                name: name.to_string(),
                constraint: c.to_string(),
            })
        })
        .transpose()?;

    Ok(Segment::Parameter(Parameter {
        name: name.to_string(),
        constraint,
        optional,
        default,
    }))
}

fn catch_all(template: &str, name: &str) -> Result<Segment, TemplateError> {
    // `{**path}` is accepted as an alias
    let name = name.trim_start_matches('*');
    if name.is_empty() {
        return Err(TemplateError::EmptyParameterName {
            template: template.to_string(),
        });
    }
    Ok(Segment::CatchAll(name.to_string()))
}

fn validate(template: &str, segments: &[Segment]) -> Result<(), TemplateError> {
    let mut seen: Vec<&str> = Vec::new();
    let mut optional: Option<&str> = None;

    for (index, segment) in segments.iter().enumerate() {
        let name = match segment {
            Segment::Literal(_) => None,
            Segment::Parameter(p) => Some(p.name.as_str()),
            Segment::CatchAll(name) => Some(name.as_str()),
        };

        if let Some(name) = name {
            if seen.iter().any(|s| s.eq_ignore_ascii_case(name)) {
                return Err(TemplateError::DuplicateParameter {
                    template: template.to_string(),
                    name: name.to_string(),
                });
            }
            seen.push(name);
        }

        match segment {
            Segment::CatchAll(_) if index + 1 != segments.len() => {
                return Err(TemplateError::CatchAllNotLast {
                    template: template.to_string(),
                });
            }
            Segment::Parameter(p) if p.may_be_absent() => {
                optional.get_or_insert(p.name.as_str());
            }
            Segment::Literal(_) | Segment::Parameter(_) => {
                if let Some(name) = optional {
                    return Err(TemplateError::RequiredAfterOptional {
                        template: template.to_string(),
                        name: name.to_string(),
                    });
                }
            }
            Segment::CatchAll(_) => {}
        }
    }
    Ok(())
}
