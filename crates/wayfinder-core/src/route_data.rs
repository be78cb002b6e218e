//! Route values and matched route data.
//!
//! [`RouteValues`] stores route-parameter values using a small-vector
//! optimization; most routes carry fewer than four values
//! (`controller`, `action`, `id`).

use serde::{Serialize, Serializer};
use smallvec::SmallVec;
use std::fmt;

/// Maximum number of values stored inline (stack allocated).
const INLINE_VALUES: usize = 4;

/// Ordered route values keyed by parameter name.
///
/// Names are compared case-insensitively, as route values are in
/// controller-style routing. Inserting an existing name replaces its value
/// and keeps its position.
///
/// # Example
///
/// ```rust
/// use wayfinder_core::RouteValues;
///
/// let mut values = RouteValues::new();
/// values.insert("controller", "Users");
/// values.insert("id", "5");
///
/// assert_eq!(values.get("Controller"), Some("Users"));
/// assert_eq!(values.get("id"), Some("5"));
/// assert_eq!(values.get("action"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RouteValues {
    inner: SmallVec<[(String, String); INLINE_VALUES]>,
}

impl RouteValues {
    /// Creates an empty set of route values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(slot) = self
            .inner
            .iter_mut()
            .find(|(n, _)| n.eq_ignore_ascii_case(&name))
        {
            slot.1 = value;
        } else {
            self.inner.push((name, value));
        }
    }

    /// Inserts a value only if no value with that name exists yet.
    pub fn insert_if_absent(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        if !self.contains(&name) {
            self.inner.push((name, value.into()));
        }
    }

    /// Returns the value for a name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns true if a value with this name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Returns true if there are no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the number of values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns an iterator over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RouteValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut values = Self::new();
        for (k, v) in iter {
            values.insert(k, v);
        }
        values
    }
}

impl Serialize for RouteValues {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

/// Identity of the router entry that produced a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteEntryId {
    /// Route name (explicit, or derived from the handler for attribute routes).
    pub name: String,
    /// The route template as written.
    pub template: String,
}

impl fmt::Display for RouteEntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.template)
    }
}

/// Result of matching a request path against a router.
///
/// An unmatched request yields empty route data: no values and no entry.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RouteData {
    values: RouteValues,
    entry: Option<RouteEntryId>,
}

impl RouteData {
    /// Creates route data for a successful match.
    #[must_use]
    pub fn matched(values: RouteValues, entry: RouteEntryId) -> Self {
        Self {
            values,
            entry: Some(entry),
        }
    }

    /// Creates empty route data (no entry matched).
    #[must_use]
    pub fn unmatched() -> Self {
        Self::default()
    }

    /// Returns the matched route values.
    #[must_use]
    pub fn values(&self) -> &RouteValues {
        &self.values
    }

    /// Returns a single route value.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&str> {
        self.values.get(name)
    }

    /// Returns the router entry that matched, if any.
    #[must_use]
    pub fn entry(&self) -> Option<&RouteEntryId> {
        self.entry.as_ref()
    }

    /// Returns true if a router entry matched.
    #[must_use]
    pub fn is_match(&self) -> bool {
        self.entry.is_some()
    }
}
