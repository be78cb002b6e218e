//! Binding and validation state accumulated while arguments are bound.

use indexmap::IndexMap;
use serde::Serialize;

/// Bound action arguments, keyed by parameter name in declaration order.
pub type BoundArguments = IndexMap<String, serde_json::Value>;

/// Default cap on recorded model errors.
pub const DEFAULT_MAX_MODEL_ERRORS: usize = 200;

/// Message recorded once the error cap is hit.
pub const MAX_ERRORS_REACHED: &str = "The maximum number of allowed model errors has been reached.";

/// State recorded for one model key.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ModelStateEntry {
    /// The raw value the binder attempted to convert.
    pub attempted_value: Option<String>,
    /// Errors recorded for this key.
    pub errors: Vec<String>,
}

impl ModelStateEntry {
    /// Returns true if no errors were recorded.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Ordered model state.
///
/// Error recording is capped: once `max_errors - 1` errors are stored, one
/// final [`MAX_ERRORS_REACHED`] error is recorded under the empty key and
/// further errors are dropped.
///
/// # Example
///
/// ```rust
/// use wayfinder_core::ModelState;
///
/// let mut state = ModelState::new();
/// state.set_attempted_value("id", "abc");
/// state.add_error("id", "The value 'abc' is not valid for id.");
///
/// assert!(!state.is_valid());
/// assert_eq!(state.error_count(), 1);
/// assert_eq!(state.get("id").unwrap().attempted_value.as_deref(), Some("abc"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelState {
    #[serde(flatten)]
    entries: IndexMap<String, ModelStateEntry>,
    #[serde(skip)]
    max_errors: usize,
    #[serde(skip)]
    error_count: usize,
    #[serde(skip)]
    max_reached: bool,
}

impl Default for ModelState {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelState {
    /// Creates empty model state with the default error cap.
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_errors(DEFAULT_MAX_MODEL_ERRORS)
    }

    /// Creates empty model state with a custom error cap (at least 1).
    #[must_use]
    pub fn with_max_errors(max_errors: usize) -> Self {
        Self {
            entries: IndexMap::new(),
            max_errors: max_errors.max(1),
            error_count: 0,
            max_reached: false,
        }
    }

    /// Records the raw value attempted for `key`.
    pub fn set_attempted_value(&mut self, key: &str, raw: impl Into<String>) {
        self.entry_mut(key).attempted_value = Some(raw.into());
    }

    /// Records an error for `key`.
    ///
    /// Returns `false` when the cap prevented the error from being stored.
    pub fn add_error(&mut self, key: &str, message: impl Into<String>) -> bool {
        if self.error_count + 1 >= self.max_errors {
            if !self.max_reached {
                self.max_reached = true;
                self.error_count += 1;
                self.entry_mut("").errors.push(MAX_ERRORS_REACHED.to_string());
            }
            return false;
        }
        self.error_count += 1;
        self.entry_mut(key).errors.push(message.into());
        true
    }

    /// Returns true if no errors are recorded.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.error_count == 0
    }

    /// Returns the total number of recorded errors.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    /// Returns true if the error cap was hit.
    #[must_use]
    pub fn has_reached_max_errors(&self) -> bool {
        self.max_reached
    }

    /// Returns the entry for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ModelStateEntry> {
        self.entries.get(key)
    }

    /// Returns the errors recorded for `key`.
    #[must_use]
    pub fn errors(&self, key: &str) -> &[String] {
        self.entries
            .get(key)
            .map(|e| e.errors.as_slice())
            .unwrap_or_default()
    }

    /// Returns the number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no keys are recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ModelStateEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn entry_mut(&mut self, key: &str) -> &mut ModelStateEntry {
        self.entries.entry(key.to_string()).or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_valid() {
        let state = ModelState::new();
        assert!(state.is_valid());
        assert!(state.is_empty());
        assert_eq!(state.error_count(), 0);
        assert!(state.errors("id").is_empty());
    }

    #[test]
    fn test_attempted_value_without_error_stays_valid() {
        let mut state = ModelState::new();
        state.set_attempted_value("id", "5");
        assert!(state.is_valid());
        assert!(state.get("id").unwrap().is_valid());
    }

    #[test]
    fn test_errors_accumulate_per_key() {
        let mut state = ModelState::new();
        assert!(state.add_error("id", "first"));
        assert!(state.add_error("id", "second"));
        assert!(state.add_error("name", "third"));

        assert_eq!(state.errors("id"), ["first", "second"]);
        assert_eq!(state.error_count(), 3);
        let keys: Vec<_> = state.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["id", "name"]);
    }

    #[test]
    fn test_error_cap() {
        let mut state = ModelState::with_max_errors(3);
        assert!(state.add_error("a", "1"));
        assert!(state.add_error("b", "2"));
        assert!(!state.add_error("c", "3"));
        assert!(!state.add_error("d", "4"));

        assert!(state.has_reached_max_errors());
        assert_eq!(state.error_count(), 3);
        assert_eq!(state.errors(""), [MAX_ERRORS_REACHED]);
        assert!(state.get("c").is_none());
    }

    #[test]
    fn test_zero_cap_is_clamped() {
        let mut state = ModelState::with_max_errors(0);
        assert!(!state.add_error("a", "1"));
        assert_eq!(state.errors(""), [MAX_ERRORS_REACHED]);
    }

    #[test]
    fn test_serializes_entries_only() {
        let mut state = ModelState::new();
        state.set_attempted_value("id", "x");
        state.add_error("id", "bad");

        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": {"attempted_value": "x", "errors": ["bad"]}})
        );
    }
}
