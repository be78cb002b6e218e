//! Ordered route table.
//!
//! Entries are kept sorted by template precedence so that, for a given path,
//! literal segments win over constrained parameters, constrained parameters
//! win over plain ones, and catch-alls are tried last. Entries with equal
//! precedence keep their registration order.

use futures_util::future::{self, BoxFuture, FutureExt};
use http::Method;
use wayfinder_core::{RequestContext, RouteData, RouteEntryId, RouteValues, Router};

use crate::error::{RoutingError, TemplateError};
use crate::template::RouteTemplate;

/// Options controlling how paths are matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoutingOptions {
    /// Compare literal segments case-sensitively.
    pub case_sensitive: bool,
    /// Percent-decode path segments before matching and capture.
    pub decode_values: bool,
}

impl Default for RoutingOptions {
    fn default() -> Self {
        Self {
            case_sensitive: false,
            decode_values: true,
        }
    }
}

/// A named template plus its method filter and route defaults.
#[derive(Debug, Clone)]
pub struct RouteEntry {
    name: String,
    template: RouteTemplate,
    methods: Vec<Method>,
    defaults: RouteValues,
    precedence: Vec<u8>,
}

impl RouteEntry {
    /// Parses `template` into a new entry.
    ///
    /// # Errors
    ///
    /// Returns a [`TemplateError`] if the template is malformed.
    pub fn new(name: impl Into<String>, template: &str) -> Result<Self, TemplateError> {
        let template = RouteTemplate::parse(template)?;
        let precedence = template.precedence();
        Ok(Self {
            name: name.into(),
            template,
            methods: Vec::new(),
            defaults: RouteValues::new(),
            precedence,
        })
    }

    /// Restricts the entry to `method` (may be called repeatedly).
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        if !self.methods.contains(&method) {
            self.methods.push(method);
        }
        self
    }

    /// Adds a route value used when the path does not supply one.
    #[must_use]
    pub fn default_value(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.defaults.insert(name, value);
        self
    }

    /// The entry name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The parsed template.
    #[must_use]
    pub fn template(&self) -> &RouteTemplate {
        &self.template
    }

    /// Allowed methods; empty means any.
    #[must_use]
    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    /// Route defaults.
    #[must_use]
    pub fn defaults(&self) -> &RouteValues {
        &self.defaults
    }

    /// Returns true if the entry accepts `method`.
    #[must_use]
    pub fn accepts(&self, method: &Method) -> bool {
        self.methods.is_empty() || self.methods.contains(method)
    }

    fn id(&self) -> RouteEntryId {
        RouteEntryId {
            name: self.name.clone(),
            template: self.template.as_str().to_string(),
        }
    }

    fn try_match(&self, method: &Method, path: &[String], case_sensitive: bool) -> Option<RouteValues> {
        if !self.accepts(method) {
            return None;
        }
        let mut values = self.template.match_segments(path, case_sensitive)?;
        for (name, value) in self.defaults.iter() {
            values.insert_if_absent(name, value);
        }
        Some(values)
    }
}

/// A table of route templates implementing [`Router`].
///
/// # Example
///
/// ```rust
/// use http::Method;
/// use wayfinder_router::RouteTable;
///
/// let mut table = RouteTable::new();
/// table.map(Method::GET, "users/me", "Users", "Me").unwrap();
/// table.map(Method::GET, "users/{id:int}", "Users", "Get").unwrap();
///
/// let data = table.match_path(&Method::GET, "/users/5").unwrap();
/// assert_eq!(data.value("controller"), Some("Users"));
/// assert_eq!(data.value("action"), Some("Get"));
/// assert_eq!(data.value("id"), Some("5"));
///
/// let data = table.match_path(&Method::GET, "/users/me").unwrap();
/// assert_eq!(data.value("action"), Some("Me"));
///
/// assert!(!table.match_path(&Method::GET, "/nope").unwrap().is_match());
/// ```
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
    options: RoutingOptions,
}

impl RouteTable {
    /// Creates an empty table with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty table with `options`.
    #[must_use]
    pub fn with_options(options: RoutingOptions) -> Self {
        Self {
            entries: Vec::new(),
            options,
        }
    }

    /// The matching options.
    #[must_use]
    pub fn options(&self) -> RoutingOptions {
        self.options
    }

    /// Maps a template to a controller action for one method.
    ///
    /// The entry is named `Controller.Action` and carries `controller` and
    /// `action` defaults so that the selector can find the action.
    ///
    /// # Errors
    ///
    /// Returns a [`TemplateError`] if the template is malformed.
    pub fn map(
        &mut self,
        method: Method,
        template: &str,
        controller: &str,
        action: &str,
    ) -> Result<&mut Self, TemplateError> {
        let entry = RouteEntry::new(format!("{controller}.{action}"), template)?
            .method(method)
            .default_value("controller", controller)
            .default_value("action", action);
        Ok(self.add(entry))
    }

    /// Maps a conventional route, such as
    /// `{controller=Home}/{action=Index}/{id?}`, accepting any method.
    ///
    /// # Errors
    ///
    /// Returns a [`TemplateError`] if the template is malformed.
    pub fn map_route<I, K, V>(
        &mut self,
        name: &str,
        template: &str,
        defaults: I,
    ) -> Result<&mut Self, TemplateError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut entry = RouteEntry::new(name, template)?;
        for (key, value) in defaults {
            entry = entry.default_value(key, value);
        }
        Ok(self.add(entry))
    }

    /// Adds a pre-built entry.
    pub fn add(&mut self, entry: RouteEntry) -> &mut Self {
        tracing::debug!(
            route = %entry.name,
            template = %entry.template,
            "route registered"
        );
        self.entries.push(entry);
        // stable: equal precedence keeps registration order
        self.entries.sort_by(|a, b| a.precedence.cmp(&b.precedence));
        self
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in matching order.
    pub fn entries(&self) -> impl Iterator<Item = &RouteEntry> {
        self.entries.iter()
    }

    /// Matches `path` for `method`.
    ///
    /// Any query string is ignored. A path that no entry accepts yields
    /// unmatched (empty) route data rather than an error.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError::MalformedSegment`] when decoding is enabled and
    /// a segment is not valid percent-encoded UTF-8.
    pub fn match_path(&self, method: &Method, path: &str) -> Result<RouteData, RoutingError> {
        let path = path.split_once('?').map_or(path, |(p, _)| p);
        let segments = self.split(path)?;

        for entry in &self.entries {
            if let Some(values) = entry.try_match(method, &segments, self.options.case_sensitive) {
                tracing::trace!(route = %entry.name, path, "route matched");
                return Ok(RouteData::matched(values, entry.id()));
            }
        }

        tracing::trace!(path, "no route matched");
        Ok(RouteData::unmatched())
    }

    fn split(&self, path: &str) -> Result<Vec<String>, RoutingError> {
        path.split('/')
            .filter(|s| !s.is_empty())
            .map(|raw| {
                if self.options.decode_values {
                    urlencoding::decode(raw)
                        .map(|s| s.into_owned())
                        .map_err(|_| RoutingError::MalformedSegment {
                            segment: raw.to_string(),
                        })
                } else {
                    Ok(raw.to_string())
                }
            })
            .collect()
    }
}

impl Router for RouteTable {
    fn route<'a>(&'a self, request: &'a RequestContext) -> BoxFuture<'a, anyhow::Result<RouteData>> {
        let result = match request.path() {
            Some(path) => self
                .match_path(request.method(), path)
                .map_err(anyhow::Error::from),
            None => Ok(RouteData::unmatched()),
        };
        future::ready(result).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn users_table() -> RouteTable {
        let mut table = RouteTable::new();
        table
            .map(Method::GET, "users/{id}", "Users", "Get")
            .unwrap()
            .map(Method::GET, "users/me", "Users", "Me")
            .unwrap()
            .map(Method::DELETE, "users/{id:int}", "Users", "Delete")
            .unwrap()
            .map(Method::GET, "files/{*path}", "Files", "Download")
            .unwrap();
        table
    }

    #[test]
    fn test_static_beats_parameter_regardless_of_order() {
        let table = users_table();
        let data = table.match_path(&Method::GET, "/users/me").unwrap();
        assert_eq!(data.value("action"), Some("Me"));
        assert_eq!(data.entry().unwrap().name, "Users.Me");

        let data = table.match_path(&Method::GET, "/users/42").unwrap();
        assert_eq!(data.value("action"), Some("Get"));
        assert_eq!(data.value("id"), Some("42"));
    }

    #[test]
    fn test_method_filter() {
        let table = users_table();
        let data = table.match_path(&Method::DELETE, "/users/42").unwrap();
        assert_eq!(data.value("action"), Some("Delete"));

        // constraint rejects, and no other DELETE entry exists
        let data = table.match_path(&Method::DELETE, "/users/abc").unwrap();
        assert!(!data.is_match());

        let data = table.match_path(&Method::POST, "/users/42").unwrap();
        assert!(!data.is_match());
    }

    #[test]
    fn test_trailing_slash_and_query_ignored() {
        let table = users_table();
        let data = table.match_path(&Method::GET, "/users/7/?expand=true").unwrap();
        assert_eq!(data.value("id"), Some("7"));
    }

    #[test]
    fn test_values_are_decoded() {
        let table = users_table();
        let data = table.match_path(&Method::GET, "/users/john%20doe").unwrap();
        assert_eq!(data.value("id"), Some("john doe"));

        let mut raw = RouteTable::with_options(RoutingOptions {
            decode_values: false,
            ..RoutingOptions::default()
        });
        raw.map(Method::GET, "users/{id}", "Users", "Get").unwrap();
        let data = raw.match_path(&Method::GET, "/users/john%20doe").unwrap();
        assert_eq!(data.value("id"), Some("john%20doe"));
    }

    #[test]
    fn test_malformed_segment_is_an_error() {
        let table = users_table();
        let err = table.match_path(&Method::GET, "/users/%FF").unwrap_err();
        assert_eq!(
            err,
            RoutingError::MalformedSegment {
                segment: "%FF".to_string()
            }
        );
    }

    #[test]
    fn test_catch_all() {
        let table = users_table();
        let data = table.match_path(&Method::GET, "/files/docs/readme.md").unwrap();
        assert_eq!(data.value("path"), Some("docs/readme.md"));
        assert_eq!(data.value("controller"), Some("Files"));
    }

    #[test]
    fn test_conventional_route_defaults() {
        let mut table = RouteTable::new();
        table
            .map_route("default", "{controller=Home}/{action=Index}/{id?}", [("area", "main")])
            .unwrap();

        let data = table.match_path(&Method::GET, "/").unwrap();
        assert_eq!(data.value("controller"), Some("Home"));
        assert_eq!(data.value("action"), Some("Index"));
        assert_eq!(data.value("area"), Some("main"));

        let data = table.match_path(&Method::POST, "/orders/create").unwrap();
        assert_eq!(data.value("controller"), Some("orders"));
        assert_eq!(data.value("action"), Some("create"));
        assert_eq!(data.entry().unwrap().template, "{controller=Home}/{action=Index}/{id?}");
    }

    #[test]
    fn test_path_value_overrides_entry_default() {
        let mut table = RouteTable::new();
        let entry = RouteEntry::new("page", "pages/{action}")
            .unwrap()
            .default_value("action", "View");
        table.add(entry);
        let data = table.match_path(&Method::GET, "/pages/edit").unwrap();
        assert_eq!(data.value("action"), Some("edit"));
    }

    #[test]
    fn test_case_sensitive_option() {
        let mut table = RouteTable::with_options(RoutingOptions {
            case_sensitive: true,
            ..RoutingOptions::default()
        });
        table.map(Method::GET, "users", "Users", "List").unwrap();
        assert!(table.match_path(&Method::GET, "/users").unwrap().is_match());
        assert!(!table.match_path(&Method::GET, "/Users").unwrap().is_match());
    }

    #[test]
    fn test_router_trait() {
        let table = users_table();
        let request = RequestContext::get("/users/5");
        let data = futures_executor::block_on(table.route(&request)).unwrap();
        assert_eq!(data.value("id"), Some("5"));

        let request = RequestContext::get("/users/%FF");
        let err = futures_executor::block_on(table.route(&request)).unwrap_err();
        assert!(err.to_string().contains("%FF"));
    }

    #[test]
    fn test_empty_table_never_matches() {
        let table = RouteTable::new();
        assert!(table.is_empty());
        assert!(!table.match_path(&Method::GET, "/anything").unwrap().is_match());
    }

    proptest! {
        #[test]
        fn int_parameter_captures_any_i32(id in any::<i32>()) {
            let table = users_table();
            let path = format!("/users/{id}");
            let data = table.match_path(&Method::DELETE, &path).unwrap();
            let expected = id.to_string();
            prop_assert_eq!(data.value("id"), Some(expected.as_str()));
        }

        #[test]
        fn literal_segments_never_capture(segment in "[a-z]{1,12}") {
            let table = users_table();
            let path = format!("/users/{segment}");
            let data = table.match_path(&Method::GET, &path).unwrap();
            prop_assert!(data.is_match());
            let expected = if segment == "me" { "Me" } else { "Get" };
            prop_assert_eq!(data.value("action"), Some(expected));
        }
    }
}
