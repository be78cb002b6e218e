//! Request context types.
//!
//! A [`RequestContext`] describes one synthetic HTTP request under test. It is
//! created fresh for every resolution attempt, receives its route data exactly
//! once, and is dropped when the resolution call returns.

use crate::di::ServiceProvider;
use crate::route_data::RouteData;
use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::sync::{Arc, OnceLock};
use uuid::Uuid;

/// A unique identifier for each request, using UUID v7.
///
/// UUID v7 is time-ordered, which keeps log lines from one test run sortable.
///
/// # Example
///
/// ```
/// use wayfinder_core::RequestId;
///
/// let id = RequestId::new();
/// println!("Request ID: {}", id);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new unique request ID using UUID v7.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One synthetic HTTP request under test.
///
/// The path is optional: a request without a path never reaches the router.
///
/// # Example
///
/// ```
/// use wayfinder_core::RequestContext;
/// use http::Method;
///
/// let ctx = RequestContext::builder()
///     .method(Method::GET)
///     .path("/users/5")
///     .query("expand=true")
///     .build();
///
/// assert_eq!(ctx.path(), Some("/users/5"));
/// assert_eq!(ctx.query_value("expand").as_deref(), Some("true"));
/// assert!(ctx.route_data().is_none());
/// ```
#[derive(Debug)]
pub struct RequestContext {
    request_id: RequestId,
    method: Method,
    path: Option<String>,
    query: Option<String>,
    headers: HeaderMap,
    body: Bytes,
    route_data: OnceLock<RouteData>,
    services: Option<Arc<ServiceProvider>>,
}

impl RequestContext {
    /// Creates a builder for a request context.
    #[must_use]
    pub fn builder() -> RequestContextBuilder {
        RequestContextBuilder::new()
    }

    /// Shortcut for a `GET` request to `path`.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::builder().method(Method::GET).path(path).build()
    }

    /// Shortcut for a `POST` request to `path`.
    #[must_use]
    pub fn post(path: impl Into<String>) -> RequestContextBuilder {
        Self::builder().method(Method::POST).path(path)
    }

    /// Shortcut for a `PUT` request to `path`.
    #[must_use]
    pub fn put(path: impl Into<String>) -> RequestContextBuilder {
        Self::builder().method(Method::PUT).path(path)
    }

    /// Shortcut for a `DELETE` request to `path`.
    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::builder().method(Method::DELETE).path(path).build()
    }

    /// Returns the request ID.
    #[must_use]
    pub const fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Returns the HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request path, if one was set.
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Returns true if the request has a non-empty path.
    #[must_use]
    pub fn has_path(&self) -> bool {
        self.path.as_deref().is_some_and(|p| !p.is_empty())
    }

    /// Returns the raw query string without the leading `?`.
    #[must_use]
    pub fn query_string(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Returns the first percent-decoded query value for `name`.
    ///
    /// Keys are compared case-insensitively and `+` decodes to a space.
    #[must_use]
    pub fn query_value(&self, name: &str) -> Option<String> {
        let query = self.query.as_deref()?;
        query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
            .find(|(key, _)| decode_component(key).eq_ignore_ascii_case(name))
            .map(|(_, value)| decode_component(value).into_owned())
    }

    /// Returns the request headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns a specific header value as a string.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns the `content-type` header without parameters, lowercased.
    #[must_use]
    pub fn content_type(&self) -> Option<String> {
        self.header("content-type")
            .map(|ct| ct.split(';').next().unwrap_or(ct).trim().to_ascii_lowercase())
    }

    /// Returns the request body.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns the route data, once a router has matched this request.
    #[must_use]
    pub fn route_data(&self) -> Option<&RouteData> {
        self.route_data.get()
    }

    /// Attaches matched route data.
    ///
    /// Route data is written once. A second attach leaves the original in
    /// place and returns it.
    pub fn attach_route_data(&self, data: RouteData) -> &RouteData {
        if let Err(rejected) = self.route_data.set(data) {
            tracing::warn!(
                request_id = %self.request_id,
                rejected_entry = ?rejected.entry(),
                "route data already attached; keeping the original"
            );
        }
        self.route_data.get_or_init(RouteData::unmatched)
    }

    /// Returns the per-request service scope, if any.
    #[must_use]
    pub fn services(&self) -> Option<&Arc<ServiceProvider>> {
        self.services.as_ref()
    }
}

impl From<http::Request<Bytes>> for RequestContext {
    fn from(request: http::Request<Bytes>) -> Self {
        let (parts, body) = request.into_parts();
        RequestContextBuilder {
            method: parts.method,
            path: Some(parts.uri.path().to_string()),
            query: parts.uri.query().map(str::to_string),
            headers: parts.headers,
            body,
            services: None,
        }
        .build()
    }
}

fn decode_component(raw: &str) -> Cow<'_, str> {
    if raw.contains('+') {
        let spaced = raw.replace('+', " ");
        return Cow::Owned(
            urlencoding::decode(&spaced)
                .map(Cow::into_owned)
                .unwrap_or(spaced),
        );
    }
    urlencoding::decode(raw).unwrap_or(Cow::Borrowed(raw))
}

/// Builder for [`RequestContext`].
#[derive(Debug)]
pub struct RequestContextBuilder {
    method: Method,
    path: Option<String>,
    query: Option<String>,
    headers: HeaderMap,
    body: Bytes,
    services: Option<Arc<ServiceProvider>>,
}

impl Default for RequestContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestContextBuilder {
    /// Creates a builder for a `GET` request with no path.
    #[must_use]
    pub fn new() -> Self {
        Self {
            method: Method::GET,
            path: None,
            query: None,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            services: None,
        }
    }

    /// Sets the HTTP method.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Sets the path. A `?query` suffix is split off into the query string.
    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        let path = path.into();
        match path.split_once('?') {
            Some((p, q)) => {
                self.path = Some(p.to_string());
                self.query = Some(q.to_string());
            }
            None => self.path = Some(path),
        }
        self
    }

    /// Sets the raw query string (without `?`).
    #[must_use]
    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Adds a header. Invalid names or values are skipped.
    #[must_use]
    pub fn header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.headers.append(name, value);
        }
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Sets a JSON body and the matching content type.
    #[must_use]
    pub fn json(self, value: &serde_json::Value) -> Self {
        self.header("content-type", "application/json")
            .body(value.to_string())
    }

    /// Sets the per-request service scope.
    #[must_use]
    pub fn services(mut self, services: Arc<ServiceProvider>) -> Self {
        self.services = Some(services);
        self
    }

    /// Builds the request context.
    #[must_use]
    pub fn build(self) -> RequestContext {
        RequestContext {
            request_id: RequestId::new(),
            method: self.method,
            path: self.path,
            query: self.query,
            headers: self.headers,
            body: self.body,
            route_data: OnceLock::new(),
            services: self.services,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route_data::{RouteEntryId, RouteValues};

    fn matched(id: &str) -> RouteData {
        let values: RouteValues = [("id", id)].into_iter().collect();
        RouteData::matched(
            values,
            RouteEntryId {
                name: "Users.Get".to_string(),
                template: "users/{id}".to_string(),
            },
        )
    }

    #[test]
    fn test_request_id_unique() {
        assert_ne!(RequestId::new(), RequestId::new());
    }

    #[test]
    fn test_builder_defaults() {
        let ctx = RequestContext::builder().build();
        assert_eq!(ctx.method(), &Method::GET);
        assert!(ctx.path().is_none());
        assert!(!ctx.has_path());
        assert!(ctx.body().is_empty());
        assert!(ctx.services().is_none());
    }

    #[test]
    fn test_empty_path_is_not_a_path() {
        let ctx = RequestContext::get("");
        assert_eq!(ctx.path(), Some(""));
        assert!(!ctx.has_path());
    }

    #[test]
    fn test_path_with_query_is_split() {
        let ctx = RequestContext::get("/search?q=rust+lang&page=2");
        assert_eq!(ctx.path(), Some("/search"));
        assert_eq!(ctx.query_string(), Some("q=rust+lang&page=2"));
        assert_eq!(ctx.query_value("q").as_deref(), Some("rust lang"));
        assert_eq!(ctx.query_value("PAGE").as_deref(), Some("2"));
        assert_eq!(ctx.query_value("missing"), None);
    }

    #[test]
    fn test_query_value_percent_decoding() {
        let ctx = RequestContext::builder()
            .path("/x")
            .query("name=J%C3%BCrgen&flag")
            .build();
        assert_eq!(ctx.query_value("name").as_deref(), Some("Jürgen"));
        assert_eq!(ctx.query_value("flag").as_deref(), Some(""));
    }

    #[test]
    fn test_headers_and_content_type() {
        let ctx = RequestContext::post("/users")
            .header("Content-Type", "Application/JSON; charset=utf-8")
            .header("bad header", "x")
            .build();
        assert_eq!(ctx.content_type().as_deref(), Some("application/json"));
        assert_eq!(ctx.headers().len(), 1);
    }

    #[test]
    fn test_json_body() {
        let ctx = RequestContext::post("/users")
            .json(&serde_json::json!({"name": "Ada"}))
            .build();
        assert_eq!(ctx.content_type().as_deref(), Some("application/json"));
        assert_eq!(ctx.body().as_ref(), br#"{"name":"Ada"}"#);
    }

    #[test]
    fn test_route_data_written_once() {
        let ctx = RequestContext::get("/users/5");
        assert!(ctx.route_data().is_none());

        let attached = ctx.attach_route_data(matched("5"));
        assert_eq!(attached.value("id"), Some("5"));

        let second = ctx.attach_route_data(matched("7"));
        assert_eq!(second.value("id"), Some("5"));
        assert_eq!(ctx.route_data().unwrap().value("id"), Some("5"));
    }

    #[test]
    fn test_from_http_request() {
        let request = http::Request::builder()
            .method(Method::PUT)
            .uri("/users/5?notify=false")
            .header("content-type", "application/json")
            .body(Bytes::from_static(b"{}"))
            .unwrap();

        let ctx = RequestContext::from(request);
        assert_eq!(ctx.method(), &Method::PUT);
        assert_eq!(ctx.path(), Some("/users/5"));
        assert_eq!(ctx.query_value("notify").as_deref(), Some("false"));
        assert_eq!(ctx.body().as_ref(), b"{}");
    }
}
