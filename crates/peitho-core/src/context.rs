//! Request context consumed by the binding pipeline.
//!
//! [`RequestContext`] is the boundary between Peitho and the transport: it
//! exposes path parameters, the parsed query string, case-normalized
//! headers, named property maps, middleware-provided values, and an async
//! payload-read operation. The transport adapter builds one per request via
//! [`RequestContextBuilder`].

use crate::{Params, PeithoError, PeithoResult, Value};
use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, Method, Uri};
use std::collections::HashMap;
use std::sync::Arc;

/// String-keyed dynamic properties attached to a request sub-object.
pub type PropertyMap = HashMap<String, Value>;

/// Asynchronous access to the raw request payload.
///
/// The transport owns buffering, size bounding, and timeouts; it receives
/// the option's declared byte `limit` as a parameter. A failure here is a
/// hard failure for the whole request, unlike a parse failure of the bytes
/// it yields.
#[async_trait]
pub trait PayloadSource: Send + Sync {
    /// Reads the payload, bounded by `limit` bytes when given.
    async fn read(&self, limit: Option<usize>) -> PeithoResult<Bytes>;
}

/// A fully buffered payload.
///
/// Suitable for tests and for servers that collect the body before routing.
#[derive(Debug, Clone, Default)]
pub struct BufferedPayload {
    bytes: Bytes,
}

impl BufferedPayload {
    /// Wraps an already collected payload.
    #[must_use]
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }
}

#[async_trait]
impl PayloadSource for BufferedPayload {
    async fn read(&self, limit: Option<usize>) -> PeithoResult<Bytes> {
        if let Some(limit) = limit {
            if self.bytes.len() > limit {
                return Err(PeithoError::payload(format!(
                    "payload exceeds limit of {limit} bytes"
                )));
            }
        }
        Ok(self.bytes.clone())
    }
}

/// Context providing access to all parts of one HTTP request.
///
/// # Example
///
/// ```
/// use peitho_core::RequestContext;
/// use http::Method;
///
/// let ctx = RequestContext::builder()
///     .method(Method::GET)
///     .uri("/users/42?active=true&tag=a&tag=b".parse().unwrap())
///     .path_param("id", "42")
///     .build();
///
/// assert_eq!(ctx.path_params().get("id"), Some("42"));
/// assert_eq!(ctx.query_value("active"), Some(&"true".into()));
/// ```
pub struct RequestContext {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    path_params: Params,
    query: PropertyMap,
    connection: PropertyMap,
    url: PropertyMap,
    request: PropertyMap,
    response: PropertyMap,
    extensions: PropertyMap,
    payload: Arc<dyn PayloadSource>,
}

impl std::fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestContext")
            .field("method", &self.method)
            .field("uri", &self.uri)
            .field("path_params", &self.path_params)
            .finish_non_exhaustive()
    }
}

impl RequestContext {
    /// Creates a builder for a request context.
    #[must_use]
    pub fn builder() -> RequestContextBuilder {
        RequestContextBuilder::default()
    }

    /// Returns the HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request URI.
    #[must_use]
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Returns the path portion of the URI.
    #[must_use]
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// Returns the raw query string if present.
    #[must_use]
    pub fn query_string(&self) -> Option<&str> {
        self.uri.query()
    }

    /// Returns the request headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns a header value as a string. Lookup is case-insensitive.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns the captured path parameters.
    #[must_use]
    pub fn path_params(&self) -> &Params {
        &self.path_params
    }

    /// Returns the parsed query-string map.
    ///
    /// Repeated keys collapse into a [`Value::Array`] of strings.
    #[must_use]
    pub fn query(&self) -> &PropertyMap {
        &self.query
    }

    /// Returns one parsed query value by key.
    #[must_use]
    pub fn query_value(&self, key: &str) -> Option<&Value> {
        self.query.get(key)
    }

    /// Returns the connection property map.
    #[must_use]
    pub fn connection(&self) -> &PropertyMap {
        &self.connection
    }

    /// Returns the url property map (`path` and `query` are pre-populated).
    #[must_use]
    pub fn url(&self) -> &PropertyMap {
        &self.url
    }

    /// Returns the request property map (`method` is pre-populated).
    #[must_use]
    pub fn request(&self) -> &PropertyMap {
        &self.request
    }

    /// Returns the response property map.
    #[must_use]
    pub fn response(&self) -> &PropertyMap {
        &self.response
    }

    /// Returns the middleware-provided extension map.
    #[must_use]
    pub fn extensions(&self) -> &PropertyMap {
        &self.extensions
    }

    /// Returns one middleware-provided value by key.
    #[must_use]
    pub fn extension(&self, key: &str) -> Option<&Value> {
        self.extensions.get(key)
    }

    /// Stores a middleware-provided value for downstream options to read.
    pub fn insert_extension(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.extensions.insert(key.into(), value.into());
    }

    /// Returns a handle to the payload source.
    #[must_use]
    pub fn payload(&self) -> Arc<dyn PayloadSource> {
        Arc::clone(&self.payload)
    }
}

/// Parses a query string into a property map.
///
/// Repeated keys collapse into an array of strings, preserving order.
fn parse_query(raw: &str) -> PropertyMap {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(raw).unwrap_or_default();
    let mut map = PropertyMap::new();
    for (key, value) in pairs {
        match map.remove(&key) {
            None => {
                map.insert(key, Value::String(value));
            }
            Some(Value::Array(mut items)) => {
                items.push(Value::String(value));
                map.insert(key, Value::Array(items));
            }
            Some(existing) => {
                map.insert(key, Value::Array(vec![existing, Value::String(value)]));
            }
        }
    }
    map
}

/// Builder for [`RequestContext`].
#[derive(Default)]
pub struct RequestContextBuilder {
    method: Option<Method>,
    uri: Option<Uri>,
    headers: HeaderMap,
    path_params: Params,
    connection: PropertyMap,
    url: PropertyMap,
    request: PropertyMap,
    response: PropertyMap,
    extensions: PropertyMap,
    payload: Option<Arc<dyn PayloadSource>>,
}

impl RequestContextBuilder {
    /// Sets the HTTP method.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Sets the URI.
    #[must_use]
    pub fn uri(mut self, uri: Uri) -> Self {
        self.uri = Some(uri);
        self
    }

    /// Replaces the header map.
    #[must_use]
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Adds a single header.
    #[must_use]
    pub fn header(mut self, name: &'static str, value: &str) -> Self {
        if let Ok(value) = value.parse() {
            self.headers.insert(name, value);
        }
        self
    }

    /// Replaces the path parameters.
    #[must_use]
    pub fn path_params(mut self, params: Params) -> Self {
        self.path_params = params;
        self
    }

    /// Adds a single path parameter.
    #[must_use]
    pub fn path_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.path_params.push(name, value);
        self
    }

    /// Sets a fully buffered payload.
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.payload = Some(Arc::new(BufferedPayload::new(body)));
        self
    }

    /// Sets a custom payload source.
    #[must_use]
    pub fn payload(mut self, payload: Arc<dyn PayloadSource>) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Adds a connection property.
    #[must_use]
    pub fn connection_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.connection.insert(key.into(), value.into());
        self
    }

    /// Adds a url property.
    #[must_use]
    pub fn url_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.url.insert(key.into(), value.into());
        self
    }

    /// Adds a request property.
    #[must_use]
    pub fn request_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.request.insert(key.into(), value.into());
        self
    }

    /// Adds a response property.
    #[must_use]
    pub fn response_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.response.insert(key.into(), value.into());
        self
    }

    /// Adds a middleware-provided extension value.
    #[must_use]
    pub fn extension(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extensions.insert(key.into(), value.into());
        self
    }

    /// Builds the request context.
    ///
    /// The query string is parsed once here; the url map is populated with
    /// `path` and `query`, and the request map with `method`, unless the
    /// caller set those keys explicitly.
    ///
    /// # Panics
    ///
    /// Panics if method or uri were not set.
    #[must_use]
    pub fn build(self) -> RequestContext {
        let method = self.method.expect("method is required");
        let uri = self.uri.expect("uri is required");

        let query = uri.query().map(parse_query).unwrap_or_default();

        let mut url = self.url;
        url.entry("path".to_string())
            .or_insert_with(|| Value::from(uri.path()));
        if let Some(raw) = uri.query() {
            url.entry("query".to_string())
                .or_insert_with(|| Value::from(raw));
        }

        let mut request = self.request;
        request
            .entry("method".to_string())
            .or_insert_with(|| Value::from(method.as_str()));

        RequestContext {
            method,
            uri,
            headers: self.headers,
            path_params: self.path_params,
            query,
            connection: self.connection,
            url,
            request,
            response: self.response,
            extensions: self.extensions,
            payload: self
                .payload
                .unwrap_or_else(|| Arc::new(BufferedPayload::default())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_basics() {
        let ctx = RequestContext::builder()
            .method(Method::POST)
            .uri(Uri::from_static("/users"))
            .header("content-type", "application/json")
            .path_param("version", "v1")
            .build();

        assert_eq!(ctx.method(), &Method::POST);
        assert_eq!(ctx.path(), "/users");
        assert_eq!(ctx.header("Content-Type"), Some("application/json"));
        assert_eq!(ctx.path_params().get("version"), Some("v1"));
    }

    #[test]
    fn test_query_parsing_single_values() {
        let ctx = RequestContext::builder()
            .method(Method::GET)
            .uri(Uri::from_static("/search?q=rust&limit=10"))
            .build();

        assert_eq!(ctx.query_value("q"), Some(&Value::from("rust")));
        assert_eq!(ctx.query_value("limit"), Some(&Value::from("10")));
        assert_eq!(ctx.query_value("missing"), None);
    }

    #[test]
    fn test_query_parsing_repeated_keys_collapse_to_array() {
        let ctx = RequestContext::builder()
            .method(Method::GET)
            .uri(Uri::from_static("/search?tag=a&tag=b&tag=c"))
            .build();

        let tags = ctx.query_value("tag").unwrap();
        assert_eq!(
            tags,
            &Value::Array(vec![
                Value::from("a"),
                Value::from("b"),
                Value::from("c")
            ])
        );
    }

    #[test]
    fn test_query_parsing_decodes_percent_escapes() {
        let ctx = RequestContext::builder()
            .method(Method::GET)
            .uri(Uri::from_static("/search?q=hello%20world"))
            .build();

        assert_eq!(ctx.query_value("q"), Some(&Value::from("hello world")));
    }

    #[test]
    fn test_url_and_request_maps_pre_populated() {
        let ctx = RequestContext::builder()
            .method(Method::GET)
            .uri(Uri::from_static("/a/b?x=1"))
            .build();

        assert_eq!(ctx.url().get("path"), Some(&Value::from("/a/b")));
        assert_eq!(ctx.url().get("query"), Some(&Value::from("x=1")));
        assert_eq!(ctx.request().get("method"), Some(&Value::from("GET")));
    }

    #[test]
    fn test_property_maps_and_extensions() {
        let mut ctx = RequestContext::builder()
            .method(Method::GET)
            .uri(Uri::from_static("/"))
            .connection_property("remoteAddress", "10.0.0.1")
            .extension("userId", 7i64)
            .build();

        assert_eq!(
            ctx.connection().get("remoteAddress"),
            Some(&Value::from("10.0.0.1"))
        );
        assert_eq!(ctx.extension("userId"), Some(&Value::Int(7)));

        ctx.insert_extension("traceId", "abc");
        assert_eq!(ctx.extension("traceId"), Some(&Value::from("abc")));
    }

    #[tokio::test]
    async fn test_buffered_payload_respects_limit() {
        let payload = BufferedPayload::new(Bytes::from_static(b"0123456789"));

        assert_eq!(payload.read(None).await.unwrap().len(), 10);
        assert_eq!(payload.read(Some(10)).await.unwrap().len(), 10);

        let err = payload.read(Some(4)).await.unwrap_err();
        assert!(err.to_string().contains("limit"));
    }

    #[tokio::test]
    async fn test_default_payload_is_empty() {
        let ctx = RequestContext::builder()
            .method(Method::GET)
            .uri(Uri::from_static("/"))
            .build();

        let bytes = ctx.payload().read(None).await.unwrap();
        assert!(bytes.is_empty());
    }
}
