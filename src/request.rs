//! Per-request context handed to handlers.

use std::collections::HashMap;

use bytes::Bytes;

use crate::headers::Headers;
use crate::method::Method;
use crate::uri::{self, Url};

/// An incoming request, as seen by a handler.
///
/// The URL and query string are parsed once, at construction. Path
/// parameters are filled in by the router during lookup.
#[derive(Clone, Debug)]
pub struct Request {
    pub(crate) method: Method,
    pub(crate) raw_path: String,
    pub(crate) url: Url,
    pub(crate) headers: Headers,
    pub(crate) body: Bytes,
    pub(crate) path_params: HashMap<String, String>,
    pub(crate) query_params: HashMap<String, Vec<String>>,
}

impl Request {
    /// Builds a request from what the transport received. `raw_path` is the
    /// request target and may carry a query string and a fragment.
    pub fn new(method: Method, raw_path: impl Into<String>, headers: Headers, body: impl Into<Bytes>) -> Self {
        let raw_path = raw_path.into();
        let url = Url::parse_relative(&raw_path);
        let query_params = if url.query.is_empty() {
            HashMap::new()
        } else {
            uri::parse_query(&url.query)
        };
        Self {
            method,
            raw_path,
            url,
            headers,
            body: body.into(),
            path_params: HashMap::new(),
            query_params,
        }
    }

    /// Shorthand for a bodiless request with no headers.
    pub fn with_target(method: Method, raw_path: impl Into<String>) -> Self {
        Self::new(method, raw_path, Headers::new(), Bytes::new())
    }

    pub fn method(&self) -> Method { self.method }
    pub fn raw_path(&self) -> &str { &self.raw_path }
    pub fn url(&self) -> &Url { &self.url }
    pub fn path(&self) -> &str { &self.url.path }
    pub fn fragment(&self) -> &str { &self.url.fragment }
    pub fn headers(&self) -> &Headers { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/{id}`, `req.param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.path_params.get(key).map(String::as_str)
    }

    pub fn params(&self) -> &HashMap<String, String> {
        &self.path_params
    }

    /// First value of a query parameter.
    pub fn query(&self, key: &str) -> Option<&str> {
        self.query_params.get(key).and_then(|v| v.first()).map(String::as_str)
    }

    /// Every value of a query parameter, in order. Empty if absent.
    pub fn query_all(&self, key: &str) -> &[String] {
        self.query_params.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn args(&self) -> &HashMap<String, Vec<String>> {
        &self.query_params
    }

    /// Path parameter first, then the first query value.
    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.param(name).or_else(|| self.query(name))
    }

    pub(crate) fn set_params(&mut self, params: HashMap<String, String>) {
        self.path_params = params;
    }
}
