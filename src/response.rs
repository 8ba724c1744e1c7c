//! Outgoing HTTP response type.
//!
//! Every constructor goes through one place that derives the framing
//! headers, so a `Response` is always wire-ready:
//!
//! - `Content-Length` is the body length.
//! - `Content-Type` is set when the body is non-empty and its media type is
//!   known.
//! - Statuses that forbid a body (`1xx`, `204`) carry neither header and no
//!   body.

use crate::headers::Headers;

/// Charset appended to textual media types.
const CHARSET: &str = "UTF-8";

// ── ContentType ───────────────────────────────────────────────────────────────

/// Media types the adapter and builder know how to label.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ContentType {
    Csv,          // text/csv
    Html,         // text/html
    Json,         // application/json
    OctetStream,  // application/octet-stream
    Text,         // text/plain
    Xml,          // application/xml
    /// Sent verbatim, no charset added.
    Custom(String),
}

impl ContentType {
    /// The `Content-Type` header value, with a charset for textual types.
    pub fn header_value(&self) -> String {
        let media = match self {
            Self::Csv         => "text/csv",
            Self::Html        => "text/html",
            Self::Json        => "application/json",
            Self::OctetStream => return "application/octet-stream".to_owned(),
            Self::Text        => "text/plain",
            Self::Xml         => "application/xml",
            Self::Custom(raw) => return raw.clone(),
        };
        format!("{media}; charset={CHARSET}")
    }
}

// ── Response ─────────────────────────────────────────────────────────────────

/// An outgoing HTTP response.
///
/// # Shortcuts (200 OK, no custom headers needed)
///
/// ```rust
/// use nanoroute::Response;
///
/// Response::json(br#"{"id":1}"#.to_vec());
/// Response::text("hello");
/// Response::empty(204);
/// ```
///
/// # Builder (custom status or headers)
///
/// ```rust
/// use nanoroute::{ContentType, Response};
///
/// Response::builder()
///     .status(201)
///     .header("location", "/users/42")
///     .json(br#"{"id":42}"#.to_vec());
///
/// Response::builder()
///     .bytes(ContentType::Xml, b"<ok/>".to_vec());
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Response {
    pub(crate) status: u16,
    pub(crate) headers: Headers,
    pub(crate) body: Vec<u8>,
}

impl Response {
    /// `200 OK`, `application/json`.
    pub fn json(body: Vec<u8>) -> Self {
        Self::builder().json(body)
    }

    /// `200 OK`, `text/plain`.
    pub fn text(body: impl Into<String>) -> Self {
        Self::builder().text(body)
    }

    /// Response with no body.
    pub fn empty(status: u16) -> Self {
        Self::builder().status(status).no_body()
    }

    /// Builder for responses that need a custom status or extra headers.
    pub fn builder() -> ResponseBuilder {
        ResponseBuilder { headers: Headers::new(), status: 200 }
    }

    pub fn status(&self) -> u16 { self.status }
    pub fn headers(&self) -> &Headers { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Assembles a response and derives its framing headers.
    ///
    /// With `content_type: None` an existing `Content-Type` header is left
    /// as it is.
    pub(crate) fn assemble(
        status: u16,
        mut headers: Headers,
        mut body: Vec<u8>,
        content_type: Option<&ContentType>,
    ) -> Self {
        if forbids_body(status) {
            headers.remove("content-length");
            headers.remove("content-type");
            body.clear();
            return Self { status, headers, body };
        }

        headers.insert("Content-Length", body.len().to_string());
        if let Some(ct) = content_type.filter(|_| !body.is_empty()) {
            headers.insert("Content-Type", ct.header_value());
        }
        Self { status, headers, body }
    }
}

/// RFC 9110 §6.4.1: no content on `1xx` and `204`.
pub(crate) fn forbids_body(status: u16) -> bool {
    (100..200).contains(&status) || status == 204
}

// ── ResponseBuilder ───────────────────────────────────────────────────────────

/// Fluent builder for [`Response`].
///
/// Obtain via [`Response::builder()`]. Defaults to `200`.
/// Terminated by a typed body method, so you always know what you're sending.
#[derive(Clone, Debug)]
pub struct ResponseBuilder {
    headers: Headers,
    status: u16,
}

impl ResponseBuilder {
    pub fn status(mut self, code: u16) -> Self {
        self.status = code;
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Terminate with a JSON body (`application/json`).
    pub fn json(self, body: Vec<u8>) -> Response {
        self.finish(body, Some(&ContentType::Json))
    }

    /// Terminate with a plain-text body (`text/plain`).
    pub fn text(self, body: impl Into<String>) -> Response {
        self.finish(body.into().into_bytes(), Some(&ContentType::Text))
    }

    /// Terminate with a typed body. Use this for XML, HTML, binary, etc.
    pub fn bytes(self, content_type: ContentType, body: Vec<u8>) -> Response {
        self.finish(body, Some(&content_type))
    }

    /// Terminate with a body that declares no media type.
    pub fn raw(self, body: Vec<u8>) -> Response {
        self.finish(body, None)
    }

    /// Terminate with no body (e.g. `204`, `301`).
    pub fn no_body(self) -> Response {
        self.finish(Vec::new(), None)
    }

    fn finish(self, body: Vec<u8>, content_type: Option<&ContentType>) -> Response {
        Response::assemble(self.status, self.headers, body, content_type)
    }
}
