//! Turning handler return values into responses.
//!
//! A handler returns anything that implements [`IntoReply`]. The reply names
//! a [`Content`] kind, and the kind decides the media type:
//!
//! | Content | Media type |
//! |---|---|
//! | `String`, `&'static str`, `Vec<u8>`, `Bytes` | `text/plain; charset=UTF-8` |
//! | `serde_json::Value`, `serde_json::Map` | `application/json; charset=UTF-8` |
//! | [`Raw`] | none |
//! | `()` | none, empty body |
//! | [`Response`] | returned unchanged |
//!
//! Tuples override the status and headers, mirroring the `(body, status)` /
//! `(body, status, headers)` convention:
//!
//! ```rust
//! use nanoroute::{Headers, IntoReply, adapt};
//!
//! let res = adapt(("created", 201).into_reply().unwrap());
//! assert_eq!(res.status(), 201);
//!
//! let res = adapt(("moved", 301, [("Location", "/new")]).into_reply().unwrap());
//! assert_eq!(res.header("location"), Some("/new"));
//! ```
//!
//! Your own types join in by implementing [`IntoContent`] (for the body) or
//! [`IntoReply`] (for the whole reply).

use bytes::Bytes;
use serde_json::{Map, Value};
use tracing::{debug, error};

use crate::error::HandlerError;
use crate::headers::Headers;
use crate::response::{ContentType, Response};

/// Body bytes with no declared media type.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Raw(pub Vec<u8>);

/// The closed set of body kinds a reply can carry.
#[derive(Clone, Debug, PartialEq)]
pub enum Content {
    Empty,
    Raw(Vec<u8>),
    Bytes(Vec<u8>),
    Text(String),
    /// Serialised compactly with non-ASCII left as is. `serde_json::Number`
    /// cannot hold `NaN` or infinities, so neither can this.
    Json(Value),
    Typed { content_type: ContentType, body: Vec<u8> },
    Response(Response),
}

/// Conversion into a [`Content`] kind.
pub trait IntoContent {
    fn into_content(self) -> Content;
}

impl IntoContent for Content {
    fn into_content(self) -> Content { self }
}

impl IntoContent for () {
    fn into_content(self) -> Content { Content::Empty }
}

impl IntoContent for Raw {
    fn into_content(self) -> Content { Content::Raw(self.0) }
}

impl IntoContent for Vec<u8> {
    fn into_content(self) -> Content { Content::Bytes(self) }
}

impl IntoContent for &'static [u8] {
    fn into_content(self) -> Content { Content::Bytes(self.to_vec()) }
}

impl IntoContent for Bytes {
    fn into_content(self) -> Content { Content::Bytes(self.to_vec()) }
}

impl IntoContent for String {
    fn into_content(self) -> Content { Content::Text(self) }
}

impl IntoContent for &'static str {
    fn into_content(self) -> Content { Content::Text(self.to_owned()) }
}

impl IntoContent for Value {
    fn into_content(self) -> Content { Content::Json(self) }
}

impl IntoContent for Map<String, Value> {
    fn into_content(self) -> Content { Content::Json(Value::Object(self)) }
}

impl IntoContent for Response {
    fn into_content(self) -> Content { Content::Response(self) }
}

// ── Reply ─────────────────────────────────────────────────────────────────────

/// Content plus optional status and header overrides.
#[derive(Clone, Debug, PartialEq)]
pub struct Reply {
    pub content: Content,
    pub status: Option<u16>,
    pub headers: Headers,
}

impl Reply {
    pub fn new(content: impl IntoContent) -> Self {
        Self { content: content.into_content(), status: None, headers: Headers::new() }
    }

    pub fn status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// Conversion of a handler's return value into a [`Reply`], or the failure it
/// reports.
pub trait IntoReply {
    fn into_reply(self) -> Result<Reply, HandlerError>;
}

impl IntoReply for Reply {
    fn into_reply(self) -> Result<Reply, HandlerError> { Ok(self) }
}

macro_rules! reply_from_content {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IntoReply for $ty {
                fn into_reply(self) -> Result<Reply, HandlerError> {
                    Ok(Reply::new(self))
                }
            }
        )*
    };
}

reply_from_content!(
    Content,
    (),
    Raw,
    Vec<u8>,
    &'static [u8],
    Bytes,
    String,
    &'static str,
    Value,
    Map<String, Value>,
    Response,
);

/// Return a bare status from a handler: `http::StatusCode::NO_CONTENT`.
impl IntoReply for http::StatusCode {
    fn into_reply(self) -> Result<Reply, HandlerError> {
        Ok(Reply::new(()).status(self.as_u16()))
    }
}

impl<C: IntoContent> IntoReply for (C, u16) {
    fn into_reply(self) -> Result<Reply, HandlerError> {
        Ok(Reply::new(self.0).status(self.1))
    }
}

impl<C: IntoContent> IntoReply for (C, http::StatusCode) {
    fn into_reply(self) -> Result<Reply, HandlerError> {
        Ok(Reply::new(self.0).status(self.1.as_u16()))
    }
}

impl<C: IntoContent, H: Into<Headers>> IntoReply for (C, u16, H) {
    fn into_reply(self) -> Result<Reply, HandlerError> {
        let (content, status, headers) = self;
        Ok(Reply { content: content.into_content(), status: Some(status), headers: headers.into() })
    }
}

impl<C: IntoContent, H: Into<Headers>> IntoReply for (C, http::StatusCode, H) {
    fn into_reply(self) -> Result<Reply, HandlerError> {
        let (content, status, headers) = self;
        Ok(Reply { content: content.into_content(), status: Some(status.as_u16()), headers: headers.into() })
    }
}

impl<T: IntoReply, E: Into<HandlerError>> IntoReply for Result<T, E> {
    fn into_reply(self) -> Result<Reply, HandlerError> {
        self.map_err(Into::into)?.into_reply()
    }
}

// ── adapt ─────────────────────────────────────────────────────────────────────

/// Builds the wire response for `reply`.
///
/// A [`Response`] without overrides comes back untouched. With overrides
/// its status is replaced, the headers are merged over its own, and the
/// framing headers are derived again.
pub fn adapt(reply: Reply) -> Response {
    let Reply { content, status, headers } = reply;

    let (body, content_type) = match content {
        Content::Response(response) => {
            if status.is_none() && headers.is_empty() {
                debug!("handler returned a response, passing it through");
                return response;
            }
            let Response { status: own_status, headers: mut own_headers, body } = response;
            own_headers.merge(headers);
            return Response::assemble(status.unwrap_or(own_status), own_headers, body, None);
        }
        Content::Empty => (Vec::new(), None),
        Content::Raw(body) => (body, None),
        Content::Bytes(body) => (body, Some(ContentType::Text)),
        Content::Text(text) => (text.into_bytes(), Some(ContentType::Text)),
        Content::Json(value) => match serde_json::to_vec(&value) {
            Ok(body) => (body, Some(ContentType::Json)),
            Err(e) => {
                error!(error = %e, "failed to serialise JSON reply");
                return Response::empty(500);
            }
        },
        Content::Typed { content_type, body } => (body, Some(content_type)),
    };

    Response::assemble(status.unwrap_or(200), headers, body, content_type.as_ref())
}
