//! Error types.
//!
//! Failures fall into four groups, each with its own type:
//!
//! - [`RouteError`]: a route could not be registered. Fatal to setup.
//! - [`LookupError`]: no route matched a request. Becomes `404` / `405`.
//! - [`HttpError`] / [`HandlerError`]: a handler failed. Becomes the declared
//!   status, or `500` for anything else.
//! - [`Error`]: infrastructure failures of the bundled [`Server`](crate::Server).

use std::fmt;
use std::net::AddrParseError;

use thiserror::Error;

use crate::method::Method;

/// Infrastructure failures: parsing the listen address, binding the port,
/// accepting a connection.
///
/// Application-level errors (404, 422, etc.) are expressed as HTTP
/// [`Response`](crate::Response) values, not as `Error`s.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid socket address `{addr}`: {source}")]
    Addr {
        addr: String,
        #[source]
        source: AddrParseError,
    },
}

/// A method string outside the routable set.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("unknown HTTP method `{0}`")]
pub struct UnknownMethod(pub String);

/// Why a route could not be registered.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum RouteError {
    #[error("malformed segment `{segment}`: unexpected `{found}`")]
    MalformedPattern { segment: String, found: char },

    #[error("unbalanced delimiters in segment `{segment}`")]
    UnbalancedDelimiter { segment: String },

    #[error("empty parameter name in segment `{segment}`")]
    EmptyParameter { segment: String },

    #[error("parameter `{name}` appears more than once in `{pattern}`")]
    DuplicateParameter { name: String, pattern: String },

    #[error("wildcard `{requested}` conflicts with existing wildcard `{existing}` for `{method} {pattern}`")]
    WildcardNameConflict {
        existing: String,
        requested: String,
        method: Method,
        pattern: String,
    },

    #[error("a handler is already registered for `{method} {pattern}`")]
    DuplicateRoute { method: Method, pattern: String },

    #[error("handler for `{method} {pattern}` takes {arity} parameter(s) but {named} name(s) were given")]
    ArityMismatch {
        method: Method,
        pattern: String,
        arity: usize,
        named: usize,
    },
}

/// Why a request could not be routed.
///
/// `NotFound` and `MethodNotAllowed` are expected outcomes, not internal
/// failures: the path either reaches no node at all, or reaches a node with
/// no handler for the requested method.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum LookupError {
    #[error("no route matches the requested path")]
    NotFound,

    #[error("method not allowed for the requested path")]
    MethodNotAllowed { allowed: Vec<Method> },
}

impl LookupError {
    pub fn status(&self) -> u16 {
        match self {
            Self::NotFound => 404,
            Self::MethodNotAllowed { .. } => 405,
        }
    }
}

/// A failure a handler declares on purpose: the response gets `status` and an
/// empty body. `description` is for logs and tests only.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HttpError {
    pub status: u16,
    pub description: String,
}

impl HttpError {
    pub fn new(status: u16, description: impl Into<String>) -> Self {
        Self { status, description: description.into() }
    }

    pub fn bad_request(description: impl Into<String>) -> Self {
        Self::new(400, description)
    }

    pub fn not_found() -> Self {
        Self::new(404, "The requested URL was not found on the server")
    }

    pub fn method_not_allowed() -> Self {
        Self::new(405, "The method is not allowed for the requested URL")
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = http::StatusCode::from_u16(self.status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("Unknown Status");
        write!(f, "{} {}: {}", self.status, reason, self.description)
    }
}

impl std::error::Error for HttpError {}

impl From<LookupError> for HttpError {
    fn from(e: LookupError) -> Self {
        match e {
            LookupError::NotFound => Self::not_found(),
            LookupError::MethodNotAllowed { .. } => Self::method_not_allowed(),
        }
    }
}

/// Everything a handler may fail with.
///
/// Return `Err(HttpError::...)` to pick the status yourself. Anything else
/// (an [`anyhow::Error`], an I/O error, a serialisation error) is an internal
/// failure: the client gets a bare `500` and the error goes to the
/// [`Observer`](crate::Observer).
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error(transparent)]
    Http(#[from] HttpError),

    #[error(transparent)]
    Internal(anyhow::Error),
}

/// An `HttpError` that travelled through `anyhow` keeps its status.
impl From<anyhow::Error> for HandlerError {
    fn from(e: anyhow::Error) -> Self {
        match e.downcast::<HttpError>() {
            Ok(http) => Self::Http(http),
            Err(other) => Self::Internal(other),
        }
    }
}

impl From<std::io::Error> for HandlerError {
    fn from(e: std::io::Error) -> Self {
        Self::Internal(e.into())
    }
}

impl From<serde_json::Error> for HandlerError {
    fn from(e: serde_json::Error) -> Self {
        Self::Internal(e.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_display_includes_reason_phrase() {
        let e = HttpError::not_found();
        assert_eq!(
            e.to_string(),
            "404 Not Found: The requested URL was not found on the server",
        );
    }

    #[test]
    fn http_error_survives_anyhow() {
        let wrapped = anyhow::Error::new(HttpError::new(418, "short and stout"));
        match HandlerError::from(wrapped) {
            HandlerError::Http(e) => assert_eq!(e.status, 418),
            other => panic!("expected Http, got {other:?}"),
        }
    }

    #[test]
    fn other_errors_are_internal() {
        let e = HandlerError::from(anyhow::anyhow!("database unreachable"));
        assert!(matches!(e, HandlerError::Internal(_)));
        assert_eq!(e.to_string(), "database unreachable");
    }
}
