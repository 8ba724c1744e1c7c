//! Observability collaborator.
//!
//! The core never touches global logging state. Whatever needs to be reported
//! goes through the [`Observer`] the [`App`](crate::App) was built with;
//! installing a `tracing` subscriber is the application's job.

use tracing::{debug, error};

use crate::method::Method;
use crate::request::Request;

/// Receives the events worth reporting.
pub trait Observer: Send + Sync + 'static {
    /// A route was bound during setup.
    fn route_added(&self, _method: Method, _pattern: &str) {}

    /// A handler failed with something other than an
    /// [`HttpError`](crate::HttpError). The client got a `500`.
    fn handler_failed(&self, req: &Request, error: &anyhow::Error);
}

/// Default observer: structured `tracing` events.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn route_added(&self, method: Method, pattern: &str) {
        debug!(%method, pattern, "handler set");
    }

    fn handler_failed(&self, req: &Request, err: &anyhow::Error) {
        let chain = format!("{err:#}");
        error!(method = %req.method(), path = req.path(), error = %chain, "handler failed");
    }
}
