//! Argument binding and guarded handler invocation.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing::debug;

use crate::adapter::adapt;
use crate::error::HandlerError;
use crate::handler::{Arg, Endpoint, ParamSpec};
use crate::observe::Observer;
use crate::request::Request;
use crate::response::Response;

/// Resolves each descriptor against the request: path parameter, then the
/// first query value, else absent.
pub fn bind_args<'a>(params: &'a [ParamSpec], req: &'a Request) -> Vec<Arg<'a>> {
    params
        .iter()
        .map(|spec| Arg { name: &spec.name, value: req.lookup(&spec.name) })
        .collect()
}

/// Calls endpoints and turns whatever they produce into a [`Response`].
///
/// Never fails: declared [`HttpError`](crate::HttpError)s become their status
/// with an empty body; every other error, panics included, becomes a bare
/// `500` and is handed to the observer.
#[derive(Clone)]
pub struct Dispatcher {
    observer: Arc<dyn Observer>,
}

impl Dispatcher {
    pub fn new(observer: Arc<dyn Observer>) -> Self {
        Self { observer }
    }

    pub fn dispatch(&self, endpoint: &Endpoint, req: &Request) -> Response {
        let args = bind_args(endpoint.params(), req);
        debug!(?args, "calling handler");

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| endpoint.call(req, &args)));
        match outcome {
            Ok(Ok(reply)) => adapt(reply),
            Ok(Err(HandlerError::Http(e))) => {
                debug!(status = e.status, error = %e, "handler returned an HTTP error");
                Response::empty(e.status)
            }
            Ok(Err(HandlerError::Internal(e))) => {
                self.observer.handler_failed(req, &e);
                Response::empty(500)
            }
            Err(payload) => {
                let e = anyhow::anyhow!("handler panicked: {}", panic_message(payload.as_ref()));
                self.observer.handler_failed(req, &e);
                Response::empty(500)
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        *s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "<non-string panic payload>"
    }
}
