//! # nanoroute
//!
//! A compact HTTP router: a segment trie that maps `(method, path)` to a
//! handler, binds path and query parameters to typed handler arguments, and
//! turns whatever the handler returns into a well-formed response.
//!
//! What it does:
//!
//! - Segment-trie routing: literal segments beat `{param}` / `<param>`
//!   segments, no backtracking.
//! - `404` when no route matches the path, `405` with `Allow` when the path
//!   matches but the method does not.
//! - Handler arguments are looked up as path parameters first, then in the
//!   query string, and parsed with [`FromParam`].
//! - Return strings, bytes, `serde_json` values, tuples with a status and
//!   headers, or a prebuilt [`Response`]; see [`IntoReply`].
//! - A tokio/hyper [`Server`] with graceful shutdown on SIGTERM / Ctrl-C.
//!
//! Logging goes through `tracing`; install a subscriber in your binary.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use nanoroute::{App, HttpError, Request, Server};
//! use serde_json::{Value, json};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), nanoroute::Error> {
//!     let app = App::new()
//!         .get("/users/{id}", get_user)
//!         .post("/users", create_user)
//!         .delete("/users/<id>", |_id: u64| http::StatusCode::NO_CONTENT);
//!
//!     Server::bind("0.0.0.0:3000")?.serve(app).await
//! }
//!
//! fn get_user(id: u64) -> Result<Value, HttpError> {
//!     if id == 0 {
//!         return Err(HttpError::not_found());
//!     }
//!     Ok(json!({ "id": id, "name": "alice" }))
//! }
//!
//! fn create_user(req: &Request) -> Result<(Value, u16, [(&'static str, &'static str); 1]), HttpError> {
//!     if req.body().is_empty() {
//!         return Err(HttpError::bad_request("empty body"));
//!     }
//!     Ok((json!({ "id": 99 }), 201, [("Location", "/users/99")]))
//! }
//! ```

mod adapter;
mod app;
mod dispatch;
mod error;
mod handler;
mod headers;
mod method;
mod observe;
mod request;
mod response;
mod router;
mod server;
mod uri;

pub mod path;

pub use adapter::{Content, IntoContent, IntoReply, Raw, Reply, adapt};
pub use app::App;
pub use dispatch::{Dispatcher, bind_args};
pub use error::{Error, HandlerError, HttpError, LookupError, RouteError, UnknownMethod};
pub use handler::{Arg, Endpoint, FromParam, Handler, IntoEndpoint, ParamSpec, Plain, WithRequest, with_params};
pub use headers::Headers;
pub use method::Method;
pub use observe::{Observer, TracingObserver};
pub use request::Request;
pub use response::{ContentType, Response, ResponseBuilder};
pub use router::{Match, Router};
pub use server::{Server, serve_with_shutdown};
pub use uri::{Url, parse_query};
