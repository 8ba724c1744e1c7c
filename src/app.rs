//! The application: route table, dispatcher and observer in one value.
//!
//! Build it once at startup, then hand it to [`Server::serve`] or drive it
//! directly through [`App::handle`].
//!
//! [`Server::serve`]: crate::Server::serve

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use tracing::debug;

use crate::dispatch::Dispatcher;
use crate::error::{LookupError, RouteError};
use crate::handler::{Endpoint, IntoEndpoint};
use crate::headers::Headers;
use crate::method::Method;
use crate::observe::{Observer, TracingObserver};
use crate::path;
use crate::request::Request;
use crate::response::Response;
use crate::router::{Match, Router};
use crate::uri::Url;

/// Registered routes plus everything needed to answer a request.
///
/// Each builder call returns `self` so registrations chain naturally:
///
/// ```rust
/// use nanoroute::{App, HttpError, Method};
///
/// fn get_user(id: u32) -> Result<String, HttpError> {
///     if id == 0 {
///         return Err(HttpError::not_found());
///     }
///     Ok(format!("user {id}"))
/// }
///
/// let app = App::new()
///     .get("/users/{id}", get_user)
///     .route(&[Method::Put, Method::Post], "/users/<id>/avatar", |id: u32| (format!("{id}"), 201));
///
/// let res = app.handle("GET", "/users/7", Default::default(), "");
/// assert_eq!(res.body(), b"user 7");
/// ```
pub struct App {
    router: Router<Endpoint>,
    dispatcher: Dispatcher,
    observer: Arc<dyn Observer>,
}

impl App {
    pub fn new() -> Self {
        let observer: Arc<dyn Observer> = Arc::new(TracingObserver);
        Self {
            router: Router::new(),
            dispatcher: Dispatcher::new(Arc::clone(&observer)),
            observer,
        }
    }

    /// Replaces the default [`TracingObserver`].
    pub fn with_observer(mut self, observer: impl Observer) -> Self {
        let observer: Arc<dyn Observer> = Arc::new(observer);
        self.dispatcher = Dispatcher::new(Arc::clone(&observer));
        self.observer = observer;
        self
    }

    /// Binds `handler` to `method` on `pattern`.
    ///
    /// Patterns use `{name}` or `<name>` for parameters. A handler that takes
    /// arguments binds them, in order, to the pattern's parameters; use
    /// [`with_params`](crate::with_params) to name them yourself.
    ///
    /// # Panics
    ///
    /// Panics if the route cannot be registered. Use [`App::try_on`] to get
    /// the [`RouteError`] instead.
    pub fn on<M>(mut self, method: Method, pattern: &str, handler: impl IntoEndpoint<M>) -> Self {
        if let Err(e) = self.try_on(method, pattern, handler) {
            panic!("invalid route `{pattern}`: {e}");
        }
        self
    }

    /// Fallible form of [`App::on`]. On error nothing is registered.
    pub fn try_on<M>(
        &mut self,
        method: Method,
        pattern: &str,
        handler: impl IntoEndpoint<M>,
    ) -> Result<&mut Self, RouteError> {
        self.add(method, pattern, handler.into_endpoint())?;
        Ok(self)
    }

    /// Binds one handler to several methods on the same pattern.
    ///
    /// # Panics
    ///
    /// Panics if any of the registrations fails.
    pub fn route<M>(mut self, methods: &[Method], pattern: &str, handler: impl IntoEndpoint<M>) -> Self {
        if let Err(e) = self.try_route(methods, pattern, handler) {
            panic!("invalid route `{pattern}`: {e}");
        }
        self
    }

    /// Fallible form of [`App::route`]. Registrations are made one method at
    /// a time; those made before the failing one stay in place.
    pub fn try_route<M>(
        &mut self,
        methods: &[Method],
        pattern: &str,
        handler: impl IntoEndpoint<M>,
    ) -> Result<&mut Self, RouteError> {
        let endpoint = handler.into_endpoint();
        for &method in methods {
            self.add(method, pattern, endpoint.clone())?;
        }
        Ok(self)
    }

    pub fn get<M>(self, pattern: &str, handler: impl IntoEndpoint<M>) -> Self {
        self.on(Method::Get, pattern, handler)
    }

    pub fn head<M>(self, pattern: &str, handler: impl IntoEndpoint<M>) -> Self {
        self.on(Method::Head, pattern, handler)
    }

    pub fn post<M>(self, pattern: &str, handler: impl IntoEndpoint<M>) -> Self {
        self.on(Method::Post, pattern, handler)
    }

    pub fn put<M>(self, pattern: &str, handler: impl IntoEndpoint<M>) -> Self {
        self.on(Method::Put, pattern, handler)
    }

    pub fn delete<M>(self, pattern: &str, handler: impl IntoEndpoint<M>) -> Self {
        self.on(Method::Delete, pattern, handler)
    }

    pub fn connect<M>(self, pattern: &str, handler: impl IntoEndpoint<M>) -> Self {
        self.on(Method::Connect, pattern, handler)
    }

    pub fn options<M>(self, pattern: &str, handler: impl IntoEndpoint<M>) -> Self {
        self.on(Method::Options, pattern, handler)
    }

    pub fn trace<M>(self, pattern: &str, handler: impl IntoEndpoint<M>) -> Self {
        self.on(Method::Trace, pattern, handler)
    }

    fn add(&mut self, method: Method, pattern: &str, mut endpoint: Endpoint) -> Result<(), RouteError> {
        let wildcards = path::wildcard_names(&path::parse_pattern(pattern)?);
        endpoint.describe(method, pattern, wildcards)?;
        self.router.add_route(method, pattern, endpoint)?;
        self.observer.route_added(method, pattern);
        Ok(())
    }

    /// The endpoint and path parameters for `method` on `path`.
    pub fn resolve(&self, method: Method, path: &str) -> Result<Match<'_, Endpoint>, LookupError> {
        self.router.resolve(method, path)
    }

    /// Resolves `req` and stores the matched path parameters on it.
    pub fn lookup(&self, req: &mut Request) -> Result<&Endpoint, LookupError> {
        let Match { handler, params } = self.router.resolve(req.method(), req.path())?;
        req.set_params(params);
        Ok(handler)
    }

    /// Routes `req` and runs the matched handler. Never fails: lookup
    /// failures become `404`/`405`, handler failures become their status.
    pub fn dispatch(&self, mut req: Request) -> Response {
        match self.lookup(&mut req) {
            Ok(endpoint) => self.dispatcher.dispatch(endpoint, &req),
            Err(e) => lookup_failed(e),
        }
    }

    /// Entry point for a transport: raw method, request target, headers and
    /// body in, response out.
    ///
    /// A method outside [`Method::ALL`] is answered with `405` when the path
    /// exists and `404` otherwise.
    pub fn handle(&self, raw_method: &str, raw_path: &str, headers: Headers, body: impl Into<Bytes>) -> Response {
        let method = match raw_method.parse::<Method>() {
            Ok(method) => method,
            Err(e) => {
                debug!(error = %e, path = raw_path, "unsupported method");
                let url = Url::parse_relative(raw_path);
                let failure = match self.router.allowed_methods(&url.path) {
                    Some(allowed) => LookupError::MethodNotAllowed { allowed },
                    None => LookupError::NotFound,
                };
                return lookup_failed(failure);
            }
        };
        self.dispatch(Request::new(method, raw_path, headers, body))
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App").field("router", &self.router).finish_non_exhaustive()
    }
}

fn lookup_failed(e: LookupError) -> Response {
    let mut builder = Response::builder().status(e.status());
    if let LookupError::MethodNotAllowed { allowed } = &e {
        if !allowed.is_empty() {
            let allow = allowed.iter().map(|m| m.as_str()).collect::<Vec<_>>().join(", ");
            builder = builder.header("Allow", &allow);
        }
    }
    builder.no_body()
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::handler::with_params;

    #[derive(Clone, Default)]
    struct Recorder(Arc<Mutex<Vec<String>>>);

    impl Observer for Recorder {
        fn route_added(&self, method: Method, pattern: &str) {
            self.0.lock().unwrap().push(format!("added {method} {pattern}"));
        }

        fn handler_failed(&self, req: &Request, error: &anyhow::Error) {
            self.0.lock().unwrap().push(format!("failed {} {}: {error}", req.method(), req.path()));
        }
    }

    fn get(app: &App, target: &str) -> Response {
        app.handle("GET", target, Headers::new(), Bytes::new())
    }

    #[test]
    fn not_found_and_method_not_allowed() {
        let app = App::new().get("/", || "root").put("/", || "put root");

        let res = app.handle("POST", "/", Headers::new(), "");
        assert_eq!(res.status(), 405);
        assert_eq!(res.header("Allow"), Some("GET, PUT"));
        assert!(res.body().is_empty());

        assert_eq!(get(&app, "/missing").status(), 404);
    }

    #[test]
    fn unknown_method_depends_on_path() {
        let app = App::new().get("/known", || "");
        let res = app.handle("BREW", "/known", Headers::new(), "");
        assert_eq!(res.status(), 405);
        assert_eq!(res.header("allow"), Some("GET"));
        assert_eq!(app.handle("BREW", "/unknown", Headers::new(), "").status(), 404);
    }

    #[test]
    fn intermediate_node_has_no_allow_header() {
        let app = App::new().get("/a/b", || "");
        let res = get(&app, "/a");
        assert_eq!(res.status(), 405);
        assert_eq!(res.header("Allow"), None);
    }

    #[test]
    fn lookup_fills_path_params() {
        let app = App::new().get("/users/{id}/posts/<post>", |id: u32, post: String| format!("{id}:{post}"));
        let mut req = Request::with_target(Method::Get, "/users/7/posts/hello?x=1");

        let endpoint = app.lookup(&mut req).unwrap();
        assert_eq!(req.param("id"), Some("7"));
        assert_eq!(req.param("post"), Some("hello"));
        assert_eq!(endpoint.params().len(), 2);
    }

    #[test]
    fn handler_sees_request_and_params() {
        let app = App::new().post("/echo/{name}", |req: &Request, name: String| {
            format!("{name}:{}", String::from_utf8_lossy(req.body()))
        });
        let res = app.handle("POST", "/echo/bob", Headers::new(), "payload");
        assert_eq!(res.body(), b"bob:payload");
    }

    #[test]
    fn parse_failure_is_bad_request() {
        let app = App::new().get("/users/{id}", |id: u32| id.to_string());
        assert_eq!(get(&app, "/users/abc").status(), 400);
        assert_eq!(get(&app, "/users/12").body(), b"12");
    }

    #[test]
    fn try_on_reports_errors_and_keeps_routes() {
        let mut app = App::new();
        app.try_on(Method::Get, "/{x}", || "x").unwrap();

        let err = app.try_on(Method::Get, "/{y}", || "y").unwrap_err();
        assert!(matches!(err, RouteError::WildcardNameConflict { .. }));

        let err = app.try_on(Method::Get, "/{x}", || "again").unwrap_err();
        assert!(matches!(err, RouteError::DuplicateRoute { .. }));

        let err = app.try_on(Method::Get, "/par{am", || "").unwrap_err();
        assert!(matches!(err, RouteError::MalformedPattern { .. }));

        assert_eq!(get(&app, "/anything").body(), b"x");
    }

    #[test]
    fn arity_mismatch_fails_registration() {
        let mut app = App::new();
        let err = app.try_on(Method::Get, "/a/{x}", |x: String, y: String| x + &y).unwrap_err();
        assert_eq!(
            err,
            RouteError::ArityMismatch { method: Method::Get, pattern: "/a/{x}".into(), arity: 2, named: 1 },
        );
        assert!(!app.router.contains_path("/a/1"));

        app.try_on(Method::Get, "/a/{x}", with_params(["x", "y"], |x: String, y: Option<String>| {
            x + &y.unwrap_or_default()
        }))
        .unwrap();
        assert_eq!(get(&app, "/a/1?y=2").body(), b"12");
    }

    #[test]
    #[should_panic(expected = "invalid route `/{a}/{a}`")]
    fn chaining_builder_panics_on_bad_route() {
        let _ = App::new().get("/{a}/{a}", || "");
    }

    #[test]
    fn observer_sees_registrations_and_failures() {
        let recorder = Recorder::default();
        let app = App::new()
            .with_observer(recorder.clone())
            .route(&[Method::Get, Method::Post], "/boom", || -> anyhow::Result<String> {
                anyhow::bail!("no luck")
            });

        assert_eq!(get(&app, "/boom").status(), 500);
        assert_eq!(
            *recorder.0.lock().unwrap(),
            ["added GET /boom", "added POST /boom", "failed GET /boom: no luck"],
        );
    }
}
