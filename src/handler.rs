//! Handler trait, parameter binding contract and type erasure.
//!
//! # Handler shapes
//!
//! A handler is any function or closure of the form
//!
//! ```text
//! fn name(            a: A, b: B, ...) -> impl IntoReply
//! fn name(req: &Request, a: A, b: B, ...) -> impl IntoReply
//! ```
//!
//! where every argument type implements [`FromParam`] (up to eight of them).
//! The leading `&Request` is optional.
//!
//! # How arguments get their values
//!
//! Argument names are fixed once, at registration, as a list of
//! [`ParamSpec`]s. By default they are the wildcard names of the route
//! pattern, in order; [`with_params`] names them explicitly, which is how a
//! handler asks for query-string values:
//!
//! ```rust
//! use nanoroute::{App, with_params};
//!
//! fn greet(name: String, lang: Option<String>) -> String {
//!     format!("hello {name} ({})", lang.as_deref().unwrap_or("en"))
//! }
//!
//! let app = App::new().get("/hello/{name}", with_params(["name", "lang"], greet));
//! ```
//!
//! At dispatch each name is looked up as a path parameter, then as the first
//! query value, else it is absent. Values are handed over positionally in the
//! declared order.
//!
//! # How handlers are stored
//!
//! Handlers of different types live in one trie, so each is boxed behind the
//! object-safe [`ErasedHandler`] once, at registration. A request then costs
//! one virtual call.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::adapter::{IntoReply, Reply};
use crate::error::{HandlerError, HttpError, RouteError};
use crate::method::Method;
use crate::request::Request;

// ── Parameter descriptors ─────────────────────────────────────────────────────

/// One named handler argument, captured at registration.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParamSpec {
    pub name: String,
    pub required: bool,
}

/// A bound argument: the declared name and the value found for it, if any.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Arg<'a> {
    pub name: &'a str,
    pub value: Option<&'a str>,
}

/// Conversion of a bound value into a handler argument.
///
/// Required types turn an absent value into `400 Bad Request`; so does a
/// value that does not parse.
pub trait FromParam: Sized {
    const REQUIRED: bool = true;

    fn from_param(name: &str, value: Option<&str>) -> Result<Self, HttpError>;
}

fn required<'a>(name: &str, value: Option<&'a str>) -> Result<&'a str, HttpError> {
    value.ok_or_else(|| HttpError::bad_request(format!("missing parameter `{name}`")))
}

impl FromParam for String {
    fn from_param(name: &str, value: Option<&str>) -> Result<Self, HttpError> {
        required(name, value).map(str::to_owned)
    }
}

impl<T: FromParam> FromParam for Option<T> {
    const REQUIRED: bool = false;

    fn from_param(name: &str, value: Option<&str>) -> Result<Self, HttpError> {
        match value {
            Some(_) => T::from_param(name, value).map(Some),
            None => Ok(None),
        }
    }
}

macro_rules! from_str_param {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FromParam for $ty {
                fn from_param(name: &str, value: Option<&str>) -> Result<Self, HttpError> {
                    let raw = required(name, value)?;
                    raw.parse().map_err(|_| {
                        HttpError::bad_request(format!("invalid value `{raw}` for parameter `{name}`"))
                    })
                }
            }
        )*
    };
}

from_str_param!(bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);

// ── Handler trait ─────────────────────────────────────────────────────────────

#[doc(hidden)]
pub struct Plain;

#[doc(hidden)]
pub struct WithRequest;

/// Implemented for every valid route handler.
///
/// You never implement this yourself. The marker `M` only tells the blanket
/// impls apart (arity, leading `&Request` or not) and is always inferred.
pub trait Handler<M>: Send + Sync + 'static {
    /// Whether each named argument is required, in call order.
    fn requirements() -> Vec<bool>;

    fn call(&self, req: &Request, args: &[Arg<'_>]) -> Result<Reply, HandlerError>;
}

fn next_arg<T: FromParam>(args: &mut std::slice::Iter<'_, Arg<'_>>) -> Result<T, HandlerError> {
    // Registration checks arity, so running out means a bug in the binder.
    let arg = args
        .next()
        .ok_or_else(|| HandlerError::Internal(anyhow::anyhow!("handler called with too few arguments")))?;
    Ok(T::from_param(arg.name, arg.value)?)
}

macro_rules! impl_handler {
    ($($ty:ident),*) => {
        impl<F, R, $($ty,)*> Handler<(Plain, $($ty,)*)> for F
        where
            F: Fn($($ty),*) -> R + Send + Sync + 'static,
            R: IntoReply,
            $($ty: FromParam,)*
        {
            fn requirements() -> Vec<bool> {
                vec![$(<$ty as FromParam>::REQUIRED),*]
            }

            #[allow(non_snake_case, unused_mut, unused_variables)]
            fn call(&self, _req: &Request, args: &[Arg<'_>]) -> Result<Reply, HandlerError> {
                let mut args = args.iter();
                $(let $ty = next_arg::<$ty>(&mut args)?;)*
                (self)($($ty),*).into_reply()
            }
        }

        impl<F, R, $($ty,)*> Handler<(WithRequest, $($ty,)*)> for F
        where
            F: Fn(&Request, $($ty),*) -> R + Send + Sync + 'static,
            R: IntoReply,
            $($ty: FromParam,)*
        {
            fn requirements() -> Vec<bool> {
                vec![$(<$ty as FromParam>::REQUIRED),*]
            }

            #[allow(non_snake_case, unused_mut, unused_variables)]
            fn call(&self, req: &Request, args: &[Arg<'_>]) -> Result<Reply, HandlerError> {
                let mut args = args.iter();
                $(let $ty = next_arg::<$ty>(&mut args)?;)*
                (self)(req, $($ty),*).into_reply()
            }
        }
    };
}

impl_handler!();
impl_handler!(T1);
impl_handler!(T1, T2);
impl_handler!(T1, T2, T3);
impl_handler!(T1, T2, T3, T4);
impl_handler!(T1, T2, T3, T4, T5);
impl_handler!(T1, T2, T3, T4, T5, T6);
impl_handler!(T1, T2, T3, T4, T5, T6, T7);
impl_handler!(T1, T2, T3, T4, T5, T6, T7, T8);

// ── Type erasure ──────────────────────────────────────────────────────────────

/// Object-safe dispatch interface behind every [`Endpoint`].
#[doc(hidden)]
pub trait ErasedHandler: Send + Sync {
    fn call(&self, req: &Request, args: &[Arg<'_>]) -> Result<Reply, HandlerError>;
}

/// Newtype wrapper that pins down the marker of a concrete handler,
/// bridging the typed world to the trait-object world.
struct FnHandler<H, M> {
    handler: H,
    _marker: PhantomData<fn() -> M>,
}

impl<H, M> ErasedHandler for FnHandler<H, M>
where
    H: Handler<M>,
    M: 'static,
{
    fn call(&self, req: &Request, args: &[Arg<'_>]) -> Result<Reply, HandlerError> {
        self.handler.call(req, args)
    }
}

// ── Endpoint ──────────────────────────────────────────────────────────────────

/// A type-erased handler together with its parameter descriptors.
///
/// Cheap to clone: registering one handler for several methods shares it.
#[derive(Clone)]
pub struct Endpoint {
    handler: Arc<dyn ErasedHandler>,
    requirements: Vec<bool>,
    names: Option<Vec<String>>,
    params: Vec<ParamSpec>,
}

impl Endpoint {
    pub fn new<M: 'static, H: Handler<M>>(handler: H) -> Self {
        Self {
            handler: Arc::new(FnHandler { handler, _marker: PhantomData }),
            requirements: H::requirements(),
            names: None,
            params: Vec::new(),
        }
    }

    /// The descriptors the dispatcher binds, in call order. Empty until the
    /// endpoint has been registered on a route.
    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    pub(crate) fn call(&self, req: &Request, args: &[Arg<'_>]) -> Result<Reply, HandlerError> {
        self.handler.call(req, args)
    }

    /// Fixes the descriptors for a route. Without explicit names, a handler
    /// that takes arguments binds the pattern's wildcards in order.
    pub(crate) fn describe(&mut self, method: Method, pattern: &str, wildcards: Vec<String>) -> Result<(), RouteError> {
        let arity = self.requirements.len();
        let names = match &self.names {
            Some(names) => names.clone(),
            None if arity == 0 => Vec::new(),
            None => wildcards,
        };
        if names.len() != arity {
            return Err(RouteError::ArityMismatch {
                method,
                pattern: pattern.to_owned(),
                arity,
                named: names.len(),
            });
        }
        self.params = names
            .into_iter()
            .zip(&self.requirements)
            .map(|(name, &required)| ParamSpec { name, required })
            .collect();
        Ok(())
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("names", &self.names)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// Names a handler's arguments explicitly.
///
/// Each name is looked up as a path parameter first, then in the query
/// string. The number of names must match the handler's arity.
pub fn with_params<M, H, I, S>(names: I, handler: H) -> Endpoint
where
    M: 'static,
    H: Handler<M>,
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut endpoint = Endpoint::new(handler);
    endpoint.names = Some(names.into_iter().map(Into::into).collect());
    endpoint
}

/// Anything [`App`](crate::App) accepts as a route target: a bare handler,
/// or an [`Endpoint`] from [`with_params`].
pub trait IntoEndpoint<M> {
    fn into_endpoint(self) -> Endpoint;
}

#[doc(hidden)]
pub struct Described;

impl<M: 'static, H: Handler<M>> IntoEndpoint<M> for H {
    fn into_endpoint(self) -> Endpoint {
        Endpoint::new(self)
    }
}

impl IntoEndpoint<Described> for Endpoint {
    fn into_endpoint(self) -> Endpoint {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::Content;

    fn args<'a>(pairs: &[(&'a str, Option<&'a str>)]) -> Vec<Arg<'a>> {
        pairs.iter().map(|&(name, value)| Arg { name, value }).collect()
    }

    fn text(reply: Result<Reply, HandlerError>) -> String {
        match reply.expect("handler failed").content {
            Content::Text(s) => s,
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn requirements_follow_argument_types() {
        fn h(_a: String, _b: Option<String>, _c: u32) -> &'static str { "" }
        assert_eq!(Endpoint::new(h).requirements, [true, false, true]);
    }

    #[test]
    fn calls_positionally() {
        let endpoint = Endpoint::new(|a: String, b: String| format!("{a}-{b}"));
        let req = Request::with_target(Method::Get, "/");
        let out = endpoint.call(&req, &args(&[("a", Some("1")), ("b", Some("2"))]));
        assert_eq!(text(out), "1-2");
    }

    #[test]
    fn request_argument_is_optional() {
        let endpoint = Endpoint::new(|req: &Request| req.path().to_owned());
        assert!(endpoint.requirements.is_empty());
        let req = Request::with_target(Method::Get, "/here");
        assert_eq!(text(endpoint.call(&req, &[])), "/here");
    }

    #[test]
    fn missing_required_value_is_bad_request() {
        let endpoint = Endpoint::new(|name: String| name);
        let req = Request::with_target(Method::Get, "/");
        match endpoint.call(&req, &args(&[("name", None)])) {
            Err(HandlerError::Http(e)) => assert_eq!(e.status, 400),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unparseable_value_is_bad_request() {
        assert_eq!(u64::from_param("id", Some("abc")).unwrap_err().status, 400);
        assert_eq!(u64::from_param("id", Some("42")), Ok(42));
        assert_eq!(Option::<u64>::from_param("id", None), Ok(None));
    }

    #[test]
    fn describe_defaults_to_pattern_wildcards() {
        let mut endpoint = Endpoint::new(|a: String, b: String| a + &b);
        endpoint.describe(Method::Get, "/{a}/{b}", vec!["a".into(), "b".into()]).unwrap();
        assert_eq!(
            endpoint.params(),
            [
                ParamSpec { name: "a".into(), required: true },
                ParamSpec { name: "b".into(), required: true },
            ],
        );
    }

    #[test]
    fn describe_allows_ignoring_path_params() {
        let mut endpoint = Endpoint::new(|| "ignored");
        endpoint.describe(Method::Get, "/{a}", vec!["a".into()]).unwrap();
        assert!(endpoint.params().is_empty());
    }

    #[test]
    fn describe_rejects_arity_mismatch() {
        let mut endpoint = with_params(["a", "q"], |a: String| a);
        assert_eq!(
            endpoint.describe(Method::Get, "/{a}", vec!["a".into()]),
            Err(RouteError::ArityMismatch { method: Method::Get, pattern: "/{a}".into(), arity: 1, named: 2 }),
        );
    }
}
