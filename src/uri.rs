//! Request-target parsing for origin-form URLs (`/path?query#fragment`).

use std::collections::HashMap;

/// The parts of a relative request target.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Url {
    pub path: String,
    pub query: String,
    pub fragment: String,
}

impl Url {
    /// Splits `target` at the first `?` and the first `#`.
    ///
    /// Anything after `#` is the fragment, even a `?`; anything between `?`
    /// and `#` is the query. Scheme and authority are not recognised: the
    /// transport hands over origin-form targets only.
    pub fn parse_relative(target: &str) -> Self {
        let (rest, fragment) = target.split_once('#').unwrap_or((target, ""));
        let (path, query) = rest.split_once('?').unwrap_or((rest, ""));
        Self {
            path: path.to_owned(),
            query: query.to_owned(),
            fragment: fragment.to_owned(),
        }
    }
}

/// Decodes an `application/x-www-form-urlencoded` query string.
///
/// Repeated keys collect their values in order. Pairs with an empty value
/// (`a=` or a bare `a`) are dropped.
pub fn parse_query(query: &str) -> HashMap<String, Vec<String>> {
    let mut args: HashMap<String, Vec<String>> = HashMap::new();
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        if value.is_empty() {
            continue;
        }
        args.entry(key.into_owned()).or_default().push(value.into_owned());
    }
    args
}
