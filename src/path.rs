//! Path tokenizing and route-pattern segments.
//!
//! Both registration patterns and request paths go through [`tokenize`], so
//! leading, trailing and repeated slashes never matter: `"/a//b/"`, `"a/b"`
//! and `"/a/b"` are the same route.

use std::str::Split;

use crate::error::RouteError;

/// Splits `path` on `/`, skipping empty components.
///
/// Lazy and restartable: clone the iterator to walk the segments again.
///
/// ```rust
/// let segments: Vec<_> = nanoroute::path::tokenize("//users/42/").collect();
/// assert_eq!(segments, ["users", "42"]);
/// ```
pub fn tokenize(path: &str) -> Segments<'_> {
    Segments { inner: path.split('/') }
}

/// Iterator returned by [`tokenize`].
#[derive(Clone, Debug)]
pub struct Segments<'a> {
    inner: Split<'a, char>,
}

impl<'a> Iterator for Segments<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        self.inner.by_ref().find(|s| !s.is_empty())
    }
}

/// Every character that may delimit a parameter, in either syntax.
const DELIMITERS: [char; 4] = ['{', '}', '<', '>'];

/// One parsed segment of a route pattern.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Segment<'a> {
    /// Matches exactly this text.
    Static(&'a str),
    /// Matches any single segment and binds it to this name.
    Wildcard(&'a str),
}

impl<'a> Segment<'a> {
    /// Classifies a pattern segment.
    ///
    /// `{name}` and `<name>` are the same wildcard. The first and last
    /// characters are the only place a delimiter may appear, and they must
    /// come as a matching pair.
    pub fn parse(segment: &'a str) -> Result<Self, RouteError> {
        let first = segment.chars().next();
        let last = segment.chars().next_back();
        let interior = {
            let mut chars = segment.chars();
            chars.next();
            chars.next_back();
            chars.as_str()
        };

        if let Some(found) = interior.chars().find(|c| DELIMITERS.contains(c)) {
            return Err(RouteError::MalformedPattern { segment: segment.to_owned(), found });
        }

        match (first, last) {
            (Some('{'), Some('}')) | (Some('<'), Some('>')) => {
                if interior.is_empty() {
                    Err(RouteError::EmptyParameter { segment: segment.to_owned() })
                } else {
                    Ok(Self::Wildcard(interior))
                }
            }
            (Some('{' | '<'), _) | (_, Some('}' | '>')) => {
                Err(RouteError::UnbalancedDelimiter { segment: segment.to_owned() })
            }
            _ => Ok(Self::Static(segment)),
        }
    }
}

/// Returns whether `segment` denotes a parameter, failing on malformed
/// delimiters.
pub fn check_param(segment: &str) -> Result<bool, RouteError> {
    Segment::parse(segment).map(|s| matches!(s, Segment::Wildcard(_)))
}

/// Parses every segment of `pattern`, rejecting a parameter name that is
/// bound twice.
pub(crate) fn parse_pattern(pattern: &str) -> Result<Vec<Segment<'_>>, RouteError> {
    let segments = tokenize(pattern)
        .map(Segment::parse)
        .collect::<Result<Vec<_>, _>>()?;

    for (i, segment) in segments.iter().enumerate() {
        if let Segment::Wildcard(name) = segment {
            if segments[..i].contains(segment) {
                return Err(RouteError::DuplicateParameter {
                    name: (*name).to_owned(),
                    pattern: pattern.to_owned(),
                });
            }
        }
    }

    Ok(segments)
}

/// Names of the wildcards in `pattern`, in order.
pub(crate) fn wildcard_names(segments: &[Segment<'_>]) -> Vec<String> {
    segments
        .iter()
        .filter_map(|s| match s {
            Segment::Wildcard(name) => Some((*name).to_owned()),
            Segment::Static(_) => None,
        })
        .collect()
}
