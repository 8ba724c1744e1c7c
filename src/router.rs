//! Segment-trie request router.
//!
//! A single trie for all methods. Each node holds its per-method handlers, a map of
//! literal children, and at most one wildcard child. Lookup is a single walk,
//! O(segment-count), with no backtracking: a literal child always wins over the
//! wildcard, and a segment that matches neither stops the walk.
//!
//! Build it once during setup, then share it read-only. `resolve` never
//! mutates, so concurrent lookups need no locking.

use std::collections::HashMap;

use tracing::debug;

use crate::error::{LookupError, RouteError};
use crate::method::Method;
use crate::path::{self, Segment};

/// A successful lookup: the handler plus the path parameters collected on
/// the way down.
#[derive(Debug)]
pub struct Match<'a, H> {
    pub handler: &'a H,
    pub params: HashMap<String, String>,
}

/// The route trie.
///
/// Generic over the handler payload `H`; [`App`](crate::App) stores
/// endpoints, tests can store plain strings.
#[derive(Debug)]
pub struct Router<H> {
    root: Node<H>,
}

#[derive(Debug)]
struct Node<H> {
    /// Literal text, or the parameter name for a wildcard node.
    label: String,
    handlers: HashMap<Method, H>,
    children: HashMap<String, Node<H>>,
    wildcard: Option<Box<Node<H>>>,
}

impl<H> Node<H> {
    fn new(label: &str) -> Self {
        Self {
            label: label.to_owned(),
            handlers: HashMap::new(),
            children: HashMap::new(),
            wildcard: None,
        }
    }

    /// Literal child first, wildcard second. Binds the segment when the
    /// wildcard is taken.
    fn child(&self, segment: &str, params: &mut HashMap<String, String>) -> Option<&Node<H>> {
        if let Some(child) = self.children.get(segment) {
            return Some(child);
        }
        let wild = self.wildcard.as_deref()?;
        params.insert(wild.label.clone(), segment.to_owned());
        Some(wild)
    }

    fn allowed(&self) -> Vec<Method> {
        let mut methods: Vec<Method> = self.handlers.keys().copied().collect();
        methods.sort();
        methods
    }
}

impl<H> Router<H> {
    pub fn new() -> Self {
        Self { root: Node::new("") }
    }

    /// Binds `handler` to `method` on `pattern`.
    ///
    /// Fails if a segment is malformed, if a wildcard position is already
    /// bound under another name, or if `method` is already bound on the same
    /// route. A failed call leaves the trie untouched.
    pub fn add_route(&mut self, method: Method, pattern: &str, handler: H) -> Result<(), RouteError> {
        let segments = path::parse_pattern(pattern)?;
        self.check(method, pattern, &segments)?;

        let mut node = &mut self.root;
        for segment in &segments {
            node = match *segment {
                Segment::Static(literal) => node
                    .children
                    .entry(literal.to_owned())
                    .or_insert_with(|| Node::new(literal)),
                Segment::Wildcard(name) => &mut **node
                    .wildcard
                    .get_or_insert_with(|| Box::new(Node::new(name))),
            };
        }
        node.handlers.insert(method, handler);

        debug!(%method, pattern, "route registered");
        Ok(())
    }

    /// Walks the existing part of the trie along `segments` and reports the
    /// first conflict, without creating anything.
    fn check(&self, method: Method, pattern: &str, segments: &[Segment<'_>]) -> Result<(), RouteError> {
        let mut node = Some(&self.root);
        for segment in segments {
            // Past the end of the existing trie nothing can conflict.
            let Some(current) = node else { return Ok(()) };
            node = match *segment {
                Segment::Static(literal) => current.children.get(literal),
                Segment::Wildcard(name) => match current.wildcard.as_deref() {
                    Some(wild) if wild.label != name => {
                        return Err(RouteError::WildcardNameConflict {
                            existing: wild.label.clone(),
                            requested: name.to_owned(),
                            method,
                            pattern: pattern.to_owned(),
                        });
                    }
                    other => other,
                },
            };
        }

        match node {
            Some(terminal) if terminal.handlers.contains_key(&method) => Err(RouteError::DuplicateRoute {
                method,
                pattern: pattern.to_owned(),
            }),
            _ => Ok(()),
        }
    }

    /// Finds the handler for `method` on `path`.
    ///
    /// `NotFound` when some segment matches no child; `MethodNotAllowed` when
    /// the path reaches a node that has no handler for `method`.
    pub fn resolve(&self, method: Method, path: &str) -> Result<Match<'_, H>, LookupError> {
        let mut params = HashMap::new();
        let Some(node) = self.walk(path, &mut params) else {
            debug!(%method, path, "no route matches path");
            return Err(LookupError::NotFound);
        };

        match node.handlers.get(&method) {
            Some(handler) => Ok(Match { handler, params }),
            None => {
                debug!(%method, path, "method not allowed for path");
                Err(LookupError::MethodNotAllowed { allowed: node.allowed() })
            }
        }
    }

    /// Whether `path` reaches a node, whatever methods it handles.
    pub fn contains_path(&self, path: &str) -> bool {
        self.walk(path, &mut HashMap::new()).is_some()
    }

    /// Methods bound on the node `path` reaches, or `None` if it reaches none.
    pub fn allowed_methods(&self, path: &str) -> Option<Vec<Method>> {
        self.walk(path, &mut HashMap::new()).map(Node::allowed)
    }

    fn walk(&self, path: &str, params: &mut HashMap<String, String>) -> Option<&Node<H>> {
        let mut node = &self.root;
        for segment in path::tokenize(path) {
            node = node.child(segment, params)?;
        }
        Some(node)
    }
}

impl<H> Default for Router<H> {
    fn default() -> Self {
        Self::new()
    }
}
