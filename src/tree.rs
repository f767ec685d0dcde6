//! A compressing dynamic trie (radix tree) of route patterns.
//!
//! Every node holds a prefix shared by all routes below it. Static children
//! are indexed by the first character of their prefix and kept sorted by
//! priority, the number of routes registered in their subtree. A node has
//! either static children or exactly one wildcard child, never both, so a
//! request path resolves to at most one route.

use std::borrow::Cow;
use std::mem;

use crate::error::{ConflictError, InsertError, StructuralError};
use crate::params::{Param, Params};

/// Trailing slash recommendation returned by a failed lookup.
///
/// `Tsr::Yes` means the same path with a trailing slash added (or removed)
/// does resolve to a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tsr {
    Yes,
    No,
}

impl From<bool> for Tsr {
    fn from(recommend: bool) -> Self {
        if recommend {
            Tsr::Yes
        } else {
            Tsr::No
        }
    }
}

/// A successful lookup.
#[derive(Debug)]
pub struct Match<'n, T> {
    /// The value stored for the route.
    pub value: &'n T,
    /// The parameters captured from the path.
    pub params: Params,
    /// The pattern the route was registered with.
    pub route: &'n str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NodeKind {
    Root,
    Static,
    Param,
    CatchAll,
}

/// A node of the route tree. The root node of an empty tree is
/// `Node::default()`.
#[derive(Debug)]
pub struct Node<T> {
    prefix: String,
    kind: NodeKind,
    wild_child: bool,
    indices: Vec<char>,
    children: Vec<Node<T>>,
    value: Option<T>,
    priority: u32,
    param_count: usize,
    full_path: Option<String>,
}

impl<T> Default for Node<T> {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            kind: NodeKind::Static,
            wild_child: false,
            indices: Vec::new(),
            children: Vec::new(),
            value: None,
            priority: 0,
            param_count: 0,
            full_path: None,
        }
    }
}

impl<T> Node<T> {
    /// Inserts a route, returning the number of parameters it captures.
    ///
    /// ```rust
    /// use trie_router::tree::Node;
    ///
    /// let mut tree = Node::default();
    /// assert_eq!(tree.insert("/user/:name", "user"), Ok(1));
    /// assert!(tree.insert("/user/:id", "other").is_err());
    /// ```
    ///
    /// A failed insertion may still have split nodes or bumped priorities on
    /// the way down; routing results for the routes already present are
    /// unaffected.
    pub fn insert(&mut self, route: impl Into<String>, value: T) -> Result<usize, InsertError> {
        let full_path = route.into();
        validate(&full_path)?;

        let mut path = full_path.as_str();
        self.priority += 1;

        // empty tree
        if self.prefix.is_empty() && self.indices.is_empty() && !self.wild_child {
            let params = self.insert_child(path, &full_path, value)?;
            self.kind = NodeKind::Root;
            return Ok(params);
        }

        let mut n = self;
        loop {
            let common = longest_common_prefix(path, &n.prefix);

            if common < n.prefix.len() {
                n.split(common);
            }

            if common == path.len() {
                if n.value.is_some() {
                    return Err(ConflictError::Duplicate(full_path.clone()).into());
                }
                n.value = Some(value);
                n.full_path = Some(full_path.clone());
                return Ok(n.param_count);
            }

            path = &path[common..];

            if n.wild_child {
                n = &mut n.children[0];
                n.priority += 1;

                if n.kind == NodeKind::CatchAll && path == n.prefix && n.value.is_some() {
                    return Err(ConflictError::Duplicate(full_path.clone()).into());
                }

                // the wildcard must be reused verbatim; `:name` does not match `:names`
                if path.starts_with(n.prefix.as_str())
                    && n.kind != NodeKind::CatchAll
                    && (n.prefix.len() >= path.len() || path.as_bytes()[n.prefix.len()] == b'/')
                {
                    continue;
                }

                let segment = match n.kind {
                    NodeKind::CatchAll => path,
                    _ => path.split('/').next().unwrap_or(path),
                };
                let consumed = &full_path[..full_path.len() - path.len()];
                return Err(ConflictError::Wildcard {
                    segment: segment.to_owned(),
                    path: full_path.clone(),
                    wildcard: n.prefix.clone(),
                    prefix: format!("{}{}", consumed, n.prefix),
                }
                .into());
            }

            let next = match path.chars().next() {
                Some(c) => c,
                None => break,
            };

            // '/' after param
            if n.kind == NodeKind::Param && next == '/' && n.children.len() == 1 {
                n = &mut n.children[0];
                n.priority += 1;
                continue;
            }

            if let Some(i) = n.indices.iter().position(|&c| c == next) {
                let i = n.increment_child_priority(i);
                n = &mut n.children[i];
                continue;
            }

            if next != ':' && next != '*' {
                n.indices.push(next);
                n.children.push(Node {
                    param_count: n.param_count,
                    ..Node::default()
                });
                let i = n.increment_child_priority(n.children.len() - 1);
                n = &mut n.children[i];
            }

            return n.insert_child(path, &full_path, value);
        }

        Err(ConflictError::Duplicate(full_path.clone()).into())
    }

    /// Splits the node so that its prefix ends at byte `at`, moving the rest
    /// of the prefix and everything below into a new static child.
    fn split(&mut self, at: usize) {
        let child = Node {
            prefix: self.prefix[at..].to_owned(),
            kind: NodeKind::Static,
            wild_child: self.wild_child,
            indices: mem::take(&mut self.indices),
            children: mem::take(&mut self.children),
            value: self.value.take(),
            priority: self.priority - 1,
            param_count: self.param_count,
            full_path: self.full_path.take(),
        };

        self.indices = child.prefix.chars().next().into_iter().collect();
        self.prefix.truncate(at);
        self.children = vec![child];
        self.wild_child = false;
    }

    /// Increments the priority of the child at `i` and moves it ahead of
    /// every sibling with a strictly lower priority. Siblings of equal
    /// priority keep their registration order. Returns the new position.
    fn increment_child_priority(&mut self, i: usize) -> usize {
        self.children[i].priority += 1;
        let priority = self.children[i].priority;

        let mut updated = i;
        while updated > 0 && self.children[updated - 1].priority < priority {
            self.children.swap(updated - 1, updated);
            updated -= 1;
        }

        if updated != i {
            let index = self.indices.remove(i);
            self.indices.insert(updated, index);
        }

        updated
    }

    /// Builds the remainder of a route below a node that has no matching
    /// child yet. The pattern has already been validated.
    fn insert_child(&mut self, mut path: &str, full_path: &str, value: T) -> Result<usize, InsertError> {
        let mut n = self;

        while let Some((wildcard, i)) = find_wildcard(path) {
            if !n.children.is_empty() {
                return Err(ConflictError::WildcardChildren {
                    wildcard: wildcard.to_owned(),
                    path: full_path.to_owned(),
                }
                .into());
            }

            if wildcard.starts_with(':') {
                if i > 0 {
                    n.prefix = path[..i].to_owned();
                    path = &path[i..];
                }

                let param_count = n.param_count + 1;
                n.wild_child = true;
                n.children = vec![Node {
                    prefix: wildcard.to_owned(),
                    kind: NodeKind::Param,
                    priority: 1,
                    param_count,
                    ..Node::default()
                }];
                n = &mut n.children[0];

                // a static subpath starting with '/' follows the param
                if wildcard.len() < path.len() {
                    path = &path[wildcard.len()..];
                    n.children = vec![Node {
                        priority: 1,
                        param_count,
                        ..Node::default()
                    }];
                    n = &mut n.children[0];
                    continue;
                }

                n.value = Some(value);
                n.full_path = Some(full_path.to_owned());
                return Ok(param_count);
            }

            // catch-all: the '/' before it has to be matched by this node
            if i == 0 || n.prefix.ends_with('/') {
                return Err(ConflictError::CatchAllRoot(full_path.to_owned()).into());
            }

            let param_count = n.param_count + 1;
            n.prefix = path[..i - 1].to_owned();
            n.indices = vec!['/'];
            n.children = vec![Node {
                kind: NodeKind::CatchAll,
                wild_child: true,
                priority: 1,
                param_count: n.param_count,
                children: vec![Node {
                    prefix: path[i - 1..].to_owned(),
                    kind: NodeKind::CatchAll,
                    value: Some(value),
                    priority: 1,
                    param_count,
                    full_path: Some(full_path.to_owned()),
                    ..Node::default()
                }],
                ..Node::default()
            }];

            return Ok(param_count);
        }

        n.prefix = path.to_owned();
        n.value = Some(value);
        n.full_path = Some(full_path.to_owned());
        Ok(n.param_count)
    }

    /// Looks up the value registered for `path`.
    ///
    /// ```rust
    /// use trie_router::tree::{Node, Tsr};
    ///
    /// let mut tree = Node::default();
    /// tree.insert("/files/*filepath", "files").unwrap();
    ///
    /// let matched = tree.at("/files/a/b.txt").unwrap();
    /// assert_eq!(*matched.value, "files");
    /// assert_eq!(matched.params.get("filepath"), Some("/a/b.txt"));
    /// assert_eq!(tree.at("/files").unwrap_err(), Tsr::Yes);
    /// ```
    pub fn at(&self, path: &str) -> Result<Match<'_, T>, Tsr> {
        self.at_with(path, Params::new())
    }

    /// Like [`at`](Node::at), capturing into a caller supplied buffer.
    pub(crate) fn at_with(&self, path: &str, mut params: Params) -> Result<Match<'_, T>, Tsr> {
        match self.get_value(path, Some(params.buffer_mut())) {
            Ok(node) => match (node.value.as_ref(), node.full_path.as_deref()) {
                (Some(value), Some(route)) => Ok(Match {
                    value,
                    params,
                    route,
                }),
                _ => Err(Tsr::No),
            },
            Err(Tsr::Yes) => Err(self.recommend_trailing_slash(path)),
            Err(Tsr::No) => Err(Tsr::No),
        }
    }

    /// Returns `true` if `path` resolves to a value.
    pub fn matches(&self, path: &str) -> bool {
        self.get_value(path, None).is_ok()
    }

    /// Whether this child, reached through the `/` index, holds a route for
    /// the lone slash: a `/` leaf, or a catch-all starting at the slash. A
    /// catch-all below a shared prefix sits behind an empty static node.
    fn resolves_slash(&self) -> bool {
        match self.kind {
            NodeKind::CatchAll => self.children.first().map_or(false, |c| c.value.is_some()),
            _ if self.prefix.is_empty() => {
                self.indices == ['/'] && self.children.first().map_or(false, Node::resolves_slash)
            }
            _ => self.prefix == "/" && self.value.is_some(),
        }
    }

    /// Confirms a trailing slash hint by resolving the adjusted path.
    fn recommend_trailing_slash(&self, path: &str) -> Tsr {
        let adjusted = match path.strip_suffix('/') {
            Some("") => return Tsr::No,
            Some(stripped) => Cow::Borrowed(stripped),
            None => Cow::Owned(format!("{}/", path)),
        };

        Tsr::from(self.matches(&adjusted))
    }

    /// Walks the tree. `Err(Tsr::Yes)` is only a hint here, the caller
    /// confirms it.
    fn get_value<'n>(
        &'n self,
        mut path: &str,
        mut params: Option<&mut Vec<Param>>,
    ) -> Result<&'n Node<T>, Tsr> {
        let mut n = self;

        loop {
            let prefix = n.prefix.as_str();

            if path.len() > prefix.len() {
                if !path.starts_with(prefix) {
                    break;
                }
                path = &path[prefix.len()..];

                if !n.wild_child {
                    if let Some(next) = path.chars().next() {
                        if let Some(i) = n.indices.iter().position(|&c| c == next) {
                            n = &n.children[i];
                            continue;
                        }
                    }

                    return Err(Tsr::from(path == "/" && n.value.is_some()));
                }

                n = &n.children[0];
                match n.kind {
                    NodeKind::Param => {
                        let end = path.find('/').unwrap_or_else(|| path.len());
                        // empty segments never match a param
                        if end == 0 {
                            return Err(Tsr::No);
                        }

                        if let Some(params) = params.as_deref_mut() {
                            params.push(Param::new(&n.prefix[1..], &path[..end]));
                        }

                        if end < path.len() {
                            if let Some(child) = n.children.first() {
                                path = &path[end..];
                                n = child;
                                continue;
                            }

                            return Err(Tsr::from(path.len() == end + 1));
                        }

                        if n.value.is_some() {
                            return Ok(n);
                        }

                        if let [child] = n.children.as_slice() {
                            return Err(Tsr::from(
                                (child.prefix == "/" && child.value.is_some())
                                    || (child.prefix.is_empty() && child.indices == ['/']),
                            ));
                        }

                        return Err(Tsr::No);
                    }
                    NodeKind::CatchAll => {
                        if let Some(params) = params.as_deref_mut() {
                            params.push(Param::new(&n.prefix[2..], path));
                        }

                        return if n.value.is_some() {
                            Ok(n)
                        } else {
                            Err(Tsr::No)
                        };
                    }
                    NodeKind::Root | NodeKind::Static => return Err(Tsr::No),
                }
            }

            if path == prefix {
                if n.value.is_some() {
                    return Ok(n);
                }

                if path == "/" && n.wild_child && n.kind != NodeKind::Root {
                    return Err(Tsr::Yes);
                }

                if path == "/" && n.kind == NodeKind::Static {
                    return Err(Tsr::Yes);
                }

                if let Some(i) = n.indices.iter().position(|&c| c == '/') {
                    return Err(Tsr::from(n.children[i].resolves_slash()));
                }

                return Err(Tsr::No);
            }

            break;
        }

        // the path may be this node's prefix without its trailing slash
        let prefix = n.prefix.as_str();
        Err(Tsr::from(
            path == "/"
                || (prefix.len() == path.len() + 1
                    && prefix.ends_with('/')
                    && prefix.starts_with(path)
                    && n.value.is_some()),
        ))
    }

    /// Makes a case-insensitive lookup of `path` and returns the path as it
    /// was registered, with the parameter values taken from `path`.
    /// With `fix_trailing_slash`, a missing or superfluous trailing slash is
    /// corrected as well.
    ///
    /// ```rust
    /// use trie_router::tree::Node;
    ///
    /// let mut tree = Node::default();
    /// tree.insert("/user/:name", ()).unwrap();
    ///
    /// assert_eq!(tree.path_ignore_case("/USER/Gopher/", true), Some("/user/Gopher".to_owned()));
    /// assert_eq!(tree.path_ignore_case("/USER/Gopher/", false), None);
    /// ```
    pub fn path_ignore_case(&self, path: &str, fix_trailing_slash: bool) -> Option<String> {
        let mut insensitive = String::with_capacity(path.len() + 1);
        if self.find_ignore_case(path, &mut insensitive, fix_trailing_slash) {
            Some(insensitive)
        } else {
            None
        }
    }

    /// Matches `path` against this (static) node and its subtree, appending
    /// the canonical text to `out`. On failure `out` is left untouched.
    fn find_ignore_case(&self, path: &str, out: &mut String, fix_trailing_slash: bool) -> bool {
        let rest = match strip_prefix_ignore_case(path, &self.prefix) {
            Some(rest) => rest,
            None => {
                // missing trailing slash
                if fix_trailing_slash
                    && self.value.is_some()
                    && self.prefix.ends_with('/')
                    && eq_ignore_case(path, &self.prefix[..self.prefix.len() - 1])
                {
                    out.push_str(&self.prefix);
                    return true;
                }
                return false;
            }
        };

        let len = out.len();
        out.push_str(&self.prefix);

        if rest.is_empty() {
            if self.value.is_some() {
                return true;
            }

            if fix_trailing_slash {
                if let Some(i) = self.indices.iter().position(|&c| c == '/') {
                    if self.children[i].resolves_slash() {
                        out.push('/');
                        return true;
                    }
                }
            }

            out.truncate(len);
            return false;
        }

        if !self.wild_child {
            if let Some(next) = rest.chars().next() {
                for (i, &index) in self.indices.iter().enumerate() {
                    if chars_eq_ignore_case(index, next)
                        && self.children[i].find_ignore_case(rest, out, fix_trailing_slash)
                    {
                        return true;
                    }
                }
            }

            // superfluous trailing slash
            if fix_trailing_slash && rest == "/" && self.value.is_some() {
                return true;
            }

            out.truncate(len);
            return false;
        }

        let wildcard = &self.children[0];
        match wildcard.kind {
            NodeKind::Param => {
                let end = rest.find('/').unwrap_or_else(|| rest.len());
                if end > 0 {
                    out.push_str(&rest[..end]);

                    if end < rest.len() {
                        if let Some(child) = wildcard.children.first() {
                            if child.find_ignore_case(&rest[end..], out, fix_trailing_slash) {
                                return true;
                            }
                        } else if fix_trailing_slash
                            && rest.len() == end + 1
                            && wildcard.value.is_some()
                        {
                            return true;
                        }
                    } else if wildcard.value.is_some() {
                        return true;
                    } else if fix_trailing_slash {
                        if let [child] = wildcard.children.as_slice() {
                            if child.prefix == "/" && child.value.is_some() {
                                out.push('/');
                                return true;
                            }
                        }
                    }
                }
            }
            NodeKind::CatchAll => {
                if wildcard.value.is_some() {
                    out.push_str(rest);
                    return true;
                }
            }
            NodeKind::Root | NodeKind::Static => {}
        }

        out.truncate(len);
        false
    }
}

/// Rejects malformed patterns before the tree is modified.
fn validate(path: &str) -> Result<(), StructuralError> {
    if !path.starts_with('/') {
        return Err(StructuralError::MissingLeadingSlash(path.to_owned()));
    }

    let mut offset = 0;
    while let Some((wildcard, i)) = find_wildcard(&path[offset..]) {
        let start = offset + i;

        if wildcard[1..].contains(|c: char| c == ':' || c == '*') {
            return Err(StructuralError::MultipleWildcards {
                segment: wildcard.to_owned(),
                path: path.to_owned(),
            });
        }

        if wildcard.len() < 2 {
            return Err(StructuralError::UnnamedWildcard(path.to_owned()));
        }

        if wildcard.starts_with('*') {
            if start + wildcard.len() != path.len() {
                return Err(StructuralError::CatchAllNotAtEnd(path.to_owned()));
            }
            if !path[..start].ends_with('/') {
                return Err(StructuralError::MissingSlashBeforeCatchAll(path.to_owned()));
            }
        }

        offset = start + wildcard.len();
    }

    Ok(())
}

/// Finds the first wildcard segment in `path`, returning it with its byte
/// offset. The wildcard extends to the next '/' or the end of the path.
fn find_wildcard(path: &str) -> Option<(&str, usize)> {
    let start = path.find(|c: char| c == ':' || c == '*')?;
    let end = path[start..].find('/').map_or(path.len(), |end| start + end);
    Some((&path[start..end], start))
}

/// Length in bytes of the longest common prefix, on a char boundary.
fn longest_common_prefix(a: &str, b: &str) -> usize {
    a.char_indices()
        .zip(b.chars())
        .find(|((_, x), y)| x != y)
        .map_or_else(|| a.len().min(b.len()), |((i, _), _)| i)
}

fn chars_eq_ignore_case(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

fn eq_ignore_case(a: &str, b: &str) -> bool {
    strip_prefix_ignore_case(a, b).map_or(false, str::is_empty)
}

/// Strips `prefix` from `path` comparing char by char without regard to case.
fn strip_prefix_ignore_case<'p>(path: &'p str, prefix: &str) -> Option<&'p str> {
    let mut rest = path.chars();
    for expected in prefix.chars() {
        let actual = rest.next()?;
        if !chars_eq_ignore_case(actual, expected) {
            return None;
        }
    }
    Some(rest.as_str())
}
