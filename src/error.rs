//! Route registration errors.

use thiserror::Error;

/// An error returned when a route cannot be inserted.
///
/// Both classes are configuration errors: an application should abort startup
/// rather than serve traffic with a partially registered routing table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InsertError {
    /// The pattern itself is malformed.
    #[error(transparent)]
    Structural(#[from] StructuralError),
    /// The pattern is well formed but would make the tree ambiguous.
    #[error(transparent)]
    Conflict(#[from] ConflictError),
}

impl InsertError {
    /// Returns `true` if the route conflicts with a previously registered one.
    pub fn is_conflict(&self) -> bool {
        matches!(self, InsertError::Conflict(_))
    }
}

/// A malformed route pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralError {
    #[error("path must begin with '/' in path '{0}'")]
    MissingLeadingSlash(String),

    #[error("wildcards must be named with a non-empty name in path '{0}'")]
    UnnamedWildcard(String),

    #[error("only one wildcard per path segment is allowed, has: '{segment}' in path '{path}'")]
    MultipleWildcards { segment: String, path: String },

    #[error("catch-all routes are only allowed at the end of the path in path '{0}'")]
    CatchAllNotAtEnd(String),

    #[error("no / before catch-all in path '{0}'")]
    MissingSlashBeforeCatchAll(String),
}

/// A route that cannot coexist with the routes already in the tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConflictError {
    #[error("a handler is already registered for path '{0}'")]
    Duplicate(String),

    #[error(
        "'{segment}' in new path '{path}' conflicts with existing wildcard '{wildcard}' in existing prefix '{prefix}'"
    )]
    Wildcard {
        segment: String,
        path: String,
        wildcard: String,
        prefix: String,
    },

    #[error("wildcard segment '{wildcard}' conflicts with existing children in path '{path}'")]
    WildcardChildren { wildcard: String, path: String },

    #[error("catch-all conflicts with existing handle for the path segment root in path '{0}'")]
    CatchAllRoot(String),
}
