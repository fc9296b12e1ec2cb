//! Error types for livebind.

use thiserror::Error;

/// Result type alias for livebind operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors raised while binding components to live queries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A query definition produced no result handle for its key.
    #[error("query `{key}` did not resolve to a result handle")]
    UnresolvedQuery {
        key: String,
    },
    /// A query map was bound without any queries.
    #[error("query map must contain at least one query")]
    EmptyQueryMap,
    /// The same key was declared twice in a query map.
    #[error("query key `{key}` is declared more than once")]
    DuplicateKey {
        key: String,
    },
    /// A query definition was tagged with more than one shaping mode.
    #[error("query `{key}` is tagged as both `{first}` and `{second}`")]
    ConflictingModifiers {
        key: String,
        first: &'static str,
        second: &'static str,
    },
    /// A lifecycle hook was called in a state that does not accept it.
    #[error("cannot {operation} a component that is {state}")]
    Lifecycle {
        operation: &'static str,
        state: &'static str,
    },
}

impl Error {
    /// Creates an unresolved query error.
    pub fn unresolved_query(key: impl Into<String>) -> Self {
        Error::UnresolvedQuery { key: key.into() }
    }

    /// Creates a duplicate key error.
    pub fn duplicate_key(key: impl Into<String>) -> Self {
        Error::DuplicateKey { key: key.into() }
    }

    /// Creates a conflicting modifiers error.
    pub fn conflicting_modifiers(
        key: impl Into<String>,
        first: &'static str,
        second: &'static str,
    ) -> Self {
        Error::ConflictingModifiers {
            key: key.into(),
            first,
            second,
        }
    }

    /// Creates a lifecycle error.
    pub fn lifecycle(operation: &'static str, state: &'static str) -> Self {
        Error::Lifecycle { operation, state }
    }

    /// Returns the query key this error refers to, if any.
    pub fn key(&self) -> Option<&str> {
        match self {
            Error::UnresolvedQuery { key }
            | Error::DuplicateKey { key }
            | Error::ConflictingModifiers { key, .. } => Some(key),
            Error::EmptyQueryMap | Error::Lifecycle { .. } => None,
        }
    }
}
