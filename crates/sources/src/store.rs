//! Store seams.
//!
//! The HTTP layer and the reconciliation route only see these traits. The
//! MongoDB and Neo4j clients implement them for production; the in-memory
//! stores in [`crate::memory`] implement them for tests.

use std::time::Duration;

use async_trait::async_trait;
use catalog::{MoviePatch, MovieRecord, MovieSearch, MovieSource, Reviewer, UpdateOutcome};
use thiserror::Error;

/// Failures at the store boundary.
///
/// Every variant names the store it came from so callers can report which
/// side of a reconciliation failed. A failed read is never turned into an
/// empty list.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Store unreachable, authentication refused, or the query was rejected
    #[error("{store} store unavailable: {message}")]
    Unavailable { store: MovieSource, message: String },

    /// The store did not answer within the configured bound
    #[error("{store} store timed out after {after:?}")]
    Timeout { store: MovieSource, after: Duration },

    /// The store answered with data that could not be mapped to a movie
    #[error("{store} store returned undecodable data: {message}")]
    Decode { store: MovieSource, message: String },

    /// A request value could not be converted into the store's format
    #[error("{store} store cannot encode request: {message}")]
    Encode { store: MovieSource, message: String },
}

impl StoreError {
    pub fn unavailable(store: MovieSource, message: impl Into<String>) -> Self {
        StoreError::Unavailable {
            store,
            message: message.into(),
        }
    }

    pub fn decode(store: MovieSource, message: impl Into<String>) -> Self {
        StoreError::Decode {
            store,
            message: message.into(),
        }
    }

    /// Which store failed
    pub fn store(&self) -> MovieSource {
        match self {
            StoreError::Unavailable { store, .. }
            | StoreError::Timeout { store, .. }
            | StoreError::Decode { store, .. }
            | StoreError::Encode { store, .. } => *store,
        }
    }
}

/// Convenience type alias for store results
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Read/update access to the document store (MongoDB `movies` collection)
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Every record in the collection
    async fn find_all(&self) -> StoreResult<Vec<MovieRecord>>;

    /// First record whose title equals `title` exactly
    async fn find_by_title(&self, title: &str) -> StoreResult<Option<MovieRecord>>;

    /// Case-insensitive title/actor search
    async fn search(&self, search: &MovieSearch) -> StoreResult<Vec<MovieRecord>>;

    /// Set the patch fields on the first record titled `title`.
    ///
    /// No match is reported as a zero-count outcome, not an error.
    async fn update_by_title(&self, title: &str, patch: &MoviePatch) -> StoreResult<UpdateOutcome>;
}

/// Read-only access to the graph store (Neo4j movie graph)
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Every `:Movie` node, in the same record shape as the document store
    async fn find_all(&self) -> StoreResult<Vec<MovieRecord>>;

    /// People with a `REVIEWED` edge to the movie titled `title`
    async fn reviewers_of(&self, title: &str) -> StoreResult<Vec<Reviewer>>;

    /// Movies reviewed by the person named `name`
    async fn movies_reviewed_by(&self, name: &str) -> StoreResult<Vec<MovieRecord>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errors_name_their_store() {
        let err = StoreError::unavailable(MovieSource::Mongo, "connection refused");
        assert_eq!(err.store(), MovieSource::Mongo);
        assert_eq!(err.to_string(), "mongo store unavailable: connection refused");

        let err = StoreError::Timeout {
            store: MovieSource::Graph,
            after: Duration::from_millis(250),
        };
        assert_eq!(err.store(), MovieSource::Graph);
        assert_eq!(err.to_string(), "graph store timed out after 250ms");

        let err = StoreError::decode(MovieSource::Graph, "missing title");
        assert_eq!(err.store(), MovieSource::Graph);
    }
}
