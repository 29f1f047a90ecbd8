//! # Application Context
//!
//! The one object every route handler receives. It owns the two long-lived
//! store clients (opened once at startup) and the per-call policies:
//!
//! 1. Every store call is bounded by `store_timeout`; an elapsed bound is a
//!    store-specific `StoreError::Timeout`
//! 2. The common-movies operation fans out to both stores concurrently and
//!    fans in before reconciling
//! 3. A failed read is propagated, never replaced by an empty list
//!
//! Clients are shared read-only behind `Arc`, so cloning the context is cheap
//! and no request holds a lock on a store.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use catalog::{MoviePatch, MovieRecord, MovieSearch, MovieSource, Reviewer, UpdateOutcome};
use reconcile::{reconcile_with, TitleMatching};
use serde::Serialize;
use sources::{DocumentStore, GraphStore, StoreError, StoreResult};
use tracing::{error, info};
use utoipa::ToSchema;

/// Per-call policies applied by the context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextSettings {
    /// Upper bound for a single store call
    pub store_timeout: Duration,
    /// Title matching policy used by reconciliation
    pub title_matching: TitleMatching,
}

impl Default for ContextSettings {
    fn default() -> Self {
        Self {
            store_timeout: Duration::from_secs(5),
            title_matching: TitleMatching::Exact,
        }
    }
}

/// Result of reconciling the two catalogs
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CommonMovies {
    pub common_movies_count: usize,
    /// Matched titles, Mongo spelling
    pub titles: Vec<String>,
    /// Mongo-side records of the matched movies
    pub movies: Vec<MovieRecord>,
}

impl CommonMovies {
    fn new(movies: Vec<MovieRecord>) -> Self {
        Self {
            common_movies_count: movies.len(),
            titles: movies.iter().map(|m| m.title.clone()).collect(),
            movies,
        }
    }
}

/// Shared request context: store clients plus policies
#[derive(Clone)]
pub struct AppContext {
    documents: Arc<dyn DocumentStore>,
    graph: Arc<dyn GraphStore>,
    settings: ContextSettings,
}

impl AppContext {
    /// Create a context around already-connected stores
    ///
    /// # Arguments
    /// * `documents` - Document store client (MongoDB or a fake)
    /// * `graph` - Graph store client (Neo4j or a fake)
    /// * `settings` - Timeout and matching policy
    pub fn new(
        documents: Arc<dyn DocumentStore>,
        graph: Arc<dyn GraphStore>,
        settings: ContextSettings,
    ) -> Self {
        Self {
            documents,
            graph,
            settings,
        }
    }

    pub fn settings(&self) -> &ContextSettings {
        &self.settings
    }

    /// Every document-store record
    pub async fn mongo_movies(&self) -> StoreResult<Vec<MovieRecord>> {
        self.bounded(MovieSource::Mongo, self.documents.find_all())
            .await
    }

    /// Every graph-store movie
    pub async fn graph_movies(&self) -> StoreResult<Vec<MovieRecord>> {
        self.bounded(MovieSource::Graph, self.graph.find_all()).await
    }

    /// One document-store record by exact title
    pub async fn find_movie(&self, title: &str) -> StoreResult<Option<MovieRecord>> {
        self.bounded(MovieSource::Mongo, self.documents.find_by_title(title))
            .await
    }

    /// Title/actor search over the document store
    pub async fn search_movies(&self, search: &MovieSearch) -> StoreResult<Vec<MovieRecord>> {
        self.bounded(MovieSource::Mongo, self.documents.search(search))
            .await
    }

    /// Apply a validated patch to the document-store record titled `title`
    pub async fn update_movie(&self, title: &str, patch: &MoviePatch) -> StoreResult<UpdateOutcome> {
        let outcome = self
            .bounded(MovieSource::Mongo, self.documents.update_by_title(title, patch))
            .await?;

        if outcome.is_noop() {
            info!("Update for '{}' matched no movie", title);
        } else {
            info!(
                "Updated '{}' ({} fields, modified {})",
                title,
                patch.len(),
                outcome.modified
            );
        }
        Ok(outcome)
    }

    /// People who reviewed a movie in the graph store
    pub async fn reviewers_of(&self, title: &str) -> StoreResult<Vec<Reviewer>> {
        self.bounded(MovieSource::Graph, self.graph.reviewers_of(title))
            .await
    }

    /// Movies a person reviewed in the graph store
    pub async fn movies_reviewed_by(&self, name: &str) -> StoreResult<Vec<MovieRecord>> {
        self.bounded(MovieSource::Graph, self.graph.movies_reviewed_by(name))
            .await
    }

    /// Movies present in both stores, matched by title.
    ///
    /// Both catalogs are read concurrently; if either read fails the whole
    /// operation fails with that store's error.
    pub async fn common_movies(&self) -> StoreResult<CommonMovies> {
        let start_time = Instant::now();

        let (mongo, graph) = tokio::try_join!(self.mongo_movies(), self.graph_movies())?;
        let fetched = start_time.elapsed();

        let matcher = self.settings.title_matching.matcher();
        let common = CommonMovies::new(reconcile_with(matcher, &mongo, &graph));

        info!(
            "Common movies: mongo={}, graph={}, common={} (fetch {:.2?}, total {:.2?})",
            mongo.len(),
            graph.len(),
            common.common_movies_count,
            fetched,
            start_time.elapsed()
        );
        Ok(common)
    }

    /// Run a store call under the configured timeout
    async fn bounded<T>(
        &self,
        store: MovieSource,
        call: impl Future<Output = StoreResult<T>>,
    ) -> StoreResult<T> {
        let after = self.settings.store_timeout;
        let result = match tokio::time::timeout(after, call).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout { store, after }),
        };

        if let Err(err) = &result {
            error!("Store call failed: {}", err);
        }
        result
    }
}
