//! In-memory stores.
//!
//! Stand-ins for MongoDB and Neo4j used by tests and local runs. They honour
//! the same contracts as the real clients and can be told to fail or to
//! answer slowly, which is how store outages and timeouts are exercised.

use std::time::Duration;

use async_trait::async_trait;
use catalog::{MoviePatch, MovieRecord, MovieSearch, MovieSource, Reviewer, UpdateOutcome};
use tokio::sync::RwLock;

use crate::store::{DocumentStore, GraphStore, StoreError, StoreResult};

/// How a fake store behaves on every call
#[derive(Debug, Clone, Default)]
struct Behavior {
    delay: Option<Duration>,
    unavailable: bool,
}

impl Behavior {
    async fn enter(&self, store: MovieSource) -> StoreResult<()> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.unavailable {
            return Err(StoreError::unavailable(store, "connection refused"));
        }
        Ok(())
    }
}

/// Document store holding records in a vector
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    records: RwLock<Vec<MovieRecord>>,
    behavior: Behavior,
}

impl InMemoryDocumentStore {
    pub fn new(records: Vec<MovieRecord>) -> Self {
        Self {
            records: RwLock::new(records),
            behavior: Behavior::default(),
        }
    }

    /// Every call fails as if the server were down
    pub fn unavailable() -> Self {
        Self {
            behavior: Behavior {
                unavailable: true,
                ..Behavior::default()
            },
            ..Self::default()
        }
    }

    /// Delay every call (builder style)
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.behavior.delay = Some(delay);
        self
    }

    /// Snapshot of the stored records
    pub async fn records(&self) -> Vec<MovieRecord> {
        self.records.read().await.clone()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn find_all(&self) -> StoreResult<Vec<MovieRecord>> {
        self.behavior.enter(MovieSource::Mongo).await?;
        Ok(self.records.read().await.clone())
    }

    async fn find_by_title(&self, title: &str) -> StoreResult<Option<MovieRecord>> {
        self.behavior.enter(MovieSource::Mongo).await?;
        let records = self.records.read().await;
        Ok(records.iter().find(|r| r.title == title).cloned())
    }

    async fn search(&self, search: &MovieSearch) -> StoreResult<Vec<MovieRecord>> {
        self.behavior.enter(MovieSource::Mongo).await?;
        let records = self.records.read().await;
        Ok(records.iter().filter(|r| search.matches(r)).cloned().collect())
    }

    async fn update_by_title(&self, title: &str, patch: &MoviePatch) -> StoreResult<UpdateOutcome> {
        self.behavior.enter(MovieSource::Mongo).await?;
        let mut records = self.records.write().await;

        let Some(record) = records.iter_mut().find(|r| r.title == title) else {
            return Ok(UpdateOutcome::default());
        };

        let before = record.clone();
        patch.apply_to(record);
        let modified = u64::from(*record != before);

        Ok(UpdateOutcome { matched: 1, modified })
    }
}

/// A review edge in the fake graph
#[derive(Debug, Clone)]
struct Review {
    reviewer: Reviewer,
    title: String,
}

/// Graph store holding movie nodes and review edges in vectors
#[derive(Debug, Default)]
pub struct InMemoryGraphStore {
    movies: Vec<MovieRecord>,
    reviews: Vec<Review>,
    behavior: Behavior,
}

impl InMemoryGraphStore {
    pub fn new(movies: Vec<MovieRecord>) -> Self {
        Self {
            movies,
            ..Self::default()
        }
    }

    /// Every call fails as if the server were down
    pub fn unavailable() -> Self {
        Self {
            behavior: Behavior {
                unavailable: true,
                ..Behavior::default()
            },
            ..Self::default()
        }
    }

    /// Add a `(:Person)-[:REVIEWED]->(:Movie)` edge (builder style)
    pub fn with_review(mut self, reviewer: Reviewer, title: impl Into<String>) -> Self {
        self.reviews.push(Review {
            reviewer,
            title: title.into(),
        });
        self
    }

    /// Delay every call (builder style)
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.behavior.delay = Some(delay);
        self
    }
}

#[async_trait]
impl GraphStore for InMemoryGraphStore {
    async fn find_all(&self) -> StoreResult<Vec<MovieRecord>> {
        self.behavior.enter(MovieSource::Graph).await?;
        Ok(self.movies.clone())
    }

    async fn reviewers_of(&self, title: &str) -> StoreResult<Vec<Reviewer>> {
        self.behavior.enter(MovieSource::Graph).await?;
        Ok(self
            .reviews
            .iter()
            .filter(|review| review.title == title)
            .map(|review| review.reviewer.clone())
            .collect())
    }

    async fn movies_reviewed_by(&self, name: &str) -> StoreResult<Vec<MovieRecord>> {
        self.behavior.enter(MovieSource::Graph).await?;
        Ok(self
            .reviews
            .iter()
            .filter(|review| review.reviewer.name == name)
            .filter_map(|review| self.movies.iter().find(|m| m.title == review.title))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn documents() -> InMemoryDocumentStore {
        InMemoryDocumentStore::new(vec![
            MovieRecord::new("Dune").with_field("year", 2021),
            MovieRecord::new("Dune").with_field("year", 1984),
            MovieRecord::new("Heat").with_field("cast", json!(["Al Pacino", "Robert De Niro"])),
        ])
    }

    #[tokio::test]
    async fn test_find_by_title_returns_first_match() {
        let store = documents();

        let found = store.find_by_title("Dune").await.unwrap().unwrap();
        assert_eq!(found.field("year"), Some(&json!(2021)));
        assert!(store.find_by_title("dune").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_touches_first_match_only() {
        let store = documents();
        let patch = MoviePatch::from_json(json!({ "runtime": 155 })).unwrap();

        let outcome = store.update_by_title("Dune", &patch).await.unwrap();
        assert_eq!(outcome, UpdateOutcome { matched: 1, modified: 1 });

        let records = store.records().await;
        assert_eq!(records[0].field("runtime"), Some(&json!(155)));
        assert!(records[1].field("runtime").is_none());

        // Same values again: matched but not modified
        let outcome = store.update_by_title("Dune", &patch).await.unwrap();
        assert_eq!(outcome, UpdateOutcome { matched: 1, modified: 0 });
    }

    #[tokio::test]
    async fn test_update_without_match_is_zero_count() {
        let store = documents();
        let patch = MoviePatch::from_json(json!({ "runtime": 1 })).unwrap();

        let outcome = store.update_by_title("Arrival", &patch).await.unwrap();
        assert!(outcome.is_noop());
    }

    #[tokio::test]
    async fn test_search_by_actor() {
        let store = documents();

        let found = store.search(&MovieSearch::by_actor("pacino")).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Heat");
    }

    #[tokio::test]
    async fn test_unavailable_stores_fail() {
        let err = InMemoryDocumentStore::unavailable().find_all().await.unwrap_err();
        assert_eq!(err.store(), MovieSource::Mongo);

        let err = InMemoryGraphStore::unavailable().find_all().await.unwrap_err();
        assert_eq!(err.store(), MovieSource::Graph);
    }

    #[tokio::test]
    async fn test_graph_reviews() {
        let graph = InMemoryGraphStore::new(vec![
            MovieRecord::new("The Replacements").with_field("released", 2000),
            MovieRecord::new("Cloud Atlas").with_field("released", 2012),
        ])
        .with_review(
            Reviewer {
                name: "Jessica Thompson".into(),
                born: None,
            },
            "Cloud Atlas",
        )
        .with_review(
            Reviewer {
                name: "James Thompson".into(),
                born: None,
            },
            "The Replacements",
        );

        let reviewers = graph.reviewers_of("Cloud Atlas").await.unwrap();
        assert_eq!(reviewers.len(), 1);
        assert_eq!(reviewers[0].name, "Jessica Thompson");

        let movies = graph.movies_reviewed_by("James Thompson").await.unwrap();
        assert_eq!(movies.len(), 1);
        assert_eq!(movies[0].title, "The Replacements");

        assert!(graph.movies_reviewed_by("Nobody").await.unwrap().is_empty());
    }
}
