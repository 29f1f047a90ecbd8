//! Neo4j graph store
//!
//! Reads the classic movie graph: `(:Movie {title, released, tagline})` and
//! `(:Person {name, born})-[:REVIEWED]->(:Movie)`. Nodes are mapped into the
//! same [`MovieRecord`] shape as documents so reconciliation can treat both
//! stores uniformly.

use std::time::Duration;

use async_trait::async_trait;
use catalog::{MovieRecord, MovieSource, Reviewer};
use neo4rs::{query, Graph, Query, Row};
use tracing::{debug, info, instrument, warn};

use crate::store::{GraphStore, StoreError, StoreResult};

const ALL_MOVIES: &str = "MATCH (m:Movie) \
     RETURN m.title AS title, m.released AS released, m.tagline AS tagline";

const REVIEWERS_OF: &str = "MATCH (p:Person)-[:REVIEWED]->(:Movie {title: $title}) \
     RETURN p.name AS name, p.born AS born";

const REVIEWED_BY: &str = "MATCH (:Person {name: $name})-[:REVIEWED]->(m:Movie) \
     RETURN m.title AS title, m.released AS released, m.tagline AS tagline";

/// Connection settings for the graph store
#[derive(Debug, Clone)]
pub struct Neo4jConfig {
    /// Bolt URI, e.g. `neo4j+s://xxxx.databases.neo4j.io`
    pub uri: String,
    pub username: String,
    pub password: String,
    /// Bound on driver setup plus the connectivity check
    pub connect_timeout: Duration,
}

/// Graph store backed by a Neo4j database
#[derive(Clone)]
pub struct Neo4jMovieStore {
    graph: Graph,
}

impl Neo4jMovieStore {
    /// Create the driver and verify connectivity with a trivial query.
    ///
    /// Both steps together are bounded by `connect_timeout`.
    pub async fn connect(config: &Neo4jConfig) -> StoreResult<Self> {
        info!("Connecting to Neo4j at {}", config.uri);

        let after = config.connect_timeout;
        let graph = tokio::time::timeout(after, Self::open(config))
            .await
            .map_err(|_| StoreError::Timeout {
                store: MovieSource::Graph,
                after,
            })??;

        info!("Connected to Neo4j at {}", config.uri);
        Ok(Self { graph })
    }

    async fn open(config: &Neo4jConfig) -> StoreResult<Graph> {
        let graph = Graph::new(&config.uri, &config.username, &config.password)
            .await
            .map_err(unavailable)?;

        graph
            .run(query("RETURN 1"))
            .await
            .map_err(|e| StoreError::unavailable(MovieSource::Graph, format!("ping failed: {}", e)))?;

        Ok(graph)
    }

    /// Run a query and map every row. Rows mapped to `None` are skipped.
    async fn fetch<T>(
        &self,
        query: Query,
        map: fn(&Row) -> StoreResult<Option<T>>,
    ) -> StoreResult<Vec<T>> {
        let mut stream = self.graph.execute(query).await.map_err(unavailable)?;

        let mut rows = Vec::new();
        while let Some(row) = stream.next().await.map_err(unavailable)? {
            rows.push(map(&row)?);
        }
        Ok(keep_present(rows))
    }
}

#[async_trait]
impl GraphStore for Neo4jMovieStore {
    #[instrument(skip(self))]
    async fn find_all(&self) -> StoreResult<Vec<MovieRecord>> {
        let movies = self.fetch(query(ALL_MOVIES), movie_from_row).await?;
        debug!("Read {} movie nodes", movies.len());
        Ok(movies)
    }

    #[instrument(skip(self))]
    async fn reviewers_of(&self, title: &str) -> StoreResult<Vec<Reviewer>> {
        self.fetch(query(REVIEWERS_OF).param("title", title), reviewer_from_row)
            .await
    }

    #[instrument(skip(self))]
    async fn movies_reviewed_by(&self, name: &str) -> StoreResult<Vec<MovieRecord>> {
        self.fetch(query(REVIEWED_BY).param("name", name), movie_from_row)
            .await
    }
}

fn unavailable(err: neo4rs::Error) -> StoreError {
    StoreError::unavailable(MovieSource::Graph, err.to_string())
}

/// Drop rows that could not take part in matching, with one warning
fn keep_present<T>(rows: Vec<Option<T>>) -> Vec<T> {
    let total = rows.len();
    let kept: Vec<T> = rows.into_iter().flatten().collect();
    if kept.len() != total {
        warn!(
            "Skipped {} of {} graph rows without a string key",
            total - kept.len(),
            total
        );
    }
    kept
}

/// A null or non-string key property reads as `None`
fn string_key(row: &Row, key: &str) -> Option<String> {
    row.get::<Option<String>>(key).ok().flatten()
}

fn movie_from_row(row: &Row) -> StoreResult<Option<MovieRecord>> {
    let Some(title) = string_key(row, "title") else {
        return Ok(None);
    };
    let released: Option<i64> = row
        .get("released")
        .map_err(|e| StoreError::decode(MovieSource::Graph, format!("movie released: {}", e)))?;
    let tagline: Option<String> = row
        .get("tagline")
        .map_err(|e| StoreError::decode(MovieSource::Graph, format!("movie tagline: {}", e)))?;

    Ok(Some(movie_record(title, released, tagline)))
}

fn reviewer_from_row(row: &Row) -> StoreResult<Option<Reviewer>> {
    let Some(name) = string_key(row, "name") else {
        return Ok(None);
    };
    let born: Option<i64> = row
        .get("born")
        .map_err(|e| StoreError::decode(MovieSource::Graph, format!("person born: {}", e)))?;

    Ok(Some(Reviewer { name, born }))
}

/// Node properties as a record; null properties are left out of the payload
pub(crate) fn movie_record(title: String, released: Option<i64>, tagline: Option<String>) -> MovieRecord {
    let mut record = MovieRecord::new(title);
    if let Some(released) = released {
        record = record.with_field("released", released);
    }
    if let Some(tagline) = tagline {
        record = record.with_field("tagline", tagline);
    }
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_movie_record_keeps_present_properties() {
        let record = movie_record(
            "The Matrix".to_string(),
            Some(1999),
            Some("Welcome to the Real World".to_string()),
        );

        assert_eq!(record.title, "The Matrix");
        assert_eq!(record.field("released"), Some(&json!(1999)));
        assert_eq!(record.field("tagline"), Some(&json!("Welcome to the Real World")));
    }

    #[test]
    fn test_movie_record_omits_null_properties() {
        let record = movie_record("Something's Gotta Give".to_string(), Some(2003), None);

        assert_eq!(record.payload.len(), 1);
        assert!(record.field("tagline").is_none());
    }

    #[test]
    fn test_rows_without_key_are_skipped() {
        let rows = vec![
            Some(MovieRecord::new("The Matrix")),
            None,
            Some(MovieRecord::new("Cloud Atlas")),
            None,
        ];

        let kept = keep_present(rows);

        let titles: Vec<&str> = kept.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, vec!["The Matrix", "Cloud Atlas"]);
        assert!(keep_present::<Reviewer>(vec![None]).is_empty());
    }

    #[tokio::test]
    async fn test_connect_is_bounded() {
        let config = Neo4jConfig {
            // Non-routable address: the connection attempt hangs
            uri: "neo4j://10.255.255.1:7687".to_string(),
            username: "neo4j".to_string(),
            password: "password".to_string(),
            connect_timeout: Duration::from_millis(200),
        };

        let start = std::time::Instant::now();
        let err = Neo4jMovieStore::connect(&config).await.err().unwrap();

        assert_eq!(err.store(), MovieSource::Graph);
        assert!(matches!(
            err,
            StoreError::Timeout { .. } | StoreError::Unavailable { .. }
        ));
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_queries_return_record_columns() {
        for cypher in [ALL_MOVIES, REVIEWED_BY] {
            assert!(cypher.contains("AS title"));
            assert!(cypher.contains("AS released"));
            assert!(cypher.contains("AS tagline"));
        }
        assert!(REVIEWERS_OF.contains("$title"));
        assert!(REVIEWED_BY.contains("$name"));
    }
}
