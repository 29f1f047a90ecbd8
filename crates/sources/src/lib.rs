//! # Sources Crate
//!
//! Access to the two movie stores behind a pair of async traits.
//!
//! ## Components
//!
//! ### Document store (MongoDB)
//! `MongoMovieStore` reads and updates the mflix `movies` collection:
//! - list every movie
//! - find one movie by exact title
//! - case-insensitive title/actor search
//! - partial update by title (`$set`)
//!
//! ### Graph store (Neo4j)
//! `Neo4jMovieStore` reads the movie graph:
//! - list every `:Movie` node
//! - reviewers of a movie, movies reviewed by a person
//!
//! ### In-memory stores
//! `InMemoryDocumentStore` / `InMemoryGraphStore` implement the same traits
//! for tests and can simulate outages and slow responses.
//!
//! ## Example Usage
//!
//! ```ignore
//! use sources::{DocumentStore, GraphStore, MongoConfig, MongoMovieStore, Neo4jConfig, Neo4jMovieStore};
//!
//! let mongo = MongoMovieStore::connect(&mongo_config).await?;
//! let graph = Neo4jMovieStore::connect(&neo4j_config).await?;
//!
//! let documents = mongo.find_all().await?;
//! let nodes = graph.find_all().await?;
//! ```
//!
//! Every failure is a `StoreError` naming the store it came from.

// Public modules
pub mod graph;
pub mod memory;
pub mod mongo;
pub mod store;

// Re-export commonly used types
pub use graph::{Neo4jConfig, Neo4jMovieStore};
pub use memory::{InMemoryDocumentStore, InMemoryGraphStore};
pub use mongo::{MongoConfig, MongoMovieStore};
pub use store::{DocumentStore, GraphStore, StoreError, StoreResult};
