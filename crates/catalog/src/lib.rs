//! # Catalog Crate
//!
//! Domain types shared by the store clients, the reconciliation logic and the
//! HTTP layer.
//!
//! ## Main Components
//!
//! - **types**: `MovieRecord` (title + open payload), `MovieSource`,
//!   `MoviePatch`, `MovieSearch`, `Reviewer`, `UpdateOutcome`
//! - **error**: validation errors for records and patches
//!
//! ## Example Usage
//!
//! ```ignore
//! use catalog::{MovieRecord, MoviePatch};
//! use serde_json::json;
//!
//! let dune = MovieRecord::new("Dune").with_field("year", 2021);
//! let patch = MoviePatch::from_json(json!({ "runtime": 155 }))?;
//! ```

pub mod error;
pub mod types;

pub use error::{PatchError, RecordError, Result};
pub use types::{
    MoviePatch,
    MovieRecord,
    MovieSearch,
    MovieSource,
    Reviewer,
    UpdateOutcome,
};
