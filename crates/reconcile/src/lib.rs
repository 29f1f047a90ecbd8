//! Cross-store reconciliation of movie catalogs.
//!
//! This crate provides:
//! - `reconcile` / `reconcile_with`: the movies present in both the document
//!   store and the graph store, matched by title
//! - `TitleMatcher` trait and the matching policies it is implemented by
//!
//! ## Example Usage
//! ```ignore
//! use reconcile::{reconcile_with, TitleMatching};
//!
//! let matcher = TitleMatching::Exact.matcher();
//! let common = reconcile_with(matcher, &mongo_movies, &graph_movies);
//! ```

pub mod matching;
pub mod intersect;

// Re-export main types
pub use matching::{CaseInsensitiveTitle, ExactTitle, TitleMatcher, TitleMatching, UnknownTitleMatching};
pub use intersect::{common_titles, reconcile, reconcile_with};
