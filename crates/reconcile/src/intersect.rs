//! Intersection of the document-store and graph-store catalogs.
//!
//! ## Contract
//! - The document-store (Mongo) record is canonical: output records are
//!   clones of Mongo-side records, never merged or modified
//! - Output order follows the first appearance in the Mongo list
//! - Output is deduplicated by title key, keeping the first Mongo occurrence
//! - A title whose key is empty never matches, not even another empty title
//!
//! ## Algorithm
//! 1. Build a HashSet of graph title keys (O(m))
//! 2. Walk the Mongo list, probing the set (O(n))
//! 3. Track emitted keys in a second HashSet to drop duplicates

use std::borrow::Cow;
use std::collections::HashSet;

use catalog::MovieRecord;
use tracing::debug;

use crate::matching::{ExactTitle, TitleMatcher};

/// Movies present in both stores, matched by exact title.
///
/// Shorthand for [`reconcile_with`] using [`ExactTitle`].
pub fn reconcile(mongo: &[MovieRecord], graph: &[MovieRecord]) -> Vec<MovieRecord> {
    reconcile_with(&ExactTitle, mongo, graph)
}

/// Movies present in both stores under the given matching policy.
///
/// # Arguments
/// * `matcher` - Policy mapping titles to comparison keys
/// * `mongo` - Full document-store list (canonical side)
/// * `graph` - Full graph-store list
///
/// # Returns
/// Clones of the matching Mongo records, deduplicated by key
pub fn reconcile_with(
    matcher: &dyn TitleMatcher,
    mongo: &[MovieRecord],
    graph: &[MovieRecord],
) -> Vec<MovieRecord> {
    if mongo.is_empty() || graph.is_empty() {
        return Vec::new();
    }

    let graph_keys = title_keys(matcher, graph);
    let mut emitted: HashSet<Cow<'_, str>> = HashSet::new();

    let mut common = Vec::new();
    for record in mongo {
        let key = matcher.key(&record.title);
        if !key.is_empty() && graph_keys.contains(&key) && emitted.insert(key) {
            common.push(record.clone());
        }
    }

    debug!(
        "Reconciled {} mongo and {} graph records with {} policy: {} in common",
        mongo.len(),
        graph.len(),
        matcher.name(),
        common.len()
    );

    common
}

/// Titles of the movies present in both stores (Mongo spelling)
pub fn common_titles(
    matcher: &dyn TitleMatcher,
    mongo: &[MovieRecord],
    graph: &[MovieRecord],
) -> Vec<String> {
    reconcile_with(matcher, mongo, graph)
        .into_iter()
        .map(|record| record.title)
        .collect()
}

fn title_keys<'a>(matcher: &dyn TitleMatcher, records: &'a [MovieRecord]) -> HashSet<Cow<'a, str>> {
    records
        .iter()
        .map(|record| matcher.key(&record.title))
        .filter(|key| !key.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::CaseInsensitiveTitle;
    use serde_json::json;

    fn titled(titles: &[&str]) -> Vec<MovieRecord> {
        titles.iter().map(|t| MovieRecord::new(*t)).collect()
    }

    #[test]
    fn test_mongo_record_is_canonical() {
        let mongo = vec![
            MovieRecord::new("Inception").with_field("year", 2010),
            MovieRecord::new("Dune").with_field("year", 2021),
        ];
        let graph = vec![
            MovieRecord::new("Dune").with_field("tagline", "Fear is the mind-killer"),
            MovieRecord::new("Arrival"),
        ];

        let common = reconcile(&mongo, &graph);

        assert_eq!(common, vec![MovieRecord::new("Dune").with_field("year", 2021)]);
        assert!(common[0].field("tagline").is_none());
    }

    #[test]
    fn test_duplicate_mongo_titles_keep_first() {
        let mongo = vec![
            MovieRecord::new("Dune").with_field("year", 2021),
            MovieRecord::new("Dune").with_field("year", 1984),
        ];
        let graph = titled(&["Dune"]);

        let common = reconcile(&mongo, &graph);

        assert_eq!(common.len(), 1);
        assert_eq!(common[0].field("year"), Some(&json!(2021)));
    }

    #[test]
    fn test_duplicate_graph_titles_match_once() {
        let mongo = titled(&["Dune"]);
        let graph = titled(&["Dune", "Dune", "Dune"]);

        assert_eq!(reconcile(&mongo, &graph).len(), 1);
    }

    #[test]
    fn test_exact_matching_is_case_and_space_sensitive() {
        let mongo = titled(&["The Matrix", "Heat "]);
        let graph = titled(&["the matrix", "Heat"]);

        assert!(reconcile(&mongo, &graph).is_empty());
    }

    #[test]
    fn test_case_insensitive_policy() {
        let mongo = titled(&["The Matrix", "Heat "]);
        let graph = titled(&["the matrix", "HEAT"]);

        let titles = common_titles(&CaseInsensitiveTitle, &mongo, &graph);

        assert_eq!(titles, vec!["The Matrix".to_string(), "Heat ".to_string()]);
    }

    #[test]
    fn test_empty_titles_never_match() {
        let mongo = titled(&["", "Dune"]);
        let graph = titled(&["", "Dune"]);

        assert_eq!(common_titles(&ExactTitle, &mongo, &graph), vec!["Dune".to_string()]);

        let blank = titled(&["   "]);
        assert!(reconcile_with(&CaseInsensitiveTitle, &blank, &blank).is_empty());
    }

    #[test]
    fn test_order_follows_mongo_list() {
        let mongo = titled(&["C", "A", "B"]);
        let graph = titled(&["A", "B", "C"]);

        assert_eq!(
            common_titles(&ExactTitle, &mongo, &graph),
            vec!["C".to_string(), "A".to_string(), "B".to_string()]
        );
    }
}
