//! OpenAPI document for the HTTP surface.
//!
//! Collected from the `#[utoipa::path]` annotations on the handlers in
//! [`crate::routes`] and served at `/openapi.json`.

use utoipa::OpenApi;

use crate::routes;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "movie-bridge",
        description = "Movies from MongoDB and Neo4j, and the titles they share"
    ),
    paths(
        routes::health,
        routes::openapi_document,
        routes::list_mongo_movies,
        routes::search_mongo_movies,
        routes::get_mongo_movie,
        routes::update_mongo_movie,
        routes::list_graph_movies,
        routes::list_reviewers,
        routes::list_reviewed_movies,
        routes::common_movies,
    ),
    tags(
        (name = "mongo", description = "Document store (MongoDB)"),
        (name = "graph", description = "Graph store (Neo4j)"),
        (name = "reconcile", description = "Titles present in both stores"),
        (name = "service", description = "Service endpoints")
    )
)]
pub struct ApiDoc;

/// Full OpenAPI 3 document as JSON
pub fn document() -> serde_json::Value {
    serde_json::to_value(ApiDoc::openapi()).unwrap_or_default()
}
