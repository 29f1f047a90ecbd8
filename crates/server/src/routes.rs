//! HTTP routes.
//!
//! Handlers are thin: validate the request, call one `AppContext` operation,
//! serialize the result. All failures go through `ApiError`. Each handler
//! carries its own OpenAPI annotation, collected in [`crate::openapi`].

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use catalog::{MoviePatch, MovieRecord, MovieSearch, Reviewer};
use serde::Serialize;
use serde_json::Value;
use tower_http::trace::TraceLayer;
use tracing::debug;
use utoipa::{OpenApi, ToSchema};

use crate::context::{AppContext, CommonMovies};
use crate::error::{ApiError, ErrorBody};
use crate::openapi::ApiDoc;

type ApiResult<T> = Result<Json<T>, ApiError>;

/// Build the application router around a shared context
pub fn router(ctx: AppContext) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/openapi.json", get(openapi_document))
        .route("/movies/search", get(search_mongo_movies))
        .route("/movies/mongo", get(list_mongo_movies))
        .route(
            "/movies/mongo/:title",
            get(get_mongo_movie).put(update_mongo_movie),
        )
        .route("/movies/graph", get(list_graph_movies))
        .route("/movies/graph/:title/reviewers", get(list_reviewers))
        .route("/reviewers/:name/movies", get(list_reviewed_movies))
        .route("/movies/common", get(common_movies))
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

/// Reject blank path segments before any store is called
fn required<'a>(what: &str, value: &'a str) -> Result<&'a str, ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::Validation(format!("{} must not be empty", what)));
    }
    Ok(value)
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct Health {
    #[schema(value_type = String, example = "ok")]
    status: &'static str,
}

/// Liveness check
#[utoipa::path(
    get,
    path = "/health",
    tag = "service",
    responses((status = 200, description = "Service is up", body = Health))
)]
pub(crate) async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// This OpenAPI document
#[utoipa::path(
    get,
    path = "/openapi.json",
    tag = "service",
    responses((status = 200, description = "OpenAPI 3 document", content_type = "application/json"))
)]
pub(crate) async fn openapi_document() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// List all movies from the document store
#[utoipa::path(
    get,
    path = "/movies/mongo",
    tag = "mongo",
    responses(
        (status = 200, description = "Every movie document", body = Vec<MovieRecord>),
        (status = 503, description = "Document store unavailable", body = ErrorBody),
        (status = 504, description = "Document store timed out", body = ErrorBody)
    )
)]
pub(crate) async fn list_mongo_movies(State(ctx): State<AppContext>) -> ApiResult<Vec<MovieRecord>> {
    Ok(Json(ctx.mongo_movies().await?))
}

/// Search document-store movies by title or actor (case-insensitive substrings)
#[utoipa::path(
    get,
    path = "/movies/search",
    tag = "mongo",
    params(
        ("title" = Option<String>, Query, description = "Substring of the title"),
        ("actor" = Option<String>, Query, description = "Substring of a cast member")
    ),
    responses(
        (status = 200, description = "Matching movie documents", body = Vec<MovieRecord>),
        (status = 503, description = "Document store unavailable", body = ErrorBody),
        (status = 504, description = "Document store timed out", body = ErrorBody)
    )
)]
pub(crate) async fn search_mongo_movies(
    State(ctx): State<AppContext>,
    Query(search): Query<MovieSearch>,
) -> ApiResult<Vec<MovieRecord>> {
    let search = search.normalized();
    debug!("Searching movies: {:?}", search);
    Ok(Json(ctx.search_movies(&search).await?))
}

/// Get a document-store movie by exact title
#[utoipa::path(
    get,
    path = "/movies/mongo/{title}",
    tag = "mongo",
    params(("title" = String, Path, description = "Exact movie title")),
    responses(
        (status = 200, description = "The first movie with this title", body = MovieRecord),
        (status = 400, description = "Blank title", body = ErrorBody),
        (status = 404, description = "No movie with this title", body = ErrorBody),
        (status = 503, description = "Document store unavailable", body = ErrorBody)
    )
)]
pub(crate) async fn get_mongo_movie(
    State(ctx): State<AppContext>,
    Path(title): Path<String>,
) -> ApiResult<MovieRecord> {
    let title = required("title", &title)?;
    ctx.find_movie(title)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("no movie titled '{}'", title)))
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct UpdateResponse {
    /// Title the update was addressed to
    title: String,
    /// Documents matched by title (0 or 1)
    matched: u64,
    /// Documents actually changed
    modified: u64,
}

/// Update a document-store movie by title
#[utoipa::path(
    put,
    path = "/movies/mongo/{title}",
    tag = "mongo",
    params(("title" = String, Path, description = "Exact movie title")),
    request_body(
        content = Object,
        description = "Fields to set; null members are ignored",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Update counts; zero when no movie matched", body = UpdateResponse),
        (status = 400, description = "Invalid title or update body", body = ErrorBody),
        (status = 503, description = "Document store unavailable", body = ErrorBody)
    )
)]
pub(crate) async fn update_mongo_movie(
    State(ctx): State<AppContext>,
    Path(title): Path<String>,
    body: Bytes,
) -> ApiResult<UpdateResponse> {
    required("title", &title)?;
    let value: Value = serde_json::from_slice(&body)
        .map_err(|err| ApiError::Validation(format!("update body is not valid JSON: {}", err)))?;
    let patch = MoviePatch::from_json(value)?;

    let outcome = ctx.update_movie(&title, &patch).await?;
    Ok(Json(UpdateResponse {
        title,
        matched: outcome.matched,
        modified: outcome.modified,
    }))
}

/// List all movies from the graph store
#[utoipa::path(
    get,
    path = "/movies/graph",
    tag = "graph",
    responses(
        (status = 200, description = "Every movie node", body = Vec<MovieRecord>),
        (status = 503, description = "Graph store unavailable", body = ErrorBody),
        (status = 504, description = "Graph store timed out", body = ErrorBody)
    )
)]
pub(crate) async fn list_graph_movies(State(ctx): State<AppContext>) -> ApiResult<Vec<MovieRecord>> {
    Ok(Json(ctx.graph_movies().await?))
}

/// List people who reviewed a movie
#[utoipa::path(
    get,
    path = "/movies/graph/{title}/reviewers",
    tag = "graph",
    params(("title" = String, Path, description = "Exact movie title")),
    responses(
        (status = 200, description = "Reviewers, possibly none", body = Vec<Reviewer>),
        (status = 400, description = "Blank title", body = ErrorBody),
        (status = 503, description = "Graph store unavailable", body = ErrorBody)
    )
)]
pub(crate) async fn list_reviewers(
    State(ctx): State<AppContext>,
    Path(title): Path<String>,
) -> ApiResult<Vec<Reviewer>> {
    let title = required("title", &title)?;
    Ok(Json(ctx.reviewers_of(title).await?))
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ReviewedMovies {
    user: String,
    count: usize,
    movies: Vec<MovieRecord>,
}

/// List movies reviewed by a person
#[utoipa::path(
    get,
    path = "/reviewers/{name}/movies",
    tag = "graph",
    params(("name" = String, Path, description = "Reviewer name")),
    responses(
        (status = 200, description = "Reviewed movies, possibly none", body = ReviewedMovies),
        (status = 400, description = "Blank name", body = ErrorBody),
        (status = 503, description = "Graph store unavailable", body = ErrorBody)
    )
)]
pub(crate) async fn list_reviewed_movies(
    State(ctx): State<AppContext>,
    Path(name): Path<String>,
) -> ApiResult<ReviewedMovies> {
    required("name", &name)?;
    let movies = ctx.movies_reviewed_by(&name).await?;
    Ok(Json(ReviewedMovies {
        count: movies.len(),
        user: name,
        movies,
    }))
}

/// Movies present in both stores, matched by title
#[utoipa::path(
    get,
    path = "/movies/common",
    tag = "reconcile",
    responses(
        (status = 200, description = "Mongo-side records of the shared titles", body = CommonMovies),
        (status = 502, description = "A store returned undecodable data", body = ErrorBody),
        (status = 503, description = "A store is unavailable", body = ErrorBody),
        (status = 504, description = "A store timed out", body = ErrorBody)
    )
)]
pub(crate) async fn common_movies(State(ctx): State<AppContext>) -> ApiResult<CommonMovies> {
    Ok(Json(ctx.common_movies().await?))
}
