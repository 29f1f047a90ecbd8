//! HTTP error mapping.
//!
//! Validation failures are answered before any store is touched. Store
//! failures keep the name of the failing store so a client can tell a Mongo
//! outage from a Neo4j outage.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use catalog::{MovieSource, PatchError};
use serde::Serialize;
use sources::StoreError;
use thiserror::Error;
use tracing::warn;
use utoipa::ToSchema;

/// Errors returned by route handlers
#[derive(Error, Debug)]
pub enum ApiError {
    /// Malformed request, rejected before reaching a store
    #[error("{0}")]
    Validation(String),

    /// A single-record read found nothing
    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<PatchError> for ApiError {
    fn from(err: PatchError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

/// JSON body of every error response
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Machine-readable kind, e.g. `validation` or `store_unavailable`
    #[schema(value_type = String)]
    error: &'static str,
    message: String,
    /// Store that failed, for store errors
    #[serde(skip_serializing_if = "Option::is_none")]
    store: Option<MovieSource>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Store(StoreError::Unavailable { .. }) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Store(StoreError::Timeout { .. }) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Store(StoreError::Decode { .. }) => StatusCode::BAD_GATEWAY,
            ApiError::Store(StoreError::Encode { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation",
            ApiError::NotFound(_) => "not_found",
            ApiError::Store(StoreError::Unavailable { .. }) => "store_unavailable",
            ApiError::Store(StoreError::Timeout { .. }) => "store_timeout",
            ApiError::Store(StoreError::Decode { .. }) => "store_decode",
            ApiError::Store(StoreError::Encode { .. }) => "store_encode",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let ApiError::Validation(message) = &self {
            warn!("Rejected request: {}", message);
        }

        let body = ErrorBody {
            error: self.kind(),
            message: self.to_string(),
            store: match &self {
                ApiError::Store(err) => Some(err.store()),
                _ => None,
            },
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::Validation("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::from(StoreError::unavailable(MovieSource::Mongo, "down")).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::from(StoreError::Timeout {
                store: MovieSource::Graph,
                after: Duration::from_secs(1),
            })
            .status(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            ApiError::from(StoreError::decode(MovieSource::Graph, "bad row")).status(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_patch_errors_are_validation() {
        let err = ApiError::from(PatchError::Empty);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "update body contains no fields to set");
    }
}
