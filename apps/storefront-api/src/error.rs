//! Error types for the Storefront API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use storefront_core::{SearchError, StoreError, TrackError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("userId is required")]
    MissingUser,

    #[error("Category not found: {0}")]
    CategoryNotFound(String),

    #[error(transparent)]
    Search(#[from] SearchError),

    #[error(transparent)]
    Track(#[from] TrackError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::MissingUser => (StatusCode::BAD_REQUEST, "userId is required".to_string()),
            ApiError::CategoryNotFound(name) => {
                (StatusCode::NOT_FOUND, format!("Category not found: {}", name))
            }
            ApiError::Search(SearchError::InvalidQuery) => {
                (StatusCode::BAD_REQUEST, "Search query is required".to_string())
            }
            ApiError::Search(SearchError::Internal(e)) => {
                tracing::error!("Search error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal error".to_string(),
                )
            }
            ApiError::Track(TrackError::MissingUser) => {
                (StatusCode::BAD_REQUEST, "userId is required".to_string())
            }
            ApiError::Track(TrackError::Store(e)) => {
                tracing::error!("Profile store error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal error".to_string(),
                )
            }
            ApiError::Store(e) => {
                tracing::error!("Store error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_query_maps_to_bad_request() {
        let response = ApiError::Search(SearchError::InvalidQuery).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn missing_user_maps_to_bad_request() {
        let response = ApiError::Track(TrackError::MissingUser).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = ApiError::MissingUser.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn store_failures_map_to_internal_error() {
        let response = ApiError::Store(StoreError::Unavailable("down".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
