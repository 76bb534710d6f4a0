//! HTTP handlers for the Storefront API

use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;

use storefront_core::{CatalogStore, ClickEvent, ProductRecord, Suggestion};

use crate::error::ApiError;
use crate::models::{ClickRequest, MessageResponse, SearchParams};
use crate::state::AppState;

const RECOMMENDATION_LIMIT: usize = 8;

/// Health check endpoint
pub async fn health() -> &'static str {
    "OK"
}

/// Full search: categories first, then products, capped at 20.
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Suggestion>>, ApiError> {
    let q = params.q.as_deref().unwrap_or("");
    let results = state.service.search(q, params.user_id.as_deref()).await?;
    Ok(Json(results.suggestions))
}

/// Typeahead autosuggest, capped at 8. A blank query is not an error
/// here; the UI fires on every keystroke.
pub async fn autosuggest(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Suggestion>>, ApiError> {
    let q = params.q.as_deref().unwrap_or("");
    let results = state
        .service
        .autosuggest(q, params.user_id.as_deref())
        .await?;
    Ok(Json(results.suggestions))
}

/// Record a click on a suggestion.
pub async fn click(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ClickRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let user_id = req
        .user_id
        .filter(|u| !u.trim().is_empty())
        .ok_or(ApiError::MissingUser)?;

    state
        .service
        .track_click(ClickEvent {
            user_id,
            product_id: req.product_id,
            category: req.category,
        })
        .await?;

    Ok(Json(MessageResponse {
        message: "Click tracked".to_string(),
    }))
}

/// Distinct category names, in catalog order.
pub async fn categories(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(state.catalog.categories()?))
}

/// Subcategories under one category.
pub async fn subcategories(
    State(state): State<Arc<AppState>>,
    Path(category): Path<String>,
) -> Result<Json<Vec<String>>, ApiError> {
    let subs = state.catalog.subcategories(&category)?;
    if subs.is_empty() && !state.catalog.categories()?.contains(&category) {
        return Err(ApiError::CategoryNotFound(category));
    }
    Ok(Json(subs))
}

/// Top rated products in a category.
pub async fn recommendations(
    State(state): State<Arc<AppState>>,
    Path(category): Path<String>,
) -> Result<Json<Vec<ProductRecord>>, ApiError> {
    let products = state.catalog.top_rated(&category, RECOMMENDATION_LIMIT)?;
    if products.is_empty() && !state.catalog.categories()?.contains(&category) {
        return Err(ApiError::CategoryNotFound(category));
    }
    Ok(Json(products))
}
