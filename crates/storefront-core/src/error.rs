//! Error types for the search pipeline
//!
//! Upstream failures are classified so the orchestrator can recover
//! locally: engine errors trigger the fallback path, store errors
//! degrade to empty candidate sets, and profile errors degrade to an
//! unpersonalized request. Only invalid input and unclassified
//! failures surface to the caller.

use thiserror::Error;

/// Failures from the primary full-text engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("search engine unavailable: {0}")]
    Unavailable(String),

    #[error("invalid engine query: {0}")]
    Query(String),

    #[error("engine error: {0}")]
    Internal(#[from] tantivy::TantivyError),
}

/// Failures from the catalog document store or the profile store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store error: {0}")]
    Internal(String),
}

/// Failures surfaced by the search/autosuggest entry points.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("query must not be empty")]
    InvalidQuery,

    #[error("search failed: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Failures surfaced by click tracking.
#[derive(Debug, Error)]
pub enum TrackError {
    #[error("userId is required")]
    MissingUser,

    #[error("profile store error: {0}")]
    Store(#[from] StoreError),
}
