//! Storefront API Server - Search and autosuggest backend
//!
//! Provides REST endpoints for:
//! - Full product search with category suggestions
//! - Typeahead autosuggest
//! - Click tracking for personalization
//! - Catalog browsing (categories, subcategories, recommendations)

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

mod error;
mod handlers;
mod models;
mod state;

use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("storefront_api=info".parse()?)
                .add_directive("storefront_core=info".parse()?)
                .add_directive("tower_http=debug".parse()?),
        )
        .init();

    // Initialize application state
    info!("Initializing Storefront API...");
    let state = AppState::new()?;
    let state = Arc::new(state);

    // CORS configuration for web clients
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router
    let app = Router::new()
        // Health check
        .route("/health", get(handlers::health))
        // Search endpoints
        .route("/search", get(handlers::search))
        .route("/autosuggest", get(handlers::autosuggest))
        // Click tracking
        .route("/click", post(handlers::click))
        // Catalog browsing
        .route("/categories", get(handlers::categories))
        .route(
            "/categories/:category/subcategories",
            get(handlers::subcategories),
        )
        .route(
            "/categories/:category/recommendations",
            get(handlers::recommendations),
        )
        // Add middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    // Parse bind address
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8000);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting Storefront API on http://{}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
