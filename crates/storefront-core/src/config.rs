//! Configuration for the search service
//!
//! Result caps and upstream timeouts. Values can be overridden from
//! environment variables so deployments can tune them without a
//! rebuild.

use std::time::Duration;

/// Tunable parameters for the search service.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Result cap for full search responses.
    pub search_limit: usize,
    /// Result cap for autosuggest responses.
    pub suggest_limit: usize,
    /// Product cap for the fallback path under autosuggest. Kept small
    /// so category/term suggestions are not crowded out.
    pub fallback_suggest_limit: usize,
    /// Category candidates kept ahead of products in full search.
    pub category_pretrim: usize,
    /// Time budget for a primary engine call.
    pub engine_timeout: Duration,
    /// Time budget for a catalog store call (fallback or taxonomy).
    pub store_timeout: Duration,
    /// Time budget for the profile fetch. Personalization is a soft
    /// enhancement; a slow profile store must not stall retrieval.
    pub profile_timeout: Duration,
    /// Bound on clicked product history per user.
    pub clicked_products_cap: usize,
    /// Bound on clicked category history per user.
    pub clicked_categories_cap: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            search_limit: 20,
            suggest_limit: 8,
            fallback_suggest_limit: 5,
            category_pretrim: 5,
            engine_timeout: Duration::from_millis(2000),
            store_timeout: Duration::from_millis(2000),
            profile_timeout: Duration::from_millis(1000),
            clicked_products_cap: 50,
            clicked_categories_cap: 10,
        }
    }
}

impl ServiceConfig {
    /// Load configuration from environment variables.
    ///
    /// Recognized variables (all optional):
    /// - STOREFRONT_SEARCH_LIMIT
    /// - STOREFRONT_SUGGEST_LIMIT
    /// - STOREFRONT_ENGINE_TIMEOUT_MS
    /// - STOREFRONT_STORE_TIMEOUT_MS
    /// - STOREFRONT_PROFILE_TIMEOUT_MS
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(v) = read_usize("STOREFRONT_SEARCH_LIMIT") {
            config.search_limit = v;
        }
        if let Some(v) = read_usize("STOREFRONT_SUGGEST_LIMIT") {
            config.suggest_limit = v;
        }
        if let Some(v) = read_u64("STOREFRONT_ENGINE_TIMEOUT_MS") {
            config.engine_timeout = Duration::from_millis(v);
        }
        if let Some(v) = read_u64("STOREFRONT_STORE_TIMEOUT_MS") {
            config.store_timeout = Duration::from_millis(v);
        }
        if let Some(v) = read_u64("STOREFRONT_PROFILE_TIMEOUT_MS") {
            config.profile_timeout = Duration::from_millis(v);
        }

        config
    }
}

fn read_usize(var: &str) -> Option<usize> {
    std::env::var(var).ok().and_then(|v| v.parse().ok())
}

fn read_u64(var: &str) -> Option<u64> {
    std::env::var(var).ok().and_then(|v| v.parse().ok())
}
