//! Search service orchestrator
//!
//! Coordinates the pipeline for both entry points. Product retrieval
//! and taxonomy matching run concurrently; the merge waits for both.
//! The fallback path runs strictly after the primary engine signals
//! failure, never alongside it. Every upstream call carries a bounded
//! timeout so a slow dependency cannot stall the merge step, and every
//! upstream failure degrades locally: no personalization, an empty
//! candidate set, or the fallback path, but always a well-formed
//! response.

use std::sync::Arc;
use std::time::Duration;

use tokio::task;
use tokio::time::timeout;
use tracing::{error, info, warn};

use crate::catalog::CatalogStore;
use crate::config::ServiceConfig;
use crate::engine::{EngineHit, EngineQuery, SearchEngine};
use crate::error::{SearchError, StoreError, TrackError};
use crate::fallback;
use crate::matcher;
use crate::profile::ProfileStore;
use crate::query::NormalizedQuery;
use crate::rank::{self, ClickSignals};
use crate::suggestion::Suggestion;
use crate::tracker::{self, ClickEvent, ClickReceipt};

/// Which retrieval path produced the product candidates. Exposed for
/// logging and tests; the HTTP layer serializes suggestions only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPath {
    Primary,
    Fallback,
    None,
}

/// An ordered, capped, deduplicated response.
#[derive(Debug, Clone)]
pub struct RankedResults {
    pub suggestions: Vec<Suggestion>,
    pub served_by: SearchPath,
}

/// Top-level entry point for search, autosuggest, and click tracking.
/// All collaborators are injected so tests can substitute fakes for
/// the engine, the catalog store, and the profile cache independently.
pub struct SearchService {
    engine: Arc<dyn SearchEngine>,
    catalog: Arc<dyn CatalogStore>,
    profiles: Arc<dyn ProfileStore>,
    config: ServiceConfig,
}

impl SearchService {
    pub fn new(
        engine: Arc<dyn SearchEngine>,
        catalog: Arc<dyn CatalogStore>,
        profiles: Arc<dyn ProfileStore>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            engine,
            catalog,
            profiles,
            config,
        }
    }

    /// Autosuggest: unified scoring across all candidate types, capped
    /// at the suggest limit. A blank query returns an empty list
    /// without touching any backend.
    pub async fn autosuggest(
        &self,
        raw_query: &str,
        user_id: Option<&str>,
    ) -> Result<RankedResults, SearchError> {
        let query = NormalizedQuery::parse(raw_query);
        if query.is_empty() {
            return Ok(RankedResults {
                suggestions: Vec::new(),
                served_by: SearchPath::None,
            });
        }

        let signals = self.load_signals(user_id).await;
        let boost_ids = signals.clicked_product_ids();

        let ((hits, served_by), taxonomy) = tokio::join!(
            self.retrieve_products(
                &query,
                boost_ids,
                self.config.suggest_limit,
                self.config.fallback_suggest_limit,
            ),
            self.retrieve_taxonomy(&query),
        );

        let suggestions = rank::rank(&query, hits, taxonomy, &signals, self.config.suggest_limit);
        info!(
            query = %query.original,
            served_by = ?served_by,
            results = suggestions.len(),
            "autosuggest"
        );

        Ok(RankedResults {
            suggestions,
            served_by,
        })
    }

    /// Full search: category candidates are pre-trimmed with the
    /// simpler exact-match-first sort and placed ahead of products,
    /// then the merged list is deduplicated and capped.
    pub async fn search(
        &self,
        raw_query: &str,
        user_id: Option<&str>,
    ) -> Result<RankedResults, SearchError> {
        let query = NormalizedQuery::parse(raw_query);
        if query.is_empty() {
            return Err(SearchError::InvalidQuery);
        }

        let signals = self.load_signals(user_id).await;
        let boost_ids = signals.clicked_product_ids();

        let ((hits, served_by), taxonomy) = tokio::join!(
            self.retrieve_products(
                &query,
                boost_ids,
                self.config.search_limit,
                self.config.search_limit,
            ),
            self.retrieve_taxonomy(&query),
        );

        let categories = rank::pretrim_exact_first(taxonomy, &query, self.config.category_pretrim);
        let combined = categories
            .into_iter()
            .chain(hits.into_iter().map(Suggestion::from));
        let suggestions = rank::merge_capped(combined, self.config.search_limit);

        info!(
            query = %query.original,
            served_by = ?served_by,
            results = suggestions.len(),
            "search"
        );

        Ok(RankedResults {
            suggestions,
            served_by,
        })
    }

    /// Record a click event into the user's profile.
    pub async fn track_click(&self, event: ClickEvent) -> Result<ClickReceipt, TrackError> {
        let profiles = Arc::clone(&self.profiles);
        let catalog = Arc::clone(&self.catalog);
        let config = self.config.clone();

        task::spawn_blocking(move || tracker::track(profiles.as_ref(), catalog.as_ref(), &config, &event))
            .await
            .map_err(|e| TrackError::Store(StoreError::Internal(e.to_string())))?
    }

    /// Fetch personalization signals; a slow or failing profile store
    /// degrades to an unpersonalized request.
    async fn load_signals(&self, user_id: Option<&str>) -> ClickSignals {
        let Some(user_id) = user_id else {
            return ClickSignals::default();
        };
        let user_id = user_id.to_string();
        let profiles = Arc::clone(&self.profiles);

        match self
            .run_bounded(self.config.profile_timeout, "profile", move || {
                profiles.get(&user_id)
            })
            .await
        {
            Some(Ok(Some(profile))) => ClickSignals::from_profile(&profile),
            Some(Ok(None)) => ClickSignals::default(),
            Some(Err(e)) => {
                warn!(error = %e, "profile store failed, proceeding without personalization");
                ClickSignals::default()
            }
            None => ClickSignals::default(),
        }
    }

    /// Primary engine first; on failure or timeout, the lexical
    /// fallback. Both paths return the same hit shape.
    async fn retrieve_products(
        &self,
        query: &NormalizedQuery,
        boost_ids: Vec<String>,
        primary_limit: usize,
        fallback_limit: usize,
    ) -> (Vec<EngineHit>, SearchPath) {
        let engine = Arc::clone(&self.engine);
        let engine_query = EngineQuery {
            original: query.original.clone(),
            expanded: query.expanded.clone(),
            boost_ids: boost_ids.clone(),
            limit: primary_limit,
        };

        match self
            .run_bounded(self.config.engine_timeout, "engine", move || {
                engine.search(&engine_query)
            })
            .await
        {
            Some(Ok(hits)) => return (hits, SearchPath::Primary),
            Some(Err(e)) => warn!(error = %e, "primary engine failed, using fallback"),
            None => warn!("primary engine timed out, using fallback"),
        }

        let catalog = Arc::clone(&self.catalog);
        let fallback_query = query.clone();
        match self
            .run_bounded(self.config.store_timeout, "fallback", move || {
                fallback::search_products(
                    catalog.as_ref(),
                    &fallback_query,
                    &boost_ids,
                    fallback_limit,
                )
            })
            .await
        {
            Some(Ok(hits)) => (hits, SearchPath::Fallback),
            Some(Err(e)) => {
                error!(error = %e, "fallback search failed, returning no products");
                (Vec::new(), SearchPath::None)
            }
            None => (Vec::new(), SearchPath::None),
        }
    }

    /// Category/term lookup; failures blank out only this candidate
    /// set, never the product results.
    async fn retrieve_taxonomy(&self, query: &NormalizedQuery) -> Vec<Suggestion> {
        let catalog = Arc::clone(&self.catalog);
        let query = query.clone();

        match self
            .run_bounded(self.config.store_timeout, "taxonomy", move || {
                matcher::match_taxonomy(catalog.as_ref(), &query)
            })
            .await
        {
            Some(Ok(candidates)) => candidates,
            Some(Err(e)) => {
                warn!(error = %e, "taxonomy lookup failed, continuing without categories");
                Vec::new()
            }
            None => Vec::new(),
        }
    }

    /// Run a blocking upstream call under a time budget. Panics and
    /// timeouts both degrade to None.
    async fn run_bounded<T, F>(&self, budget: Duration, label: &'static str, job: F) -> Option<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        match timeout(budget, task::spawn_blocking(job)).await {
            Ok(Ok(value)) => Some(value),
            Ok(Err(e)) => {
                error!(task = label, error = %e, "upstream task failed");
                None
            }
            Err(_) => {
                warn!(task = label, "upstream task timed out");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{sample_products, sample_taxonomy, MemoryCatalog, ProductRecord, TaxonomyRecord};
    use crate::engine::ProductIndex;
    use crate::error::EngineError;
    use crate::profile::{MemoryProfileStore, UserProfile};
    use pretty_assertions::assert_eq;
    use regex::Regex;

    struct DownEngine;

    impl SearchEngine for DownEngine {
        fn search(&self, _query: &EngineQuery) -> Result<Vec<EngineHit>, EngineError> {
            Err(EngineError::Unavailable("connection refused".into()))
        }
    }

    struct DownCatalog;

    impl CatalogStore for DownCatalog {
        fn find_products(
            &self,
            _pattern: &Regex,
            _limit: usize,
        ) -> Result<Vec<ProductRecord>, StoreError> {
            Err(StoreError::Unavailable("down".into()))
        }
        fn product_by_id(&self, _id: &str) -> Result<Option<ProductRecord>, StoreError> {
            Err(StoreError::Unavailable("down".into()))
        }
        fn find_taxonomy(&self, _pattern: &Regex) -> Result<Vec<TaxonomyRecord>, StoreError> {
            Err(StoreError::Unavailable("down".into()))
        }
        fn categories(&self) -> Result<Vec<String>, StoreError> {
            Err(StoreError::Unavailable("down".into()))
        }
        fn subcategories(&self, _category: &str) -> Result<Vec<String>, StoreError> {
            Err(StoreError::Unavailable("down".into()))
        }
        fn top_rated(
            &self,
            _category: &str,
            _limit: usize,
        ) -> Result<Vec<ProductRecord>, StoreError> {
            Err(StoreError::Unavailable("down".into()))
        }
    }

    struct DownProfiles;

    impl ProfileStore for DownProfiles {
        fn get(&self, _user_id: &str) -> Result<Option<UserProfile>, StoreError> {
            Err(StoreError::Unavailable("down".into()))
        }
        fn put(&self, _user_id: &str, _profile: &UserProfile) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("down".into()))
        }
    }

    fn seeded_service() -> SearchService {
        let index = ProductIndex::in_memory();
        index.index_products(&sample_products()).unwrap();
        SearchService::new(
            Arc::new(index),
            Arc::new(MemoryCatalog::new(sample_products(), sample_taxonomy())),
            Arc::new(MemoryProfileStore::new()),
            ServiceConfig::default(),
        )
    }

    fn fallback_service() -> SearchService {
        SearchService::new(
            Arc::new(DownEngine),
            Arc::new(MemoryCatalog::new(sample_products(), sample_taxonomy())),
            Arc::new(MemoryProfileStore::new()),
            ServiceConfig::default(),
        )
    }

    #[tokio::test]
    async fn autosuggest_serves_from_the_primary_path() {
        let results = seeded_service().autosuggest("shoe", None).await.unwrap();
        assert_eq!(results.served_by, SearchPath::Primary);
        assert!(!results.suggestions.is_empty());
        assert!(results.suggestions.len() <= 8);
    }

    #[tokio::test]
    async fn engine_failure_degrades_to_the_fallback_path() {
        let results = fallback_service().autosuggest("shoe", None).await.unwrap();
        assert_eq!(results.served_by, SearchPath::Fallback);
        assert!(results
            .suggestions
            .iter()
            .any(|s| matches!(s, Suggestion::Product { .. })));
    }

    #[tokio::test]
    async fn everything_down_still_yields_a_well_formed_response() {
        let service = SearchService::new(
            Arc::new(DownEngine),
            Arc::new(DownCatalog),
            Arc::new(DownProfiles),
            ServiceConfig::default(),
        );
        let results = service.autosuggest("shoe", Some("u1")).await.unwrap();
        assert_eq!(results.served_by, SearchPath::None);
        assert!(results.suggestions.is_empty());
    }

    #[tokio::test]
    async fn profile_store_failure_never_blocks_search() {
        let index = ProductIndex::in_memory();
        index.index_products(&sample_products()).unwrap();
        let service = SearchService::new(
            Arc::new(index),
            Arc::new(MemoryCatalog::new(sample_products(), sample_taxonomy())),
            Arc::new(DownProfiles),
            ServiceConfig::default(),
        );
        let results = service.autosuggest("shoe", Some("u1")).await.unwrap();
        assert!(!results.suggestions.is_empty());
    }

    #[tokio::test]
    async fn category_store_failure_keeps_product_results() {
        // Engine healthy, catalog down: taxonomy blanks out, products
        // survive.
        let index = ProductIndex::in_memory();
        index.index_products(&sample_products()).unwrap();
        let service = SearchService::new(
            Arc::new(index),
            Arc::new(DownCatalog),
            Arc::new(MemoryProfileStore::new()),
            ServiceConfig::default(),
        );
        let results = service.autosuggest("shoe", None).await.unwrap();
        assert_eq!(results.served_by, SearchPath::Primary);
        assert!(results
            .suggestions
            .iter()
            .all(|s| matches!(s, Suggestion::Product { .. })));
        assert!(!results.suggestions.is_empty());
    }

    #[tokio::test]
    async fn blank_autosuggest_skips_backends() {
        let service = SearchService::new(
            Arc::new(DownEngine),
            Arc::new(DownCatalog),
            Arc::new(DownProfiles),
            ServiceConfig::default(),
        );
        let results = service.autosuggest("   ", Some("u1")).await.unwrap();
        assert!(results.suggestions.is_empty());
        assert_eq!(results.served_by, SearchPath::None);
    }

    #[tokio::test]
    async fn blank_full_search_is_a_client_error() {
        let err = seeded_service().search("", None).await.unwrap_err();
        assert!(matches!(err, SearchError::InvalidQuery));
    }

    #[tokio::test]
    async fn full_search_places_categories_ahead_of_products() {
        let results = seeded_service().search("shoe", None).await.unwrap();
        assert!(results.suggestions.len() <= 20);

        let first_product = results
            .suggestions
            .iter()
            .position(|s| matches!(s, Suggestion::Product { .. }));
        let last_category = results
            .suggestions
            .iter()
            .rposition(|s| !matches!(s, Suggestion::Product { .. }));
        if let (Some(product), Some(category)) = (first_product, last_category) {
            assert!(category < product);
        }
    }

    #[tokio::test]
    async fn clicked_products_rank_above_equal_tier_matches() {
        let profiles = Arc::new(MemoryProfileStore::new());
        profiles
            .put(
                "u1",
                &UserProfile {
                    clicked_products: vec!["P2".into()],
                    clicked_categories: vec![],
                },
            )
            .unwrap();

        let index = ProductIndex::in_memory();
        index.index_products(&sample_products()).unwrap();
        let service = SearchService::new(
            Arc::new(index),
            Arc::new(MemoryCatalog::new(sample_products(), sample_taxonomy())),
            profiles,
            ServiceConfig::default(),
        );

        let results = service.autosuggest("shoe", Some("u1")).await.unwrap();
        let first_product = results
            .suggestions
            .iter()
            .find_map(|s| match s {
                Suggestion::Product { id, .. } => Some(id.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(first_product, "P2");
    }

    #[tokio::test]
    async fn click_then_suggest_round_trip() {
        let service = seeded_service();
        service
            .track_click(ClickEvent {
                user_id: "u1".into(),
                product_id: Some("P2".into()),
                category: None,
            })
            .await
            .unwrap();

        let results = service.autosuggest("shoe", Some("u1")).await.unwrap();
        let first_product = results
            .suggestions
            .iter()
            .find_map(|s| match s {
                Suggestion::Product { id, .. } => Some(id.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(first_product, "P2");
    }
}
