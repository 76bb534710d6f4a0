//! Storefront Core - Personalized search and autosuggest ranking pipeline
//!
//! This crate provides:
//! - Query normalization and abbreviation expansion
//! - Suggestion types (products, categories, subcategories, search terms)
//! - Primary full-text search client (Tantivy)
//! - Lexical fallback search against the catalog store
//! - Category/term matching and the suggestion ranker/merger
//! - Click tracking and bounded user profiles
//! - The search service orchestrator

pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod fallback;
pub mod matcher;
pub mod profile;
pub mod query;
pub mod rank;
pub mod service;
pub mod suggestion;
pub mod tracker;

// Re-export commonly used types
pub use catalog::{CatalogStore, MemoryCatalog, ProductRecord, TaxonomyRecord};
pub use config::ServiceConfig;
pub use engine::{EngineHit, EngineQuery, ProductIndex, SearchEngine};
pub use error::{EngineError, SearchError, StoreError, TrackError};
pub use profile::{MemoryProfileStore, ProfileStore, UserProfile};
pub use query::NormalizedQuery;
pub use service::{RankedResults, SearchPath, SearchService};
pub use suggestion::{ProductTitle, Suggestion, SuggestionKey};
pub use tracker::{ClickEvent, ClickReceipt};
