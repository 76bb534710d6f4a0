//! Application state for the Storefront API

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Deserialize;
use storefront_core::{
    CatalogStore, MemoryCatalog, MemoryProfileStore, ProductIndex, ProductRecord, SearchService,
    ServiceConfig, TaxonomyRecord,
};

/// Seed file layout for the catalog.
#[derive(Debug, Deserialize)]
struct CatalogSeed {
    products: Vec<ProductRecord>,
    #[serde(default)]
    taxonomy: Vec<TaxonomyRecord>,
}

pub struct AppState {
    pub service: SearchService,
    pub catalog: Arc<MemoryCatalog>,
}

impl AppState {
    pub fn new() -> Result<Self> {
        // Catalog seed path from env or the bundled default
        let seed_path = std::env::var("STOREFRONT_CATALOG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data/catalog.json"));

        let raw = std::fs::read_to_string(&seed_path)
            .with_context(|| format!("reading catalog seed {}", seed_path.display()))?;
        let seed: CatalogSeed = serde_json::from_str(&raw)
            .with_context(|| format!("parsing catalog seed {}", seed_path.display()))?;

        Self::from_seed(seed.products, seed.taxonomy)
    }

    pub fn from_seed(products: Vec<ProductRecord>, taxonomy: Vec<TaxonomyRecord>) -> Result<Self> {
        // Persistent index directory is optional; without it the index
        // is rebuilt in memory from the seed on startup.
        let index = match std::env::var("STOREFRONT_INDEX_DIR") {
            Ok(dir) => ProductIndex::open_or_create(Path::new(&dir))?,
            Err(_) => ProductIndex::in_memory(),
        };
        index.index_products(&products)?;

        tracing::info!(
            products = products.len(),
            taxonomy = taxonomy.len(),
            "catalog loaded"
        );

        let catalog = Arc::new(MemoryCatalog::new(products, taxonomy));
        let store: Arc<dyn CatalogStore> = catalog.clone();
        let service = SearchService::new(
            Arc::new(index),
            store,
            Arc::new(MemoryProfileStore::new()),
            ServiceConfig::from_env(),
        );

        Ok(Self { service, catalog })
    }
}
