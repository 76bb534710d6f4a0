//! Catalog store abstraction
//!
//! The catalog is the document store of record for products and the
//! category/term taxonomy. The pipeline only reads it: pattern lookups
//! for the fallback path and the taxonomy matcher, id lookups for click
//! tracking, and distinct listings for catalog browsing. Persistence
//! and indexing source of truth live with the external collaborator;
//! `MemoryCatalog` stands in for it here and in tests.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// A stored product document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: String,
    pub long_title: String,
    pub short_title: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub subcategory: String,
    #[serde(default)]
    pub rating: f32,
}

/// A taxonomy row: category/subcategory pair plus the curated search
/// terms that navigate to the subcategory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxonomyRecord {
    pub category: String,
    pub subcategory: String,
    #[serde(default)]
    pub search_terms: Vec<String>,
}

/// Read-side interface to the product/category document store.
pub trait CatalogStore: Send + Sync {
    /// Products whose long title, short title, or description matches
    /// the pattern, ordered by rating descending, at most `limit`.
    fn find_products(&self, pattern: &Regex, limit: usize)
        -> Result<Vec<ProductRecord>, StoreError>;

    /// Look up one product by id.
    fn product_by_id(&self, id: &str) -> Result<Option<ProductRecord>, StoreError>;

    /// Taxonomy rows whose category, subcategory, or any search term
    /// matches the pattern.
    fn find_taxonomy(&self, pattern: &Regex) -> Result<Vec<TaxonomyRecord>, StoreError>;

    /// Distinct category names, in catalog order.
    fn categories(&self) -> Result<Vec<String>, StoreError>;

    /// Distinct subcategory names under a category.
    fn subcategories(&self, category: &str) -> Result<Vec<String>, StoreError>;

    /// Top rated products in a category.
    fn top_rated(&self, category: &str, limit: usize) -> Result<Vec<ProductRecord>, StoreError>;
}

/// In-memory catalog.
pub struct MemoryCatalog {
    products: Vec<ProductRecord>,
    taxonomy: Vec<TaxonomyRecord>,
}

impl MemoryCatalog {
    pub fn new(products: Vec<ProductRecord>, taxonomy: Vec<TaxonomyRecord>) -> Self {
        Self { products, taxonomy }
    }
}

impl CatalogStore for MemoryCatalog {
    fn find_products(
        &self,
        pattern: &Regex,
        limit: usize,
    ) -> Result<Vec<ProductRecord>, StoreError> {
        let mut matches: Vec<ProductRecord> = self
            .products
            .iter()
            .filter(|p| {
                pattern.is_match(&p.long_title)
                    || pattern.is_match(&p.short_title)
                    || pattern.is_match(&p.description)
            })
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.rating.partial_cmp(&a.rating).unwrap_or(std::cmp::Ordering::Equal));
        matches.truncate(limit);
        Ok(matches)
    }

    fn product_by_id(&self, id: &str) -> Result<Option<ProductRecord>, StoreError> {
        Ok(self.products.iter().find(|p| p.id == id).cloned())
    }

    fn find_taxonomy(&self, pattern: &Regex) -> Result<Vec<TaxonomyRecord>, StoreError> {
        Ok(self
            .taxonomy
            .iter()
            .filter(|t| {
                pattern.is_match(&t.category)
                    || pattern.is_match(&t.subcategory)
                    || t.search_terms.iter().any(|s| pattern.is_match(s))
            })
            .cloned()
            .collect())
    }

    fn categories(&self) -> Result<Vec<String>, StoreError> {
        let mut seen = Vec::new();
        for p in &self.products {
            if !p.category.is_empty() && !seen.contains(&p.category) {
                seen.push(p.category.clone());
            }
        }
        Ok(seen)
    }

    fn subcategories(&self, category: &str) -> Result<Vec<String>, StoreError> {
        let mut seen = Vec::new();
        for p in self.products.iter().filter(|p| p.category == category) {
            if !p.subcategory.is_empty() && !seen.contains(&p.subcategory) {
                seen.push(p.subcategory.clone());
            }
        }
        Ok(seen)
    }

    fn top_rated(&self, category: &str, limit: usize) -> Result<Vec<ProductRecord>, StoreError> {
        let mut matches: Vec<ProductRecord> = self
            .products
            .iter()
            .filter(|p| p.category == category)
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.rating.partial_cmp(&a.rating).unwrap_or(std::cmp::Ordering::Equal));
        matches.truncate(limit);
        Ok(matches)
    }
}

#[cfg(test)]
pub(crate) fn sample_products() -> Vec<ProductRecord> {
    vec![
        ProductRecord {
            id: "P1".into(),
            long_title: "Acme Running Shoe Pro".into(),
            short_title: "Sports Shoes".into(),
            description: "Lightweight running shoe".into(),
            category: "Footwear".into(),
            subcategory: "Sports Shoes".into(),
            rating: 4.5,
        },
        ProductRecord {
            id: "P2".into(),
            long_title: "Trail Shoe Classic".into(),
            short_title: "Sports Shoes".into(),
            description: "All-terrain trail shoe".into(),
            category: "Footwear".into(),
            subcategory: "Sports Shoes".into(),
            rating: 3.9,
        },
        ProductRecord {
            id: "P3".into(),
            long_title: "UltraView 55 Smart TV".into(),
            short_title: "Televisions".into(),
            description: "55 inch 4K television".into(),
            category: "Electronics".into(),
            subcategory: "Televisions".into(),
            rating: 4.8,
        },
    ]
}

#[cfg(test)]
pub(crate) fn sample_taxonomy() -> Vec<TaxonomyRecord> {
    vec![
        TaxonomyRecord {
            category: "Footwear".into(),
            subcategory: "Sports Shoes".into(),
            search_terms: vec!["running gear".into(), "marathon shoes".into()],
        },
        TaxonomyRecord {
            category: "Electronics".into(),
            subcategory: "Televisions".into(),
            search_terms: vec!["smart tv".into()],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use regex::RegexBuilder;

    fn catalog() -> MemoryCatalog {
        MemoryCatalog::new(sample_products(), sample_taxonomy())
    }

    fn pattern(text: &str) -> Regex {
        RegexBuilder::new(&regex::escape(text))
            .case_insensitive(true)
            .build()
            .unwrap()
    }

    #[test]
    fn find_products_orders_by_rating() {
        let hits = catalog().find_products(&pattern("shoe"), 10).unwrap();
        let ids: Vec<&str> = hits.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["P1", "P2"]);
    }

    #[test]
    fn find_products_respects_limit() {
        let hits = catalog().find_products(&pattern("shoe"), 1).unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn taxonomy_matches_search_terms() {
        let rows = catalog().find_taxonomy(&pattern("marathon")).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].subcategory, "Sports Shoes");
    }

    #[test]
    fn distinct_categories_preserve_order() {
        assert_eq!(
            catalog().categories().unwrap(),
            vec!["Footwear".to_string(), "Electronics".to_string()]
        );
    }

    #[test]
    fn top_rated_filters_by_category() {
        let top = catalog().top_rated("Footwear", 1).unwrap();
        assert_eq!(top[0].id, "P1");
    }
}
