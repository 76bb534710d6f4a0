//! Category/term matcher
//!
//! Probes the taxonomy store for categories, subcategories, and
//! curated search terms containing either query form. A search-term
//! candidate keeps the record's subcategory as its navigable target;
//! the term text is only what the user sees.

use crate::catalog::CatalogStore;
use crate::error::StoreError;
use crate::fallback::literal_pattern;
use crate::query::NormalizedQuery;
use crate::suggestion::Suggestion;

/// Match taxonomy records against both query forms. Duplicates across
/// records are left for the merger to collapse.
pub fn match_taxonomy(
    catalog: &dyn CatalogStore,
    query: &NormalizedQuery,
) -> Result<Vec<Suggestion>, StoreError> {
    if query.is_empty() {
        return Ok(Vec::new());
    }

    let pattern = literal_pattern(query)?;
    let records = catalog.find_taxonomy(&pattern)?;

    let mut candidates = Vec::new();
    for record in records {
        if !record.category.is_empty() && pattern.is_match(&record.category) {
            candidates.push(Suggestion::Category {
                name: record.category.clone(),
            });
        }
        if !record.subcategory.is_empty() && pattern.is_match(&record.subcategory) {
            candidates.push(Suggestion::Subcategory {
                name: record.subcategory.clone(),
            });
        }
        for term in &record.search_terms {
            if pattern.is_match(term) {
                candidates.push(Suggestion::SearchTerm {
                    name: term.clone(),
                    subcategory: record.subcategory.clone(),
                });
            }
        }
    }

    Ok(candidates)
}
