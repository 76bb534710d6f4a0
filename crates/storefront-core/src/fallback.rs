//! Lexical fallback search
//!
//! Degraded-mode product retrieval against the catalog store, used
//! when the primary engine is unavailable. Both query forms are probed
//! through one case-insensitive alternation pattern built from escaped
//! literals, so user input can never act as pattern syntax. Results
//! come back rating-descending from the store; previously clicked
//! products are then moved to the front with a stable partition.
//! Highlighting is synthesized by wrapping literal matches in the same
//! `<strong>` markers the primary path produces, keeping the response
//! shape identical downstream.

use regex::{Regex, RegexBuilder};

use crate::catalog::CatalogStore;
use crate::engine::EngineHit;
use crate::error::StoreError;
use crate::query::NormalizedQuery;

/// Build a case-insensitive pattern matching any of the query forms as
/// literal text. `regex::escape` neutralizes every metacharacter,
/// including a trailing backslash.
pub fn literal_pattern(query: &NormalizedQuery) -> Result<Regex, StoreError> {
    let alternation = query
        .forms()
        .iter()
        .map(|form| regex::escape(form))
        .collect::<Vec<_>>()
        .join("|");

    RegexBuilder::new(&alternation)
        .case_insensitive(true)
        .build()
        .map_err(|e| StoreError::Internal(e.to_string()))
}

/// Wrap every literal match of the query forms in `<strong>` markers.
pub fn wrap_matches(pattern: &Regex, text: &str) -> String {
    pattern.replace_all(text, "<strong>$0</strong>").into_owned()
}

/// Search the catalog store for products matching either query form.
pub fn search_products(
    catalog: &dyn CatalogStore,
    query: &NormalizedQuery,
    boost_ids: &[String],
    limit: usize,
) -> Result<Vec<EngineHit>, StoreError> {
    if query.is_empty() {
        return Ok(Vec::new());
    }

    let pattern = literal_pattern(query)?;
    let mut products = catalog.find_products(&pattern, limit)?;

    // Clicked products first, relative order otherwise preserved.
    let (boosted, rest): (Vec<_>, Vec<_>) = products
        .drain(..)
        .partition(|p| boost_ids.iter().any(|b| b == &p.id));

    let hits = boosted
        .into_iter()
        .chain(rest)
        .map(|p| {
            let highlighted_name = wrap_matches(&pattern, &p.long_title);
            let highlighted_category = wrap_matches(&pattern, &p.short_title);
            EngineHit {
                highlighted_name: (highlighted_name != p.long_title).then_some(highlighted_name),
                highlighted_category: (highlighted_category != p.short_title)
                    .then_some(highlighted_category),
                id: p.id,
                name: p.long_title,
                category: p.short_title,
                rating: p.rating,
                score: 0.0,
            }
        })
        .collect();

    Ok(hits)
}
