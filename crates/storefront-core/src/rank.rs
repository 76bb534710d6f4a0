//! Suggestion ranker/merger
//!
//! Scores heterogeneous candidates with an additive model and merges
//! them into one deduplicated, capped list. Scores are not normalized
//! across types: category/term text tiers are weighted far above the
//! product tiers so an exact category match always outranks a merely
//! contained product match. Ties keep retrieval order (stable sort).

use std::collections::HashSet;

use crate::engine::EngineHit;
use crate::profile::UserProfile;
use crate::query::NormalizedQuery;
use crate::suggestion::{Suggestion, SuggestionKey};

// Personalization
const IDENTITY_BOOST: i64 = 1000;
const WORD_OVERLAP_BOOST: i64 = 800;

// Text-match tiers, products
const PRODUCT_EXACT: i64 = 900;
const PRODUCT_PREFIX: i64 = 500;

// Text-match tiers, categories and terms
const TAXONOMY_EXACT: i64 = 2000;
const TAXONOMY_PREFIX: i64 = 1500;

const CONTAINS: i64 = 100;

// Product secondary field (category / short title)
const SECONDARY_PREFIX: i64 = 200;
const SECONDARY_CONTAINS: i64 = 50;

// Type specificity for non-product candidates
const SEARCH_TERM_BOOST: i64 = 200;
const SUBCATEGORY_BOOST: i64 = 150;

/// Personalization signals extracted from a user profile.
#[derive(Debug, Default, Clone)]
pub struct ClickSignals {
    clicked_products: HashSet<String>,
    clicked_categories: HashSet<String>,
    category_words: HashSet<String>,
}

impl ClickSignals {
    pub fn from_profile(profile: &UserProfile) -> Self {
        let category_words = profile
            .clicked_categories
            .iter()
            .flat_map(|c| c.split_whitespace())
            .map(|w| w.to_lowercase())
            .collect();
        Self {
            clicked_products: profile.clicked_products.iter().cloned().collect(),
            clicked_categories: profile.clicked_categories.iter().cloned().collect(),
            category_words,
        }
    }

    pub fn clicked_product_ids(&self) -> Vec<String> {
        self.clicked_products.iter().cloned().collect()
    }

    fn word_overlap(&self, display_name: &str) -> i64 {
        display_name
            .split_whitespace()
            .filter(|w| self.category_words.contains(&w.to_lowercase()))
            .count() as i64
            * WORD_OVERLAP_BOOST
    }
}

/// Best text tier of `name` against both query forms.
fn text_tier(name_lower: &str, query: &NormalizedQuery, exact: i64, prefix: i64) -> i64 {
    query
        .forms()
        .iter()
        .map(|form| {
            if name_lower == *form {
                exact
            } else if name_lower.starts_with(form) {
                prefix
            } else if name_lower.contains(form) {
                CONTAINS
            } else {
                0
            }
        })
        .max()
        .unwrap_or(0)
}

/// Reduced-weight tier for the product's secondary field.
fn secondary_tier(field_lower: &str, query: &NormalizedQuery) -> i64 {
    query
        .forms()
        .iter()
        .map(|form| {
            if field_lower.starts_with(form) {
                SECONDARY_PREFIX
            } else if field_lower.contains(form) {
                SECONDARY_CONTAINS
            } else {
                0
            }
        })
        .max()
        .unwrap_or(0)
}

/// Score a product hit. Uses the raw (unhighlighted) fields.
pub fn score_product(hit: &EngineHit, query: &NormalizedQuery, signals: &ClickSignals) -> i64 {
    let name_lower = hit.name.to_lowercase();
    let category_lower = hit.category.to_lowercase();

    let mut score = 0;
    if signals.clicked_products.contains(&hit.id) {
        score += IDENTITY_BOOST;
    }
    score += signals.word_overlap(&hit.name);
    score += text_tier(&name_lower, query, PRODUCT_EXACT, PRODUCT_PREFIX);
    score += secondary_tier(&category_lower, query);
    score
}

/// Score a category, subcategory, or search-term candidate.
pub fn score_taxonomy(
    candidate: &Suggestion,
    query: &NormalizedQuery,
    signals: &ClickSignals,
) -> i64 {
    let display = candidate.display_name().unwrap_or_default();
    let target = candidate.target_name().unwrap_or_default();

    let mut score = 0;
    // Identity is the navigable category/subcategory, not the display
    // string.
    if signals.clicked_categories.contains(target) {
        score += IDENTITY_BOOST;
    }
    score += signals.word_overlap(display);
    score += text_tier(&display.to_lowercase(), query, TAXONOMY_EXACT, TAXONOMY_PREFIX);
    score += match candidate {
        Suggestion::SearchTerm { .. } => SEARCH_TERM_BOOST,
        Suggestion::Subcategory { .. } => SUBCATEGORY_BOOST,
        _ => 0,
    };
    score
}

/// Unified rank: score every candidate, stable-sort descending, then
/// walk deduplicating by identity key until the cap is reached.
pub fn rank(
    query: &NormalizedQuery,
    product_hits: Vec<EngineHit>,
    taxonomy: Vec<Suggestion>,
    signals: &ClickSignals,
    cap: usize,
) -> Vec<Suggestion> {
    if query.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<(i64, Suggestion)> = Vec::with_capacity(product_hits.len() + taxonomy.len());
    for hit in product_hits {
        let score = score_product(&hit, query, signals);
        scored.push((score, Suggestion::from(hit)));
    }
    for candidate in taxonomy {
        let score = score_taxonomy(&candidate, query, signals);
        scored.push((score, candidate));
    }

    // Vec::sort_by is stable; ties keep retrieval order.
    scored.sort_by(|a, b| b.0.cmp(&a.0));

    merge_capped(scored.into_iter().map(|(_, s)| s), cap)
}

/// Deduplicate by identity key and cap, preserving order.
pub fn merge_capped(candidates: impl IntoIterator<Item = Suggestion>, cap: usize) -> Vec<Suggestion> {
    let mut seen: HashSet<SuggestionKey> = HashSet::new();
    let mut out = Vec::new();
    for candidate in candidates {
        if out.len() >= cap {
            break;
        }
        if seen.insert(candidate.key()) {
            out.push(candidate);
        }
    }
    out
}

/// Full search's simpler category path: exact matches of either query
/// form first (stable), trimmed to `cap`.
pub fn pretrim_exact_first(
    mut candidates: Vec<Suggestion>,
    query: &NormalizedQuery,
    cap: usize,
) -> Vec<Suggestion> {
    candidates.sort_by_key(|c| {
        let exact = c
            .display_name()
            .map(|n| {
                let lower = n.to_lowercase();
                query.forms().iter().any(|f| lower == *f)
            })
            .unwrap_or(false);
        !exact
    });
    candidates.truncate(cap);
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn hit(id: &str, name: &str, category: &str, rating: f32) -> EngineHit {
        EngineHit {
            id: id.to_string(),
            name: name.to_string(),
            category: category.to_string(),
            highlighted_name: None,
            highlighted_category: None,
            rating,
            score: 0.0,
        }
    }

    fn profile(products: &[&str], categories: &[&str]) -> ClickSignals {
        ClickSignals::from_profile(&UserProfile {
            clicked_products: products.iter().map(|s| s.to_string()).collect(),
            clicked_categories: categories.iter().map(|s| s.to_string()).collect(),
        })
    }

    #[test]
    fn category_exact_match_beats_product_substring_match() {
        let query = NormalizedQuery::parse("shoe");
        let products = vec![hit("P1", "Canvas shoe cleaner", "Accessories", 4.0)];
        let taxonomy = vec![Suggestion::Category { name: "Shoe".into() }];

        let ranked = rank(&query, products, taxonomy, &ClickSignals::default(), 8);
        assert_eq!(ranked[0], Suggestion::Category { name: "Shoe".into() });
    }

    #[test]
    fn clicked_product_outranks_equal_tier_match() {
        let query = NormalizedQuery::parse("shoe");
        let products = vec![
            hit("P2", "Trail shoe classic", "Sports Shoes", 4.9),
            hit("P1", "Acme shoe pro", "Sports Shoes", 3.0),
        ];
        let signals = profile(&["P1"], &[]);

        let ranked = rank(&query, products, vec![], &signals, 8);
        match &ranked[0] {
            Suggestion::Product { id, .. } => assert_eq!(id, "P1"),
            other => panic!("expected product, got {:?}", other),
        }
    }

    #[test]
    fn keyword_overlap_rewards_topical_affinity() {
        let query = NormalizedQuery::parse("gear");
        let signals = profile(&[], &["Sports Shoes"]);
        let products = vec![
            hit("P1", "Camping gear kit", "Outdoor", 4.0),
            hit("P2", "Shoes gear bag", "Outdoor", 4.0),
        ];

        // "Shoes" overlaps a clicked category word: +800.
        let ranked = rank(&query, products, vec![], &signals, 8);
        match &ranked[0] {
            Suggestion::Product { id, .. } => assert_eq!(id, "P2"),
            other => panic!("expected product, got {:?}", other),
        }
    }

    #[test]
    fn search_term_identity_boost_uses_the_subcategory_target() {
        let query = NormalizedQuery::parse("running");
        let signals = profile(&[], &["Sports Shoes"]);
        let taxonomy = vec![
            Suggestion::Category { name: "Running Machines".into() },
            Suggestion::SearchTerm {
                name: "running gear".into(),
                subcategory: "Sports Shoes".into(),
            },
        ];

        let ranked = rank(&query, vec![], taxonomy, &signals, 8);
        assert!(matches!(ranked[0], Suggestion::SearchTerm { .. }));
    }

    #[test]
    fn scores_are_non_increasing_along_the_result() {
        let query = NormalizedQuery::parse("shoe");
        let signals = profile(&["P1"], &["Footwear"]);
        let products = vec![
            hit("P1", "Acme shoe pro", "Sports Shoes", 4.0),
            hit("P2", "Shoe", "Sports Shoes", 4.1),
            hit("P3", "Canvas cleaner for shoe care", "Accessories", 2.0),
        ];
        let taxonomy = vec![
            Suggestion::Category { name: "Shoe".into() },
            Suggestion::Subcategory { name: "Sports Shoes".into() },
        ];

        let ranked = rank(
            &query,
            products.clone(),
            taxonomy.clone(),
            &signals,
            8,
        );

        let score_of = |s: &Suggestion| match s {
            Suggestion::Product { id, .. } => {
                let hit = products.iter().find(|h| &h.id == id).unwrap();
                score_product(hit, &query, &signals)
            }
            other => score_taxonomy(other, &query, &signals),
        };

        let scores: Vec<i64> = ranked.iter().map(score_of).collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]), "scores: {:?}", scores);
    }

    #[test]
    fn dedup_is_by_composite_key() {
        let query = NormalizedQuery::parse("shoe");
        let products = vec![
            hit("P1", "Acme shoe pro", "Sports Shoes", 4.0),
            hit("P1", "Acme shoe pro", "Sports Shoes", 4.0),
        ];
        let taxonomy = vec![
            Suggestion::Category { name: "Shoes".into() },
            Suggestion::Subcategory { name: "Shoes".into() },
        ];

        let ranked = rank(&query, products, taxonomy, &ClickSignals::default(), 8);
        assert_eq!(ranked.len(), 2);
    }

    #[test]
    fn cap_is_enforced() {
        let query = NormalizedQuery::parse("shoe");
        let products: Vec<EngineHit> = (0..20)
            .map(|i| hit(&format!("P{}", i), &format!("Shoe model {}", i), "Shoes", 3.0))
            .collect();

        let ranked = rank(&query, products, vec![], &ClickSignals::default(), 8);
        assert_eq!(ranked.len(), 8);
    }

    #[test]
    fn single_candidate_is_returned_alone() {
        let query = NormalizedQuery::parse("shoe");
        let ranked = rank(
            &query,
            vec![hit("P1", "Shoe", "Shoes", 4.0)],
            vec![],
            &ClickSignals::default(),
            8,
        );
        assert_eq!(ranked.len(), 1);
    }

    #[test]
    fn empty_query_short_circuits() {
        let query = NormalizedQuery::parse("");
        let ranked = rank(
            &query,
            vec![hit("P1", "Shoe", "Shoes", 4.0)],
            vec![],
            &ClickSignals::default(),
            8,
        );
        assert!(ranked.is_empty());
    }

    #[test]
    fn pretrim_puts_exact_matches_first() {
        let query = NormalizedQuery::parse("shoes");
        let candidates = vec![
            Suggestion::Category { name: "Shoe Care".into() },
            Suggestion::Category { name: "Shoes".into() },
            Suggestion::Subcategory { name: "Sports Shoes".into() },
        ];

        let trimmed = pretrim_exact_first(candidates, &query, 2);
        assert_eq!(
            trimmed,
            vec![
                Suggestion::Category { name: "Shoes".into() },
                Suggestion::Category { name: "Shoe Care".into() },
            ]
        );
    }

    #[test]
    fn both_query_forms_feed_the_text_tier() {
        // Exact match through the expansion only.
        let query = NormalizedQuery::parse("tv");
        let taxonomy = vec![
            Suggestion::Category { name: "Televisions".into() },
            Suggestion::Category { name: "TV Stands".into() },
        ];

        let ranked = rank(&query, vec![], taxonomy, &ClickSignals::default(), 8);
        assert_eq!(
            ranked[0],
            Suggestion::Category { name: "Televisions".into() }
        );
    }
}
