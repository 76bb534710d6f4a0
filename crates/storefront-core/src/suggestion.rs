//! Suggestion types returned by search and autosuggest
//!
//! A suggestion is a tagged union over four variants. The tag is
//! serialized as `type` and product titles keep the camelCase keys the
//! storefront clients render (`longTitle` may carry HTML highlight
//! markers). The ranking score is a transient and never serialized.

use serde::{Deserialize, Serialize};

/// Product title pair; `long_title` may contain `<strong>` highlight
/// markers from whichever search path served the request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductTitle {
    #[serde(rename = "longTitle")]
    pub long_title: String,
    #[serde(rename = "shortTitle")]
    pub short_title: String,
}

/// A single candidate offered to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Suggestion {
    Product {
        id: String,
        title: ProductTitle,
        rating: f32,
    },
    Category {
        name: String,
    },
    Subcategory {
        name: String,
    },
    /// A curated query string whose navigable target is a subcategory
    /// distinct from its display text. The distinction is preserved
    /// end-to-end: clients search on `subcategory`, display `name`.
    SearchTerm {
        name: String,
        subcategory: String,
    },
}

/// Composite identity used for deduplication: product id for products,
/// display name for everything else.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SuggestionKey {
    Product(String),
    Named(String),
}

impl Suggestion {
    pub fn key(&self) -> SuggestionKey {
        match self {
            Suggestion::Product { id, .. } => SuggestionKey::Product(id.clone()),
            Suggestion::Category { name }
            | Suggestion::Subcategory { name }
            | Suggestion::SearchTerm { name, .. } => SuggestionKey::Named(name.clone()),
        }
    }

    /// Display name for non-product variants.
    pub fn display_name(&self) -> Option<&str> {
        match self {
            Suggestion::Product { .. } => None,
            Suggestion::Category { name }
            | Suggestion::Subcategory { name }
            | Suggestion::SearchTerm { name, .. } => Some(name),
        }
    }

    /// The name the user navigates to when clicking this suggestion.
    /// For search terms that is the underlying subcategory, not the
    /// display string.
    pub fn target_name(&self) -> Option<&str> {
        match self {
            Suggestion::Product { .. } => None,
            Suggestion::Category { name } | Suggestion::Subcategory { name } => Some(name),
            Suggestion::SearchTerm { subcategory, .. } => Some(subcategory),
        }
    }
}
