//! Click tracking
//!
//! Records product and category interactions into the user's profile,
//! feeding future personalization. Product clicks also best-effort
//! resolve the product's category and subcategory; a failed resolution
//! is logged and skipped, never fatal. Partial success still counts as
//! overall success.

use tracing::{info, warn};

use crate::catalog::CatalogStore;
use crate::config::ServiceConfig;
use crate::error::TrackError;
use crate::profile::ProfileStore;

/// A click on a suggestion. `product_id` and `category` may both be
/// present and are processed independently.
#[derive(Debug, Clone)]
pub struct ClickEvent {
    pub user_id: String,
    pub product_id: Option<String>,
    pub category: Option<String>,
}

/// What was actually recorded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClickReceipt {
    pub tracked_product: bool,
    pub tracked_categories: Vec<String>,
}

/// Apply a click event to the user's profile.
pub fn track(
    profiles: &dyn ProfileStore,
    catalog: &dyn CatalogStore,
    config: &ServiceConfig,
    event: &ClickEvent,
) -> Result<ClickReceipt, TrackError> {
    if event.user_id.trim().is_empty() {
        return Err(TrackError::MissingUser);
    }

    // Profile is created lazily on the first click.
    let mut profile = profiles.get(&event.user_id)?.unwrap_or_default();
    let mut receipt = ClickReceipt::default();
    let mut dirty = false;

    if let Some(product_id) = &event.product_id {
        if profile.record_product(product_id, config.clicked_products_cap) {
            receipt.tracked_product = true;
            dirty = true;
        }

        // Best-effort category resolution from the clicked product.
        match catalog.product_by_id(product_id) {
            Ok(Some(product)) => {
                for name in [product.category, product.subcategory] {
                    if !name.is_empty() {
                        profile.record_category(&name, config.clicked_categories_cap);
                        receipt.tracked_categories.push(name);
                        dirty = true;
                    }
                }
            }
            Ok(None) => {
                warn!(product_id = %product_id, "product not found, skipping category tracking");
            }
            Err(e) => {
                warn!(product_id = %product_id, error = %e, "product lookup failed, skipping category tracking");
            }
        }
    }

    if let Some(category) = &event.category {
        if !category.trim().is_empty() {
            profile.record_category(category, config.clicked_categories_cap);
            receipt.tracked_categories.push(category.clone());
            dirty = true;
        }
    }

    if dirty {
        profiles.put(&event.user_id, &profile)?;
        info!(
            user_id = %event.user_id,
            tracked_product = receipt.tracked_product,
            tracked_categories = ?receipt.tracked_categories,
            "click tracked"
        );
    }

    Ok(receipt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{sample_products, sample_taxonomy, MemoryCatalog};
    use crate::profile::MemoryProfileStore;
    use pretty_assertions::assert_eq;

    fn setup() -> (MemoryProfileStore, MemoryCatalog, ServiceConfig) {
        (
            MemoryProfileStore::new(),
            MemoryCatalog::new(sample_products(), sample_taxonomy()),
            ServiceConfig::default(),
        )
    }

    fn product_click(user: &str, product: &str) -> ClickEvent {
        ClickEvent {
            user_id: user.to_string(),
            product_id: Some(product.to_string()),
            category: None,
        }
    }

    #[test]
    fn missing_user_is_rejected() {
        let (profiles, catalog, config) = setup();
        let event = ClickEvent {
            user_id: "  ".into(),
            product_id: Some("P1".into()),
            category: None,
        };
        assert!(matches!(
            track(&profiles, &catalog, &config, &event),
            Err(TrackError::MissingUser)
        ));
    }

    #[test]
    fn product_click_records_product_and_resolved_categories() {
        let (profiles, catalog, config) = setup();
        let receipt = track(&profiles, &catalog, &config, &product_click("u1", "P1")).unwrap();

        assert!(receipt.tracked_product);
        assert_eq!(
            receipt.tracked_categories,
            vec!["Footwear".to_string(), "Sports Shoes".to_string()]
        );

        let profile = profiles.get("u1").unwrap().unwrap();
        assert_eq!(profile.clicked_products, vec!["P1"]);
        // Subcategory was recorded after category, so it sits in front.
        assert_eq!(profile.clicked_categories, vec!["Sports Shoes", "Footwear"]);
    }

    #[test]
    fn repeated_product_click_is_idempotent() {
        let (profiles, catalog, config) = setup();
        track(&profiles, &catalog, &config, &product_click("u1", "P1")).unwrap();
        track(&profiles, &catalog, &config, &product_click("u1", "P1")).unwrap();

        let profile = profiles.get("u1").unwrap().unwrap();
        assert_eq!(profile.clicked_products, vec!["P1"]);
    }

    #[test]
    fn unknown_product_is_tracked_without_categories() {
        let (profiles, catalog, config) = setup();
        let receipt = track(&profiles, &catalog, &config, &product_click("u1", "NOPE")).unwrap();

        assert!(receipt.tracked_product);
        assert!(receipt.tracked_categories.is_empty());
        let profile = profiles.get("u1").unwrap().unwrap();
        assert_eq!(profile.clicked_products, vec!["NOPE"]);
    }

    #[test]
    fn category_clicks_keep_recency_order() {
        let (profiles, catalog, config) = setup();
        for name in ["A", "B", "A"] {
            let event = ClickEvent {
                user_id: "u1".into(),
                product_id: None,
                category: Some(name.into()),
            };
            track(&profiles, &catalog, &config, &event).unwrap();
        }

        let profile = profiles.get("u1").unwrap().unwrap();
        assert_eq!(profile.clicked_categories, vec!["A", "B"]);
    }

    #[test]
    fn product_and_category_in_one_event_are_both_processed() {
        let (profiles, catalog, config) = setup();
        let event = ClickEvent {
            user_id: "u1".into(),
            product_id: Some("P3".into()),
            category: Some("Footwear".into()),
        };
        let receipt = track(&profiles, &catalog, &config, &event).unwrap();

        assert!(receipt.tracked_product);
        let profile = profiles.get("u1").unwrap().unwrap();
        assert_eq!(profile.clicked_categories[0], "Footwear");
        assert!(profile.clicked_categories.contains(&"Televisions".to_string()));
    }
}
