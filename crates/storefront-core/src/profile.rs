//! User profiles and the profile store adapter
//!
//! A profile is a small per-user blob of click history driving
//! personalization. The store is a plain key-value get/put; the
//! in-memory implementation stands in for the external cache and is
//! what tests substitute.

use std::collections::HashMap;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Per-user click history. `clicked_products` keeps click order (oldest
/// first, bounded); `clicked_categories` keeps most-recent-first order
/// with move-to-front dedup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub clicked_products: Vec<String>,
    #[serde(default)]
    pub clicked_categories: Vec<String>,
}

impl UserProfile {
    /// Record a product click. Duplicate ids are ignored; once the cap
    /// is reached the oldest entry is dropped. Returns false on a
    /// duplicate.
    pub fn record_product(&mut self, product_id: &str, cap: usize) -> bool {
        if self.clicked_products.iter().any(|p| p == product_id) {
            return false;
        }
        self.clicked_products.push(product_id.to_string());
        if self.clicked_products.len() > cap {
            let excess = self.clicked_products.len() - cap;
            self.clicked_products.drain(..excess);
        }
        true
    }

    /// Record a category click. A repeated click moves the entry to the
    /// front instead of duplicating it; the list is truncated to `cap`.
    pub fn record_category(&mut self, category: &str, cap: usize) {
        self.clicked_categories.retain(|c| c != category);
        self.clicked_categories.insert(0, category.to_string());
        self.clicked_categories.truncate(cap);
    }
}

/// Key-value store of profile blobs.
pub trait ProfileStore: Send + Sync {
    fn get(&self, user_id: &str) -> Result<Option<UserProfile>, StoreError>;
    fn put(&self, user_id: &str, profile: &UserProfile) -> Result<(), StoreError>;
}

/// In-memory profile store.
#[derive(Default)]
pub struct MemoryProfileStore {
    profiles: RwLock<HashMap<String, UserProfile>>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProfileStore for MemoryProfileStore {
    fn get(&self, user_id: &str) -> Result<Option<UserProfile>, StoreError> {
        let profiles = self
            .profiles
            .read()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        Ok(profiles.get(user_id).cloned())
    }

    fn put(&self, user_id: &str, profile: &UserProfile) -> Result<(), StoreError> {
        let mut profiles = self
            .profiles
            .write()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        profiles.insert(user_id.to_string(), profile.clone());
        Ok(())
    }
}
