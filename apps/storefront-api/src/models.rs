//! Request and response models for the Storefront API

use serde::{Deserialize, Serialize};

/// Query parameters shared by the search and autosuggest endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

/// Click tracking request body.
#[derive(Debug, Clone, Deserialize)]
pub struct ClickRequest {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
    #[serde(rename = "productId")]
    pub product_id: Option<String>,
    pub category: Option<String>,
}

/// Simple acknowledgement body.
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
