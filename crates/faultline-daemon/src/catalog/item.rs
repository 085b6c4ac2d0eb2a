//! Catalog item

use serde::{Deserialize, Serialize};

/// A product shown on the landing and listing pages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: u32,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub category: Option<String>,
    pub image_url: Option<String>,
}

impl Item {
    pub fn new(
        id: u32,
        name: &str,
        description: &str,
        price: f64,
        category: &str,
        image_url: &str,
    ) -> Self {
        Self {
            id,
            name: name.to_string(),
            description: Some(description.to_string()),
            price,
            category: Some(category.to_string()),
            image_url: Some(image_url.to_string()),
        }
    }
}
