//! # Product Data Model
//!
//! Corpus entries as loaded from the product store, and the summary of a
//! product returned to callers inside a recommendation.
//!
//! ## Usage
//!
//! ```rust
//! use skinsight::product::Product;
//!
//! let serum = Product::new("Niacinamide Serum")
//!     .with_ingredients("Aqua, Niacinamide, Glycerin")
//!     .with_price("Rp89.000")
//!     .with_description("Cocok untuk semua jenis kulit");
//!
//! assert_eq!(serum.summary().price, "Rp89.000");
//! assert_eq!(serum.summary().product_link, "Unknown");
//! ```

use serde::{Deserialize, Serialize};

/// Placeholder for product attributes missing from the store
pub const UNKNOWN_ATTRIBUTE: &str = "Unknown";

/// A product of the recommendation corpus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Product name, used to deduplicate recommendations
    pub title: String,

    /// Raw ingredients text as collected
    #[serde(default)]
    pub ingredients: Option<String>,

    /// Product photo
    #[serde(default)]
    pub image_url: Option<String>,

    /// Display price, kept as collected (e.g. "Rp89.000")
    #[serde(default)]
    pub price: Option<String>,

    /// Product page
    #[serde(default)]
    pub link: Option<String>,

    /// Free-text marketing description
    #[serde(default)]
    pub description: Option<String>,
}

/// Product attributes returned with a recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub product_name: String,
    pub product_image: String,
    pub price: String,
    pub product_link: String,
}

impl Product {
    /// Create a product with only a title
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            ingredients: None,
            image_url: None,
            price: None,
            link: None,
            description: None,
        }
    }

    /// Set the raw ingredients text
    pub fn with_ingredients(mut self, ingredients: &str) -> Self {
        self.ingredients = Some(ingredients.to_string());
        self
    }

    /// Set the image URL
    pub fn with_image_url(mut self, image_url: &str) -> Self {
        self.image_url = Some(image_url.to_string());
        self
    }

    /// Set the display price
    pub fn with_price(mut self, price: &str) -> Self {
        self.price = Some(price.to_string());
        self
    }

    /// Set the product page link
    pub fn with_link(mut self, link: &str) -> Self {
        self.link = Some(link.to_string());
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Raw ingredients text, empty when missing
    pub fn ingredients_text(&self) -> &str {
        self.ingredients.as_deref().unwrap_or_default()
    }

    /// Caller-facing attributes, missing values rendered as [`UNKNOWN_ATTRIBUTE`]
    pub fn summary(&self) -> ProductSummary {
        let or_unknown =
            |value: &Option<String>| value.clone().unwrap_or_else(|| UNKNOWN_ATTRIBUTE.to_string());

        ProductSummary {
            product_name: self.title.clone(),
            product_image: or_unknown(&self.image_url),
            price: or_unknown(&self.price),
            product_link: or_unknown(&self.link),
        }
    }
}
