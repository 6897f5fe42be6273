//! Normalized product catalog types.

use serde::{Deserialize, Serialize};

use super::money::Money;

/// Product or variant image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub url: String,
    pub alt_text: Option<String>,
}

/// A product variant (a purchasable combination of options).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductVariant {
    /// Variant ID - this is the `merchandise_id` cart mutations take.
    pub id: String,
    pub title: String,
    pub available_for_sale: bool,
    pub price: Money,
    /// Compare-at price (original price if on sale).
    pub compare_at_price: Option<Money>,
}

/// A product in the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub title: String,
    /// URL handle.
    pub handle: String,
    pub description: String,
    /// Product images in display order; the first is the featured one.
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub variants: Vec<ProductVariant>,
}

impl Product {
    /// First image, if any.
    #[must_use]
    pub fn featured_image(&self) -> Option<&Image> {
        self.images.first()
    }

    /// First variant available for purchase, falling back to the first
    /// variant so out-of-stock products still render a price.
    #[must_use]
    pub fn default_variant(&self) -> Option<&ProductVariant> {
        self.variants
            .iter()
            .find(|v| v.available_for_sale)
            .or_else(|| self.variants.first())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variant(id: &str, available: bool) -> ProductVariant {
        ProductVariant {
            id: id.to_string(),
            title: "Default Title".to_string(),
            available_for_sale: available,
            price: Money::zero("USD"),
            compare_at_price: None,
        }
    }

    #[test]
    fn test_default_variant_prefers_available() {
        let product = Product {
            id: "p1".to_string(),
            title: "Salsa".to_string(),
            handle: "salsa".to_string(),
            description: String::new(),
            images: vec![],
            variants: vec![variant("v1", false), variant("v2", true)],
        };
        assert_eq!(product.default_variant().map(|v| v.id.as_str()), Some("v2"));
    }

    #[test]
    fn test_default_variant_falls_back_to_first() {
        let product = Product {
            id: "p1".to_string(),
            title: "Salsa".to_string(),
            handle: "salsa".to_string(),
            description: String::new(),
            images: vec![],
            variants: vec![variant("v1", false)],
        };
        assert_eq!(product.default_variant().map(|v| v.id.as_str()), Some("v1"));
    }
}
