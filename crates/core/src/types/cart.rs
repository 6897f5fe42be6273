//! Normalized cart types.
//!
//! The provider owns authoritative cart state; these types are the local
//! denormalized shape every gateway operation returns. Callers replace
//! their snapshot wholesale with whatever the provider sends back - a cart
//! is never patched locally.
//!
//! # Invariants
//!
//! - A cart's `id` is assigned by the provider and immutable for the cart's
//!   lifetime.
//! - `total_quantity` equals the sum of all line quantities.
//! - A line's `id` is stable across quantity updates; lines reduced to zero
//!   quantity are removed by the provider, never retained.

use serde::{Deserialize, Serialize};

use super::money::Money;
use super::product::Image;

/// Custom attribute (key-value pair) carried on a cart line.
///
/// Used for attribution data such as the fundraising team identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attribute {
    pub key: String,
    pub value: Option<String>,
}

/// Input form of an attribute for cart mutations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeInput {
    pub key: String,
    pub value: String,
}

/// Merchandise referenced by a cart line (a product variant).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartMerchandise {
    /// Variant ID.
    pub id: String,
    /// Variant title (e.g., "Large" or "Default Title").
    pub title: String,
    /// Unit price.
    pub price: Money,
    /// Parent product info.
    pub product: CartMerchandiseProduct,
}

/// Parent product info on a cart line's merchandise.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartMerchandiseProduct {
    pub id: String,
    pub title: String,
    /// URL handle.
    pub handle: String,
    /// First product image.
    pub featured_image: Option<Image>,
}

/// A line item in the cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Provider-assigned line ID, unique within the cart.
    pub id: String,
    /// Quantity, always >= 1. A request to go below 1 is a removal.
    pub quantity: i64,
    /// Custom attributes (attribution data rides here).
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    /// Product variant.
    pub merchandise: CartMerchandise,
}

/// Cart cost summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartCost {
    /// Subtotal before tax/shipping.
    #[serde(rename = "subtotalAmount")]
    pub subtotal: Money,
    /// Total amount.
    #[serde(rename = "totalAmount")]
    pub total: Money,
}

/// A shopping cart, normalized from the provider's GraphQL shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    /// Provider-assigned opaque cart ID.
    pub id: String,
    /// Checkout URL hosted by the provider.
    pub checkout_url: String,
    /// Total item quantity across all lines.
    pub total_quantity: i64,
    /// Cost summary.
    pub cost: CartCost,
    /// Line items in the provider's order.
    #[serde(default)]
    pub lines: Vec<CartLine>,
}

impl Cart {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of all line quantities. The provider guarantees this equals
    /// `total_quantity`; exposed so callers can assert it.
    #[must_use]
    pub fn line_quantity_sum(&self) -> i64 {
        self.lines.iter().map(|line| line.quantity).sum()
    }
}

/// Input for adding a line to a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineInput {
    /// Product variant ID.
    pub merchandise_id: String,
    /// Quantity to add.
    pub quantity: i64,
    /// Custom attributes to attach to the new line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Vec<AttributeInput>>,
}

/// Input for updating an existing cart line's quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineUpdateInput {
    /// Cart line ID.
    pub id: String,
    /// New quantity.
    pub quantity: i64,
}
