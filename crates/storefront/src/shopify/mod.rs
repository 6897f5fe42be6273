//! Shopify Storefront API gateway.
//!
//! # Architecture
//!
//! - Hand-written GraphQL documents with typed serde response structs;
//!   Shopify is source of truth - NO local sync, direct API calls
//! - One shared normalization routine maps every cart-returning operation
//!   into the same [`copper_state_core::Cart`] shape
//! - Catalog responses cached in-memory via `moka` (5 minute TTL); cart
//!   operations are never cached
//!
//! The [`CommerceGateway`] trait is the seam the HTTP layer depends on, so
//! proxy handlers can be exercised against a stub gateway in tests.

mod storefront;

pub use storefront::StorefrontClient;

use async_trait::async_trait;
use thiserror::Error;

use copper_state_core::{Cart, CartLineInput, CartLineUpdateInput, Product};

/// Typed cart and catalog operations against the commerce provider.
///
/// Every mutation returns the full updated cart (never a delta) so callers
/// always replace their snapshot wholesale. `get_cart` models "no such
/// cart" as `None`, not an error - callers must treat it as "cart is gone",
/// not as a transient failure.
#[async_trait]
pub trait CommerceGateway: Send + Sync {
    /// Create a new cart, optionally seeded with lines.
    async fn create_cart(&self, lines: Vec<CartLineInput>) -> Result<Cart, ShopifyError>;

    /// Fetch current cart state. `Ok(None)` means the provider has no such
    /// cart.
    async fn get_cart(&self, cart_id: &str) -> Result<Option<Cart>, ShopifyError>;

    /// Add lines to an existing cart. Requires at least one line.
    async fn add_to_cart(
        &self,
        cart_id: &str,
        lines: Vec<CartLineInput>,
    ) -> Result<Cart, ShopifyError>;

    /// Update quantities of existing lines. Requires at least one line.
    async fn update_cart(
        &self,
        cart_id: &str,
        lines: Vec<CartLineUpdateInput>,
    ) -> Result<Cart, ShopifyError>;

    /// Remove lines from a cart. Requires at least one line ID.
    async fn remove_from_cart(
        &self,
        cart_id: &str,
        line_ids: Vec<String>,
    ) -> Result<Cart, ShopifyError>;

    /// List products for the catalog pages.
    async fn get_products(&self, first: i64) -> Result<Vec<Product>, ShopifyError>;

    /// Fetch a single product. `Ok(None)` when the handle is unknown.
    async fn get_product_by_handle(&self, handle: &str) -> Result<Option<Product>, ShopifyError>;
}

/// Errors that can occur when interacting with the Shopify Storefront API.
#[derive(Debug, Error)]
pub enum ShopifyError {
    /// Provider credentials are missing or blank. Raised before any
    /// network traffic is sent.
    #[error("Shopify credentials not configured: {0}")]
    Config(String),

    /// HTTP request failed (network-level transport error).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// GraphQL query returned errors, or the provider answered non-2xx.
    #[error("GraphQL errors: {}", format_graphql_errors(.0))]
    GraphQL(Vec<GraphQLError>),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Rate limited by Shopify.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Provider-reported validation error on a mutation (aggregated
    /// `userErrors` messages).
    #[error("User error: {0}")]
    UserError(String),
}

impl ShopifyError {
    /// Whether retrying the same request could plausibly succeed.
    ///
    /// Validation and configuration failures are deterministic; only
    /// transport-level failures and rate limiting are worth retrying.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Http(_) | Self::GraphQL(_) | Self::RateLimited(_)
        )
    }
}

/// A GraphQL error returned by the Shopify API.
#[derive(Debug, Clone)]
pub struct GraphQLError {
    /// Error message.
    pub message: String,
    /// Source locations in the query.
    pub locations: Vec<GraphQLErrorLocation>,
    /// Path to the error in the response.
    pub path: Vec<serde_json::Value>,
}

impl GraphQLError {
    /// A bare message with no location or path information.
    #[must_use]
    pub fn message_only(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            locations: vec![],
            path: vec![],
        }
    }
}

/// Location in a GraphQL query where an error occurred.
#[derive(Debug, Clone)]
pub struct GraphQLErrorLocation {
    /// Line number (1-indexed).
    pub line: i64,
    /// Column number (1-indexed).
    pub column: i64,
}

fn format_graphql_errors(errors: &[GraphQLError]) -> String {
    if errors.is_empty() {
        return "(no error details provided)".to_string();
    }

    errors
        .iter()
        .enumerate()
        .map(|(i, e)| {
            let mut parts = Vec::new();

            if !e.message.is_empty() {
                parts.push(e.message.clone());
            }

            if !e.path.is_empty() {
                let path_str = e
                    .path
                    .iter()
                    .map(|p| match p {
                        serde_json::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(".");
                parts.push(format!("path: {path_str}"));
            }

            if let Some(loc) = e.locations.first() {
                parts.push(format!("at line {}:{}", loc.line, loc.column));
            }

            if parts.is_empty() {
                format!("[error {}]: (no details)", i + 1)
            } else {
                parts.join(" ")
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shopify_error_display() {
        let err = ShopifyError::UserError("Variant not found".to_string());
        assert_eq!(err.to_string(), "User error: Variant not found");
    }

    #[test]
    fn test_graphql_error_formatting() {
        let errors = vec![
            GraphQLError::message_only("Field not found"),
            GraphQLError::message_only("Invalid ID"),
        ];
        let err = ShopifyError::GraphQL(errors);
        assert_eq!(
            err.to_string(),
            "GraphQL errors: Field not found; Invalid ID"
        );
    }

    #[test]
    fn test_graphql_error_path_and_location() {
        let errors = vec![GraphQLError {
            message: String::new(),
            locations: vec![GraphQLErrorLocation { line: 5, column: 10 }],
            path: vec![
                serde_json::Value::String("cart".to_string()),
                serde_json::Value::Number(0.into()),
            ],
        }];
        let err = ShopifyError::GraphQL(errors);
        assert_eq!(err.to_string(), "GraphQL errors: path: cart.0 at line 5:10");
    }

    #[test]
    fn test_graphql_error_empty_vec() {
        let err = ShopifyError::GraphQL(vec![]);
        assert_eq!(
            err.to_string(),
            "GraphQL errors: (no error details provided)"
        );
    }

    #[test]
    fn test_retryable_classification() {
        assert!(ShopifyError::RateLimited(30).is_retryable());
        assert!(ShopifyError::GraphQL(vec![]).is_retryable());
        assert!(!ShopifyError::UserError("bad variant".to_string()).is_retryable());
        assert!(!ShopifyError::Config("missing token".to_string()).is_retryable());
    }
}
