//! GraphQL documents and wire-format response types for the Storefront API.
//!
//! Documents are hand-written with shared fragments; the response structs
//! mirror the exact JSON the provider returns (camelCase, connection
//! edges/node nesting). Normalization into the core domain types lives in
//! [`super::conversions`].

use serde::Deserialize;

// =============================================================================
// Documents
// =============================================================================

/// Cart selection shared by every cart-returning query and mutation.
pub const CART_FIELDS_FRAGMENT: &str = r"
fragment CartFields on Cart {
  id
  checkoutUrl
  totalQuantity
  cost {
    subtotalAmount {
      amount
      currencyCode
    }
    totalAmount {
      amount
      currencyCode
    }
  }
  lines(first: 100) {
    edges {
      node {
        id
        quantity
        attributes {
          key
          value
        }
        merchandise {
          ... on ProductVariant {
            id
            title
            price {
              amount
              currencyCode
            }
            product {
              id
              title
              handle
              featuredImage {
                url
                altText
              }
            }
          }
        }
      }
    }
  }
}
";

/// Product selection shared by the catalog queries.
pub const PRODUCT_FIELDS_FRAGMENT: &str = r"
fragment ProductFields on Product {
  id
  title
  handle
  description
  images(first: 10) {
    edges {
      node {
        url
        altText
      }
    }
  }
  variants(first: 25) {
    edges {
      node {
        id
        title
        availableForSale
        price {
          amount
          currencyCode
        }
        compareAtPrice {
          amount
          currencyCode
        }
      }
    }
  }
}
";

pub const CREATE_CART: &str = r"
mutation createCart($input: CartInput!) {
  cartCreate(input: $input) {
    cart {
      ...CartFields
    }
    userErrors {
      field
      message
    }
  }
}
";

pub const GET_CART: &str = r"
query getCart($cartId: ID!) {
  cart(id: $cartId) {
    ...CartFields
  }
}
";

pub const ADD_TO_CART: &str = r"
mutation addToCart($cartId: ID!, $lines: [CartLineInput!]!) {
  cartLinesAdd(cartId: $cartId, lines: $lines) {
    cart {
      ...CartFields
    }
    userErrors {
      field
      message
    }
  }
}
";

pub const UPDATE_CART_LINES: &str = r"
mutation updateCartLines($cartId: ID!, $lines: [CartLineUpdateInput!]!) {
  cartLinesUpdate(cartId: $cartId, lines: $lines) {
    cart {
      ...CartFields
    }
    userErrors {
      field
      message
    }
  }
}
";

pub const REMOVE_FROM_CART: &str = r"
mutation removeFromCart($cartId: ID!, $lineIds: [ID!]!) {
  cartLinesRemove(cartId: $cartId, lineIds: $lineIds) {
    cart {
      ...CartFields
    }
    userErrors {
      field
      message
    }
  }
}
";

pub const GET_PRODUCTS: &str = r"
query getProducts($first: Int!) {
  products(first: $first) {
    edges {
      node {
        ...ProductFields
      }
    }
  }
}
";

pub const GET_PRODUCT_BY_HANDLE: &str = r"
query getProductByHandle($handle: String!) {
  productByHandle(handle: $handle) {
    ...ProductFields
  }
}
";

/// Assemble a full document from an operation and the fragments it spreads.
#[must_use]
pub fn document(operation: &str, fragments: &[&str]) -> String {
    let mut doc = operation.trim().to_string();
    for fragment in fragments {
        doc.push('\n');
        doc.push_str(fragment.trim());
    }
    doc
}

// =============================================================================
// Response envelope
// =============================================================================

/// GraphQL response wrapper.
#[derive(Debug, Deserialize)]
pub struct GraphQLResponse<T> {
    pub data: Option<T>,
    pub errors: Option<Vec<WireGraphQLError>>,
}

#[derive(Debug, Deserialize)]
pub struct WireGraphQLError {
    pub message: String,
    #[serde(default)]
    pub locations: Vec<WireGraphQLErrorLocation>,
    #[serde(default)]
    pub path: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct WireGraphQLErrorLocation {
    pub line: i64,
    pub column: i64,
}

// =============================================================================
// Shared wire shapes
// =============================================================================

/// A GraphQL connection, collapsed to its nodes.
#[derive(Debug, Deserialize)]
pub struct WireConnection<T> {
    pub edges: Vec<WireEdge<T>>,
}

#[derive(Debug, Deserialize)]
pub struct WireEdge<T> {
    pub node: T,
}

impl<T> WireConnection<T> {
    /// Flatten the edges/node nesting into a plain vector.
    pub fn into_nodes(self) -> Vec<T> {
        self.edges.into_iter().map(|edge| edge.node).collect()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireMoney {
    pub amount: String,
    pub currency_code: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireImage {
    pub url: String,
    pub alt_text: Option<String>,
}

// =============================================================================
// Cart wire shapes
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireCart {
    pub id: String,
    pub checkout_url: String,
    pub total_quantity: i64,
    pub cost: WireCartCost,
    pub lines: WireConnection<WireCartLine>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireCartCost {
    pub subtotal_amount: WireMoney,
    pub total_amount: WireMoney,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireCartLine {
    pub id: String,
    pub quantity: i64,
    #[serde(default)]
    pub attributes: Vec<WireAttribute>,
    pub merchandise: WireMerchandise,
}

#[derive(Debug, Deserialize)]
pub struct WireAttribute {
    pub key: String,
    pub value: Option<String>,
}

/// Inline `... on ProductVariant` fragment, flattened by the provider.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireMerchandise {
    pub id: String,
    pub title: String,
    pub price: WireMoney,
    pub product: WireMerchandiseProduct,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireMerchandiseProduct {
    pub id: String,
    pub title: String,
    pub handle: String,
    pub featured_image: Option<WireImage>,
}

/// Provider-reported validation error on a cart mutation.
#[derive(Debug, Deserialize)]
pub struct WireUserError {
    #[serde(default)]
    pub field: Option<Vec<String>>,
    pub message: String,
}

/// The `{ cart, userErrors }` payload every cart mutation returns.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartMutationPayload {
    pub cart: Option<WireCart>,
    #[serde(default)]
    pub user_errors: Vec<WireUserError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCartData {
    pub cart_create: Option<CartMutationPayload>,
}

#[derive(Debug, Deserialize)]
pub struct GetCartData {
    pub cart: Option<WireCart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartData {
    pub cart_lines_add: Option<CartMutationPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartData {
    pub cart_lines_update: Option<CartMutationPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveFromCartData {
    pub cart_lines_remove: Option<CartMutationPayload>,
}

// =============================================================================
// Product wire shapes
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireProduct {
    pub id: String,
    pub title: String,
    pub handle: String,
    #[serde(default)]
    pub description: String,
    pub images: WireConnection<WireImage>,
    pub variants: WireConnection<WireVariant>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireVariant {
    pub id: String,
    pub title: String,
    pub available_for_sale: bool,
    pub price: WireMoney,
    pub compare_at_price: Option<WireMoney>,
}

#[derive(Debug, Deserialize)]
pub struct GetProductsData {
    pub products: WireConnection<WireProduct>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetProductByHandleData {
    pub product_by_handle: Option<WireProduct>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_appends_fragments() {
        let doc = document(GET_CART, &[CART_FIELDS_FRAGMENT]);
        assert!(doc.starts_with("query getCart"));
        assert!(doc.contains("fragment CartFields on Cart"));
    }

    #[test]
    fn test_mutation_payload_deserializes_user_errors() {
        let payload: CartMutationPayload = serde_json::from_value(serde_json::json!({
            "cart": null,
            "userErrors": [{"field": ["lines"], "message": "Variant not found"}]
        }))
        .expect("deserialize");
        assert!(payload.cart.is_none());
        assert_eq!(payload.user_errors.len(), 1);
        assert_eq!(payload.user_errors[0].message, "Variant not found");
    }
}
