//! Shopify Storefront API client implementation.
//!
//! Hand-written GraphQL documents executed over `reqwest`, with typed serde
//! response structs per operation. Catalog lookups are cached with `moka`
//! (5-minute TTL); cart operations always hit the provider - the cart
//! snapshot is never trusted as a cache.

mod conversions;
pub mod queries;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use copper_state_core::{Cart, CartLineInput, CartLineUpdateInput, Product};

use crate::config::ShopifyStorefrontConfig;

use super::{CommerceGateway, GraphQLError, GraphQLErrorLocation, ShopifyError};
use conversions::{cart_from_mutation, convert_cart, convert_product};
use queries::{
    ADD_TO_CART, AddToCartData, CART_FIELDS_FRAGMENT, CREATE_CART, CreateCartData, GET_CART,
    GET_PRODUCT_BY_HANDLE, GET_PRODUCTS, GetCartData, GetProductByHandleData, GetProductsData,
    GraphQLResponse, PRODUCT_FIELDS_FRAGMENT, REMOVE_FROM_CART, RemoveFromCartData,
    UPDATE_CART_LINES, UpdateCartData, document,
};

/// Request timeout for provider calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Catalog cache TTL.
const CACHE_TTL: Duration = Duration::from_secs(300);

/// Cached catalog values. Cart state deliberately has no variant here.
#[derive(Clone, Debug)]
enum CacheValue {
    Product(Box<Product>),
    Products(Vec<Product>),
}

/// Client for the Shopify Storefront API.
///
/// Cheaply cloneable; one instance is constructed per process and shared
/// through application state.
#[derive(Clone, Debug)]
pub struct StorefrontClient {
    inner: Arc<StorefrontClientInner>,
}

#[derive(Debug)]
struct StorefrontClientInner {
    client: reqwest::Client,
    endpoint: String,
    access_token: String,
    cache: Cache<String, CacheValue>,
}

impl StorefrontClient {
    /// Create a new Storefront API client.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::Config` when the store domain or access token
    /// is blank - checked here so a misconfigured deployment fails before
    /// any request goes over the network.
    pub fn new(config: &ShopifyStorefrontConfig) -> Result<Self, ShopifyError> {
        if config.store_domain.trim().is_empty() {
            return Err(ShopifyError::Config("store domain is empty".to_string()));
        }
        let access_token = config.access_token.expose_secret().to_string();
        if access_token.trim().is_empty() {
            return Err(ShopifyError::Config("access token is empty".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(ShopifyError::Http)?;

        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(CACHE_TTL)
            .build();

        let endpoint = format!(
            "https://{}/api/{}/graphql.json",
            config.store_domain, config.api_version
        );

        Ok(Self {
            inner: Arc::new(StorefrontClientInner {
                client,
                endpoint,
                access_token,
                cache,
            }),
        })
    }

    /// Execute a GraphQL document against the Storefront API.
    async fn execute<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T, ShopifyError> {
        let body = serde_json::json!({
            "query": query,
            "variables": variables,
        });

        let response = self
            .inner
            .client
            .post(&self.inner.endpoint)
            .header(
                "X-Shopify-Storefront-Access-Token",
                &self.inner.access_token,
            )
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ShopifyError::RateLimited(retry_after));
        }

        // Read the body as text first for better error diagnostics.
        let response_text = response.text().await?;

        decode_response(status, &response_text)
    }
}

/// Turn a raw provider response into typed data.
///
/// Factored out of `execute` so the status/error handling can be tested
/// without a live endpoint.
fn decode_response<T: DeserializeOwned>(
    status: reqwest::StatusCode,
    body: &str,
) -> Result<T, ShopifyError> {
    if !status.is_success() {
        tracing::error!(
            status = %status,
            body = %body.chars().take(500).collect::<String>(),
            "Shopify API returned non-success status"
        );
        return Err(ShopifyError::GraphQL(vec![GraphQLError::message_only(
            format!(
                "HTTP {status}: {}",
                body.chars().take(200).collect::<String>()
            ),
        )]));
    }

    let response: GraphQLResponse<T> = match serde_json::from_str(body) {
        Ok(r) => r,
        Err(e) => {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse Shopify GraphQL response"
            );
            return Err(ShopifyError::Parse(e));
        }
    };

    if let Some(errors) = response.errors
        && !errors.is_empty()
    {
        debug!(?errors, "GraphQL errors in response");
        return Err(ShopifyError::GraphQL(
            errors
                .into_iter()
                .map(|e| GraphQLError {
                    message: e.message,
                    locations: e
                        .locations
                        .into_iter()
                        .map(|l| GraphQLErrorLocation {
                            line: l.line,
                            column: l.column,
                        })
                        .collect(),
                    path: e.path,
                })
                .collect(),
        ));
    }

    response.data.ok_or_else(|| {
        tracing::error!(
            body = %body.chars().take(500).collect::<String>(),
            "Shopify GraphQL response has no data and no errors"
        );
        ShopifyError::GraphQL(vec![GraphQLError::message_only("No data in response")])
    })
}

#[async_trait]
impl CommerceGateway for StorefrontClient {
    #[instrument(skip(self, lines))]
    async fn create_cart(&self, lines: Vec<CartLineInput>) -> Result<Cart, ShopifyError> {
        let query = document(CREATE_CART, &[CART_FIELDS_FRAGMENT]);
        let variables = serde_json::json!({ "input": { "lines": lines } });

        let data: CreateCartData = self.execute(&query, variables).await?;
        cart_from_mutation(data.cart_create, "cartCreate")
    }

    #[instrument(skip(self), fields(cart_id = %cart_id))]
    async fn get_cart(&self, cart_id: &str) -> Result<Option<Cart>, ShopifyError> {
        let query = document(GET_CART, &[CART_FIELDS_FRAGMENT]);
        let variables = serde_json::json!({ "cartId": cart_id });

        let data: GetCartData = self.execute(&query, variables).await?;

        // The provider answers `cart: null` for an unknown or expired id;
        // that is "cart is gone", not a failure.
        Ok(data.cart.map(convert_cart))
    }

    #[instrument(skip(self, lines), fields(cart_id = %cart_id))]
    async fn add_to_cart(
        &self,
        cart_id: &str,
        lines: Vec<CartLineInput>,
    ) -> Result<Cart, ShopifyError> {
        if lines.is_empty() {
            return Err(ShopifyError::UserError(
                "at least one line is required".to_string(),
            ));
        }

        let query = document(ADD_TO_CART, &[CART_FIELDS_FRAGMENT]);
        let variables = serde_json::json!({ "cartId": cart_id, "lines": lines });

        let data: AddToCartData = self.execute(&query, variables).await?;
        cart_from_mutation(data.cart_lines_add, "cartLinesAdd")
    }

    #[instrument(skip(self, lines), fields(cart_id = %cart_id))]
    async fn update_cart(
        &self,
        cart_id: &str,
        lines: Vec<CartLineUpdateInput>,
    ) -> Result<Cart, ShopifyError> {
        if lines.is_empty() {
            return Err(ShopifyError::UserError(
                "at least one line is required".to_string(),
            ));
        }

        let query = document(UPDATE_CART_LINES, &[CART_FIELDS_FRAGMENT]);
        let variables = serde_json::json!({ "cartId": cart_id, "lines": lines });

        let data: UpdateCartData = self.execute(&query, variables).await?;
        cart_from_mutation(data.cart_lines_update, "cartLinesUpdate")
    }

    #[instrument(skip(self, line_ids), fields(cart_id = %cart_id))]
    async fn remove_from_cart(
        &self,
        cart_id: &str,
        line_ids: Vec<String>,
    ) -> Result<Cart, ShopifyError> {
        if line_ids.is_empty() {
            return Err(ShopifyError::UserError(
                "at least one line id is required".to_string(),
            ));
        }

        let query = document(REMOVE_FROM_CART, &[CART_FIELDS_FRAGMENT]);
        let variables = serde_json::json!({ "cartId": cart_id, "lineIds": line_ids });

        let data: RemoveFromCartData = self.execute(&query, variables).await?;
        cart_from_mutation(data.cart_lines_remove, "cartLinesRemove")
    }

    #[instrument(skip(self))]
    async fn get_products(&self, first: i64) -> Result<Vec<Product>, ShopifyError> {
        let cache_key = format!("products:{first}");

        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let query = document(GET_PRODUCTS, &[PRODUCT_FIELDS_FRAGMENT]);
        let variables = serde_json::json!({ "first": first });

        let data: GetProductsData = self.execute(&query, variables).await?;
        let products: Vec<Product> = data
            .products
            .into_nodes()
            .into_iter()
            .map(convert_product)
            .collect();

        self.inner
            .cache
            .insert(cache_key, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    #[instrument(skip(self), fields(handle = %handle))]
    async fn get_product_by_handle(&self, handle: &str) -> Result<Option<Product>, ShopifyError> {
        let cache_key = format!("product:{handle}");

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(Some(*product));
        }

        let query = document(GET_PRODUCT_BY_HANDLE, &[PRODUCT_FIELDS_FRAGMENT]);
        let variables = serde_json::json!({ "handle": handle });

        let data: GetProductByHandleData = self.execute(&query, variables).await?;

        let Some(product) = data.product_by_handle.map(convert_product) else {
            return Ok(None);
        };

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(Some(product))
    }
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    fn config(domain: &str, token: &str) -> ShopifyStorefrontConfig {
        ShopifyStorefrontConfig {
            store_domain: domain.to_string(),
            api_version: "2024-10".to_string(),
            access_token: SecretString::from(token),
        }
    }

    #[test]
    fn test_new_rejects_blank_credentials() {
        let err = StorefrontClient::new(&config("", "shpat_token")).expect_err("blank domain");
        assert!(matches!(err, ShopifyError::Config(_)));

        let err =
            StorefrontClient::new(&config("test.myshopify.com", "  ")).expect_err("blank token");
        assert!(matches!(err, ShopifyError::Config(_)));
    }

    #[test]
    fn test_new_builds_versioned_endpoint() {
        let client = StorefrontClient::new(&config("test.myshopify.com", "shpat_token"))
            .expect("valid config");
        assert_eq!(
            client.inner.endpoint,
            "https://test.myshopify.com/api/2024-10/graphql.json"
        );
    }

    #[test]
    fn test_decode_missing_cart_is_none() {
        let data: GetCartData =
            decode_response(reqwest::StatusCode::OK, r#"{"data":{"cart":null}}"#)
                .expect("valid response");
        assert!(data.cart.is_none());
    }

    #[test]
    fn test_decode_graphql_errors() {
        let result: Result<GetCartData, _> = decode_response(
            reqwest::StatusCode::OK,
            r#"{"data":null,"errors":[{"message":"invalid id","locations":[{"line":2,"column":3}]}]}"#,
        );
        let err = result.expect_err("should fail");
        match err {
            ShopifyError::GraphQL(errors) => {
                assert_eq!(errors.first().map(|e| e.message.as_str()), Some("invalid id"));
            }
            other => panic!("expected GraphQL error, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_non_success_status() {
        let result: Result<GetCartData, _> =
            decode_response(reqwest::StatusCode::BAD_GATEWAY, "upstream exploded");
        let err = result.expect_err("should fail");
        assert!(err.to_string().contains("HTTP 502"));
    }

    #[test]
    fn test_decode_no_data_no_errors() {
        let result: Result<GetCartData, _> = decode_response(reqwest::StatusCode::OK, "{}");
        let err = result.expect_err("should fail");
        assert!(err.to_string().contains("No data in response"));
    }

    #[tokio::test]
    async fn test_empty_lines_rejected_without_network() {
        // Client points at an unreachable endpoint; the guard must fire first.
        let client =
            StorefrontClient::new(&config("unreachable.invalid", "shpat_token")).expect("client");

        let err = client
            .add_to_cart("gid://shopify/Cart/abc", vec![])
            .await
            .expect_err("empty lines");
        assert!(matches!(err, ShopifyError::UserError(_)));

        let err = client
            .remove_from_cart("gid://shopify/Cart/abc", vec![])
            .await
            .expect_err("empty line ids");
        assert!(matches!(err, ShopifyError::UserError(_)));
    }
}
