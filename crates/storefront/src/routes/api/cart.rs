//! Cart proxy endpoints (JSON).
//!
//! Thin, stateless request/response mappings: validate the request shape,
//! invoke the gateway, translate the result to HTTP. Client-input errors
//! are rejected here and never reach the gateway; the endpoints never
//! retry - retry policy, if any, belongs to the caller.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use tracing::instrument;

use copper_state_core::{Cart, CartLineInput, CartLineUpdateInput};

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Query parameters for `GET /api/cart`.
#[derive(Debug, Deserialize)]
pub struct GetCartQuery {
    pub id: Option<String>,
}

/// `GET /api/cart?id=<cartId>`
///
/// 200 with the cart, 400 when the id is missing, 404 when the provider
/// has no such cart.
#[instrument(skip(state))]
pub async fn get_cart(
    State(state): State<AppState>,
    Query(query): Query<GetCartQuery>,
) -> Result<Json<Cart>> {
    let Some(cart_id) = query.id.filter(|id| !id.is_empty()) else {
        return Err(AppError::BadRequest("Cart ID is required".to_string()));
    };

    let cart = state
        .gateway()
        .get_cart(&cart_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Cart not found".to_string()))?;

    Ok(Json(cart))
}

/// Body for `POST /api/cart`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCartRequest {
    #[serde(default)]
    pub lines: Option<Vec<CartLineInput>>,
}

/// `POST /api/cart` - create a cart, optionally seeded with lines.
#[instrument(skip(state, body))]
pub async fn create_cart(
    State(state): State<AppState>,
    Json(body): Json<CreateCartRequest>,
) -> Result<Json<Cart>> {
    let cart = state
        .gateway()
        .create_cart(body.lines.unwrap_or_default())
        .await?;

    Ok(Json(cart))
}

/// Body for `POST /api/cart/add`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    #[serde(default)]
    pub cart_id: Option<String>,
    #[serde(default)]
    pub lines: Option<Vec<CartLineInput>>,
}

/// `POST /api/cart/add` - add lines to an existing cart.
#[instrument(skip(state, body))]
pub async fn add_to_cart(
    State(state): State<AppState>,
    Json(body): Json<AddToCartRequest>,
) -> Result<Json<Cart>> {
    let cart_id = require_cart_id(body.cart_id)?;
    let lines = require_non_empty(body.lines, "Lines are required")?;

    let cart = state.gateway().add_to_cart(&cart_id, lines).await?;
    Ok(Json(cart))
}

/// Body for `POST /api/cart/update`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartRequest {
    #[serde(default)]
    pub cart_id: Option<String>,
    #[serde(default)]
    pub lines: Option<Vec<CartLineUpdateInput>>,
}

/// `POST /api/cart/update` - update quantities of existing lines.
#[instrument(skip(state, body))]
pub async fn update_cart(
    State(state): State<AppState>,
    Json(body): Json<UpdateCartRequest>,
) -> Result<Json<Cart>> {
    let cart_id = require_cart_id(body.cart_id)?;
    let lines = require_non_empty(body.lines, "Lines are required")?;

    let cart = state.gateway().update_cart(&cart_id, lines).await?;
    Ok(Json(cart))
}

/// Body for `POST /api/cart/remove`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveFromCartRequest {
    #[serde(default)]
    pub cart_id: Option<String>,
    #[serde(default)]
    pub line_ids: Option<Vec<String>>,
}

/// `POST /api/cart/remove` - remove lines from a cart.
#[instrument(skip(state, body))]
pub async fn remove_from_cart(
    State(state): State<AppState>,
    Json(body): Json<RemoveFromCartRequest>,
) -> Result<Json<Cart>> {
    let cart_id = require_cart_id(body.cart_id)?;
    let line_ids = require_non_empty(body.line_ids, "Line IDs are required")?;

    let cart = state.gateway().remove_from_cart(&cart_id, line_ids).await?;
    Ok(Json(cart))
}

fn require_cart_id(cart_id: Option<String>) -> Result<String> {
    cart_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::BadRequest("Cart ID is required".to_string()))
}

fn require_non_empty<T>(items: Option<Vec<T>>, message: &str) -> Result<Vec<T>> {
    match items {
        Some(items) if !items.is_empty() => Ok(items),
        _ => Err(AppError::BadRequest(message.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::Ordering;

    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::shopify::ShopifyError;
    use crate::state::AppState;
    use crate::test_support::{StubGateway, sample_cart, test_config};

    fn test_app(stub: Arc<StubGateway>) -> Router {
        let state = AppState::new(test_config(), stub);
        crate::routes::api_routes().with_state(state)
    }

    fn json_request(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body")
            .to_bytes();
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn test_get_cart_without_id_is_400_and_never_hits_gateway() {
        let stub = Arc::new(StubGateway::default());
        let app = test_app(Arc::clone(&stub));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/cart")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(stub.get_calls.load(Ordering::SeqCst), 0);

        let body = body_json(response).await;
        assert_eq!(body["error"], "Cart ID is required");
    }

    #[tokio::test]
    async fn test_get_cart_returns_normalized_cart() {
        let stub = Arc::new(StubGateway::with_cart(sample_cart("gid://shopify/Cart/c1")));
        let app = test_app(Arc::clone(&stub));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/cart?id=gid://shopify/Cart/c1")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["id"], "gid://shopify/Cart/c1");

        // totalQuantity always equals the sum of line quantities.
        let sum: i64 = body["lines"]
            .as_array()
            .expect("lines")
            .iter()
            .map(|line| line["quantity"].as_i64().expect("quantity"))
            .sum();
        assert_eq!(body["totalQuantity"].as_i64(), Some(sum));
    }

    #[tokio::test]
    async fn test_get_cart_missing_on_provider_is_404() {
        let stub = Arc::new(StubGateway::default());
        stub.set_get_cart(Ok(None));
        let app = test_app(stub);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/cart?id=gid://shopify/Cart/expired")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_create_cart_allows_empty_body() {
        let stub = Arc::new(StubGateway::with_cart(sample_cart("gid://shopify/Cart/new")));
        let app = test_app(Arc::clone(&stub));

        let response = app
            .oneshot(json_request("/api/cart", serde_json::json!({})))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(stub.create_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_add_without_cart_id_is_400_and_never_hits_gateway() {
        let stub = Arc::new(StubGateway::default());
        let app = test_app(Arc::clone(&stub));

        let response = app
            .oneshot(json_request(
                "/api/cart/add",
                serde_json::json!({
                    "lines": [{"merchandiseId": "gid://shopify/ProductVariant/1", "quantity": 1}]
                }),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(stub.add_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_add_with_empty_lines_is_400_and_never_hits_gateway() {
        let stub = Arc::new(StubGateway::default());
        let app = test_app(Arc::clone(&stub));

        let response = app
            .oneshot(json_request(
                "/api/cart/add",
                serde_json::json!({"cartId": "gid://shopify/Cart/c1", "lines": []}),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(stub.add_calls.load(Ordering::SeqCst), 0);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Lines are required");
    }

    #[tokio::test]
    async fn test_add_forwards_lines_and_returns_full_cart() {
        let stub = Arc::new(StubGateway::with_cart(sample_cart("gid://shopify/Cart/c1")));
        let app = test_app(Arc::clone(&stub));

        let response = app
            .oneshot(json_request(
                "/api/cart/add",
                serde_json::json!({
                    "cartId": "gid://shopify/Cart/c1",
                    "lines": [{
                        "merchandiseId": "gid://shopify/ProductVariant/9",
                        "quantity": 2,
                        "attributes": [{"key": "Fundraising Team", "value": "alpha"}]
                    }]
                }),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(stub.add_calls.load(Ordering::SeqCst), 1);

        let lines = stub.last_add_lines.lock().expect("lock");
        let sent = lines.as_ref().expect("captured lines");
        assert_eq!(sent.len(), 1);
        let line = sent.first().expect("line");
        assert_eq!(line.merchandise_id, "gid://shopify/ProductVariant/9");
        assert_eq!(
            line.attributes
                .as_ref()
                .and_then(|attrs| attrs.first())
                .map(|a| (a.key.as_str(), a.value.as_str())),
            Some(("Fundraising Team", "alpha"))
        );
    }

    #[tokio::test]
    async fn test_provider_validation_error_maps_to_400_with_message() {
        let stub = Arc::new(StubGateway::default());
        stub.fail_next_mutation(ShopifyError::UserError("Variant not found".to_string()));
        let app = test_app(stub);

        let response = app
            .oneshot(json_request(
                "/api/cart/add",
                serde_json::json!({
                    "cartId": "gid://shopify/Cart/c1",
                    "lines": [{"merchandiseId": "gid://shopify/ProductVariant/bad", "quantity": 1}]
                }),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Variant not found");
    }

    #[tokio::test]
    async fn test_transport_failure_maps_to_500() {
        let stub = Arc::new(StubGateway::default());
        stub.fail_next_mutation(ShopifyError::GraphQL(vec![]));
        let app = test_app(stub);

        let response = app
            .oneshot(json_request(
                "/api/cart/update",
                serde_json::json!({
                    "cartId": "gid://shopify/Cart/c1",
                    "lines": [{"id": "gid://shopify/CartLine/1", "quantity": 2}]
                }),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_update_forwards_line_updates() {
        let stub = Arc::new(StubGateway::with_cart(sample_cart("gid://shopify/Cart/c1")));
        let app = test_app(Arc::clone(&stub));

        let response = app
            .oneshot(json_request(
                "/api/cart/update",
                serde_json::json!({
                    "cartId": "gid://shopify/Cart/c1",
                    "lines": [{"id": "gid://shopify/CartLine/1", "quantity": 4}]
                }),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let updates = stub.last_update_lines.lock().expect("lock");
        let sent = updates.as_ref().expect("captured updates");
        assert_eq!(sent.first().map(|u| u.quantity), Some(4));
    }

    #[tokio::test]
    async fn test_remove_with_empty_line_ids_is_400_and_never_hits_gateway() {
        let stub = Arc::new(StubGateway::default());
        let app = test_app(Arc::clone(&stub));

        let response = app
            .oneshot(json_request(
                "/api/cart/remove",
                serde_json::json!({"cartId": "gid://shopify/Cart/c1", "lineIds": []}),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(stub.remove_calls.load(Ordering::SeqCst), 0);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Line IDs are required");
    }

    #[tokio::test]
    async fn test_remove_forwards_line_ids() {
        let stub = Arc::new(StubGateway::with_cart(sample_cart("gid://shopify/Cart/c1")));
        let app = test_app(Arc::clone(&stub));

        let response = app
            .oneshot(json_request(
                "/api/cart/remove",
                serde_json::json!({
                    "cartId": "gid://shopify/Cart/c1",
                    "lineIds": ["gid://shopify/CartLine/2"]
                }),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let ids = stub.last_remove_ids.lock().expect("lock");
        assert_eq!(
            ids.as_deref(),
            Some(&["gid://shopify/CartLine/2".to_string()][..])
        );
    }
}
