//! Cart route handlers (HTML + HTMX fragments).
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! The provider-assigned cart id is persisted in a durable cookie; the
//! snapshot is refetched per request through [`CartStore`] and never
//! cached server-side.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{AppendHeaders, Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use copper_state_core::{Cart, CartLine, Money};

use crate::cart::{CART_ID_COOKIE, CartStore, attribution};
use crate::shopify::ShopifyError;
use crate::state::AppState;

// =============================================================================
// View Models
// =============================================================================

/// Cart item display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub id: String,
    pub handle: String,
    pub title: String,
    pub variant_title: Option<String>,
    pub quantity: i64,
    pub price: String,
    pub line_price: String,
    pub image_url: Option<String>,
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub item_count: i64,
}

impl CartView {
    /// Create an empty cart.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            subtotal: "$0.00".to_string(),
            item_count: 0,
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn format_line_price(price: &Money, quantity: i64) -> String {
    price.amount.parse::<f64>().map_or_else(
        |_| price.display(),
        |amount| format!("${:.2}", amount * quantity as f64),
    )
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.lines.iter().map(CartItemView::from).collect(),
            subtotal: cart.cost.subtotal.display(),
            item_count: cart.total_quantity,
        }
    }
}

impl From<&CartLine> for CartItemView {
    fn from(line: &CartLine) -> Self {
        Self {
            id: line.id.clone(),
            handle: line.merchandise.product.handle.clone(),
            title: line.merchandise.product.title.clone(),
            variant_title: if line.merchandise.title == "Default Title" {
                None
            } else {
                Some(line.merchandise.title.clone())
            },
            quantity: line.quantity,
            price: line.merchandise.price.display(),
            line_price: format_line_price(&line.merchandise.price, line.quantity),
            image_url: line
                .merchandise
                .product
                .featured_image
                .as_ref()
                .map(|img| img.url.clone()),
        }
    }
}

// =============================================================================
// Cookie Helpers
// =============================================================================

/// Read the persisted cart id from the durable cookie.
fn persisted_cart_id(jar: &CookieJar) -> Option<String> {
    jar.get(CART_ID_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
}

fn cart_cookie(id: String) -> Cookie<'static> {
    Cookie::build((CART_ID_COOKIE, id))
        .path("/")
        .same_site(SameSite::Lax)
        .http_only(true)
        .permanent()
        .build()
}

/// Write the store's cart identity back to the cookie jar.
///
/// Adds the cookie when an id was adopted or changed, removes it when the
/// store discarded a stale id.
fn sync_cart_cookie(jar: CookieJar, persisted: Option<&str>, store: &CartStore) -> CookieJar {
    match (persisted, store.cart_id()) {
        (old, Some(id)) if old != Some(id) => jar.add(cart_cookie(id.to_string())),
        (Some(_), None) => {
            let mut stale = Cookie::from(CART_ID_COOKIE);
            stale.set_path("/");
            jar.remove(stale)
        }
        _ => jar,
    }
}

// =============================================================================
// Forms & Templates
// =============================================================================

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub variant_id: String,
    pub quantity: Option<u32>,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub line_id: String,
    pub quantity: u32,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub line_id: String,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: CartView,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: i64,
}

/// Inline error fragment for failed cart operations.
///
/// Provider validation messages are shown to the shopper; everything else
/// gets a generic message.
fn error_fragment(err: &ShopifyError) -> Response {
    tracing::error!(error = %err, "cart operation failed");
    let (status, message) = match err {
        ShopifyError::UserError(message) => (StatusCode::BAD_REQUEST, html_escape(message)),
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Something went wrong, please try again.".to_string(),
        ),
    };
    (
        status,
        Html(format!("<span class=\"cart-error\">{message}</span>")),
    )
        .into_response()
}

fn html_escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

// =============================================================================
// Handlers
// =============================================================================

/// Display cart page.
#[instrument(skip(state, jar))]
pub async fn show(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let persisted = persisted_cart_id(&jar);
    let store = CartStore::restore(state.gateway(), persisted.clone()).await;
    let jar = sync_cart_cookie(jar, persisted.as_deref(), &store);

    let cart = store.snapshot().map_or_else(CartView::empty, CartView::from);
    (jar, CartShowTemplate { cart })
}

/// Add item to cart (HTMX).
///
/// Creates a new cart if one doesn't exist, or adds to the existing cart;
/// the returned cart id becomes the new persisted identity either way. The
/// captured fundraising attribution, if any, rides along on the new line.
#[instrument(skip(state, jar, session))]
pub async fn add(
    State(state): State<AppState>,
    jar: CookieJar,
    session: Session,
    Form(form): Form<AddToCartForm>,
) -> Response {
    let quantity = i64::from(form.quantity.unwrap_or(1));
    let team = attribution::stored_team(&session).await;
    let attributes = attribution::line_attributes(team);

    let persisted = persisted_cart_id(&jar);
    let mut store = CartStore::with_cart_id(state.gateway(), persisted.clone());

    match store.add_item(&form.variant_id, quantity, attributes).await {
        Ok(()) => {
            let jar = sync_cart_cookie(jar, persisted.as_deref(), &store);
            let count = store.item_count();
            (
                jar,
                AppendHeaders([("HX-Trigger", "cart-updated")]),
                CartCountTemplate { count },
            )
                .into_response()
        }
        Err(e) => error_fragment(&e),
    }
}

/// Update cart item quantity (HTMX).
///
/// A quantity of zero is a removal, not an update - lines are never
/// retained at quantity zero.
#[instrument(skip(state, jar))]
pub async fn update(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<UpdateCartForm>,
) -> Response {
    let persisted = persisted_cart_id(&jar);
    let mut store = CartStore::with_cart_id(state.gateway(), persisted.clone());

    let result = if form.quantity == 0 {
        store.remove_item(&form.line_id).await
    } else {
        store
            .update_item(&form.line_id, i64::from(form.quantity))
            .await
    };

    match result {
        Ok(()) => {
            let jar = sync_cart_cookie(jar, persisted.as_deref(), &store);
            let cart = store.snapshot().map_or_else(CartView::empty, CartView::from);
            (
                jar,
                AppendHeaders([("HX-Trigger", "cart-updated")]),
                CartItemsTemplate { cart },
            )
                .into_response()
        }
        Err(e) => error_fragment(&e),
    }
}

/// Remove item from cart (HTMX).
#[instrument(skip(state, jar))]
pub async fn remove(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<RemoveFromCartForm>,
) -> Response {
    let persisted = persisted_cart_id(&jar);
    let mut store = CartStore::with_cart_id(state.gateway(), persisted.clone());

    match store.remove_item(&form.line_id).await {
        Ok(()) => {
            let jar = sync_cart_cookie(jar, persisted.as_deref(), &store);
            let cart = store.snapshot().map_or_else(CartView::empty, CartView::from);
            (
                jar,
                AppendHeaders([("HX-Trigger", "cart-updated")]),
                CartItemsTemplate { cart },
            )
                .into_response()
        }
        Err(e) => error_fragment(&e),
    }
}

/// Clear the cart (HTMX).
///
/// Discards the persisted identity and snapshot without notifying the
/// provider - the remote cart is simply abandoned.
#[instrument(skip(state, jar))]
pub async fn clear(State(state): State<AppState>, jar: CookieJar) -> Response {
    let persisted = persisted_cart_id(&jar);
    let mut store = CartStore::with_cart_id(state.gateway(), persisted.clone());
    store.clear();

    let jar = sync_cart_cookie(jar, persisted.as_deref(), &store);
    (
        jar,
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate {
            cart: CartView::empty(),
        },
    )
        .into_response()
}

/// Get cart count badge (HTMX).
#[instrument(skip(state, jar))]
pub async fn count(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let persisted = persisted_cart_id(&jar);
    let store = CartStore::restore(state.gateway(), persisted).await;

    CartCountTemplate {
        count: store.item_count(),
    }
}

/// Redirect to the provider-hosted checkout.
#[instrument(skip(state, jar))]
pub async fn checkout(State(state): State<AppState>, jar: CookieJar) -> Response {
    let persisted = persisted_cart_id(&jar);
    let store = CartStore::restore(state.gateway(), persisted).await;

    match store.snapshot() {
        Some(cart) => Redirect::to(&cart.checkout_url).into_response(),
        None => Redirect::to("/cart").into_response(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::Ordering;

    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use tower::ServiceExt;

    use crate::state::AppState;
    use crate::test_support::{StubGateway, sample_cart, test_config};

    fn test_app(stub: Arc<StubGateway>) -> Router {
        let state = AppState::new(test_config(), stub);
        Router::new()
            .merge(crate::routes::routes())
            .layer(axum::middleware::from_fn(
                crate::cart::attribution::capture_team,
            ))
            .layer(crate::middleware::create_session_layer("http://localhost:3000"))
            .with_state(state)
    }

    /// Extract a `name=value` pair from the response's Set-Cookie headers.
    fn set_cookie_pair(response: &axum::response::Response, name: &str) -> Option<String> {
        response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find(|v| v.starts_with(&format!("{name}=")))
            .and_then(|v| v.split(';').next())
            .map(ToString::to_string)
    }

    fn form_request(uri: &str, body: &str, cookies: &[String]) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if !cookies.is_empty() {
            builder = builder.header(header::COOKIE, cookies.join("; "));
        }
        builder.body(Body::from(body.to_string())).expect("request")
    }

    #[tokio::test]
    async fn test_attribution_survives_navigation_and_rides_on_add() {
        let stub = Arc::new(StubGateway::with_cart(sample_cart("gid://shopify/Cart/new")));
        let app = test_app(Arc::clone(&stub));

        // 1. Land on the fundraise page with ?team=alpha.
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/fundraise?team=alpha")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let session_cookie = set_cookie_pair(&response, "csf_session").expect("session cookie");

        // 2. Navigate elsewhere without the parameter - attribution must
        //    not be cleared by omission.
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/about")
                    .header(header::COOKIE, session_cookie.clone())
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        // 3. Add to cart: no cart exists yet, so the store creates one and
        //    the captured team rides along as a line attribute.
        let response = app
            .clone()
            .oneshot(form_request(
                "/cart/add",
                "variant_id=gid%3A%2F%2Fshopify%2FProductVariant%2F9&quantity=1",
                std::slice::from_ref(&session_cookie),
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(stub.create_calls.load(Ordering::SeqCst), 1);
        assert_eq!(stub.add_calls.load(Ordering::SeqCst), 0);

        {
            let lines = stub.last_create_lines.lock().expect("lock");
            let line = lines.as_ref().and_then(|l| l.first()).expect("line");
            assert_eq!(line.merchandise_id, "gid://shopify/ProductVariant/9");
            assert_eq!(
                line.attributes
                    .as_ref()
                    .and_then(|attrs| attrs.first())
                    .map(|a| (a.key.as_str(), a.value.as_str())),
                Some(("Fundraising Team", "alpha"))
            );
        }

        // The returned cart id becomes the persisted identity.
        let cart_cookie = set_cookie_pair(&response, "csf_cart_id").expect("cart cookie");
        assert_eq!(cart_cookie, "csf_cart_id=gid://shopify/Cart/new");

        // 4. A second add goes through cartLinesAdd against the adopted id.
        let response = app
            .clone()
            .oneshot(form_request(
                "/cart/add",
                "variant_id=gid%3A%2F%2Fshopify%2FProductVariant%2F10&quantity=2",
                &[session_cookie, cart_cookie],
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(stub.create_calls.load(Ordering::SeqCst), 1);
        assert_eq!(stub.add_calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            stub.last_add_cart_id.lock().expect("lock").as_deref(),
            Some("gid://shopify/Cart/new")
        );
    }

    #[tokio::test]
    async fn test_update_with_zero_quantity_is_a_removal() {
        let stub = Arc::new(StubGateway::with_cart(sample_cart("gid://shopify/Cart/c1")));
        let app = test_app(Arc::clone(&stub));

        let response = app
            .oneshot(form_request(
                "/cart/update",
                "line_id=gid%3A%2F%2Fshopify%2FCartLine%2F1&quantity=0",
                &["csf_cart_id=gid://shopify/Cart/c1".to_string()],
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(stub.update_calls.load(Ordering::SeqCst), 0);
        assert_eq!(stub.remove_calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            stub.last_remove_ids.lock().expect("lock").as_deref(),
            Some(&["gid://shopify/CartLine/1".to_string()][..])
        );
    }

    #[tokio::test]
    async fn test_cart_page_discards_stale_id() {
        let stub = Arc::new(StubGateway::default());
        stub.set_get_cart(Ok(None));
        let app = test_app(stub);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/cart")
                    .header(header::COOKIE, "csf_cart_id=gid://shopify/Cart/stale")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        // The stale id is discarded via a removal cookie.
        let removal = set_cookie_pair(&response, "csf_cart_id").expect("removal cookie");
        assert_eq!(removal, "csf_cart_id=");
    }

    #[tokio::test]
    async fn test_provider_validation_error_surfaces_inline() {
        let stub = Arc::new(StubGateway::default());
        stub.fail_next_mutation(crate::shopify::ShopifyError::UserError(
            "Variant not found".to_string(),
        ));
        let app = test_app(stub);

        let response = app
            .oneshot(form_request(
                "/cart/add",
                "variant_id=gid%3A%2F%2Fshopify%2FProductVariant%2Fbad&quantity=1",
                &[],
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_checkout_without_cart_redirects_home() {
        let stub = Arc::new(StubGateway::default());
        let app = test_app(stub);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/checkout")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response
                .headers()
                .get(header::LOCATION)
                .and_then(|v| v.to_str().ok()),
            Some("/cart")
        );
    }
}
