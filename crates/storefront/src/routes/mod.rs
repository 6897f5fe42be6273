//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page
//! GET  /health                 - Health check
//!
//! # Catalog
//! GET  /products               - Product listing
//! GET  /products/{handle}      - Product detail
//!
//! # Cart (HTMX fragments)
//! GET  /cart                   - Cart page
//! POST /cart/add               - Add to cart (returns count badge, triggers cart-updated)
//! POST /cart/update            - Update quantity (returns cart_items fragment)
//! POST /cart/remove            - Remove item (returns cart_items fragment)
//! POST /cart/clear             - Abandon the cart (returns cart_items fragment)
//! GET  /cart/count             - Cart count badge (fragment)
//! GET  /checkout               - Redirect to provider checkout
//!
//! # Marketing pages
//! GET  /about /contact /wholesale /fundraising /co-packaging
//! GET  /fundraise              - QR landing page, captures ?team=
//!
//! # JSON API (cart proxy + QR)
//! GET  /api/cart?id=           - Fetch cart
//! POST /api/cart               - Create cart
//! POST /api/cart/add           - Add lines
//! POST /api/cart/update        - Update lines
//! POST /api/cart/remove        - Remove lines
//! GET  /api/qr-code            - Fundraising QR code PNG
//! ```

pub mod api;
pub mod cart;
pub mod home;
pub mod pages;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{handle}", get(products::show))
}

/// Create the cart routes router (HTML + HTMX fragments).
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/count", get(cart::count))
}

/// Create the JSON API router (cart proxy endpoints + QR codes).
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/api/cart", get(api::cart::get_cart).post(api::cart::create_cart))
        .route("/api/cart/add", post(api::cart::add_to_cart))
        .route("/api/cart/update", post(api::cart::update_cart))
        .route("/api/cart/remove", post(api::cart::remove_from_cart))
        .route("/api/qr-code", get(api::qr::qr_code))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home page
        .route("/", get(home::home))
        // Catalog
        .nest("/products", product_routes())
        // Cart
        .nest("/cart", cart_routes())
        .route("/checkout", get(cart::checkout))
        // Marketing pages
        .route("/about", get(pages::about))
        .route("/contact", get(pages::contact))
        .route("/wholesale", get(pages::wholesale))
        .route("/fundraising", get(pages::fundraising))
        .route("/co-packaging", get(pages::co_packaging))
        .route("/fundraise", get(pages::fundraise))
        // JSON API
        .merge(api_routes())
        // 404
        .fallback(pages::not_found)
}
