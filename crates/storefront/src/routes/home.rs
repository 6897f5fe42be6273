//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use copper_state_core::Product;

use crate::state::AppState;

/// How many products the home page grid shows.
const FEATURED_PRODUCT_COUNT: i64 = 8;

/// Product card display data shared by the home and products pages.
#[derive(Clone)]
pub struct ProductCardView {
    pub handle: String,
    pub title: String,
    pub price: String,
    pub compare_at_price: Option<String>,
    pub image_url: Option<String>,
    pub image_alt: String,
    pub available: bool,
}

impl From<&Product> for ProductCardView {
    fn from(product: &Product) -> Self {
        let variant = product.default_variant();
        Self {
            handle: product.handle.clone(),
            title: product.title.clone(),
            price: variant.map_or_else(String::new, |v| v.price.display()),
            compare_at_price: variant
                .and_then(|v| v.compare_at_price.as_ref())
                .map(copper_state_core::Money::display),
            image_url: product.featured_image().map(|img| img.url.clone()),
            image_alt: product
                .featured_image()
                .and_then(|img| img.alt_text.clone())
                .unwrap_or_else(|| product.title.clone()),
            available: product.variants.iter().any(|v| v.available_for_sale),
        }
    }
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub products: Vec<ProductCardView>,
}

/// Display the home page with the featured product grid.
///
/// Catalog failures degrade to an empty grid - the marketing page must
/// still render when the provider is unreachable.
#[instrument(skip(state))]
pub async fn home(State(state): State<AppState>) -> impl IntoResponse {
    let products = match state.gateway().get_products(FEATURED_PRODUCT_COUNT).await {
        Ok(products) => products.iter().map(ProductCardView::from).collect(),
        Err(e) => {
            tracing::warn!(error = %e, "failed to load featured products");
            Vec::new()
        }
    };

    HomeTemplate { products }
}
