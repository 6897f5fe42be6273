//! Product catalog route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::instrument;

use copper_state_core::Product;

use super::home::ProductCardView;
use crate::state::AppState;

/// How many products the catalog page lists.
const CATALOG_PRODUCT_COUNT: i64 = 20;

/// Variant display data for the detail page selector.
#[derive(Clone)]
pub struct VariantView {
    pub id: String,
    pub title: String,
    pub price: String,
    pub available: bool,
}

/// Product detail display data.
pub struct ProductDetailView {
    pub title: String,
    pub description: String,
    pub price: String,
    pub compare_at_price: Option<String>,
    pub image_url: Option<String>,
    pub image_alt: String,
    pub available: bool,
    /// Variant preselected for the add-to-cart form.
    pub default_variant_id: String,
    pub variants: Vec<VariantView>,
}

impl From<&Product> for ProductDetailView {
    fn from(product: &Product) -> Self {
        let default_variant = product.default_variant();
        Self {
            title: product.title.clone(),
            description: product.description.clone(),
            price: default_variant.map_or_else(String::new, |v| v.price.display()),
            compare_at_price: default_variant
                .and_then(|v| v.compare_at_price.as_ref())
                .map(copper_state_core::Money::display),
            image_url: product.featured_image().map(|img| img.url.clone()),
            image_alt: product
                .featured_image()
                .and_then(|img| img.alt_text.clone())
                .unwrap_or_else(|| product.title.clone()),
            available: product.variants.iter().any(|v| v.available_for_sale),
            default_variant_id: default_variant.map_or_else(String::new, |v| v.id.clone()),
            variants: product
                .variants
                .iter()
                .map(|v| VariantView {
                    id: v.id.clone(),
                    title: v.title.clone(),
                    price: v.price.display(),
                    available: v.available_for_sale,
                })
                .collect(),
        }
    }
}

/// Product listing template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub products: Vec<ProductCardView>,
}

/// Product detail template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub product: ProductDetailView,
}

/// Display the product listing.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> impl IntoResponse {
    let products = match state.gateway().get_products(CATALOG_PRODUCT_COUNT).await {
        Ok(products) => products.iter().map(ProductCardView::from).collect(),
        Err(e) => {
            tracing::warn!(error = %e, "failed to load product catalog");
            Vec::new()
        }
    };

    ProductsIndexTemplate { products }
}

/// Display a product detail page.
///
/// # Errors
///
/// Returns 404 when the handle is unknown, 500 when the provider call
/// fails.
#[instrument(skip(state), fields(handle = %handle))]
pub async fn show(
    State(state): State<AppState>,
    Path(handle): Path<String>,
) -> Result<impl IntoResponse, StatusCode> {
    let product = state
        .gateway()
        .get_product_by_handle(&handle)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "failed to load product");
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .ok_or(StatusCode::NOT_FOUND)?;

    Ok(ProductShowTemplate {
        product: ProductDetailView::from(&product),
    })
}
