//! Shared test fixtures: a scriptable stub gateway and sample domain data.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use copper_state_core::{
    Cart, CartCost, CartLine, CartLineInput, CartLineUpdateInput, CartMerchandise,
    CartMerchandiseProduct, Money, Product, ProductVariant,
};

use crate::config::{ShopifyStorefrontConfig, StorefrontConfig};
use crate::shopify::{CommerceGateway, ShopifyError};

/// Configuration for handler tests; never touches the environment.
#[must_use]
pub fn test_config() -> StorefrontConfig {
    StorefrontConfig {
        host: std::net::IpAddr::from([127, 0, 0, 1]),
        port: 3000,
        base_url: "https://copperstatefoods.com".to_string(),
        shopify: ShopifyStorefrontConfig {
            store_domain: "copper-state.myshopify.com".to_string(),
            api_version: "2024-10".to_string(),
            access_token: secrecy::SecretString::from("shpat_test_token"),
        },
        sentry_dsn: None,
    }
}

/// Stub gateway with call counters and scriptable results.
///
/// Defaults: mutations succeed returning the configured cart template (or a
/// fresh sample cart), `get_cart` returns the template when one is set.
#[derive(Default)]
pub struct StubGateway {
    pub create_calls: AtomicUsize,
    pub get_calls: AtomicUsize,
    pub add_calls: AtomicUsize,
    pub update_calls: AtomicUsize,
    pub remove_calls: AtomicUsize,

    pub last_create_lines: Mutex<Option<Vec<CartLineInput>>>,
    pub last_add_cart_id: Mutex<Option<String>>,
    pub last_add_lines: Mutex<Option<Vec<CartLineInput>>>,
    pub last_update_lines: Mutex<Option<Vec<CartLineUpdateInput>>>,
    pub last_remove_ids: Mutex<Option<Vec<String>>>,

    cart: Option<Cart>,
    products: Vec<Product>,
    fail_next_mutation: Mutex<Option<ShopifyError>>,
    get_cart_script: Mutex<Option<Result<Option<Cart>, ShopifyError>>>,
}

impl StubGateway {
    /// Stub whose successful operations return `cart`.
    #[must_use]
    pub fn with_cart(cart: Cart) -> Self {
        Self {
            cart: Some(cart),
            ..Self::default()
        }
    }

    /// Stub serving a product catalog.
    #[must_use]
    pub fn with_products(products: Vec<Product>) -> Self {
        Self {
            products,
            ..Self::default()
        }
    }

    /// Make the next mutation fail with `err`.
    pub fn fail_next_mutation(&self, err: ShopifyError) {
        *self.fail_next_mutation.lock().expect("lock") = Some(err);
    }

    /// Script the next `get_cart` result.
    pub fn set_get_cart(&self, result: Result<Option<Cart>, ShopifyError>) {
        *self.get_cart_script.lock().expect("lock") = Some(result);
    }

    fn mutation_result(&self) -> Result<Cart, ShopifyError> {
        if let Some(err) = self.fail_next_mutation.lock().expect("lock").take() {
            return Err(err);
        }
        Ok(self
            .cart
            .clone()
            .unwrap_or_else(|| sample_cart("gid://shopify/Cart/stub")))
    }
}

#[async_trait]
impl CommerceGateway for StubGateway {
    async fn create_cart(&self, lines: Vec<CartLineInput>) -> Result<Cart, ShopifyError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_create_lines.lock().expect("lock") = Some(lines);
        self.mutation_result()
    }

    async fn get_cart(&self, _cart_id: &str) -> Result<Option<Cart>, ShopifyError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(scripted) = self.get_cart_script.lock().expect("lock").take() {
            return scripted;
        }
        Ok(self.cart.clone())
    }

    async fn add_to_cart(
        &self,
        cart_id: &str,
        lines: Vec<CartLineInput>,
    ) -> Result<Cart, ShopifyError> {
        self.add_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_add_cart_id.lock().expect("lock") = Some(cart_id.to_string());
        *self.last_add_lines.lock().expect("lock") = Some(lines);
        self.mutation_result()
    }

    async fn update_cart(
        &self,
        _cart_id: &str,
        lines: Vec<CartLineUpdateInput>,
    ) -> Result<Cart, ShopifyError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_update_lines.lock().expect("lock") = Some(lines);
        self.mutation_result()
    }

    async fn remove_from_cart(
        &self,
        _cart_id: &str,
        line_ids: Vec<String>,
    ) -> Result<Cart, ShopifyError> {
        self.remove_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_remove_ids.lock().expect("lock") = Some(line_ids);
        self.mutation_result()
    }

    async fn get_products(&self, _first: i64) -> Result<Vec<Product>, ShopifyError> {
        Ok(self.products.clone())
    }

    async fn get_product_by_handle(&self, handle: &str) -> Result<Option<Product>, ShopifyError> {
        Ok(self.products.iter().find(|p| p.handle == handle).cloned())
    }
}

/// A consistent two-line cart: quantities 1 + 2, `total_quantity` 3.
#[must_use]
pub fn sample_cart(id: &str) -> Cart {
    Cart {
        id: id.to_string(),
        checkout_url: "https://copper-state.myshopify.com/checkout/abc".to_string(),
        total_quantity: 3,
        cost: CartCost {
            subtotal: Money {
                amount: "26.97".to_string(),
                currency_code: "USD".to_string(),
            },
            total: Money {
                amount: "26.97".to_string(),
                currency_code: "USD".to_string(),
            },
        },
        lines: vec![
            sample_line("gid://shopify/CartLine/1", 1),
            sample_line("gid://shopify/CartLine/2", 2),
        ],
    }
}

fn sample_line(id: &str, quantity: i64) -> CartLine {
    CartLine {
        id: id.to_string(),
        quantity,
        attributes: vec![],
        merchandise: CartMerchandise {
            id: "gid://shopify/ProductVariant/11".to_string(),
            title: "Default Title".to_string(),
            price: Money {
                amount: "8.99".to_string(),
                currency_code: "USD".to_string(),
            },
            product: CartMerchandiseProduct {
                id: "gid://shopify/Product/1".to_string(),
                title: "Green Chile Salsa".to_string(),
                handle: "green-chile-salsa".to_string(),
                featured_image: None,
            },
        },
    }
}

/// A single-variant product for catalog tests.
#[must_use]
pub fn sample_product(handle: &str) -> Product {
    Product {
        id: format!("gid://shopify/Product/{handle}"),
        title: "Green Chile Salsa".to_string(),
        handle: handle.to_string(),
        description: "Slow-roasted Hatch green chile.".to_string(),
        images: vec![],
        variants: vec![ProductVariant {
            id: "gid://shopify/ProductVariant/11".to_string(),
            title: "Default Title".to_string(),
            available_for_sale: true,
            price: Money {
                amount: "8.99".to_string(),
                currency_code: "USD".to_string(),
            },
            compare_at_price: None,
        }],
    }
}
