//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::StorefrontConfig;
use crate::shopify::CommerceGateway;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. The gateway is held as a trait object so
/// handlers can be exercised against a stub in tests; in production it is
/// a [`crate::shopify::StorefrontClient`] constructed once at startup.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    gateway: Arc<dyn CommerceGateway>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: StorefrontConfig, gateway: Arc<dyn CommerceGateway>) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, gateway }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a handle to the commerce gateway.
    #[must_use]
    pub fn gateway(&self) -> Arc<dyn CommerceGateway> {
        Arc::clone(&self.inner.gateway)
    }
}
