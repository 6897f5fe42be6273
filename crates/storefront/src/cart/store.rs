//! Per-session cart store.
//!
//! State machine: `Uninitialized` -> `Loading` (persisted id found, fetch
//! in flight) -> `Ready`; every mutating operation is `Ready -> Loading ->
//! Ready` for the duration of that single call, and `Loading` clears on
//! every exit path including failures.
//!
//! The store does not queue or serialize concurrent operations; the UI is
//! expected to disable controls while an operation is in flight.

use std::sync::Arc;

use copper_state_core::{AttributeInput, Cart, CartLineInput, CartLineUpdateInput};

use crate::shopify::{CommerceGateway, ShopifyError};

/// Lifecycle phase of the cart store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartPhase {
    /// No restore attempted yet.
    Uninitialized,
    /// A gateway call is in flight.
    Loading,
    /// Snapshot present or confirmed absent.
    Ready,
}

/// Holder of the current cart identity and snapshot.
///
/// Constructed per browser session; mutating operations replace the
/// snapshot wholesale with the full cart the gateway returns and propagate
/// every failure to the caller - nothing is masked as success.
pub struct CartStore {
    gateway: Arc<dyn CommerceGateway>,
    cart_id: Option<String>,
    snapshot: Option<Cart>,
    phase: CartPhase,
}

impl CartStore {
    /// A store with no cart identity.
    #[must_use]
    pub fn new(gateway: Arc<dyn CommerceGateway>) -> Self {
        Self {
            gateway,
            cart_id: None,
            snapshot: None,
            phase: CartPhase::Uninitialized,
        }
    }

    /// Adopt a persisted cart id without fetching the snapshot.
    ///
    /// Used by mutating handlers that are about to replace the snapshot
    /// anyway; page rendering goes through [`Self::restore`] instead.
    #[must_use]
    pub fn with_cart_id(gateway: Arc<dyn CommerceGateway>, cart_id: Option<String>) -> Self {
        Self {
            gateway,
            cart_id,
            snapshot: None,
            phase: CartPhase::Ready,
        }
    }

    /// Mount: restore the persisted cart id and fetch the current snapshot.
    ///
    /// When the provider confirms the cart no longer exists, the stale id
    /// is discarded and the store settles at `Ready` with an empty cart. A
    /// transport failure keeps the id (the cart may still exist) and leaves
    /// the snapshot empty for this request.
    pub async fn restore(gateway: Arc<dyn CommerceGateway>, persisted_id: Option<String>) -> Self {
        let mut store = Self::new(gateway);

        let Some(id) = persisted_id else {
            store.phase = CartPhase::Ready;
            return store;
        };

        store.phase = CartPhase::Loading;
        match store.gateway.get_cart(&id).await {
            Ok(Some(cart)) => {
                store.cart_id = Some(id);
                store.snapshot = Some(cart);
            }
            Ok(None) => {
                tracing::info!(cart_id = %id, "persisted cart no longer exists, discarding id");
            }
            Err(e) => {
                tracing::warn!(cart_id = %id, error = %e, "failed to restore cart snapshot");
                store.cart_id = Some(id);
            }
        }
        store.phase = CartPhase::Ready;
        store
    }

    /// Current lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> CartPhase {
        self.phase
    }

    /// The known cart id, if any.
    #[must_use]
    pub fn cart_id(&self) -> Option<&str> {
        self.cart_id.as_deref()
    }

    /// The current snapshot, if any.
    #[must_use]
    pub const fn snapshot(&self) -> Option<&Cart> {
        self.snapshot.as_ref()
    }

    /// Total item count for the badge; 0 when no snapshot is held.
    #[must_use]
    pub fn item_count(&self) -> i64 {
        self.snapshot
            .as_ref()
            .map_or(0, |cart| cart.total_quantity)
    }

    /// Add a variant to the cart.
    ///
    /// Lazily creates the cart on the first add (adopting the returned id
    /// as the new persisted identity); otherwise adds to the existing cart.
    ///
    /// # Errors
    ///
    /// Propagates every gateway failure so the UI can surface it.
    pub async fn add_item(
        &mut self,
        variant_id: &str,
        quantity: i64,
        attributes: Option<Vec<AttributeInput>>,
    ) -> Result<(), ShopifyError> {
        let line = CartLineInput {
            merchandise_id: variant_id.to_string(),
            quantity,
            attributes,
        };

        self.phase = CartPhase::Loading;
        let result = match self.cart_id.clone() {
            Some(id) => self.gateway.add_to_cart(&id, vec![line]).await,
            None => self.gateway.create_cart(vec![line]).await,
        };
        // Loading must clear on every exit path.
        self.phase = CartPhase::Ready;

        self.adopt(result?);
        Ok(())
    }

    /// Update an existing line's quantity. No-op when no cart id is known.
    ///
    /// Quantities are passed through untouched; redirecting a quantity
    /// below 1 to a removal is the caller's responsibility.
    ///
    /// # Errors
    ///
    /// Propagates every gateway failure.
    pub async fn update_item(&mut self, line_id: &str, quantity: i64) -> Result<(), ShopifyError> {
        let Some(id) = self.cart_id.clone() else {
            return Ok(());
        };

        let update = CartLineUpdateInput {
            id: line_id.to_string(),
            quantity,
        };

        self.phase = CartPhase::Loading;
        let result = self.gateway.update_cart(&id, vec![update]).await;
        self.phase = CartPhase::Ready;

        self.adopt(result?);
        Ok(())
    }

    /// Remove a line from the cart. No-op when no cart id is known.
    ///
    /// # Errors
    ///
    /// Propagates every gateway failure.
    pub async fn remove_item(&mut self, line_id: &str) -> Result<(), ShopifyError> {
        let Some(id) = self.cart_id.clone() else {
            return Ok(());
        };

        self.phase = CartPhase::Loading;
        let result = self
            .gateway
            .remove_from_cart(&id, vec![line_id.to_string()])
            .await;
        self.phase = CartPhase::Ready;

        self.adopt(result?);
        Ok(())
    }

    /// Re-fetch the snapshot for the known id.
    ///
    /// # Errors
    ///
    /// Propagates every gateway failure.
    pub async fn refresh(&mut self) -> Result<(), ShopifyError> {
        let Some(id) = self.cart_id.clone() else {
            return Ok(());
        };

        self.phase = CartPhase::Loading;
        let result = self.gateway.get_cart(&id).await;
        self.phase = CartPhase::Ready;

        match result? {
            Some(cart) => self.adopt(cart),
            None => self.clear(),
        }
        Ok(())
    }

    /// Discard the cart identity and snapshot.
    ///
    /// The remote cart, if any, is simply abandoned - the provider is not
    /// notified.
    pub fn clear(&mut self) {
        self.cart_id = None;
        self.snapshot = None;
        self.phase = CartPhase::Ready;
    }

    /// Replace the snapshot wholesale with what the provider returned.
    fn adopt(&mut self, cart: Cart) {
        self.cart_id = Some(cart.id.clone());
        self.snapshot = Some(cart);
    }
}
