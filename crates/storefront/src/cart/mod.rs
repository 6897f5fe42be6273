//! Cart session state: the per-browser cart store and attribution capture.
//!
//! The provider owns authoritative cart state. What lives on our side is
//! only identity and a transient snapshot:
//!
//! - the cart identifier, persisted in a durable cookie so it survives
//!   browser restarts (two tabs share it; the provider arbitrates races)
//! - the denormalized snapshot, refetched from the provider per request and
//!   never trusted as a cache
//! - the fundraising attribution id, session-scoped only

pub mod attribution;
pub mod store;

pub use store::{CartPhase, CartStore};

/// Durable cookie holding the provider-assigned cart id.
pub const CART_ID_COOKIE: &str = "csf_cart_id";
