//! Session middleware configuration.
//!
//! Sessions back the attribution capture only, so the layer uses an
//! in-memory store with a true session cookie (`Expiry::OnSessionEnd`) -
//! the attribution id must die with the browsing session, never persist.
//! The durable cart id deliberately does NOT live here; it is a separate
//! long-lived cookie (see `crate::cart`).

use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "csf_session";

/// Create the session layer with an in-memory store.
#[must_use]
pub fn create_session_layer(base_url: &str) -> SessionManagerLayer<MemoryStore> {
    let store = MemoryStore::default();

    // Secure cookies only when actually served over HTTPS.
    let is_secure = base_url.starts_with("https://");

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnSessionEnd)
        .with_secure(is_secure)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
