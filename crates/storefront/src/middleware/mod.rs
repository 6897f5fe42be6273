//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (capture errors, outermost)
//! 2. `TraceLayer` (request tracing)
//! 3. Session layer (tower-sessions, in-memory, session-scoped)
//! 4. Attribution capture (`crate::cart::attribution::capture_team`)

pub mod session;

pub use session::create_session_layer;
