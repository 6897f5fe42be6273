//! Fundraising attribution capture.
//!
//! A team identifier arrives via `?team=<id>` on any page URL (QR codes
//! and shared links point at `/fundraise?team=...`). The id is kept in
//! session-scoped storage only - it dies with the browsing session, never
//! durable storage - and is attached as a line attribute when an item is
//! added to the cart. It is never attached to updates of existing lines.

use axum::{
    extract::Request,
    middleware::Next,
    response::Response,
};
use tower_sessions::Session;

use copper_state_core::AttributeInput;

/// Session key holding the captured team id.
pub const TEAM_SESSION_KEY: &str = "fundraising_team";

/// Line attribute key carried to the provider on add-to-cart.
pub const TEAM_ATTRIBUTE_KEY: &str = "Fundraising Team";

/// Extract a non-empty `team` parameter from a raw query string.
#[must_use]
pub fn team_from_query(query: &str) -> Option<String> {
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "team")
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

/// Decide the effective team id for this navigation.
///
/// The URL is authoritative: a team in the URL overwrites whatever was
/// stored. A URL without the parameter falls back to the stored value -
/// navigating away and back must not lose the attribution.
///
/// Returns the effective id and whether it needs (re)storing.
#[must_use]
pub fn resolve(from_url: Option<String>, stored: Option<String>) -> (Option<String>, bool) {
    match from_url {
        Some(team) => (Some(team), true),
        None => (stored, false),
    }
}

/// Read the stored team id from the session.
pub async fn stored_team(session: &Session) -> Option<String> {
    match session.get::<String>(TEAM_SESSION_KEY).await {
        Ok(team) => team,
        Err(e) => {
            tracing::warn!(error = %e, "failed to read attribution from session");
            None
        }
    }
}

/// Line attributes for a new cart line, if attribution was captured.
#[must_use]
pub fn line_attributes(team: Option<String>) -> Option<Vec<AttributeInput>> {
    team.map(|value| {
        vec![AttributeInput {
            key: TEAM_ATTRIBUTE_KEY.to_string(),
            value,
        }]
    })
}

/// Middleware capturing `?team=` off every page navigation.
///
/// Idempotent: re-visiting the same URL just rewrites the same value.
pub async fn capture_team(session: Session, request: Request, next: Next) -> Response {
    let from_url = request.uri().query().and_then(team_from_query);

    if let Some(team) = from_url {
        tracing::debug!(team = %team, "captured fundraising attribution");
        if let Err(e) = session.insert(TEAM_SESSION_KEY, team).await {
            tracing::warn!(error = %e, "failed to store attribution in session");
        }
    }

    next.run(request).await
}
