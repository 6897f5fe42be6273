//! Fundraising QR code endpoint.

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::qr;
use crate::state::AppState;

/// Query parameters for `GET /api/qr-code`.
#[derive(Debug, Deserialize)]
pub struct QrCodeQuery {
    pub team: Option<String>,
    pub player: Option<String>,
    pub width: Option<u32>,
}

/// `GET /api/qr-code?team=<id>&player=<id>&width=<px>`
///
/// Renders a PNG QR code pointing at `/fundraise?team=<id>`. Cacheable for
/// an hour - codes for a team are stable.
#[instrument(skip(state))]
pub async fn qr_code(
    State(state): State<AppState>,
    Query(query): Query<QrCodeQuery>,
) -> Result<Response> {
    let Some(team) = query.team.filter(|t| !t.is_empty()) else {
        return Err(AppError::BadRequest("Team ID is required".to_string()));
    };

    let width = qr::clamp_width(query.width);
    let url = qr::fundraise_url(&state.config().base_url, &team, query.player.as_deref())
        .map_err(|e| AppError::Internal(e.to_string()))?;
    let png = qr::generate_png(&url, width).map_err(|e| AppError::Internal(e.to_string()))?;

    let filename = query.player.as_deref().map_or_else(
        || format!("qr-{team}.png"),
        |player| format!("qr-{team}-{player}.png"),
    );

    Ok((
        [
            (header::CONTENT_TYPE, "image/png".to_string()),
            (header::CACHE_CONTROL, "public, max-age=3600".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("inline; filename=\"{filename}\""),
            ),
        ],
        png,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::state::AppState;
    use crate::test_support::{StubGateway, test_config};

    fn test_app() -> Router {
        let state = AppState::new(test_config(), Arc::new(StubGateway::default()));
        crate::routes::api_routes().with_state(state)
    }

    #[tokio::test]
    async fn test_qr_code_requires_team() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri("/api/qr-code")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_qr_code_renders_cacheable_png() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri("/api/qr-code?team=alpha&player=7&width=200")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok()),
            Some("image/png")
        );
        assert_eq!(
            response
                .headers()
                .get(header::CACHE_CONTROL)
                .and_then(|v| v.to_str().ok()),
            Some("public, max-age=3600")
        );

        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body")
            .to_bytes();
        assert_eq!(bytes.get(..4), Some(&b"\x89PNG"[..]));
    }
}
