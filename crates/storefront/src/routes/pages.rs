//! Static marketing page route handlers.
//!
//! These pages are presentational; the only logic is the contact page's
//! mailto link construction and the fundraise landing page reading the
//! captured team id for its banner.

use askama::Template;
use askama_web::WebTemplate;
use axum::{http::StatusCode, response::IntoResponse};
use tower_sessions::Session;
use tracing::instrument;

use crate::cart::attribution;

/// General inbox for contact form submissions.
const CONTACT_EMAIL: &str = "steven@copperstatefoods.com";

/// Wholesale inquiries inbox.
const WHOLESALE_EMAIL: &str = "dave@copperstatefoods.com";

/// Build a mailto link with an encoded subject.
fn mailto_link(to: &str, subject: &str) -> String {
    format!("mailto:{to}?subject={}", urlencoding::encode(subject))
}

/// About page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/about.html")]
pub struct AboutTemplate;

/// Contact page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/contact.html")]
pub struct ContactTemplate {
    pub contact_email: String,
    pub contact_mailto: String,
    pub wholesale_email: String,
    pub wholesale_mailto: String,
}

/// Wholesale page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/wholesale.html")]
pub struct WholesaleTemplate {
    pub wholesale_mailto: String,
}

/// Fundraising program page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/fundraising.html")]
pub struct FundraisingTemplate {
    pub contact_mailto: String,
}

/// Co-packaging page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/co_packaging.html")]
pub struct CoPackagingTemplate {
    pub contact_mailto: String,
}

/// Fundraise landing page template (QR code target).
#[derive(Template, WebTemplate)]
#[template(path = "pages/fundraise.html")]
pub struct FundraiseTemplate {
    pub team: Option<String>,
}

/// Not found template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/not_found.html")]
pub struct NotFoundTemplate;

/// Display the About page.
#[instrument]
pub async fn about() -> impl IntoResponse {
    AboutTemplate
}

/// Display the Contact page.
#[instrument]
pub async fn contact() -> impl IntoResponse {
    ContactTemplate {
        contact_email: CONTACT_EMAIL.to_string(),
        contact_mailto: mailto_link(CONTACT_EMAIL, "Contact Form Submission"),
        wholesale_email: WHOLESALE_EMAIL.to_string(),
        wholesale_mailto: mailto_link(WHOLESALE_EMAIL, "Wholesale Inquiry"),
    }
}

/// Display the Wholesale page.
#[instrument]
pub async fn wholesale() -> impl IntoResponse {
    WholesaleTemplate {
        wholesale_mailto: mailto_link(WHOLESALE_EMAIL, "Wholesale Inquiry"),
    }
}

/// Display the Fundraising program page.
#[instrument]
pub async fn fundraising() -> impl IntoResponse {
    FundraisingTemplate {
        contact_mailto: mailto_link(CONTACT_EMAIL, "Fundraising Inquiry"),
    }
}

/// Display the Co-Packaging page.
#[instrument]
pub async fn co_packaging() -> impl IntoResponse {
    CoPackagingTemplate {
        contact_mailto: mailto_link(CONTACT_EMAIL, "Co-Packaging Inquiry"),
    }
}

/// Display the fundraise landing page.
///
/// QR codes point here with `?team=<id>`; the attribution middleware has
/// already captured the parameter by the time this handler runs, so the
/// banner also shows on later visits within the same browsing session.
#[instrument(skip(session))]
pub async fn fundraise(session: Session) -> impl IntoResponse {
    let team = attribution::stored_team(&session).await;
    FundraiseTemplate { team }
}

/// Fallback 404 page.
#[instrument]
pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, NotFoundTemplate)
}
