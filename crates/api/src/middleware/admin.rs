//! Admin authentication middleware.
//!
//! The admin surface is gated by a single shared secret; there are no
//! per-user accounts. The secret arrives in the `X-Admin-Secret` header and
//! is compared in constant time.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::app::AppState;
use crate::error::ApiError;

/// Header carrying the admin shared secret.
pub const ADMIN_SECRET_HEADER: &str = "X-Admin-Secret";

/// Middleware that requires the admin shared secret.
pub async fn require_admin(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let presented = req
        .headers()
        .get(ADMIN_SECRET_HEADER)
        .and_then(|v| v.to_str().ok());

    match presented {
        Some(secret) if shared::crypto::secret_eq(secret, &state.config.admin_secret) => {
            next.run(req).await
        }
        _ => ApiError::Unauthorized("Invalid or missing admin secret".into()).into_response(),
    }
}
