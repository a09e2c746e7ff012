//! QR endpoint handlers.
//!
//! The QR image encodes a signed registration link so that a scan lands on
//! the registration page with a token that resolves back to the session code.

use axum::extract::{Path, State};
use axum::Json;
use base64::{engine::general_purpose::STANDARD, Engine};
use persistence::repositories::RunRepository;
use qrcode::render::svg;
use qrcode::QrCode;
use serde::Serialize;

use crate::app::AppState;
use crate::error::ApiError;
use crate::services::CodeIssuer;

#[derive(Debug, Serialize)]
pub struct QrResponse {
    /// Base64-encoded SVG image.
    pub qr_code: String,
    pub session_id: String,
}

#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// QR image for a session code.
///
/// GET /api/qr/{session_code}
pub async fn qr_image(
    State(state): State<AppState>,
    Path(session_code): Path<String>,
) -> Result<Json<QrResponse>, ApiError> {
    let runs = RunRepository::new(state.pool.clone());
    let run = runs
        .find_by_code(&session_code)
        .await?
        .ok_or(ApiError::BadSession)?;

    let issuer = CodeIssuer::new(RunRepository::new(state.pool.clone()), &state.config);
    let token = issuer.mint_qr_token(&run.session_code);
    let link = format!("{}/register?token={}", state.config.app_base_url, token);

    let code = QrCode::new(link.as_bytes())
        .map_err(|e| ApiError::Internal(format!("QR encoding failed: {}", e)))?;
    let image = code
        .render::<svg::Color>()
        .min_dimensions(240, 240)
        .build();

    Ok(Json(QrResponse {
        qr_code: STANDARD.encode(image.as_bytes()),
        session_id: run.session_code,
    }))
}

/// Resolve a signed QR token back to its session code.
///
/// GET /api/qr/validate/{token}
///
/// Always 200; the body carries the verdict so scanner UIs can branch
/// without parsing error envelopes.
pub async fn validate_token(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Json<ValidateResponse> {
    let issuer = CodeIssuer::new(RunRepository::new(state.pool.clone()), &state.config);
    match issuer.verify_qr_token(&token) {
        Ok(session_id) => Json(ValidateResponse {
            valid: true,
            session_id: Some(session_id),
        }),
        Err(err) => {
            tracing::debug!(reason = %err, "QR token validation failed");
            Json(ValidateResponse {
                valid: false,
                session_id: None,
            })
        }
    }
}
