//! Registration endpoint handler.

use axum::extract::State;
use axum::Json;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::ValidJson;
use crate::services::RegistrationEngine;
use domain::models::{RegisterOutcome, RegisterRequest, RegisterResponse};

/// Register attendance for a session.
///
/// POST /api/register (rate limited per remote address)
pub async fn register(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<RegisterRequest>,
) -> Result<Json<RegisterResponse>, ApiError> {
    request.validate()?;

    let engine = RegistrationEngine::new(state.pool.clone(), &state.config, state.bus.clone());
    let outcome = engine
        .register(&request.session_id, &request.runner_name)
        .await?;

    match outcome {
        RegisterOutcome::Registered(count) => Ok(Json(RegisterResponse {
            success: true,
            current_count: count,
            runner_name: request.runner_name.trim().to_string(),
        })),
        RegisterOutcome::AlreadyRegistered(count) => Err(ApiError::AlreadyRegistered {
            current_count: count,
        }),
        RegisterOutcome::BadSession => Err(ApiError::BadSession),
        RegisterOutcome::SessionClosed => Err(ApiError::SessionClosed),
        RegisterOutcome::Invalid(reason) => Err(ApiError::Invalid(reason)),
        RegisterOutcome::Retryable => Err(ApiError::Retryable),
    }
}
