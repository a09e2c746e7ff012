//! Calendar endpoint handlers.

use axum::extract::{Query, State};
use axum::Json;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::ValidJson;
use crate::services::calendar::CalendarError;
use crate::services::CalendarService;
use domain::models::{
    ConfigureDayRequest, ConfigureDayResponse, MonthQuery, MonthResponse, TodayResponse,
};

/// Set whether a date has a run.
///
/// POST /api/calendar/configure (admin)
pub async fn configure(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<ConfigureDayRequest>,
) -> Result<Json<ConfigureDayResponse>, ApiError> {
    let service = CalendarService::new(state.pool.clone(), &state.config);
    let run = service
        .configure(request.date, request.has_run)
        .await
        .map_err(map_calendar_error)?;

    Ok(Json(ConfigureDayResponse {
        session_code: run.filter(|_| request.has_run).map(|r| r.session_code),
    }))
}

/// Monthly overview.
///
/// GET /api/calendar?month=YYYY-MM
pub async fn month(
    State(state): State<AppState>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<MonthResponse>, ApiError> {
    let service = CalendarService::new(state.pool.clone(), &state.config);
    let data = service
        .month(&query.month)
        .await
        .map_err(map_calendar_error)?;
    Ok(Json(MonthResponse { data }))
}

/// Today's status.
///
/// GET /api/calendar/today
pub async fn today(State(state): State<AppState>) -> Result<Json<TodayResponse>, ApiError> {
    let service = CalendarService::new(state.pool.clone(), &state.config);
    Ok(Json(service.today_status().await?))
}

fn map_calendar_error(err: CalendarError) -> ApiError {
    match err {
        CalendarError::BadMonth => ApiError::Malformed("month must be formatted as YYYY-MM".into()),
        CalendarError::Issue(err) => ApiError::Internal(err.to_string()),
        CalendarError::Store(err) => err.into(),
    }
}
