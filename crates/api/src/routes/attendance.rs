//! Attendance query endpoint handlers.

use axum::extract::{Query, State};
use axum::Json;
use persistence::repositories::AttendanceRepository;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::services::CalendarService;
use domain::models::{HistoryQuery, HistoryRecord, HistoryResponse, TodayAttendanceResponse};

/// Count for today's run.
///
/// GET /api/attendance/today
pub async fn today(
    State(state): State<AppState>,
) -> Result<Json<TodayAttendanceResponse>, ApiError> {
    let service = CalendarService::new(state.pool.clone(), &state.config);
    let status = service.today_status().await?;

    Ok(Json(TodayAttendanceResponse {
        count: status.attendance_count,
        has_run_today: status.has_run,
        session_id: status.session_code,
    }))
}

/// Paged attendance history over a date window.
///
/// GET /api/attendance/history?start_date&end_date&page&page_size
///
/// An inverted window is an empty result, not an error.
pub async fn history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, ApiError> {
    query.validate()?;

    let repo = AttendanceRepository::new(state.pool.clone());
    let total = repo.history_total(query.start_date, query.end_date).await?;
    let offset = i64::from(query.page - 1) * i64::from(query.page_size);
    let rows = repo
        .history_page(
            query.start_date,
            query.end_date,
            i64::from(query.page_size),
            offset,
        )
        .await?;

    let data: Vec<HistoryRecord> = rows.into_iter().map(HistoryRecord::from).collect();
    Ok(Json(HistoryResponse::paged(
        data,
        total,
        query.page,
        query.page_size,
    )))
}
