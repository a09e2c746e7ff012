//! CSV export endpoint handler.

use axum::extract::{Query, State};
use axum::http::header;
use axum::response::Response;
use chrono::NaiveDate;
use persistence::repositories::AttendanceRepository;
use serde::Deserialize;

use crate::app::AppState;
use crate::error::ApiError;
use crate::services::export::csv_body;

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Stream attendance history as CSV.
///
/// GET /api/attendance/export?start_date&end_date
pub async fn export(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, ApiError> {
    let repo = AttendanceRepository::new(state.pool.clone());
    let body = csv_body(repo, query.start_date, query.end_date);

    let filename = format!(
        "attendance_{}_{}.csv",
        query.start_date, query.end_date
    );

    Response::builder()
        .header(header::CONTENT_TYPE, "text/csv; charset=utf-8")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        )
        .body(body)
        .map_err(|e| ApiError::Internal(format!("Failed to build export response: {}", e)))
}
