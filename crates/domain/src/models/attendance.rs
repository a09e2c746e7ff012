//! Attendance wire DTOs and domain model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A single successful check-in by one runner for one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attendance {
    pub id: i64,
    pub run_id: i64,
    pub runner_id: String,
    pub registered_at: DateTime<Utc>,
}

/// Request payload for `POST /api/register`.
///
/// `session_id` carries either a plain session code or a signed QR token.
/// `timestamp` is the client's clock in milliseconds; it is accepted for
/// diagnostics but the server clock is authoritative for `registered_at`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 512, message = "session_id must be 1-512 characters"))]
    pub session_id: String,

    pub runner_name: String,

    pub timestamp: Option<i64>,
}

/// Success payload for `POST /api/register`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub success: bool,
    pub current_count: i64,
    pub runner_name: String,
}

/// Response payload for `GET /api/attendance/today`.
#[derive(Debug, Clone, Serialize)]
pub struct TodayAttendanceResponse {
    pub count: i64,
    pub has_run_today: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// Query parameters for `GET /api/attendance/history`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct HistoryQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,

    #[serde(default = "default_page")]
    #[validate(range(min = 1, message = "page starts at 1"))]
    pub page: u32,

    #[serde(default = "default_page_size")]
    #[validate(range(min = 1, max = 500, message = "page_size must be 1-500"))]
    pub page_size: u32,
}

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    50
}

/// One row of the attendance history.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryRecord {
    pub id: i64,
    pub run_date: NaiveDate,
    pub session_code: String,
    pub runner_name: String,
    pub registered_at: DateTime<Utc>,
}

/// Response payload for `GET /api/attendance/history`.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryResponse {
    pub data: Vec<HistoryRecord>,
    pub total_count: i64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
}

impl HistoryResponse {
    /// Assembles a page, deriving `total_pages` from the row count.
    pub fn paged(data: Vec<HistoryRecord>, total_count: i64, page: u32, page_size: u32) -> Self {
        let total_pages = if total_count == 0 {
            0
        } else {
            ((total_count as u64).div_ceil(page_size as u64)) as u32
        };
        Self {
            data,
            total_count,
            page,
            page_size,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn test_register_request_parses_spec_body() {
        let req: RegisterRequest = serde_json::from_str(
            r#"{"session_id":"A7K2P","runner_name":"12345678","timestamp":1741600000000}"#,
        )
        .unwrap();
        assert_eq!(req.session_id, "A7K2P");
        assert_eq!(req.runner_name, "12345678");
        assert_eq!(req.timestamp, Some(1741600000000));
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_register_request_timestamp_optional() {
        let req: RegisterRequest =
            serde_json::from_str(r#"{"session_id":"A7K2P","runner_name":"Alice"}"#).unwrap();
        assert_eq!(req.timestamp, None);
    }

    #[test]
    fn test_register_response_wire_shape() {
        let value = serde_json::to_value(RegisterResponse {
            success: true,
            current_count: 1,
            runner_name: "12345678".into(),
        })
        .unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["current_count"], 1);
        assert_eq!(value["runner_name"], "12345678");
    }

    #[test]
    fn test_history_query_defaults() {
        let q: HistoryQuery =
            serde_json::from_str(r#"{"start_date":"2025-03-01","end_date":"2025-03-31"}"#).unwrap();
        assert_eq!(q.page, 1);
        assert_eq!(q.page_size, 50);
    }

    #[test]
    fn test_history_query_rejects_oversized_page() {
        let q: HistoryQuery = serde_json::from_str(
            r#"{"start_date":"2025-03-01","end_date":"2025-03-31","page":1,"page_size":5000}"#,
        )
        .unwrap();
        assert!(q.validate().is_err());
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let page = HistoryResponse::paged(vec![], 101, 1, 50);
        assert_eq!(page.total_pages, 3);

        let empty = HistoryResponse::paged(vec![], 0, 1, 50);
        assert_eq!(empty.total_pages, 0);

        let exact = HistoryResponse::paged(vec![], 100, 1, 50);
        assert_eq!(exact.total_pages, 2);
    }
}
