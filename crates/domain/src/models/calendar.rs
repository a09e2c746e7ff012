//! Calendar wire DTOs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Request payload for `POST /api/calendar/configure`.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigureDayRequest {
    pub date: NaiveDate,
    pub has_run: bool,
}

/// Response payload for `POST /api/calendar/configure`.
///
/// `session_code` is present whenever the date has a run (newly materialised
/// or pre-existing) and absent when the day was switched off.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigureDayResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_code: Option<String>,
}

/// Query parameters for `GET /api/calendar`.
#[derive(Debug, Clone, Deserialize)]
pub struct MonthQuery {
    /// Month selector in `YYYY-MM` form.
    pub month: String,
}

/// One configured day in the monthly overview.
#[derive(Debug, Clone, Serialize)]
pub struct CalendarDaySummary {
    pub date: NaiveDate,
    pub has_run: bool,
    pub attendance_count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_code: Option<String>,
}

/// Response payload for `GET /api/calendar`.
#[derive(Debug, Clone, Serialize)]
pub struct MonthResponse {
    pub data: Vec<CalendarDaySummary>,
}

/// Response payload for `GET /api/calendar/today`.
#[derive(Debug, Clone, Serialize)]
pub struct TodayResponse {
    pub has_run: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_code: Option<String>,
    pub attendance_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configure_response_omits_absent_code() {
        let off = serde_json::to_value(ConfigureDayResponse { session_code: None }).unwrap();
        assert!(off.get("session_code").is_none());

        let on = serde_json::to_value(ConfigureDayResponse {
            session_code: Some("A7K2P".into()),
        })
        .unwrap();
        assert_eq!(on["session_code"], "A7K2P");
    }

    #[test]
    fn test_today_response_shape() {
        let value = serde_json::to_value(TodayResponse {
            has_run: true,
            session_code: Some("A7K2P".into()),
            attendance_count: 4,
        })
        .unwrap();
        assert_eq!(value["has_run"], true);
        assert_eq!(value["attendance_count"], 4);
    }

    #[test]
    fn test_configure_request_parses_iso_date() {
        let req: ConfigureDayRequest =
            serde_json::from_str(r#"{"date":"2025-03-10","has_run":true}"#).unwrap();
        assert_eq!(req.date, NaiveDate::from_ymd_opt(2025, 3, 10).unwrap());
        assert!(req.has_run);
    }
}
