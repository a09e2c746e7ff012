//! Run domain model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A scheduled attendance-taking session on a specific date.
///
/// At most one run exists per calendar date; the session code is unique
/// across all runs ever created. Runs are never deleted while attendances
/// reference them; closing a day only clears `is_active`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    pub id: i64,
    pub date: NaiveDate,
    pub session_code: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_serialises_snake_case() {
        let run = Run {
            id: 1,
            date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            session_code: "A7K2P".into(),
            is_active: true,
            created_at: Utc::now(),
        };
        let value = serde_json::to_value(&run).unwrap();
        assert_eq!(value["session_code"], "A7K2P");
        assert_eq!(value["is_active"], true);
        assert_eq!(value["date"], "2025-03-10");
    }
}
