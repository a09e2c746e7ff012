//! Calendar entities (database row mappings).

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

/// Database row mapping for the calendar_config table.
#[derive(Debug, Clone, FromRow)]
pub struct CalendarDayEntity {
    pub date: NaiveDate,
    pub has_run: bool,
    pub updated_at: DateTime<Utc>,
}

/// One calendar day joined with its run and attendance count, as produced by
/// the monthly overview query.
#[derive(Debug, Clone, FromRow)]
pub struct MonthDayRow {
    pub date: NaiveDate,
    pub has_run: bool,
    pub session_code: Option<String>,
    pub attendance_count: i64,
}

impl From<MonthDayRow> for domain::models::CalendarDaySummary {
    fn from(row: MonthDayRow) -> Self {
        Self {
            date: row.date,
            has_run: row.has_run,
            attendance_count: row.attendance_count,
            session_code: row.session_code,
        }
    }
}
