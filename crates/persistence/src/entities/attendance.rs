//! Attendance entities (database row mappings).

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

/// Database row mapping for the attendances table.
#[derive(Debug, Clone, FromRow)]
pub struct AttendanceEntity {
    pub id: i64,
    pub run_id: i64,
    pub runner_id: String,
    pub registered_at: DateTime<Utc>,
}

impl From<AttendanceEntity> for domain::models::Attendance {
    fn from(entity: AttendanceEntity) -> Self {
        Self {
            id: entity.id,
            run_id: entity.run_id,
            runner_id: entity.runner_id,
            registered_at: entity.registered_at,
        }
    }
}

/// One attendance row joined with its run, as used by history and export.
#[derive(Debug, Clone, FromRow)]
pub struct HistoryRowEntity {
    pub id: i64,
    pub run_date: NaiveDate,
    pub session_code: String,
    pub runner_id: String,
    pub registered_at: DateTime<Utc>,
}

impl From<HistoryRowEntity> for domain::models::HistoryRecord {
    fn from(entity: HistoryRowEntity) -> Self {
        Self {
            id: entity.id,
            run_date: entity.run_date,
            session_code: entity.session_code,
            runner_name: entity.runner_id,
            registered_at: entity.registered_at,
        }
    }
}
