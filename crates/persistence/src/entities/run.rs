//! Run entity (database row mapping).

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

/// Database row mapping for the runs table.
#[derive(Debug, Clone, FromRow)]
pub struct RunEntity {
    pub id: i64,
    pub date: NaiveDate,
    pub session_code: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<RunEntity> for domain::models::Run {
    fn from(entity: RunEntity) -> Self {
        Self {
            id: entity.id,
            date: entity.date,
            session_code: entity.session_code,
            is_active: entity.is_active,
            created_at: entity.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_converts_to_domain_model() {
        let entity = RunEntity {
            id: 42,
            date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            session_code: "A7K2P".into(),
            is_active: true,
            created_at: Utc::now(),
        };
        let run: domain::models::Run = entity.clone().into();
        assert_eq!(run.id, 42);
        assert_eq!(run.session_code, "A7K2P");
        assert_eq!(run.date, entity.date);
        assert!(run.is_active);
    }
}
