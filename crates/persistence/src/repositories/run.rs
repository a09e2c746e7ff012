//! Run repository for database operations.

use chrono::NaiveDate;
use sqlx::PgPool;

use crate::entities::RunEntity;
use crate::metrics::QueryTimer;

/// Repository for run-related point lookups.
#[derive(Clone)]
pub struct RunRepository {
    pool: PgPool,
}

impl RunRepository {
    /// Creates a new RunRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Look up the run scheduled for a given date, if any.
    pub async fn find_by_date(&self, date: NaiveDate) -> Result<Option<RunEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_run_by_date");
        let result = sqlx::query_as::<_, RunEntity>(
            r#"
            SELECT id, date, session_code, is_active, created_at
            FROM runs
            WHERE date = $1
            "#,
        )
        .bind(date)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Look up a run by its session code.
    pub async fn find_by_code(&self, session_code: &str) -> Result<Option<RunEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_run_by_code");
        let result = sqlx::query_as::<_, RunEntity>(
            r#"
            SELECT id, date, session_code, is_active, created_at
            FROM runs
            WHERE session_code = $1
            "#,
        )
        .bind(session_code)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Returns true when the session code is already taken by any run,
    /// past or present. Codes are unique across history.
    pub async fn code_exists(&self, session_code: &str) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM runs WHERE session_code = $1)")
                .bind(session_code)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }
}
