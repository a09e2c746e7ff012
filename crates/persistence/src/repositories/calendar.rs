//! Calendar repository for database operations.

use chrono::NaiveDate;
use sqlx::PgPool;

use crate::entities::{CalendarDayEntity, MonthDayRow, RunEntity};
use crate::metrics::QueryTimer;

/// Repository for calendar-day configuration and run materialisation.
#[derive(Clone)]
pub struct CalendarRepository {
    pool: PgPool,
}

impl CalendarRepository {
    /// Creates a new CalendarRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Sets `has_run` for a date and keeps the runs table in step, all in one
    /// transaction.
    ///
    /// Enabling a day inserts a run with `session_code` if none exists for
    /// that date (re-enabling an existing run reactivates it and keeps its
    /// original code). Disabling marks the run inactive but never deletes it.
    /// Returns the run for the date when one exists after the call.
    ///
    /// A unique violation on `runs.session_code` bubbles up as a database
    /// error; the caller retries with a freshly generated code.
    pub async fn upsert_day(
        &self,
        date: NaiveDate,
        has_run: bool,
        session_code: Option<&str>,
    ) -> Result<Option<RunEntity>, sqlx::Error> {
        let timer = QueryTimer::new("upsert_calendar_day");
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO calendar_config (date, has_run, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (date) DO UPDATE SET has_run = $2, updated_at = NOW()
            "#,
        )
        .bind(date)
        .bind(has_run)
        .execute(&mut *tx)
        .await?;

        let run = if has_run {
            sqlx::query(
                r#"
                INSERT INTO runs (date, session_code, is_active)
                VALUES ($1, $2, TRUE)
                ON CONFLICT (date) DO UPDATE SET is_active = TRUE
                "#,
            )
            .bind(date)
            .bind(session_code)
            .execute(&mut *tx)
            .await?;

            sqlx::query_as::<_, RunEntity>(
                r#"
                SELECT id, date, session_code, is_active, created_at
                FROM runs
                WHERE date = $1
                "#,
            )
            .bind(date)
            .fetch_optional(&mut *tx)
            .await?
        } else {
            sqlx::query_as::<_, RunEntity>(
                r#"
                UPDATE runs SET is_active = FALSE
                WHERE date = $1
                RETURNING id, date, session_code, is_active, created_at
                "#,
            )
            .bind(date)
            .fetch_optional(&mut *tx)
            .await?
        };

        tx.commit().await?;
        timer.record();
        Ok(run)
    }

    /// Fetch the configuration row for a single date.
    pub async fn get_day(&self, date: NaiveDate) -> Result<Option<CalendarDayEntity>, sqlx::Error> {
        sqlx::query_as::<_, CalendarDayEntity>(
            r#"
            SELECT date, has_run, updated_at
            FROM calendar_config
            WHERE date = $1
            "#,
        )
        .bind(date)
        .fetch_optional(&self.pool)
        .await
    }

    /// Monthly overview: every configured day in the window joined with its
    /// run's session code and attendance count.
    pub async fn month_overview(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<MonthDayRow>, sqlx::Error> {
        let timer = QueryTimer::new("month_overview");
        let result = sqlx::query_as::<_, MonthDayRow>(
            r#"
            SELECT c.date,
                   c.has_run,
                   r.session_code,
                   COUNT(a.id) AS attendance_count
            FROM calendar_config c
            LEFT JOIN runs r ON r.date = c.date
            LEFT JOIN attendances a ON a.run_id = r.id
            WHERE c.date BETWEEN $1 AND $2
            GROUP BY c.date, c.has_run, r.session_code
            ORDER BY c.date
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}

/// Returns true when the error is a unique violation on the session code,
/// i.e. the generated code collided with an existing run.
pub fn is_code_collision(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err.code().as_deref() == Some("23505")
                && db_err.constraint() == Some("runs_session_code_key")
        }
        _ => false,
    }
}
