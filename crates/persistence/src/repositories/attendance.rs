//! Attendance repository for database operations.

use async_stream::try_stream;
use chrono::{DateTime, NaiveDate, Utc};
use futures::stream::Stream;
use futures::TryStreamExt;
use sqlx::PgPool;

use crate::entities::{AttendanceEntity, HistoryRowEntity};
use crate::metrics::QueryTimer;

/// Store-level outcome of a registration attempt.
///
/// The at-most-once property comes from the UNIQUE(run_id, runner_id)
/// constraint, not from any application lock; `Duplicate` is reported iff
/// the insert affected zero rows for uniqueness reasons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterStatus {
    /// Row inserted; carries the post-insert count for the run.
    Registered(i64),
    /// The runner already has a row for this run; carries the current count.
    Duplicate(i64),
    /// No run with this id exists.
    NoSuchRun,
    /// The run exists but is not active.
    Inactive,
}

/// Repository for attendance-related database operations.
#[derive(Clone)]
pub struct AttendanceRepository {
    pool: PgPool,
}

impl AttendanceRepository {
    /// Creates a new AttendanceRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Registers one runner for one run.
    ///
    /// Runs as a single transaction: run check, conflict-suppressed insert,
    /// count read. The count returned to the caller is therefore consistent
    /// with the insert it reports on.
    pub async fn register(
        &self,
        run_id: i64,
        runner_id: &str,
        registered_at: DateTime<Utc>,
    ) -> Result<RegisterStatus, sqlx::Error> {
        let timer = QueryTimer::new("register_attendance");
        let mut tx = self.pool.begin().await?;

        let run: Option<(bool,)> = sqlx::query_as("SELECT is_active FROM runs WHERE id = $1")
            .bind(run_id)
            .fetch_optional(&mut *tx)
            .await?;

        let status = match run {
            None => RegisterStatus::NoSuchRun,
            Some((false,)) => RegisterStatus::Inactive,
            Some((true,)) => {
                let inserted = sqlx::query(
                    r#"
                    INSERT INTO attendances (run_id, runner_id, registered_at)
                    VALUES ($1, $2, $3)
                    ON CONFLICT (run_id, runner_id) DO NOTHING
                    "#,
                )
                .bind(run_id)
                .bind(runner_id)
                .bind(registered_at)
                .execute(&mut *tx)
                .await?
                .rows_affected();

                let (count,): (i64,) =
                    sqlx::query_as("SELECT COUNT(*) FROM attendances WHERE run_id = $1")
                        .bind(run_id)
                        .fetch_one(&mut *tx)
                        .await?;

                if inserted == 0 {
                    RegisterStatus::Duplicate(count)
                } else {
                    RegisterStatus::Registered(count)
                }
            }
        };

        tx.commit().await?;
        timer.record();
        Ok(status)
    }

    /// Current attendance count for a run.
    pub async fn count_for_run(&self, run_id: i64) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM attendances WHERE run_id = $1")
                .bind(run_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// All attendances for a run in check-in order.
    pub async fn list_for_run(&self, run_id: i64) -> Result<Vec<AttendanceEntity>, sqlx::Error> {
        sqlx::query_as::<_, AttendanceEntity>(
            r#"
            SELECT id, run_id, runner_id, registered_at
            FROM attendances
            WHERE run_id = $1
            ORDER BY registered_at ASC, id ASC
            "#,
        )
        .bind(run_id)
        .fetch_all(&self.pool)
        .await
    }

    /// One page of joined history rows, newest run first, check-ins in
    /// arrival order within a run. An inverted window matches nothing.
    pub async fn history_page(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<HistoryRowEntity>, sqlx::Error> {
        let timer = QueryTimer::new("history_page");
        let result = sqlx::query_as::<_, HistoryRowEntity>(
            r#"
            SELECT a.id, r.date AS run_date, r.session_code, a.runner_id, a.registered_at
            FROM attendances a
            JOIN runs r ON r.id = a.run_id
            WHERE r.date BETWEEN $1 AND $2
            ORDER BY r.date DESC, a.registered_at ASC, a.id ASC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(start)
        .bind(end)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Total number of history rows in the window.
    pub async fn history_total(&self, start: NaiveDate, end: NaiveDate) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM attendances a
            JOIN runs r ON r.id = a.run_id
            WHERE r.date BETWEEN $1 AND $2
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Lazily streams history rows for export.
    ///
    /// The cursor is driven as rows are consumed, so memory stays bounded no
    /// matter how wide the window is.
    pub fn stream_history(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> impl Stream<Item = Result<HistoryRowEntity, sqlx::Error>> + Send + 'static {
        let pool = self.pool.clone();
        try_stream! {
            let mut rows = sqlx::query_as::<_, HistoryRowEntity>(
                r#"
                SELECT a.id, r.date AS run_date, r.session_code, a.runner_id, a.registered_at
                FROM attendances a
                JOIN runs r ON r.id = a.run_id
                WHERE r.date BETWEEN $1 AND $2
                ORDER BY r.date DESC, a.registered_at ASC, a.id ASC
                "#,
            )
            .bind(start)
            .bind(end)
            .fetch(&pool);

            while let Some(row) = rows.try_next().await? {
                yield row;
            }
        }
    }
}
