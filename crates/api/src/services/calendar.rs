//! Calendar management: translating "date D has a run" into a materialised
//! run with a discoverable session code.

use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use domain::models::{CalendarDaySummary, Run, TodayResponse};
use persistence::repositories::{
    is_code_collision, AttendanceRepository, CalendarRepository, RunRepository,
};
use sqlx::PgPool;
use thiserror::Error;

use crate::config::Config;
use crate::services::code_issuer::{CodeIssuer, IssueError};

/// How often the configure path retries when a freshly generated code loses
/// the race against a concurrent insert.
const MAX_CONFIGURE_ATTEMPTS: usize = 4;

#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("month must be formatted as YYYY-MM")]
    BadMonth,
    #[error(transparent)]
    Issue(#[from] IssueError),
    #[error(transparent)]
    Store(#[from] sqlx::Error),
}

/// Orchestrates calendar configuration and date-keyed queries.
pub struct CalendarService {
    calendar: CalendarRepository,
    runs: RunRepository,
    attendance: AttendanceRepository,
    issuer: CodeIssuer,
    tz: Tz,
}

impl CalendarService {
    pub fn new(pool: PgPool, config: &Config) -> Self {
        Self {
            calendar: CalendarRepository::new(pool.clone()),
            runs: RunRepository::new(pool.clone()),
            attendance: AttendanceRepository::new(pool.clone()),
            issuer: CodeIssuer::new(RunRepository::new(pool), config),
            tz: config.tz(),
        }
    }

    /// Today's date in the service time zone. "Today" flips at local
    /// midnight, never at UTC midnight.
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.tz).date_naive()
    }

    /// Sets `has_run` for a date.
    ///
    /// Enabling materialises a run (idempotently: reconfiguring an existing
    /// day returns the same run and code). Disabling deactivates the run but
    /// keeps it and its attendances for history. Past dates are legal; they
    /// produce retro-marked runs that admit no new registrations because
    /// registration is gated on "today".
    pub async fn configure(
        &self,
        date: NaiveDate,
        has_run: bool,
    ) -> Result<Option<Run>, CalendarError> {
        if !has_run {
            let run = self.calendar.upsert_day(date, false, None).await?;
            if run.is_some() {
                tracing::info!(%date, "Run day disabled");
            }
            return Ok(run.map(Run::from));
        }

        let mut attempts = 0;
        loop {
            let code = self.issuer.new_session_code().await?;
            match self.calendar.upsert_day(date, true, Some(&code)).await {
                Ok(run) => {
                    let run = run.map(Run::from);
                    if let Some(ref run) = run {
                        tracing::info!(%date, session_code = %run.session_code, "Run day enabled");
                    }
                    return Ok(run);
                }
                Err(err) if is_code_collision(&err) && attempts < MAX_CONFIGURE_ATTEMPTS => {
                    attempts += 1;
                    tracing::debug!(%date, attempts, "Session code raced an existing run, retrying");
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Today's status: whether a run exists, its code, and the current tally.
    pub async fn today_status(&self) -> Result<TodayResponse, sqlx::Error> {
        let day = self.today();
        let run = self.runs.find_by_date(day).await?;

        match run {
            Some(run) if run.is_active => {
                let count = self.attendance.count_for_run(run.id).await?;
                Ok(TodayResponse {
                    has_run: true,
                    session_code: Some(run.session_code),
                    attendance_count: count,
                })
            }
            _ => Ok(TodayResponse {
                has_run: false,
                session_code: None,
                attendance_count: 0,
            }),
        }
    }

    /// Monthly overview for `YYYY-MM`.
    pub async fn month(&self, month: &str) -> Result<Vec<CalendarDaySummary>, CalendarError> {
        let (start, end) = shared::validation::month_window(month).ok_or(CalendarError::BadMonth)?;
        let rows = self.calendar.month_overview(start, end).await?;
        Ok(rows.into_iter().map(CalendarDaySummary::from).collect())
    }
}
