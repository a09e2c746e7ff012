//! The registration hot path.
//!
//! At-most-once per (run, runner) is delegated entirely to the database's
//! uniqueness constraint; no application lock exists, so any number of
//! workers can run this path concurrently. Events are published strictly
//! after the store transaction commits, so subscribers never see a count
//! that is later rolled back.

use chrono::Utc;
use chrono_tz::Tz;
use domain::events::{EventBus, TallyEvent};
use domain::models::RegisterOutcome;
use persistence::db::is_transient;
use persistence::repositories::{AttendanceRepository, RegisterStatus, RunRepository};
use sqlx::PgPool;
use std::time::Duration;

use crate::config::Config;
use crate::middleware::metrics;
use crate::services::code_issuer::CodeIssuer;

/// Admits registrations keyed by session code or signed QR token.
pub struct RegistrationEngine {
    runs: RunRepository,
    attendance: AttendanceRepository,
    issuer: CodeIssuer,
    bus: EventBus,
    tz: Tz,
    max_runner_id_len: usize,
    commit_timeout: Duration,
}

impl RegistrationEngine {
    pub fn new(pool: PgPool, config: &Config, bus: EventBus) -> Self {
        Self {
            runs: RunRepository::new(pool.clone()),
            attendance: AttendanceRepository::new(pool.clone()),
            issuer: CodeIssuer::new(RunRepository::new(pool), config),
            bus,
            tz: config.tz(),
            max_runner_id_len: config.max_runner_id_len,
            commit_timeout: Duration::from_secs(config.commit_timeout_secs),
        }
    }

    /// Attempts to register `runner_id` for the session identified by
    /// `code_or_token`.
    ///
    /// Validation failures and closed sessions come back as outcomes;
    /// transient store trouble comes back as `Retryable`. Only non-transient
    /// unexpected store errors surface as `Err` (the gateway turns those into
    /// `Internal`).
    pub async fn register(
        &self,
        code_or_token: &str,
        runner_id: &str,
    ) -> Result<RegisterOutcome, sqlx::Error> {
        // Normalisation happens before any store access.
        let runner_id =
            match shared::validation::normalize_runner_id(runner_id, self.max_runner_id_len) {
                Ok(id) => id,
                Err(err) => return Ok(RegisterOutcome::Invalid(err.to_string())),
            };

        let session_code = if shared::token::looks_like_token(code_or_token) {
            match self.issuer.verify_qr_token(code_or_token) {
                Ok(code) => code,
                Err(err) => {
                    tracing::debug!(reason = %err, "QR token rejected");
                    return Ok(RegisterOutcome::BadSession);
                }
            }
        } else {
            code_or_token.trim().to_string()
        };

        let run = match self.runs.find_by_code(&session_code).await {
            Ok(Some(run)) => run,
            Ok(None) => return Ok(RegisterOutcome::BadSession),
            Err(err) => return transient_or(err),
        };

        if !run.is_active {
            return Ok(RegisterOutcome::SessionClosed);
        }

        // A session code must not admit late check-ins days after the run.
        let today = Utc::now().with_timezone(&self.tz).date_naive();
        if run.date != today {
            return Ok(RegisterOutcome::SessionClosed);
        }

        let attempt = tokio::time::timeout(
            self.commit_timeout,
            self.attendance.register(run.id, &runner_id, Utc::now()),
        )
        .await;

        let status = match attempt {
            Err(_elapsed) => {
                tracing::warn!(run_id = run.id, "Registration transaction timed out");
                return Ok(RegisterOutcome::Retryable);
            }
            Ok(Err(err)) => return transient_or(err),
            Ok(Ok(status)) => status,
        };

        match status {
            RegisterStatus::Registered(count) => {
                metrics::record_registration();
                self.publish_after_commit(run.id, count, &runner_id);
                Ok(RegisterOutcome::Registered(count))
            }
            RegisterStatus::Duplicate(count) => {
                metrics::record_duplicate_registration();
                Ok(RegisterOutcome::AlreadyRegistered(count))
            }
            // The run vanished or flipped inactive between lookup and commit.
            RegisterStatus::NoSuchRun => Ok(RegisterOutcome::BadSession),
            RegisterStatus::Inactive => Ok(RegisterOutcome::SessionClosed),
        }
    }

    /// Publishes the tally events for a committed registration. A publish
    /// that reaches nobody degrades freshness, not correctness, so failures
    /// never propagate to the registering caller.
    fn publish_after_commit(&self, run_id: i64, count: i64, runner_name: &str) {
        self.bus.publish(TallyEvent::TallyUpdate { run_id, count });
        self.bus.publish(TallyEvent::RegistrationSuccess {
            run_id,
            count,
            runner_name: runner_name.to_string(),
        });
        metrics::record_subscriber_count(self.bus.subscriber_count());
    }
}

fn transient_or(err: sqlx::Error) -> Result<RegisterOutcome, sqlx::Error> {
    if is_transient(&err) {
        Ok(RegisterOutcome::Retryable)
    } else {
        Err(err)
    }
}
