//! Common test utilities for integration tests.
//!
//! These tests run against a real PostgreSQL database. Set the
//! `TEST_DATABASE_URL` environment variable to enable them; without it each
//! test prints a notice and passes vacuously, so the suite stays green on
//! machines without a database.

#![allow(dead_code)]

use axum::Router;
use rollcall_api::{app::create_app, config::Config};
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;

/// Connect to the test database, or `None` when `TEST_DATABASE_URL` is unset.
pub async fn try_create_pool() -> Option<PgPool> {
    let database_url = std::env::var("TEST_DATABASE_URL").ok()?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&database_url)
        .await
        .expect("Failed to connect to test database");

    Some(pool)
}

/// Run migrations on the test database.
pub async fn run_migrations(pool: &PgPool) {
    sqlx::migrate!("../persistence/src/migrations")
        .run(pool)
        .await
        .expect("Failed to run migrations");
}

/// Remove all rows so each test starts from a clean slate.
pub async fn cleanup_test_data(pool: &PgPool) {
    sqlx::raw_sql("TRUNCATE attendances, runs, calendar_config RESTART IDENTITY CASCADE")
        .execute(pool)
        .await
        .expect("Failed to clean up test data");
}

/// Test secrets used across the integration suites.
pub const TEST_ADMIN_SECRET: &str = "integration-admin-secret";
pub const TEST_SIGNING_KEY: &str = "integration-signing-key";

/// Configuration for tests: permissive rate limits so suites never trip the
/// bucket, UTC so "today" is deterministic against `NOW()`.
pub fn test_config() -> Config {
    Config::load_for_test(&[
        ("database_url", "postgres://unused"),
        ("signing_key", TEST_SIGNING_KEY),
        ("admin_secret", TEST_ADMIN_SECRET),
        ("rate_limit_rps", "10000"),
        ("rate_limit_burst", "10000"),
        ("time_zone", "UTC"),
    ])
    .expect("Failed to build test config")
}

/// Build the application router against the given pool.
pub fn create_test_app(config: Config, pool: PgPool) -> Router {
    create_app(config, pool)
}
