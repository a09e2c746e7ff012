use anyhow::Result;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::info;

mod app;
mod config;
mod error;
mod extractors;
mod middleware;
mod routes;
mod services;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Load configuration
    let config = config::Config::load()?;

    // Initialize logging
    middleware::logging::init_logging(&config.log_level, &config.log_format);

    // Initialize Prometheus metrics
    middleware::metrics::init_metrics();

    info!("Starting Rollcall v{}", env!("CARGO_PKG_VERSION"));
    info!(time_zone = %config.time_zone, "Run days interpreted in configured zone");

    // Create database pool
    let db_config = persistence::db::DatabaseConfig {
        url: config.database_url.clone(),
        max_connections: config.database_max_connections,
        min_connections: config.database_min_connections,
        connect_timeout_secs: config.database_connect_timeout_secs,
    };
    let pool = persistence::db::create_pool(&db_config).await?;

    // Sample connection pool gauges every 10 seconds
    let metrics_pool = pool.clone();
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(Duration::from_secs(10));
        loop {
            tick.tick().await;
            persistence::metrics::record_pool_metrics(&metrics_pool);
        }
    });

    // Run migrations
    info!("Running database migrations...");
    sqlx::migrate!("../persistence/src/migrations")
        .run(&pool)
        .await?;
    info!("Migrations completed");

    // Build application
    let app = app::create_app(config.clone(), pool);

    // Start server
    let addr = config.socket_addr();
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Handle shutdown gracefully
    let shutdown_signal = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C signal handler");
        info!("Received shutdown signal");
    };

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal)
    .await?;

    info!("Server shutdown complete");
    Ok(())
}
