use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{
    metrics_handler, metrics_middleware, registration_rate_limit, require_admin, trace_id,
    RateLimiterState,
};
use crate::routes::{attendance, calendar, events, export, health, qr, register};
use domain::events::EventBus;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    /// Tally fan-out to connected dashboards.
    pub bus: EventBus,
    /// Per-remote-address token bucket for the registration endpoint.
    pub rate_limiter: Arc<RateLimiterState>,
}

pub fn create_app(config: Config, pool: PgPool) -> Router {
    let config = Arc::new(config);

    let state = AppState {
        pool,
        config: config.clone(),
        bus: EventBus::new(config.event_bus_capacity),
        rate_limiter: Arc::new(RateLimiterState::new(
            config.rate_limit_rps,
            config.rate_limit_burst,
        )),
    };

    // Build CORS layer from the allowlist; an empty list (or "*") stays
    // permissive for development.
    let origins = config.origins();
    let cors = if origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        use tower_http::cors::AllowOrigin;
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Registration is the one write endpoint open to the public; it gets the
    // per-address token bucket.
    let registration_routes = Router::new()
        .route("/api/register", post(register::register))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            registration_rate_limit,
        ));

    // Admin surface (calendar configuration), gated by the shared secret.
    let admin_routes = Router::new()
        .route("/api/calendar/configure", post(calendar::configure))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    // Public read surface.
    let public_routes = Router::new()
        .route("/api/calendar", get(calendar::month))
        .route("/api/calendar/today", get(calendar::today))
        .route("/api/attendance/today", get(attendance::today))
        .route("/api/attendance/history", get(attendance::history))
        .route("/api/attendance/export", get(export::export))
        .route("/api/qr/:session_code", get(qr::qr_image))
        .route("/api/qr/validate/:token", get(qr::validate_token))
        .route("/health", get(health::health_check))
        .route("/metrics", get(metrics_handler));

    // Subscriber transport. Merged after the timeout layer: the connection
    // is long-lived and must not be cut off at the request timeout.
    let subscriber_routes = Router::new().route("/events", get(events::events_handler));

    Router::new()
        .merge(registration_routes)
        .merge(admin_routes)
        .merge(public_routes)
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.request_timeout_secs,
        )))
        .merge(subscriber_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}
