//! HTTP middleware components.

pub mod admin;
pub mod logging;
pub mod metrics;
pub mod rate_limit;
pub mod trace_id;

pub use admin::require_admin;
pub use metrics::{init_metrics, metrics_handler, metrics_middleware};
pub use rate_limit::{registration_rate_limit, RateLimiterState};
pub use trace_id::{trace_id, RequestId, REQUEST_ID_HEADER};
