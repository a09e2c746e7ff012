//! Rate limiting middleware.
//!
//! Applies a per-remote-address token bucket to the registration endpoint.
//! A client over its bucket is refused before the request reaches the store.

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter as GovRateLimiter,
};
use std::{
    collections::HashMap,
    net::{IpAddr, SocketAddr},
    num::NonZeroU32,
    sync::RwLock,
};
use std::sync::Arc;

use crate::app::AppState;
use crate::error::ApiError;

/// Type alias for the rate limiter used per remote address.
type AddrRateLimiter = GovRateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Rate limiter state shared across all requests.
///
/// One token bucket per remote address: tokens refill at `refill_per_minute`
/// and the bucket holds at most `burst` tokens.
pub struct RateLimiterState {
    limiters: RwLock<HashMap<IpAddr, Arc<AddrRateLimiter>>>,
    refill_per_minute: u32,
    burst: u32,
}

impl RateLimiterState {
    pub fn new(refill_per_minute: u32, burst: u32) -> Self {
        Self {
            limiters: RwLock::new(HashMap::new()),
            refill_per_minute,
            burst,
        }
    }

    /// Get or create the limiter for the given remote address.
    fn get_or_create_limiter(&self, addr: IpAddr) -> Arc<AddrRateLimiter> {
        {
            let limiters = self.limiters.read().unwrap();
            if let Some(limiter) = limiters.get(&addr) {
                return limiter.clone();
            }
        }

        let mut limiters = self.limiters.write().unwrap();

        // Double-check in case another thread created it
        if let Some(limiter) = limiters.get(&addr) {
            return limiter.clone();
        }

        let refill = NonZeroU32::new(self.refill_per_minute)
            .unwrap_or_else(|| NonZeroU32::new(10).unwrap());
        let burst = NonZeroU32::new(self.burst).unwrap_or(refill);
        let quota = Quota::per_minute(refill).allow_burst(burst);
        let limiter = Arc::new(GovRateLimiter::direct(quota));
        limiters.insert(addr, limiter.clone());
        limiter
    }

    /// Check whether a request from the given address should be admitted.
    pub fn check(&self, addr: IpAddr) -> Result<(), ()> {
        self.get_or_create_limiter(addr).check().map_err(|_| ())
    }
}

impl std::fmt::Debug for RateLimiterState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiterState")
            .field("refill_per_minute", &self.refill_per_minute)
            .field("burst", &self.burst)
            .field("active_limiters", &self.limiters.read().unwrap().len())
            .finish()
    }
}

/// Middleware that applies the registration token bucket.
pub async fn registration_rate_limit(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let addr = remote_addr(&req);
    if state.rate_limiter.check(addr).is_err() {
        tracing::debug!(remote = %addr, "Registration attempt rate limited");
        return ApiError::RateLimited.into_response();
    }
    next.run(req).await
}

/// The client's remote address: the first `X-Forwarded-For` hop when the
/// service sits behind a proxy, otherwise the socket peer address.
fn remote_addr(req: &Request<Body>) -> IpAddr {
    if let Some(forwarded) = req
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|v| v.trim().parse::<IpAddr>().ok())
    {
        return forwarded;
    }

    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::from([0, 0, 0, 0]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(last: u8) -> IpAddr {
        IpAddr::from([10, 0, 0, last])
    }

    #[test]
    fn test_allows_within_burst() {
        let state = RateLimiterState::new(10, 20);
        for _ in 0..20 {
            assert!(state.check(addr(1)).is_ok());
        }
    }

    #[test]
    fn test_rejects_beyond_burst() {
        let state = RateLimiterState::new(10, 20);
        for _ in 0..20 {
            let _ = state.check(addr(2));
        }
        assert!(state.check(addr(2)).is_err());
    }

    #[test]
    fn test_addresses_are_independent() {
        let state = RateLimiterState::new(10, 1);
        assert!(state.check(addr(3)).is_ok());
        assert!(state.check(addr(3)).is_err());
        assert!(state.check(addr(4)).is_ok());
    }

    #[test]
    fn test_debug_output() {
        let state = RateLimiterState::new(10, 20);
        let debug = format!("{:?}", state);
        assert!(debug.contains("RateLimiterState"));
        assert!(debug.contains("refill_per_minute"));
    }
}
