//! Rate limiting implementation
//!
//! Uses the governor crate to keep API usage inside HubSpot's daily
//! call allowance. The quota is spread evenly across the day rather
//! than reset at midnight, so a burst can never consume hours of
//! budget at once.

use governor::clock::DefaultClock;
use governor::middleware::NoOpMiddleware;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as Governor};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

const SECONDS_PER_DAY: u64 = 86_400;

/// Token bucket limiter replenishing one call per daily interval
#[derive(Clone)]
pub struct DailyRateLimiter {
    limiter: Arc<Governor<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>>,
    calls_per_day: u32,
}

impl DailyRateLimiter {
    /// Create a limiter spacing `calls_per_day` requests evenly across
    /// the day. Zero is treated as one call per day.
    pub fn new(calls_per_day: u32) -> Self {
        let calls = NonZeroU32::new(calls_per_day).unwrap_or(NonZeroU32::MIN);
        let interval = Duration::from_secs(SECONDS_PER_DAY) / calls.get();
        let quota = match Quota::with_period(interval) {
            Some(quota) => quota,
            // Interval only rounds to zero for absurd quotas; fall back
            // to an effectively unlimited refill.
            None => Quota::per_second(NonZeroU32::MAX),
        };

        Self {
            limiter: Arc::new(Governor::direct(quota)),
            calls_per_day: calls.get(),
        }
    }

    /// The configured daily allowance
    pub fn calls_per_day(&self) -> u32 {
        self.calls_per_day
    }

    /// Wait until the next call is allowed
    pub async fn wait(&self) {
        self.limiter.until_ready().await;
    }

    /// Try to acquire a permit, returning immediately
    pub fn try_acquire(&self) -> bool {
        self.limiter.check().is_ok()
    }
}

impl std::fmt::Debug for DailyRateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DailyRateLimiter")
            .field("calls_per_day", &self.calls_per_day)
            .finish()
    }
}

#[cfg(test)]
mod rate_limit_tests {
    use super::*;

    #[test]
    fn test_zero_calls_treated_as_one() {
        let limiter = DailyRateLimiter::new(0);
        assert_eq!(limiter.calls_per_day(), 1);
    }

    #[test]
    fn test_first_call_allowed_immediately() {
        let limiter = DailyRateLimiter::new(100);
        assert!(limiter.try_acquire());
    }

    #[test]
    fn test_second_call_blocked_on_small_quota() {
        let limiter = DailyRateLimiter::new(2);
        assert!(limiter.try_acquire());
        // Next slot is twelve hours away
        assert!(!limiter.try_acquire());
    }

    #[tokio::test]
    async fn test_wait_within_burst() {
        let limiter = DailyRateLimiter::new(1_000_000);
        limiter.wait().await;
    }
}
