//! Client-side rate limiting.
//!
//! The service allows five requests per second per base; the limiter spaces
//! requests so that bursts from pagination stay within that.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::clock::{Clock, DefaultClock};
use governor::middleware::NoOpMiddleware;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as Governor};
use tracing::trace;

/// Configuration for rate limiting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Maximum number of requests per second.
    pub requests_per_second: u32,
    /// Requests allowed back to back before spacing kicks in.
    pub burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: 5,
            burst_size: 1,
        }
    }
}

impl RateLimitConfig {
    pub fn new(requests_per_second: u32, burst_size: u32) -> Self {
        Self {
            requests_per_second,
            burst_size,
        }
    }
}

/// Token bucket rate limiter shared by all clones.
#[derive(Clone)]
pub struct RateLimiter {
    limiter: Arc<Governor<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>>,
    clock: DefaultClock,
}

impl RateLimiter {
    /// Create a limiter. Zero rates are treated as one.
    pub fn new(config: &RateLimitConfig) -> Self {
        let per_second = NonZeroU32::new(config.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(config.burst_size).unwrap_or(NonZeroU32::MIN);
        let quota = Quota::per_second(per_second).allow_burst(burst);

        let clock = DefaultClock::default();
        Self {
            limiter: Arc::new(Governor::direct_with_clock(quota, &clock)),
            clock,
        }
    }

    /// Block the current thread until a request may be made.
    pub fn wait(&self) {
        while let Err(not_until) = self.limiter.check() {
            let delay: Duration = not_until.wait_time_from(self.clock.now());
            trace!(?delay, "waiting for rate limiter");
            std::thread::sleep(delay);
        }
    }

    /// Take a permit if one is available right now.
    pub fn try_acquire(&self) -> bool {
        self.limiter.check().is_ok()
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn default_is_five_per_second() {
        let config = RateLimitConfig::default();
        assert_eq!(config.requests_per_second, 5);
        assert_eq!(config.burst_size, 1);
    }

    #[test]
    fn allows_burst_then_refuses() {
        let limiter = RateLimiter::new(&RateLimitConfig::new(1, 3));
        for _ in 0..3 {
            assert!(limiter.try_acquire());
        }
        assert!(!limiter.try_acquire());
    }

    #[test]
    fn wait_spaces_requests() {
        let limiter = RateLimiter::new(&RateLimitConfig::new(50, 1));
        let start = Instant::now();
        for _ in 0..3 {
            limiter.wait();
        }
        // First permit is immediate, the next two are 20ms apart.
        assert!(start.elapsed() >= Duration::from_millis(35));
    }

    #[test]
    fn zero_rate_is_clamped() {
        let limiter = RateLimiter::new(&RateLimitConfig::new(0, 0));
        assert!(limiter.try_acquire());
    }

    #[test]
    fn clones_share_the_bucket() {
        let limiter = RateLimiter::new(&RateLimitConfig::new(1, 1));
        let other = limiter.clone();
        assert!(limiter.try_acquire());
        assert!(!other.try_acquire());
    }
}
