//! Fixed-period request pacing.
//!
//! [`Pacer`] admits one request per period with no burst allowance, so a loop
//! that calls [`Pacer::wait`] before every provider request sends them at most
//! once per period. The first request goes out immediately. The period never
//! changes: there is no backoff and no reaction to errors.

use std::time::Duration;

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use nonzero_ext::nonzero;

/// Spaces provider requests a fixed period apart.
pub struct Pacer {
    period: Duration,
    limiter: Option<DefaultDirectRateLimiter>,
}

impl Pacer {
    /// Paces requests `period` apart. A zero period disables pacing.
    pub fn new(period: Duration) -> Self {
        let limiter = Quota::with_period(period)
            .map(|quota| RateLimiter::direct(quota.allow_burst(nonzero!(1u32))));
        Self { period, limiter }
    }

    /// A pacer that never waits.
    pub fn unpaced() -> Self {
        Self::new(Duration::ZERO)
    }

    /// The configured spacing between requests.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Waits until the next request may be sent.
    pub async fn wait(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }
    }
}

impl std::fmt::Debug for Pacer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pacer").field("period", &self.period).finish()
    }
}
