use std::num::NonZeroU32;
use std::sync::Arc;

use governor::clock::DefaultClock;
use governor::state::direct::NotKeyed;
use governor::state::InMemoryState;
use governor::{Quota, RateLimiter};

/// Fallback rate when the caller asks for zero or negative throughput.
pub const DEFAULT_REQUESTS_PER_SECOND: u32 = 1;

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Token-bucket throttle owned by one provider instance.
///
/// Callers wait for a token; nothing is queued, prioritized or rejected.
#[derive(Clone)]
pub struct RequestThrottle {
    limiter: Arc<DirectRateLimiter>,
    per_second: u32,
}

impl RequestThrottle {
    /// `requests_per_second <= 0` falls back to one request per second; rates
    /// beyond `u32::MAX` saturate.
    pub fn per_second(requests_per_second: i64) -> Self {
        let fallback = NonZeroU32::new(DEFAULT_REQUESTS_PER_SECOND).unwrap_or(NonZeroU32::MIN);
        let per_second = if requests_per_second <= 0 {
            fallback
        } else {
            u32::try_from(requests_per_second)
                .ok()
                .and_then(NonZeroU32::new)
                .unwrap_or(NonZeroU32::MAX)
        };

        Self {
            limiter: Arc::new(RateLimiter::direct(Quota::per_second(per_second))),
            per_second: per_second.get(),
        }
    }

    pub const fn rate(&self) -> u32 {
        self.per_second
    }

    /// Suspends until a token is available. Dropping the future abandons the wait.
    pub async fn wait(&self) {
        self.limiter.until_ready().await;
    }

    /// Takes a token if one is available right now.
    pub fn try_acquire(&self) -> bool {
        self.limiter.check().is_ok()
    }
}

impl Default for RequestThrottle {
    fn default() -> Self {
        Self::per_second(i64::from(DEFAULT_REQUESTS_PER_SECOND))
    }
}

impl std::fmt::Debug for RequestThrottle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestThrottle")
            .field("per_second", &self.per_second)
            .finish()
    }
}
