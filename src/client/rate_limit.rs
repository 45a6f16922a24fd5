//! Shared minimum-interval throttle for outbound calls.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

#[derive(Debug, Default)]
struct LimiterState {
    last_grant: Option<Instant>,
    grants: u64,
}

/// Serializes callers so consecutive grants are at least `min_interval` apart.
///
/// The lock is held while sleeping; waiters queue in acquisition order.
/// Share one instance per server through an `Arc`.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    state: Mutex<LimiterState>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            state: Mutex::new(LimiterState::default()),
        }
    }

    /// Limiter allowing `requests` grants per second.
    pub fn per_second(requests: u32) -> Self {
        Self::new(Duration::from_secs(1) / requests.max(1))
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Wait until a call may be made. The first grant is immediate.
    pub async fn wait(&self) {
        let mut state = self.state.lock().await;
        if let Some(last) = state.last_grant {
            let next = last + self.min_interval;
            if next > Instant::now() {
                tracing::trace!(delay_ms = (next - Instant::now()).as_millis() as u64, "Rate limiting");
                tokio::time::sleep_until(next).await;
            }
        }
        state.last_grant = Some(Instant::now());
        state.grants += 1;
    }

    /// Number of grants so far.
    pub async fn count(&self) -> u64 {
        self.state.lock().await.grants
    }

    /// Zero the grant counter. Spacing relative to the last grant is kept.
    pub async fn reset(&self) {
        self.state.lock().await.grants = 0;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_first_grant_immediate() {
        let limiter = RateLimiter::new(Duration::from_secs(2));
        let start = Instant::now();
        limiter.wait().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(limiter.count().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_consecutive_grants_spaced() {
        let limiter = RateLimiter::new(Duration::from_millis(500));
        let mut grants = Vec::new();
        for _ in 0..4 {
            limiter.wait().await;
            grants.push(Instant::now());
        }
        for pair in grants.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_millis(500));
        }
        assert_eq!(limiter.count().await, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_wait_after_idle() {
        let limiter = RateLimiter::new(Duration::from_millis(100));
        limiter.wait().await;
        tokio::time::sleep(Duration::from_millis(250)).await;
        let before = Instant::now();
        limiter.wait().await;
        assert_eq!(before.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_waiters_serialized() {
        let limiter = Arc::new(RateLimiter::new(Duration::from_millis(200)));
        let start = Instant::now();

        let handles: Vec<_> = (0..10)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                tokio::spawn(async move {
                    limiter.wait().await;
                    Instant::now()
                })
            })
            .collect();

        let mut grants = Vec::new();
        for handle in handles {
            grants.push(handle.await.unwrap());
        }
        grants.sort();

        assert!(start.elapsed() >= Duration::from_millis(1800));
        for pair in grants.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_millis(200));
        }
        assert_eq!(limiter.count().await, 10);
    }

    #[tokio::test]
    async fn test_per_second_and_reset() {
        let limiter = RateLimiter::per_second(10);
        assert_eq!(limiter.min_interval(), Duration::from_millis(100));
        limiter.wait().await;
        limiter.reset().await;
        assert_eq!(limiter.count().await, 0);
        assert_eq!(RateLimiter::per_second(0).min_interval(), Duration::from_secs(1));
    }
}
