//! Sliding-window rate limiting for the search directory.
//!
//! Callers acquire a slot before each request. When the window budget is
//! spent, `acquire` waits for the oldest request to age out instead of
//! failing immediately, bounded by a configurable maximum wait.

use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

use crate::config::RemoteSearchSettings;

/// Configuration for the sliding-window limiter.
#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    /// Maximum requests allowed inside one window.
    pub max_requests: u32,
    pub window: Duration,
    /// Upper bound on how long `acquire` waits for a free slot.
    pub max_wait: Duration,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            max_requests: 60,
            window: Duration::from_secs(60),
            max_wait: Duration::from_secs(30),
        }
    }
}

impl RateLimiterConfig {
    pub fn from_settings(settings: &RemoteSearchSettings) -> Self {
        Self {
            max_requests: settings.requests_per_window,
            window: Duration::from_secs(settings.window_secs),
            max_wait: Duration::from_secs(settings.max_wait_secs),
        }
    }
}

/// Sliding-window request limiter.
pub struct SlidingWindowLimiter {
    requests: Mutex<VecDeque<Instant>>,
    config: RateLimiterConfig,
}

impl SlidingWindowLimiter {
    pub fn new(config: RateLimiterConfig) -> Self {
        Self {
            requests: Mutex::new(VecDeque::new()),
            config,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(RateLimiterConfig::default())
    }

    fn prune_old_entries(requests: &mut VecDeque<Instant>, now: Instant, window: Duration) {
        let cutoff = now - window;
        while let Some(front) = requests.front() {
            if *front < cutoff {
                requests.pop_front();
            } else {
                break;
            }
        }
    }

    /// Take a slot if one is free, otherwise report how long until the
    /// oldest in-window request expires.
    pub async fn try_acquire(&self) -> Result<(), Duration> {
        let mut requests = self.requests.lock().await;
        let now = Instant::now();

        Self::prune_old_entries(&mut requests, now, self.config.window);

        if requests.len() >= self.config.max_requests as usize {
            let wait = match requests.front() {
                Some(oldest) => (*oldest + self.config.window).saturating_duration_since(now),
                None => self.config.window,
            };
            return Err(wait.max(Duration::from_millis(1)));
        }

        requests.push_back(now);
        Ok(())
    }

    /// Wait-and-retry until a slot frees up. Returns false if the
    /// cumulative wait would exceed the configured maximum.
    pub async fn acquire(&self) -> bool {
        let deadline = Instant::now() + self.config.max_wait;

        loop {
            match self.try_acquire().await {
                Ok(()) => return true,
                Err(wait) => {
                    let now = Instant::now();
                    if now + wait > deadline {
                        debug!(
                            "Rate limit wait of {:?} exceeds remaining budget, giving up",
                            wait
                        );
                        return false;
                    }
                    debug!("Rate limit reached, waiting {:?} for a free slot", wait);
                    tokio::time::sleep(wait).await;
                }
            }
        }
    }

    /// Requests currently counted inside the window.
    pub async fn in_flight(&self) -> usize {
        let mut requests = self.requests.lock().await;
        Self::prune_old_entries(&mut requests, Instant::now(), self.config.window);
        requests.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_requests: u32, window_ms: u64, max_wait_ms: u64) -> SlidingWindowLimiter {
        SlidingWindowLimiter::new(RateLimiterConfig {
            max_requests,
            window: Duration::from_millis(window_ms),
            max_wait: Duration::from_millis(max_wait_ms),
        })
    }

    #[tokio::test]
    async fn test_allows_under_limit() {
        let limiter = limiter(3, 1000, 100);
        for _ in 0..3 {
            assert!(limiter.try_acquire().await.is_ok());
        }
        assert_eq!(limiter.in_flight().await, 3);
    }

    #[tokio::test]
    async fn test_blocks_at_limit() {
        let limiter = limiter(2, 1000, 100);
        assert!(limiter.try_acquire().await.is_ok());
        assert!(limiter.try_acquire().await.is_ok());

        let result = limiter.try_acquire().await;
        assert!(result.is_err());
        let wait = result.unwrap_err();
        assert!(wait > Duration::ZERO);
        assert!(wait <= Duration::from_millis(1000));
    }

    #[tokio::test]
    async fn test_acquire_waits_for_slot() {
        let limiter = limiter(1, 50, 500);
        assert!(limiter.acquire().await);

        // Second acquire must wait for the 50ms window to roll over
        let start = Instant::now();
        assert!(limiter.acquire().await);
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[tokio::test]
    async fn test_acquire_gives_up_past_max_wait() {
        let limiter = limiter(1, 10_000, 20);
        assert!(limiter.acquire().await);
        // Window is far longer than max_wait, so this cannot succeed
        assert!(!limiter.acquire().await);
    }

    #[tokio::test]
    async fn test_window_rolls_over() {
        let limiter = limiter(1, 30, 100);
        assert!(limiter.try_acquire().await.is_ok());
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(limiter.try_acquire().await.is_ok());
    }
}
