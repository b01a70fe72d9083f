//! Outbound request rate limiting.

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Process-wide minimum spacing between outbound requests.
///
/// Callers block (never queue or drop) until the minimum interval since the
/// last outbound request has elapsed. The lock is held across the sleep so
/// that concurrent callers serialize and each observes the previous caller's
/// updated timestamp — N calls always span at least (N-1) intervals.
pub struct RateLimiter {
    /// When the last request went out.
    last_request: Mutex<Option<Instant>>,
    /// Minimum spacing between requests.
    min_interval: Duration,
}

impl RateLimiter {
    /// Creates a rate limiter with the given minimum spacing.
    #[must_use]
    pub const fn new(min_interval: Duration) -> Self {
        Self {
            last_request: Mutex::new(None),
            min_interval,
        }
    }

    /// Blocks until an outbound request may be issued, then records it.
    pub fn acquire(&self) {
        let mut last = self
            .last_request
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                tracing::trace!(wait_ms = wait.as_millis() as u64, "Rate limiter sleeping");
                std::thread::sleep(wait);
            }
        }

        *last = Some(Instant::now());
    }

    /// Returns the configured minimum spacing.
    #[must_use]
    pub const fn min_interval(&self) -> Duration {
        self.min_interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_acquire_does_not_block() {
        let limiter = RateLimiter::new(Duration::from_millis(50));
        let start = Instant::now();
        limiter.acquire();
        assert!(start.elapsed() < Duration::from_millis(40));
    }

    #[test]
    fn test_consecutive_acquires_are_spaced() {
        let limiter = RateLimiter::new(Duration::from_millis(20));
        let start = Instant::now();
        for _ in 0..4 {
            limiter.acquire();
        }
        // Four calls span at least three intervals.
        assert!(start.elapsed() >= Duration::from_millis(60));
    }

    #[test]
    fn test_spacing_holds_across_threads() {
        use std::sync::Arc;
        use std::thread;

        let limiter = Arc::new(RateLimiter::new(Duration::from_millis(10)));
        let start = Instant::now();

        let handles: Vec<_> = (0..3)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                thread::spawn(move || {
                    limiter.acquire();
                    limiter.acquire();
                })
            })
            .collect();
        for handle in handles {
            let _ = handle.join();
        }

        // Six acquisitions span at least five intervals.
        assert!(start.elapsed() >= Duration::from_millis(50));
    }
}
