//! Bounded retry with a short fixed (or doubling) delay.
//!
//! Both ends of the channel race each other: a watcher may fire before the
//! writer's handle is closed, and a writer may hit a file a reader still
//! holds. Neither side coordinates, they just try again a few times.

use std::time::Duration;

/// Upper bound for a single backoff step.
const MAX_DELAY: Duration = Duration::from_millis(500);

/// Fixed attempt budget with a delay between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one. Treated as at least 1.
    pub attempts: u32,
    /// Delay after a failed attempt.
    pub delay: Duration,
    /// Double the delay after every failure (capped), same attempt budget.
    pub backoff: bool,
}

impl RetryPolicy {
    /// Reader default: 10 attempts, 20ms apart (~200ms worst case).
    pub const READ: Self = Self::fixed(10, Duration::from_millis(20));

    /// Writer default: 3 attempts, 30ms apart.
    pub const WRITE: Self = Self::fixed(3, Duration::from_millis(30));

    pub const fn fixed(attempts: u32, delay: Duration) -> Self {
        Self {
            attempts,
            delay,
            backoff: false,
        }
    }

    pub const fn with_backoff(mut self, backoff: bool) -> Self {
        self.backoff = backoff;
        self
    }

    /// Delay to wait after the failed `attempt` (0-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        if !self.backoff {
            return self.delay;
        }
        let factor = 1u32.checked_shl(attempt.min(16)).unwrap_or(u32::MAX);
        self.delay.saturating_mul(factor).min(MAX_DELAY.max(self.delay))
    }

    /// Worst-case time spent sleeping when every attempt fails.
    pub fn budget(&self) -> Duration {
        (0..self.attempts.max(1).saturating_sub(1))
            .map(|attempt| self.delay_for(attempt))
            .sum()
    }

    /// Run `op` until it succeeds or the attempt budget is spent.
    ///
    /// `op` receives the 0-based attempt number. Returns the first success
    /// or the error of the last attempt. Blocks the calling thread while
    /// waiting between attempts; there is no cancellation.
    pub fn run<T, E>(&self, mut op: impl FnMut(u32) -> Result<T, E>) -> Result<T, E> {
        let attempts = self.attempts.max(1);
        let mut attempt = 0;
        loop {
            match op(attempt) {
                Ok(value) => return Ok(value),
                Err(e) if attempt + 1 >= attempts => return Err(e),
                Err(_) => {
                    std::thread::sleep(self.delay_for(attempt));
                    attempt += 1;
                }
            }
        }
    }
}
