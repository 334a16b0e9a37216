use std::thread;
use std::time::Duration;

use crate::domain::errors::DomainError;

/// Bounded exponential backoff for conflicting checkout transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(20),
            max_delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (1-based): `base * 2^(attempt-1)`, capped.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
        self.base_delay
            .checked_mul(factor)
            .map_or(self.max_delay, |d| d.min(self.max_delay))
    }

    /// Calls `attempt` until it stops reporting a conflict or the budget is spent.
    ///
    /// Only [`DomainError::TransactionConflict`] is retried; the closure receives
    /// the 1-based attempt number.
    pub fn run<T, F>(&self, mut attempt: F) -> Result<T, DomainError>
    where
        F: FnMut(u32) -> Result<T, DomainError>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut n = 1;
        loop {
            match attempt(n) {
                Err(DomainError::TransactionConflict) if n < max_attempts => {
                    let delay = self.delay_for(n);
                    log::debug!(
                        "checkout attempt {} of {} conflicted, retrying in {:?}",
                        n,
                        max_attempts,
                        delay
                    );
                    thread::sleep(delay);
                    n += 1;
                }
                Err(DomainError::TransactionConflict) => {
                    log::warn!("checkout gave up after {} conflicting attempts", n);
                    return Err(DomainError::TransactionConflict);
                }
                other => return other,
            }
        }
    }
}
