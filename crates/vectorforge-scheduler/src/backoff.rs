//! Retry backoff strategies.

use std::time::Duration;

/// Governs the delay chosen before a failed item is re-enqueued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RetryStrategy {
    /// Never retry.
    None,
    /// Retry with no delay.
    Immediate,
    /// Retry after a fixed one-second delay.
    Fixed,
    /// Retry after an exponentially growing delay, capped at 60s.
    Exponential,
    /// Retry after a uniformly random delay in `[0.5s, 2.0s)`.
    #[default]
    Jittered,
}

/// Computes the delay for a retry, given how many attempts remain (including
/// the one about to be spent) and the configured ceiling on attempts.
pub fn backoff(strategy: RetryStrategy, remaining_attempts: usize, max_attempts: usize) -> Duration {
    match strategy {
        RetryStrategy::None => Duration::ZERO,
        RetryStrategy::Immediate => Duration::ZERO,
        RetryStrategy::Fixed => Duration::from_secs(1),
        RetryStrategy::Exponential => {
            let exponent = max_attempts.saturating_sub(remaining_attempts);
            let seconds = 2u64.checked_pow(exponent as u32).unwrap_or(u64::MAX);
            Duration::from_secs(seconds.min(60))
        }
        RetryStrategy::Jittered => {
            let jitter = rand::random::<f64>() * 1.5 + 0.5;
            Duration::from_secs_f64(jitter)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_is_one_second() {
        assert_eq!(backoff(RetryStrategy::Fixed, 3, 10), Duration::from_secs(1));
    }

    #[test]
    fn immediate_is_zero() {
        assert_eq!(backoff(RetryStrategy::Immediate, 3, 10), Duration::ZERO);
    }

    #[test]
    fn exponential_grows_with_attempts_spent_and_caps_at_sixty() {
        // max_attempts=10, remaining=9 -> exponent 1 -> 2s
        assert_eq!(backoff(RetryStrategy::Exponential, 9, 10), Duration::from_secs(2));
        // remaining=1 -> exponent 9 -> 512s capped to 60
        assert_eq!(backoff(RetryStrategy::Exponential, 1, 10), Duration::from_secs(60));
    }

    #[test]
    fn jittered_is_within_bounds() {
        for _ in 0..100 {
            let d = backoff(RetryStrategy::Jittered, 1, 10);
            assert!(d >= Duration::from_secs_f64(0.5));
            assert!(d < Duration::from_secs_f64(2.0));
        }
    }
}
