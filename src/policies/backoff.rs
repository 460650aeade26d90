//! # Backoff strategies for retrying operations.
//!
//! [`BackoffStrategy`] maps the number of attempts made so far to the time to
//! wait before the next one. It is a pure function of the attempt count: no
//! state, no clock, no randomness.
//!
//! [`BackoffPolicy`] is the built-in implementation:
//! - [`BackoffPolicy::Exponential`] waits `base × 2^attempt`, saturating at `max`;
//! - [`BackoffPolicy::Linear`] waits `base` regardless of the attempt count.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use pacer::{BackoffPolicy, BackoffStrategy};
//!
//! let backoff = BackoffPolicy::exponential(Duration::from_millis(100))
//!     .with_max(Duration::from_secs(10));
//!
//! // After the first failed attempt: 100ms × 2^1
//! assert_eq!(backoff.wait_duration(1), Duration::from_millis(200));
//!
//! // After the third: 100ms × 2^3
//! assert_eq!(backoff.wait_duration(3), Duration::from_millis(800));
//!
//! // 100ms × 2^10 = 102_400ms → capped at max=10s
//! assert_eq!(backoff.wait_duration(10), Duration::from_secs(10));
//! ```

use std::sync::Arc;
use std::time::Duration;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Computes how long to wait between two attempts.
///
/// `attempt` is the 1-based number of attempts made so far, i.e. the retry
/// runner calls `wait_duration(n)` right after the n-th attempt failed.
///
/// Implementations must be deterministic and side-effect free.
pub trait BackoffStrategy: Send + Sync + 'static {
    /// Returns the delay to apply after `attempt` attempts.
    fn wait_duration(&self, attempt: u32) -> Duration;
}

/// Shared handle to a backoff strategy.
pub type BackoffRef = Arc<dyn BackoffStrategy>;

impl<T: BackoffStrategy + ?Sized> BackoffStrategy for Arc<T> {
    fn wait_duration(&self, attempt: u32) -> Duration {
        (**self).wait_duration(attempt)
    }
}

impl<T: BackoffStrategy + ?Sized> BackoffStrategy for Box<T> {
    fn wait_duration(&self, attempt: u32) -> Duration {
        (**self).wait_duration(attempt)
    }
}

/// Built-in backoff policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackoffPolicy {
    /// Doubles the delay with each attempt: `base × 2^attempt`, clamped to `max`.
    Exponential {
        /// Delay unit multiplied by `2^attempt`.
        base: Duration,
        /// Upper bound of the computed delay.
        max: Duration,
    },
    /// Waits the same `base` between every pair of attempts.
    Linear {
        /// Constant delay.
        base: Duration,
    },
}

impl Default for BackoffPolicy {
    /// Returns `Exponential { base: 100ms, max: 30s }`.
    fn default() -> Self {
        Self::Exponential {
            base: Duration::from_millis(100),
            max: Duration::from_secs(30),
        }
    }
}

impl BackoffPolicy {
    /// Exponential backoff without an explicit cap (saturates at [`Duration::MAX`]).
    pub const fn exponential(base: Duration) -> Self {
        Self::Exponential {
            base,
            max: Duration::MAX,
        }
    }

    /// Constant backoff.
    pub const fn linear(base: Duration) -> Self {
        Self::Linear { base }
    }

    /// Sets the cap of an exponential policy. Linear policies are returned unchanged.
    #[must_use]
    pub fn with_max(self, max: Duration) -> Self {
        match self {
            Self::Exponential { base, .. } => Self::Exponential { base, max },
            linear @ Self::Linear { .. } => linear,
        }
    }

    /// Wraps the policy into a shared [`BackoffRef`].
    pub fn arc(self) -> BackoffRef {
        Arc::new(self)
    }
}

impl BackoffStrategy for BackoffPolicy {
    fn wait_duration(&self, attempt: u32) -> Duration {
        match *self {
            Self::Exponential { base, max } => doubled(base, attempt).min(max),
            Self::Linear { base } => base,
        }
    }
}

/// `base << attempt` in nanoseconds, saturating at [`Duration::MAX`].
fn doubled(base: Duration, attempt: u32) -> Duration {
    let nanos = base.as_nanos();
    if nanos == 0 {
        return Duration::ZERO;
    }
    // `nanos` needs at most 94 bits, so any shift past the leading zeros overflows.
    if attempt >= nanos.leading_zeros() {
        return Duration::MAX;
    }
    let shifted = nanos << attempt;
    let secs = shifted / NANOS_PER_SEC;
    match u64::try_from(secs) {
        Ok(secs) => Duration::new(secs, (shifted % NANOS_PER_SEC) as u32),
        Err(_) => Duration::MAX,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exponential_doubles() {
        let policy = BackoffPolicy::exponential(Duration::from_millis(1));
        for n in 0..20u32 {
            assert_eq!(
                policy.wait_duration(n),
                Duration::from_millis(1u64 << n),
                "attempt {} should wait 2^{}ms",
                n,
                n
            );
        }
    }

    #[test]
    fn test_exponential_attempt_zero_returns_base() {
        let policy = BackoffPolicy::exponential(Duration::from_millis(250));
        assert_eq!(policy.wait_duration(0), Duration::from_millis(250));
    }

    #[test]
    fn test_exponential_keeps_subsecond_precision() {
        let policy = BackoffPolicy::exponential(Duration::new(1, 500_000_000));
        assert_eq!(policy.wait_duration(1), Duration::from_secs(3));
        assert_eq!(policy.wait_duration(2), Duration::from_secs(6));
    }

    #[test]
    fn test_exponential_clamped_to_max() {
        let policy =
            BackoffPolicy::exponential(Duration::from_millis(100)).with_max(Duration::from_secs(1));
        assert_eq!(policy.wait_duration(3), Duration::from_millis(800));
        assert_eq!(policy.wait_duration(4), Duration::from_secs(1));
        assert_eq!(policy.wait_duration(10), Duration::from_secs(1));
    }

    #[test]
    fn test_exponential_huge_attempt_saturates() {
        let capped =
            BackoffPolicy::exponential(Duration::from_millis(100)).with_max(Duration::from_secs(60));
        assert_eq!(capped.wait_duration(u32::MAX), Duration::from_secs(60));

        let uncapped = BackoffPolicy::exponential(Duration::from_millis(100));
        assert_eq!(uncapped.wait_duration(70), Duration::MAX);
        assert_eq!(uncapped.wait_duration(u32::MAX), Duration::MAX);
    }

    #[test]
    fn test_exponential_zero_base_stays_zero() {
        let policy = BackoffPolicy::exponential(Duration::ZERO);
        assert_eq!(policy.wait_duration(u32::MAX), Duration::ZERO);
    }

    #[test]
    fn test_linear_constant() {
        let policy = BackoffPolicy::linear(Duration::from_millis(500));
        for attempt in [0, 1, 2, 7, 100, u32::MAX] {
            assert_eq!(
                policy.wait_duration(attempt),
                Duration::from_millis(500),
                "attempt {} should be constant at 500ms",
                attempt
            );
        }
    }

    #[test]
    fn test_with_max_ignored_by_linear() {
        let policy = BackoffPolicy::linear(Duration::from_secs(5)).with_max(Duration::from_secs(1));
        assert_eq!(policy.wait_duration(3), Duration::from_secs(5));
    }

    #[test]
    fn test_shared_handle_delegates() {
        let shared: BackoffRef = BackoffPolicy::exponential(Duration::from_millis(10)).arc();
        let again = Arc::clone(&shared);
        assert_eq!(shared.wait_duration(2), Duration::from_millis(40));
        assert_eq!(again.wait_duration(2), shared.wait_duration(2));
    }
}
