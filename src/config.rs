//! # Shared defaults.
//!
//! Provides [`Config`] centralized settings for schedulers and retry runners.
//!
//! Config is used in two ways:
//! 1. **Bus creation**: `Bus::from_config(&config)`
//! 2. **Runner defaults**: `RetryRunner::with_defaults(operation, &config)`
//!
//! ## Sentinel values
//! - `bus_capacity = 0` → clamped to 1 by [`Config::bus_capacity_clamped`]
//! - `max_attempts = 0` → rejected by the runner builder (`BuildError::ZeroAttempts`)

use crate::policies::BackoffPolicy;

/// Shared configuration.
///
/// ## Field semantics
/// - `bus_capacity`: Event bus ring buffer size (min 1; clamped by Bus)
/// - `max_attempts`: Default attempt budget for retry runners
/// - `backoff`: Default backoff policy for retry runners
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow subscribers that lag behind more than `bus_capacity` messages will
    /// receive `Lagged` and skip older items.
    pub bus_capacity: usize,

    /// Default maximum number of operation invocations per runner.
    pub max_attempts: u32,

    /// Default backoff policy between attempts.
    pub backoff: BackoffPolicy,
}

impl Config {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `bus_capacity = 1024`
    /// - `max_attempts = 3`
    /// - `backoff = BackoffPolicy::default()` (exponential, 100ms base, 30s cap)
    fn default() -> Self {
        Self {
            bus_capacity: 1024,
            max_attempts: 3,
            backoff: BackoffPolicy::default(),
        }
    }
}
