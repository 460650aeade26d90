//! Error types used by the scheduler, the retry runner and their builders.
//!
//! - [`IntervalError`] contract violations on an [`IntervalScheduler`](crate::IntervalScheduler).
//! - [`RetryError`] outcome of a [`RetryRunner::run`](crate::RetryRunner::run) that did not succeed.
//! - [`BuildError`] invalid construction parameters for a [`RetryRunner`](crate::RetryRunner).
//!
//! Coordination errors are returned to the caller only; they are never retried
//! and never published on the event bus.

use thiserror::Error;

/// # Errors produced by the interval scheduler.
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalError {
    /// Stop (or abort) requested while the scheduler is not running.
    #[error("interval not running")]
    NotRunning,

    /// Abort requested on a scheduler that was already aborted.
    #[error("interval already aborted")]
    AlreadyAborted,

    /// The scheduler was constructed with a zero period.
    #[error("interval period must be greater than zero")]
    ZeroPeriod,
}

impl IntervalError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use pacer::IntervalError;
    ///
    /// assert_eq!(IntervalError::NotRunning.as_label(), "interval_not_running");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            IntervalError::NotRunning => "interval_not_running",
            IntervalError::AlreadyAborted => "interval_already_aborted",
            IntervalError::ZeroPeriod => "interval_zero_period",
        }
    }
}

/// # Errors returned by [`RetryRunner::run`](crate::RetryRunner::run).
///
/// `E` is the operation's own error type. It is surfaced verbatim from the
/// last attempt once the attempt budget is spent.
#[non_exhaustive]
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RetryError<E> {
    /// The runner was already used; the operation was not invoked.
    #[error("retry runner already used; create a new one to run again")]
    AlreadyUsed,

    /// Error of the last attempt.
    #[error("operation failed: {0}")]
    Operation(E),
}

impl<E> RetryError<E> {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            RetryError::AlreadyUsed => "retry_already_used",
            RetryError::Operation(_) => "retry_operation_failed",
        }
    }

    /// Returns the operation's error, if this is one.
    ///
    /// # Example
    /// ```
    /// use pacer::RetryError;
    ///
    /// let err: RetryError<&str> = RetryError::Operation("boom");
    /// assert_eq!(err.into_operation(), Some("boom"));
    ///
    /// let used: RetryError<&str> = RetryError::AlreadyUsed;
    /// assert_eq!(used.into_operation(), None);
    /// ```
    pub fn into_operation(self) -> Option<E> {
        match self {
            RetryError::Operation(e) => Some(e),
            RetryError::AlreadyUsed => None,
        }
    }

    /// Borrowing variant of [`into_operation`](Self::into_operation).
    pub fn operation(&self) -> Option<&E> {
        match self {
            RetryError::Operation(e) => Some(e),
            RetryError::AlreadyUsed => None,
        }
    }

    /// Indicates whether the runner was invoked more than once.
    pub fn is_already_used(&self) -> bool {
        matches!(self, RetryError::AlreadyUsed)
    }
}

/// # Errors produced while constructing a [`RetryRunner`](crate::RetryRunner).
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildError {
    /// `max_attempts` was zero; the operation would never run.
    #[error("max attempts must be at least 1")]
    ZeroAttempts,

    /// No backoff strategy was supplied to the builder.
    #[error("backoff strategy is required")]
    MissingBackoff,
}

impl BuildError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            BuildError::ZeroAttempts => "build_zero_attempts",
            BuildError::MissingBackoff => "build_missing_backoff",
        }
    }
}
