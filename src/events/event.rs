//! # Runtime events emitted by the interval scheduler and the retry runner.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Scheduler events**: lifecycle and dispatches of an [`IntervalScheduler`](crate::IntervalScheduler)
//! - **Retry events**: attempts, failures and outcome of a [`RetryRunner`](crate::RetryRunner)
//! - **Subscriber events**: overflow and panics inside subscriber workers
//!
//! The [`Event`] struct carries additional metadata such as timestamps, the
//! source name, attempt/dispatch numbers, reasons, and backoff delays.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use pacer::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::AttemptFailed)
//!     .with_source("fetch")
//!     .with_reason("connection refused")
//!     .with_attempt(3)
//!     .with_delay(Duration::from_millis(800));
//!
//! assert_eq!(ev.kind, EventKind::AttemptFailed);
//! assert_eq!(ev.source.as_deref(), Some("fetch"));
//! assert_eq!(ev.delay_ms, Some(800));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `source`: subscriber name
    /// - `reason`: panic info/message
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `source`: subscriber name
    /// - `reason`: reason string (e.g., "full", "closed")
    SubscriberOverflow,

    // === Scheduler events ===
    /// Scheduler transitioned to running; pulse generator and dispatcher spawned.
    ///
    /// Sets:
    /// - `source`: action name
    /// - `delay_ms`: pulse period (ms)
    SchedulerStarted,

    /// An action was launched in response to a pulse.
    ///
    /// Sets:
    /// - `source`: action name
    /// - `attempt`: dispatch number (1-based)
    PulseDispatched,

    /// A dispatched action finished and the dispatcher is ready for the next pulse.
    ///
    /// Sets:
    /// - `source`: action name
    /// - `attempt`: dispatch number
    ActionCompleted,

    /// A dispatched action panicked. Treated as completed.
    ///
    /// Sets:
    /// - `source`: action name
    /// - `attempt`: dispatch number
    /// - `reason`: panic info
    ActionPanicked,

    /// Scheduler stopped gracefully; no further dispatches.
    ///
    /// Sets:
    /// - `source`: action name
    /// - `attempt`: total dispatches
    SchedulerStopped,

    /// Scheduler aborted; an in-flight action (if any) is detached.
    ///
    /// Sets:
    /// - `source`: action name
    /// - `attempt`: total dispatches
    SchedulerAborted,

    // === Retry events ===
    /// Operation attempt is starting.
    ///
    /// Sets:
    /// - `source`: runner name
    /// - `attempt`: attempt number (1-based)
    AttemptStarting,

    /// Operation attempt returned an error.
    ///
    /// Sets:
    /// - `source`: runner name
    /// - `attempt`: attempt number
    /// - `reason`: error message
    AttemptFailed,

    /// Next attempt scheduled after a failure.
    ///
    /// Sets:
    /// - `source`: runner name
    /// - `attempt`: failed attempt number
    /// - `delay_ms`: delay before the next attempt (ms)
    BackoffScheduled,

    /// Operation succeeded.
    ///
    /// Sets:
    /// - `source`: runner name
    /// - `attempt`: successful attempt number
    RetrySucceeded,

    /// Attempt budget spent; the last error is surfaced to the caller.
    ///
    /// Sets:
    /// - `source`: runner name
    /// - `attempt`: total attempts
    /// - `reason`: last error message
    RetriesExhausted,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,

    /// Delay in milliseconds (backoff delay or pulse period).
    pub delay_ms: Option<u32>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
    /// Attempt or dispatch count (starting from 1).
    pub attempt: Option<u64>,
    /// Name of the emitting scheduler, runner or subscriber.
    pub source: Option<Arc<str>>,
    /// Event classification.
    pub kind: EventKind,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            kind,
            at: SystemTime::now(),
            attempt: None,
            reason: None,
            delay_ms: None,
            source: None,
        }
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches the emitter's name.
    #[inline]
    pub fn with_source(mut self, source: impl Into<Arc<str>>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Attaches a delay (stored as milliseconds, saturating at `u32::MAX`).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.delay_ms = Some(ms);
        self
    }

    /// Attaches an attempt or dispatch count.
    #[inline]
    pub fn with_attempt(mut self, n: u64) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_source(subscriber)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_source(subscriber)
            .with_reason(info)
    }

    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberOverflow)
    }

    #[inline]
    pub fn is_subscriber_panic(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberPanicked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seq_is_monotonic() {
        let a = Event::new(EventKind::PulseDispatched);
        let b = Event::new(EventKind::PulseDispatched);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn test_delay_saturates() {
        let ev = Event::new(EventKind::BackoffScheduled).with_delay(Duration::MAX);
        assert_eq!(ev.delay_ms, Some(u32::MAX));
    }

    #[test]
    fn test_subscriber_helpers() {
        let ev = Event::subscriber_overflow("metrics", "full");
        assert!(ev.is_subscriber_overflow());
        assert_eq!(ev.source.as_deref(), Some("metrics"));
        assert_eq!(ev.reason.as_deref(), Some("subscriber=metrics reason=full"));

        let ev = Event::subscriber_panicked("audit", "oops".into());
        assert!(ev.is_subscriber_panic());
    }
}
