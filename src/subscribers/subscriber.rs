//! # Consumers of scheduler and retry events.
//!
//! A [`Subscribe`] implementation receives the [`Event`]s that an
//! [`IntervalScheduler`](crate::IntervalScheduler) or a
//! [`RetryRunner`](crate::RetryRunner) publishes on a [`Bus`](crate::Bus),
//! once a [`SubscriberSet`](crate::SubscriberSet) is listening on that bus.
//!
//! Typical filters:
//! - dispatch health: `PulseDispatched`, `ActionCompleted`, `ActionPanicked`
//! - lifecycle: `SchedulerStarted`, `SchedulerStopped`, `SchedulerAborted`
//! - retry outcome: `AttemptFailed`, `BackoffScheduled`, `RetriesExhausted`
//!
//! The set gives each subscriber its own queue and worker, so a handler that
//! awaits on I/O only delays itself. When its queue is full the event is
//! skipped for that subscriber and `SubscriberOverflow` is published instead.
//!
//! ## Example
//! ```rust
//! use std::sync::atomic::{AtomicU64, Ordering};
//! use async_trait::async_trait;
//! use pacer::{Event, EventKind, Subscribe};
//!
//! #[derive(Default)]
//! struct GiveUpCounter(AtomicU64);
//!
//! #[async_trait]
//! impl Subscribe for GiveUpCounter {
//!     async fn on_event(&self, ev: &Event) {
//!         if ev.kind == EventKind::RetriesExhausted {
//!             self.0.fetch_add(1, Ordering::Relaxed);
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "give-up-counter" }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Handler for events published by schedulers and runners.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handles one event. Events arrive in publish order for this subscriber.
    ///
    /// A panic here is caught by the worker and reported as `SubscriberPanicked`;
    /// the subscriber keeps receiving later events.
    async fn on_event(&self, event: &Event);

    /// Name reported as the `source` of this subscriber's overflow and panic events.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Capacity of this subscriber's queue (at least 1 is used). Default: 1024.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
