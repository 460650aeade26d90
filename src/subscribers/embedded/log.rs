//! # LogWriter: simple event printer
//!
//! A minimal subscriber that prints incoming [`Event`]s to stdout.
//! Use it for test or demo.
//!
//! ## Example output
//! ```text
//! [scheduler-started] source="heartbeat" period_ms=Some(1000)
//! [dispatched] source="heartbeat" n=Some(1)
//! [completed] source="heartbeat" n=Some(1)
//! [stopped] source="heartbeat" started=Some(3)
//! [attempt] source="fetch" attempt=Some(1)
//! [attempt-failed] source="fetch" err="connection refused" attempt=Some(1)
//! [backoff] source="fetch" delay_ms=Some(200) after_attempt=Some(1)
//! [exhausted] source="fetch" attempts=Some(5) err="connection refused"
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let reason = e.reason.as_deref().unwrap_or("");
        match e.kind {
            EventKind::SchedulerStarted => {
                println!(
                    "[scheduler-started] source={:?} period_ms={:?}",
                    e.source, e.delay_ms
                );
            }
            EventKind::PulseDispatched => {
                println!("[dispatched] source={:?} n={:?}", e.source, e.attempt);
            }
            EventKind::ActionCompleted => {
                println!("[completed] source={:?} n={:?}", e.source, e.attempt);
            }
            EventKind::ActionPanicked => {
                println!(
                    "[action-panicked] source={:?} n={:?} info={reason:?}",
                    e.source, e.attempt
                );
            }
            EventKind::SchedulerStopped => {
                println!("[stopped] source={:?} started={:?}", e.source, e.attempt);
            }
            EventKind::SchedulerAborted => {
                println!("[aborted] source={:?} started={:?}", e.source, e.attempt);
            }
            EventKind::AttemptStarting => {
                println!("[attempt] source={:?} attempt={:?}", e.source, e.attempt);
            }
            EventKind::AttemptFailed => {
                println!(
                    "[attempt-failed] source={:?} err={reason:?} attempt={:?}",
                    e.source, e.attempt
                );
            }
            EventKind::BackoffScheduled => {
                println!(
                    "[backoff] source={:?} delay_ms={:?} after_attempt={:?}",
                    e.source, e.delay_ms, e.attempt
                );
            }
            EventKind::RetrySucceeded => {
                println!("[succeeded] source={:?} attempt={:?}", e.source, e.attempt);
            }
            EventKind::RetriesExhausted => {
                println!(
                    "[exhausted] source={:?} attempts={:?} err={reason:?}",
                    e.source, e.attempt
                );
            }
            EventKind::SubscriberOverflow => {
                println!("[subscriber-overflow] {reason}");
            }
            EventKind::SubscriberPanicked => {
                println!(
                    "[subscriber-panicked] subscriber={} info={reason}",
                    e.source.as_deref().unwrap_or("unknown"),
                );
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
