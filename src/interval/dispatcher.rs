//! # Pulse generator and dispatcher loops.
//!
//! The two long-lived tasks behind a running [`IntervalScheduler`](super::IntervalScheduler).
//!
//! ## Architecture
//! ```text
//! pulse_generator                      Dispatcher::run
//! loop {                               loop {
//!   ├─► send pulse ──[mpsc, cap 1]──►    ├─► recv pulse (stop checked first)
//!   └─► sleep(period)                    ├─► tokio::spawn(action.spawn())
//! }                                      ├─► started += 1 (watch)
//!                                        └─► wait: action done | abort
//!                                      }
//! ```
//!
//! ## Rules
//! - Actions run **sequentially**: the next pulse is accepted only after the
//!   previous action completed (or an abort detached it)
//! - A slow action back-pressures the generator: `send` waits for a free slot
//! - `started` has a single writer (the dispatcher); readers hold `watch::Receiver`s
//! - Stop ends both loops after the in-flight action; abort ends the dispatcher at once

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::{select, time};
use tokio_util::sync::CancellationToken;

use crate::events::{Bus, Event, EventKind, emit};
use crate::interval::action::ActionRef;

/// Emits one pulse, then sleeps `period`, until `stop` is cancelled or the
/// dispatcher goes away.
pub(super) async fn pulse_generator(
    period: Duration,
    pulses: mpsc::Sender<()>,
    stop: CancellationToken,
) {
    loop {
        select! {
            biased;
            _ = stop.cancelled() => break,
            res = pulses.send(()) => {
                if res.is_err() {
                    break;
                }
            }
        }

        let sleep = time::sleep(period);
        tokio::pin!(sleep);
        select! {
            biased;
            _ = stop.cancelled() => break,
            _ = &mut sleep => {}
        }
    }
}

/// Receives pulses and launches the action, one execution at a time.
pub(super) struct Dispatcher {
    pub(super) action: ActionRef,
    pub(super) bus: Option<Bus>,
    pub(super) stop: CancellationToken,
    pub(super) abort: CancellationToken,
    pub(super) started: watch::Sender<u64>,
}

impl Dispatcher {
    /// Runs until stopped, aborted, or the pulse generator exits.
    ///
    /// ### Cancellation semantics
    /// - `stop` is checked with priority before every pulse, so a pulse already
    ///   buffered when stop arrives is never dispatched
    /// - `abort` is only awaited while an action is in flight; the action's
    ///   `JoinHandle` is dropped, which detaches it without cancelling it
    pub(super) async fn run(self, mut pulses: mpsc::Receiver<()>) {
        let mut dispatched: u64 = 0;

        loop {
            let pulse = select! {
                biased;
                _ = self.stop.cancelled() => None,
                p = pulses.recv() => p,
            };
            if pulse.is_none() {
                break;
            }

            let mut running = tokio::spawn(self.action.spawn());
            dispatched += 1;
            self.started.send_replace(dispatched);
            emit(self.bus.as_ref(), || {
                Event::new(EventKind::PulseDispatched)
                    .with_source(self.action.name())
                    .with_attempt(dispatched)
            });

            select! {
                biased;
                _ = self.abort.cancelled() => break,
                res = &mut running => self.completed(dispatched, res),
            }
        }
    }

    fn completed(&self, n: u64, res: Result<(), tokio::task::JoinError>) {
        match res {
            Ok(()) => emit(self.bus.as_ref(), || {
                Event::new(EventKind::ActionCompleted)
                    .with_source(self.action.name())
                    .with_attempt(n)
            }),
            Err(e) if e.is_panic() => {
                let info = crate::panic_message(&*e.into_panic());
                emit(self.bus.as_ref(), || {
                    Event::new(EventKind::ActionPanicked)
                        .with_source(self.action.name())
                        .with_attempt(n)
                        .with_reason(info)
                });
            }
            // Only reachable if the runtime is shutting down.
            Err(_) => {}
        }
    }
}
