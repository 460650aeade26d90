//! # IntervalScheduler: periodic dispatch with stop/abort control.
//!
//! Runs an [`Action`](super::Action) on a fixed pulse until stopped or aborted.
//!
//! ## State machine
//! ```text
//!            start()           stop()
//!   Idle ─────────────► Running ──────► Stopped
//!                          │               │
//!                          │ abort()       │ abort()
//!                          ▼               ▼
//!                       Aborted ◄──────────┘
//! ```
//!
//! No transition leaves `Stopped` or `Aborted`; a second `stop()` or `abort()`
//! fails instead of re-running the transition.
//!
//! ## Rules
//! - **Serialized dispatch**: an action never overlaps the previous one; the
//!   period is a target cadence, not a guarantee
//! - **Stop is graceful**: no new dispatches, the in-flight action completes
//! - **Abort is immediate** for the dispatcher but never interrupts the action body
//! - **Single owner**: lifecycle state lives in this value; `started` is written
//!   only by the dispatcher task

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::IntervalError;
use crate::events::{Bus, Event, EventKind, emit};
use crate::interval::action::ActionRef;
use crate::interval::dispatcher::{Dispatcher, pulse_generator};

/// Lifecycle state of an [`IntervalScheduler`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchedulerState {
    /// Created, never started.
    Idle,
    /// Pulse generator and dispatcher are live.
    Running,
    /// Stopped gracefully.
    Stopped,
    /// Aborted; an in-flight action (if any) was detached.
    Aborted,
}

/// Periodically dispatches an action with explicit stop/abort control.
///
/// # Example
/// ```rust
/// use std::time::Duration;
/// use pacer::{ActionFn, IntervalScheduler};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), pacer::IntervalError> {
/// let action = ActionFn::arc("heartbeat", || async {
///     // send heartbeat...
/// });
///
/// let mut sched = IntervalScheduler::new(Duration::from_millis(10), action)?;
/// assert!(sched.start());
/// assert!(!sched.start()); // already running
///
/// tokio::time::sleep(Duration::from_millis(35)).await;
/// sched.stop()?;
/// sched.join().await;
///
/// assert!(sched.started() >= 1);
/// # Ok(())
/// # }
/// ```
pub struct IntervalScheduler {
    action: ActionRef,
    period: Duration,
    state: SchedulerState,
    bus: Option<Bus>,

    stop: CancellationToken,
    abort: CancellationToken,
    started: watch::Receiver<u64>,
    /// Moved into the dispatcher on start.
    started_tx: Option<watch::Sender<u64>>,

    pulse: Option<JoinHandle<()>>,
    dispatcher: Option<JoinHandle<()>>,
}

impl IntervalScheduler {
    /// Creates an idle scheduler.
    ///
    /// Fails with [`IntervalError::ZeroPeriod`] if `period` is zero.
    pub fn new(period: Duration, action: ActionRef) -> Result<Self, IntervalError> {
        Self::builder(period, action).build()
    }

    /// Returns a builder for a scheduler with optional event publishing.
    pub fn builder(period: Duration, action: ActionRef) -> IntervalSchedulerBuilder {
        IntervalSchedulerBuilder {
            period,
            action,
            bus: None,
        }
    }

    /// Starts dispatching.
    ///
    /// Returns `true` iff the scheduler transitioned from `Idle` to `Running`.
    /// From any other state this is a no-op returning `false`.
    ///
    /// # Panics
    /// Must be called from within a tokio runtime (the pulse generator and the
    /// dispatcher are spawned on it).
    pub fn start(&mut self) -> bool {
        if self.state != SchedulerState::Idle {
            return false;
        }
        let Some(started) = self.started_tx.take() else {
            return false;
        };
        self.state = SchedulerState::Running;

        // Published before either task exists so it precedes every dispatch event.
        emit(self.bus.as_ref(), || {
            Event::new(EventKind::SchedulerStarted)
                .with_source(self.action.name())
                .with_delay(self.period)
        });

        let (tx, rx) = mpsc::channel::<()>(1);
        self.pulse = Some(tokio::spawn(pulse_generator(
            self.period,
            tx,
            self.stop.clone(),
        )));

        let dispatcher = Dispatcher {
            action: self.action.clone(),
            bus: self.bus.clone(),
            stop: self.stop.clone(),
            abort: self.abort.clone(),
            started,
        };
        self.dispatcher = Some(tokio::spawn(dispatcher.run(rx)));
        true
    }

    /// Stops dispatching new actions.
    ///
    /// An action already in flight is not cancelled. Fails with
    /// [`IntervalError::NotRunning`] unless the scheduler is `Running`.
    pub fn stop(&mut self) -> Result<(), IntervalError> {
        if self.state != SchedulerState::Running {
            return Err(IntervalError::NotRunning);
        }
        self.stop.cancel();
        self.state = SchedulerState::Stopped;

        emit(self.bus.as_ref(), || {
            Event::new(EventKind::SchedulerStopped)
                .with_source(self.action.name())
                .with_attempt(self.started())
        });
        Ok(())
    }

    /// Stops dispatching and releases the dispatcher without waiting for the
    /// in-flight action, which keeps running detached.
    ///
    /// Valid once, from `Running` or `Stopped`:
    /// - a second call fails with [`IntervalError::AlreadyAborted`];
    /// - a never-started scheduler fails with [`IntervalError::NotRunning`].
    pub fn abort(&mut self) -> Result<(), IntervalError> {
        match self.state {
            SchedulerState::Aborted => return Err(IntervalError::AlreadyAborted),
            SchedulerState::Idle => return Err(IntervalError::NotRunning),
            SchedulerState::Running | SchedulerState::Stopped => {}
        }
        self.stop.cancel();
        self.abort.cancel();
        self.state = SchedulerState::Aborted;

        emit(self.bus.as_ref(), || {
            Event::new(EventKind::SchedulerAborted)
                .with_source(self.action.name())
                .with_attempt(self.started())
        });
        Ok(())
    }

    /// Waits for the pulse generator and dispatcher to exit.
    ///
    /// Only waits after a stop or abort was requested; returns immediately
    /// otherwise. After `stop()` this includes the in-flight action; after
    /// `abort()` the detached action is not awaited.
    pub async fn join(&mut self) {
        if !matches!(
            self.state,
            SchedulerState::Stopped | SchedulerState::Aborted
        ) {
            return;
        }
        if let Some(h) = self.pulse.take() {
            let _ = h.await;
        }
        if let Some(h) = self.dispatcher.take() {
            let _ = h.await;
        }
    }

    /// Number of actions launched so far.
    ///
    /// Final once the dispatcher has exited (see [`join`](Self::join)).
    pub fn started(&self) -> u64 {
        *self.started.borrow()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SchedulerState {
        self.state
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.state == SchedulerState::Running
    }

    /// Configured pulse period.
    pub fn period(&self) -> Duration {
        self.period
    }
}

impl Drop for IntervalScheduler {
    /// A running scheduler that goes out of scope stops gracefully.
    fn drop(&mut self) {
        if self.state == SchedulerState::Running {
            self.stop.cancel();
        }
    }
}

/// Builder for [`IntervalScheduler`].
pub struct IntervalSchedulerBuilder {
    period: Duration,
    action: ActionRef,
    bus: Option<Bus>,
}

impl IntervalSchedulerBuilder {
    /// Publishes lifecycle and dispatch events on `bus`.
    pub fn with_bus(mut self, bus: Bus) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Builds an idle scheduler.
    pub fn build(self) -> Result<IntervalScheduler, IntervalError> {
        if self.period.is_zero() {
            return Err(IntervalError::ZeroPeriod);
        }
        let (started_tx, started) = watch::channel(0);

        Ok(IntervalScheduler {
            action: self.action,
            period: self.period,
            state: SchedulerState::Idle,
            bus: self.bus,
            stop: CancellationToken::new(),
            abort: CancellationToken::new(),
            started,
            started_tx: Some(started_tx),
            pulse: None,
            dispatcher: None,
        })
    }
}
