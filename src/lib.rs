//! # pacer
//!
//! **pacer** provides two small concurrency primitives for tokio:
//!
//! - [`IntervalScheduler`] repeatedly dispatches an [`Action`] on a fixed pulse,
//!   with explicit stop/abort control;
//! - [`RetryRunner`] re-invokes a fallible operation until it succeeds or its
//!   attempt budget is spent, waiting between attempts per a [`BackoffStrategy`].
//!
//! ## Architecture
//! ### Overview
//! ```text
//!  IntervalScheduler                              RetryRunner
//!  ┌───────────────────────────────┐              ┌──────────────────────────┐
//!  │ start() ─► spawn:             │              │ run(args)                │
//!  │   pulse_generator ──pulse──►  │              │  loop {                  │
//!  │   dispatcher                  │              │    attempt += 1          │
//!  │     ├─► spawn(action)         │              │    operation(args)       │
//!  │     ├─► started += 1          │              │    Ok / last ─► return   │
//!  │     └─► wait done | abort     │              │    sleep(backoff(n))     │
//!  │ stop()  ─► no new dispatches  │              │  }                       │
//!  │ abort() ─► detach in-flight   │              └────────────┬─────────────┘
//!  └──────────────┬────────────────┘                           │
//!                 │ publish (optional)        BackoffStrategy ◄┘
//!                 ▼
//!  ┌─────────────────────────────────────────────────────────────────────────┐
//!  │                 Bus (broadcast channel) ◄── RetryRunner                 │
//!  └───────────────────────────────┬─────────────────────────────────────────┘
//!                                  ▼
//!                      SubscriberSet (per-sub queues)
//!                        ┌─────────┼─────────┐
//!                        ▼         ▼         ▼
//!                    LogWriter   metrics   custom
//! ```
//!
//! ## Features
//! | Area              | Description                                             | Key types / traits                         |
//! |-------------------|---------------------------------------------------------|--------------------------------------------|
//! | **Interval**      | Periodic, serialized dispatch with stop/abort.          | [`IntervalScheduler`], [`ActionFn`]        |
//! | **Retry**         | Single-use bounded retries of an async operation.       | [`RetryRunner`]                            |
//! | **Backoff**       | Pure attempt → delay strategies.                        | [`BackoffStrategy`], [`BackoffPolicy`]     |
//! | **Events**        | Lifecycle events on a broadcast bus.                    | [`Bus`], [`Event`], [`Subscribe`]          |
//! | **Errors**        | Typed contract violations.                              | [`IntervalError`], [`RetryError`]          |
//! | **Configuration** | Shared defaults.                                        | [`Config`]                                 |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use pacer::{ActionFn, BackoffPolicy, IntervalScheduler, RetryRunner};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut ping = IntervalScheduler::new(
//!         Duration::from_millis(20),
//!         ActionFn::arc("ping", || async { println!("ping") }),
//!     )?;
//!     ping.start();
//!
//!     let mut connect = RetryRunner::new(
//!         |addr: &'static str| async move { Ok::<_, std::io::Error>(addr.len()) },
//!         3,
//!         BackoffPolicy::exponential(Duration::from_millis(10)),
//!     )?;
//!     let n = connect.run("127.0.0.1:8080").await?;
//!     assert_eq!(n, 14);
//!
//!     ping.stop()?;
//!     ping.join().await;
//!     Ok(())
//! }
//! ```
mod config;
mod error;
mod events;
mod interval;
mod policies;
mod retry;
mod subscribers;

// ---- Public re-exports ----

pub use config::Config;
pub use error::{BuildError, IntervalError, RetryError};
pub use events::{Bus, Event, EventKind};
pub use interval::{
    Action, ActionFn, ActionRef, BoxActionFuture, IntervalScheduler, IntervalSchedulerBuilder,
    SchedulerState,
};
pub use policies::{BackoffPolicy, BackoffRef, BackoffStrategy};
pub use retry::{RetryRunner, RetryRunnerBuilder};
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
