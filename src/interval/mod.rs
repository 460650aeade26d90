//! Interval scheduling.
//!
//! ## Contents
//! - [`Action`], [`ActionFn`], [`ActionRef`] the unit dispatched on each pulse
//! - [`IntervalScheduler`] start/stop/abort control over periodic dispatch
//! - [`SchedulerState`] lifecycle states
//!
//! Internal:
//! - `dispatcher`: the pulse generator and dispatcher loops.

mod action;
mod dispatcher;
mod scheduler;

pub use action::{Action, ActionFn, ActionRef, BoxActionFuture};
pub use scheduler::{IntervalScheduler, IntervalSchedulerBuilder, SchedulerState};
