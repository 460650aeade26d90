//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to events emitted by interval schedulers, retry runners
//! and subscriber workers.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! Publishing is opt-in: a scheduler or runner built without a bus emits nothing.

mod bus;
mod event;

pub use bus::Bus;
pub(crate) use bus::emit;
pub use event::{Event, EventKind};
