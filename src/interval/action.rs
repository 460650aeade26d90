//! # Action abstraction and function-backed implementation.
//!
//! An [`Action`] is the zero-argument unit an [`IntervalScheduler`](super::IntervalScheduler)
//! dispatches on every pulse. [`ActionFn`] wraps a closure `F: Fn() -> Fut`,
//! producing a fresh future per dispatch. The common handle type is [`ActionRef`].
//!
//! ## Concurrency semantics
//! - Each call to [`Action::spawn`] creates a **new** future that owns its state.
//! - The future is driven on its own tokio task, detached from the dispatcher.
//! - Nothing interrupts a running action: stop and abort only affect dispatching.
//!   If shared state is needed across dispatches, capture an `Arc<...>` explicitly.
//!
//! ## Example
//! ```rust
//! use pacer::{ActionFn, ActionRef};
//!
//! let a: ActionRef = ActionFn::arc("heartbeat", || async {
//!     // do work...
//! });
//!
//! assert_eq!(a.name(), "heartbeat");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Boxed future returned by [`Action::spawn`].
pub type BoxActionFuture = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Shared handle to an action.
pub type ActionRef = Arc<dyn Action>;

/// # Zero-argument asynchronous unit of work.
///
/// # Example
/// ```
/// use pacer::{Action, BoxActionFuture};
///
/// struct Flush;
///
/// impl Action for Flush {
///     fn name(&self) -> &str { "flush" }
///
///     fn spawn(&self) -> BoxActionFuture {
///         Box::pin(async {
///             // flush buffers...
///         })
///     }
/// }
/// ```
pub trait Action: Send + Sync + 'static {
    /// Returns a stable, human-readable name (used as the event source).
    fn name(&self) -> &str;

    /// Creates the future for one execution.
    fn spawn(&self) -> BoxActionFuture;
}

/// Function-backed action.
///
/// Wraps a closure that *creates* a new future per dispatch.
#[derive(Debug)]
pub struct ActionFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> ActionFn<F> {
    /// Creates a new function-backed action.
    ///
    /// Prefer [`ActionFn::arc`] when you immediately need an [`ActionRef`].
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the action and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

impl<F, Fut> Action for ActionFn<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn spawn(&self) -> BoxActionFuture {
        Box::pin((self.f)())
    }
}
