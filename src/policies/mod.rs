//! Backoff policies.
//!
//! This module groups the knobs that control **how long** to wait between
//! attempts of a [`RetryRunner`](crate::RetryRunner).
//!
//! ## Contents
//! - [`BackoffStrategy`] the capability: attempt count → wait duration
//! - [`BackoffPolicy`]   built-in exponential / linear implementation
//! - [`BackoffRef`]      shared handle (`Arc<dyn BackoffStrategy>`)
//!
//! ## Defaults
//! - `BackoffPolicy::default()` → exponential, base=100ms, max=30s.

mod backoff;

pub use backoff::{BackoffPolicy, BackoffRef, BackoffStrategy};
