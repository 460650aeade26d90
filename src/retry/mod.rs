//! Bounded retries.
//!
//! ## Contents
//! - [`RetryRunner`] single-use runner driving sequential attempts with backoff
//! - [`RetryRunnerBuilder`] validated construction (attempt budget, backoff, bus)
//!
//! ## Quick wiring
//! ```text
//! RetryRunner { operation, max_attempts, backoff: BackoffRef }
//!      └─► run(args) uses:
//!           - max_attempts to decide continue/exit
//!           - backoff.wait_duration(attempts_so_far) to sleep between attempts
//! ```

mod runner;

pub use runner::{RetryRunner, RetryRunnerBuilder};
