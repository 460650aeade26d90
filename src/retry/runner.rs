//! # RetryRunner: bounded sequential retries of a fallible operation.
//!
//! Re-invokes an async operation until it succeeds or `max_attempts` is reached,
//! sleeping between attempts as dictated by a [`BackoffStrategy`].
//!
//! ## Event flow
//! For each attempt, the runner publishes (when built with a bus):
//! ```text
//! AttemptStarting → [operation] → RetrySucceeded (Ok)
//!                               → AttemptFailed (Err)
//!
//! If budget left:
//!   → BackoffScheduled → [sleep] → (next attempt)
//! Else:
//!   → RetriesExhausted
//! ```
//!
//! ## Rules
//! - Attempts run **sequentially** (never parallel)
//! - Attempt counter **increments on each invocation** (monotonic, never resets)
//! - A runner is **single-use**: a second `run` fails with [`RetryError::AlreadyUsed`]
//! - Only the **last** attempt's error is surfaced

use std::borrow::Cow;
use std::fmt;
use std::future::Future;
use std::num::NonZeroU32;
use std::sync::Arc;

use tokio::sync::watch;
use tokio::time;

use crate::config::Config;
use crate::error::{BuildError, RetryError};
use crate::events::{Bus, Event, EventKind, emit};
use crate::policies::{BackoffRef, BackoffStrategy};

/// Runs an operation with retries and backoff, exactly once.
///
/// `F` is an `FnMut(A) -> impl Future<Output = Result<T, E>>`; each attempt
/// receives a clone of the arguments passed to [`run`](Self::run).
///
/// # Example
/// ```rust
/// use std::time::Duration;
/// use pacer::{BackoffPolicy, RetryError, RetryRunner};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let mut calls = 0;
/// let mut runner = RetryRunner::new(
///     move |url: &'static str| {
///         calls += 1;
///         let n = calls;
///         async move {
///             if n < 3 { Err(format!("{url}: refused")) } else { Ok(n) }
///         }
///     },
///     5,
///     BackoffPolicy::linear(Duration::from_millis(1)),
/// )
/// .unwrap();
///
/// assert_eq!(runner.run("http://example").await, Ok(3));
/// assert_eq!(runner.tried(), 3);
///
/// // Single-use.
/// assert_eq!(runner.run("http://example").await, Err(RetryError::AlreadyUsed));
/// # }
/// ```
pub struct RetryRunner<F> {
    operation: F,
    max_attempts: NonZeroU32,
    backoff: BackoffRef,
    name: Cow<'static, str>,
    bus: Option<Bus>,
    attempts: watch::Sender<u32>,
    used: bool,
}

impl<F> RetryRunner<F> {
    /// Creates a runner.
    ///
    /// Fails with [`BuildError::ZeroAttempts`] if `max_attempts` is zero.
    pub fn new(
        operation: F,
        max_attempts: u32,
        backoff: impl BackoffStrategy,
    ) -> Result<Self, BuildError> {
        Self::builder(operation)
            .max_attempts(max_attempts)
            .backoff(backoff)
            .build()
    }

    /// Creates a runner taking the attempt budget and backoff from `cfg`.
    pub fn with_defaults(operation: F, cfg: &Config) -> Result<Self, BuildError> {
        Self::builder(operation)
            .max_attempts(cfg.max_attempts)
            .backoff(cfg.backoff)
            .build()
    }

    /// Returns a builder for `operation`.
    pub fn builder(operation: F) -> RetryRunnerBuilder<F> {
        RetryRunnerBuilder {
            operation,
            max_attempts: 0,
            backoff: None,
            name: Cow::Borrowed("retry"),
            bus: None,
        }
    }

    /// Number of attempts made so far.
    pub fn tried(&self) -> u32 {
        *self.attempts.borrow()
    }

    /// Returns a receiver observing the attempt count.
    ///
    /// Useful to watch progress from another task while [`run`](Self::run)
    /// holds the runner mutably borrowed.
    pub fn attempts(&self) -> watch::Receiver<u32> {
        self.attempts.subscribe()
    }

    /// Whether [`run`](Self::run) was already invoked.
    pub fn is_used(&self) -> bool {
        self.used
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts.get()
    }

    /// Runs the operation until it succeeds or the attempt budget is spent.
    ///
    /// ### Flow
    /// 1. Fail with [`RetryError::AlreadyUsed`] if the runner was used before
    /// 2. Invoke the operation with a clone of `args`
    /// 3. On success, or after the last allowed attempt, return the outcome
    /// 4. Otherwise sleep `backoff.wait_duration(attempts_so_far)` and repeat
    ///
    /// The runner is marked used as soon as the run begins, so a run whose
    /// future is dropped midway cannot be replayed either.
    ///
    /// `E` needs no bounds; published `AttemptFailed` and `RetriesExhausted`
    /// events carry no `reason`. Use [`run_described`](Self::run_described)
    /// to have the error text attached.
    pub async fn run<A, Fut, T, E>(&mut self, args: A) -> Result<T, RetryError<E>>
    where
        F: FnMut(A) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        A: Clone,
    {
        self.drive(args, |_| None).await
    }

    /// Same as [`run`](Self::run), with each attempt's error rendered into
    /// the `reason` of the failure events.
    pub async fn run_described<A, Fut, T, E>(&mut self, args: A) -> Result<T, RetryError<E>>
    where
        F: FnMut(A) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        A: Clone,
        E: fmt::Display,
    {
        self.drive(args, |e| Some(e.to_string())).await
    }

    async fn drive<A, Fut, T, E>(
        &mut self,
        args: A,
        describe: fn(&E) -> Option<String>,
    ) -> Result<T, RetryError<E>>
    where
        F: FnMut(A) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        A: Clone,
    {
        if self.used {
            return Err(RetryError::AlreadyUsed);
        }
        self.used = true;

        loop {
            let attempt = self.next_attempt();
            emit(self.bus.as_ref(), || {
                Event::new(EventKind::AttemptStarting)
                    .with_source(self.name.clone())
                    .with_attempt(u64::from(attempt))
            });

            let err = match (self.operation)(args.clone()).await {
                Ok(value) => {
                    emit(self.bus.as_ref(), || {
                        Event::new(EventKind::RetrySucceeded)
                            .with_source(self.name.clone())
                            .with_attempt(u64::from(attempt))
                    });
                    return Ok(value);
                }
                Err(err) => err,
            };

            emit(self.bus.as_ref(), || {
                let ev = Event::new(EventKind::AttemptFailed)
                    .with_source(self.name.clone())
                    .with_attempt(u64::from(attempt));
                with_described(ev, describe(&err))
            });

            if attempt >= self.max_attempts.get() {
                emit(self.bus.as_ref(), || {
                    let ev = Event::new(EventKind::RetriesExhausted)
                        .with_source(self.name.clone())
                        .with_attempt(u64::from(attempt));
                    with_described(ev, describe(&err))
                });
                return Err(RetryError::Operation(err));
            }

            let delay = self.backoff.wait_duration(attempt);
            emit(self.bus.as_ref(), || {
                Event::new(EventKind::BackoffScheduled)
                    .with_source(self.name.clone())
                    .with_attempt(u64::from(attempt))
                    .with_delay(delay)
            });
            time::sleep(delay).await;
        }
    }

    fn next_attempt(&mut self) -> u32 {
        let mut attempt = 0;
        self.attempts.send_modify(|n| {
            *n = n.saturating_add(1);
            attempt = *n;
        });
        attempt
    }
}

impl<F> fmt::Debug for RetryRunner<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryRunner")
            .field("name", &self.name)
            .field("max_attempts", &self.max_attempts)
            .field("tried", &self.tried())
            .field("used", &self.used)
            .finish_non_exhaustive()
    }
}

fn with_described(ev: Event, reason: Option<String>) -> Event {
    match reason {
        Some(reason) => ev.with_reason(reason),
        None => ev,
    }
}

/// Builder for [`RetryRunner`].
///
/// Both an attempt budget (`>= 1`) and a backoff strategy are required.
pub struct RetryRunnerBuilder<F> {
    operation: F,
    max_attempts: u32,
    backoff: Option<BackoffRef>,
    name: Cow<'static, str>,
    bus: Option<Bus>,
}

impl<F> RetryRunnerBuilder<F> {
    /// Maximum number of operation invocations.
    pub fn max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = n;
        self
    }

    /// Backoff strategy between attempts.
    pub fn backoff(mut self, backoff: impl BackoffStrategy) -> Self {
        self.backoff = Some(Arc::new(backoff));
        self
    }

    /// Name used as the source of published events. Default: `"retry"`.
    pub fn name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = name.into();
        self
    }

    /// Publishes attempt events on `bus`.
    pub fn with_bus(mut self, bus: Bus) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Validates the parameters and builds the runner.
    pub fn build(self) -> Result<RetryRunner<F>, BuildError> {
        let max_attempts = NonZeroU32::new(self.max_attempts).ok_or(BuildError::ZeroAttempts)?;
        let backoff = self.backoff.ok_or(BuildError::MissingBackoff)?;
        let (attempts, _) = watch::channel(0);

        Ok(RetryRunner {
            operation: self.operation,
            max_attempts,
            backoff,
            name: self.name,
            bus: self.bus,
            attempts,
            used: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policies::BackoffPolicy;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;
    use tokio::time::Instant;

    fn always_fails(calls: Arc<AtomicU32>) -> impl FnMut(()) -> std::future::Ready<Result<(), String>> {
        move |_: ()| {
            calls.fetch_add(1, Ordering::SeqCst);
            std::future::ready(Err("failed".to_string()))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_max_attempts_exhausted() {
        let calls = Arc::new(AtomicU32::new(0));
        let mut runner = RetryRunner::new(
            always_fails(Arc::clone(&calls)),
            5,
            BackoffPolicy::exponential(Duration::from_millis(1)),
        )
        .unwrap();

        let res = runner.run(()).await;

        assert_eq!(res, Err(RetryError::Operation("failed".to_string())));
        assert_eq!(runner.tried(), 5);
        assert_eq!(calls.load(Ordering::SeqCst), 5);
        assert!(runner.is_used());
    }

    #[tokio::test(start_paused = true)]
    async fn test_pass_before_max_attempts() {
        let mut n = 0;
        let mut runner = RetryRunner::new(
            move |_: ()| {
                n += 1;
                let k = n;
                async move { if k == 1 { Err("flaky") } else { Ok(k) } }
            },
            5,
            BackoffPolicy::exponential(Duration::from_millis(1)),
        )
        .unwrap();

        assert_eq!(runner.run(()).await, Ok(2));
        assert_eq!(runner.tried(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_run_rejected() {
        let calls = Arc::new(AtomicU32::new(0));
        let mut runner = RetryRunner::new(
            always_fails(Arc::clone(&calls)),
            3,
            BackoffPolicy::linear(Duration::from_millis(1)),
        )
        .unwrap();

        let _ = runner.run(()).await;
        assert_eq!(runner.tried(), 3);

        let again = runner.run(()).await;
        assert!(again.as_ref().is_err_and(|e| e.is_already_used()));
        assert_eq!(runner.tried(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3, "operation must not be re-invoked");
    }

    #[tokio::test(start_paused = true)]
    async fn test_linear_waits_between_attempts() {
        let mut runner = RetryRunner::new(
            always_fails(Arc::new(AtomicU32::new(0))),
            4,
            BackoffPolicy::linear(Duration::from_millis(100)),
        )
        .unwrap();

        let start = Instant::now();
        let _ = runner.run(()).await;
        // Three sleeps between four attempts, none after the last.
        assert_eq!(start.elapsed(), Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exponential_waits_use_attempt_count() {
        let mut runner = RetryRunner::new(
            always_fails(Arc::new(AtomicU32::new(0))),
            4,
            BackoffPolicy::exponential(Duration::from_millis(10)),
        )
        .unwrap();

        let start = Instant::now();
        let _ = runner.run(()).await;
        // wait_duration(1) + wait_duration(2) + wait_duration(3) = 20 + 40 + 80
        assert_eq!(start.elapsed(), Duration::from_millis(140));
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_attempt_never_sleeps() {
        let mut runner = RetryRunner::new(
            always_fails(Arc::new(AtomicU32::new(0))),
            1,
            BackoffPolicy::linear(Duration::from_secs(60)),
        )
        .unwrap();

        let start = Instant::now();
        assert!(runner.run(()).await.is_err());
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(runner.tried(), 1);
    }

    #[tokio::test]
    async fn test_args_cloned_into_each_attempt() {
        let mut seen = Vec::new();
        let mut runner = RetryRunner::new(
            |args: (String, u8)| {
                seen.push(args.clone());
                async move { Err::<(), _>(format!("{} {}", args.0, args.1)) }
            },
            2,
            BackoffPolicy::linear(Duration::ZERO),
        )
        .unwrap();

        let err = runner.run(("job".to_string(), 7)).await.unwrap_err();
        assert_eq!(err.into_operation().as_deref(), Some("job 7"));
        drop(runner);
        assert_eq!(seen, vec![("job".to_string(), 7), ("job".to_string(), 7)]);
    }

    #[test]
    fn test_build_errors() {
        let op = |_: ()| std::future::ready(Ok::<(), String>(()));

        let zero = RetryRunner::new(op, 0, BackoffPolicy::default());
        assert_eq!(zero.err(), Some(BuildError::ZeroAttempts));

        let missing = RetryRunner::builder(op).max_attempts(3).build();
        assert_eq!(missing.err(), Some(BuildError::MissingBackoff));

        let zero_cfg = Config {
            max_attempts: 0,
            ..Config::default()
        };
        assert_eq!(
            RetryRunner::with_defaults(op, &zero_cfg).err(),
            Some(BuildError::ZeroAttempts)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_with_defaults_uses_config() {
        let calls = Arc::new(AtomicU32::new(0));
        let cfg = Config {
            max_attempts: 2,
            backoff: BackoffPolicy::linear(Duration::from_millis(5)),
            ..Config::default()
        };
        let mut runner = RetryRunner::with_defaults(always_fails(Arc::clone(&calls)), &cfg).unwrap();
        assert_eq!(runner.max_attempts(), 2);

        let start = Instant::now();
        let _ = runner.run(()).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(start.elapsed(), Duration::from_millis(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_attempts_observable_mid_run() {
        let mut runner = RetryRunner::new(
            always_fails(Arc::new(AtomicU32::new(0))),
            3,
            BackoffPolicy::linear(Duration::from_secs(1)),
        )
        .unwrap();
        let mut rx = runner.attempts();

        let watcher = async move {
            let seen = *rx.wait_for(|n| *n >= 2).await.expect("runner alive");
            (seen, Instant::now())
        };
        let start = Instant::now();
        let (res, (seen, at)) = tokio::join!(runner.run(()), watcher);

        assert!(res.is_err());
        assert_eq!(seen, 2);
        // Second attempt starts right after the first one-second backoff.
        assert_eq!(at - start, Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_publishes_attempt_events() {
        let bus = Bus::new(64);
        let mut rx = bus.subscribe();
        let mut n = 0;
        let mut runner = RetryRunner::builder(move |_: ()| {
            n += 1;
            let k = n;
            async move { if k < 2 { Err("refused") } else { Ok(()) } }
        })
        .name("fetch")
        .max_attempts(3)
        .backoff(BackoffPolicy::linear(Duration::from_millis(50)))
        .with_bus(bus)
        .build()
        .unwrap();

        runner.run_described(()).await.unwrap();

        let mut events = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            assert_eq!(ev.source.as_deref(), Some("fetch"));
            events.push(ev);
        }
        let kinds: Vec<_> = events.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                EventKind::AttemptStarting,
                EventKind::AttemptFailed,
                EventKind::BackoffScheduled,
                EventKind::AttemptStarting,
                EventKind::RetrySucceeded,
            ]
        );
        assert_eq!(events[1].reason.as_deref(), Some("refused"));
        assert_eq!(events[2].delay_ms, Some(50));
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_without_display_is_surfaced() {
        #[derive(Debug, PartialEq)]
        struct Opaque(u8);

        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let op = |code: u8| std::future::ready(Err::<(), _>(Opaque(code)));
        let mut runner = RetryRunner::builder(op)
            .max_attempts(2)
            .backoff(BackoffPolicy::linear(Duration::from_millis(1)))
            .with_bus(bus)
            .build()
            .unwrap();

        assert_eq!(runner.run(9).await, Err(RetryError::Operation(Opaque(9))));
        assert_eq!(runner.tried(), 2);

        let mut failures = 0;
        while let Ok(ev) = rx.try_recv() {
            if ev.kind == EventKind::AttemptFailed {
                failures += 1;
                assert!(ev.reason.is_none());
            }
        }
        assert_eq!(failures, 2);
    }
}
