//! # Example: retry_with_backoff
//!
//! Demonstrates how a [`RetryRunner`] re-invokes a failing operation
//! according to its [`BackoffPolicy`] and attempt budget.
//!
//! The operation fails twice before succeeding, showing the exponential
//! delays applied between attempts.
//!
//! ## Flow
//! ```text
//! RetryRunner::run()
//!   ├─► publish(AttemptStarting, attempt=1)
//!   ├─► operation() → Err("boom #1")
//!   ├─► publish(AttemptFailed)
//!   ├─► publish(BackoffScheduled{delay=200ms})
//!   ├─► sleep(delay)
//!   ├─► attempt=2 → Err("boom #2") → BackoffScheduled{delay=400ms}
//!   ├─► attempt=3 → Ok(())
//!   └─► publish(RetrySucceeded)
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example retry_with_backoff
//! ```

use std::{
    sync::atomic::{AtomicU32, Ordering},
    time::Duration,
};

use pacer::{BackoffPolicy, Bus, Config, EventKind, RetryRunner};

static FAIL_COUNT: AtomicU32 = AtomicU32::new(0);

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // 1. Bus to observe attempts (no subscribers: read the receiver directly)
    let bus = Bus::from_config(&Config::default());
    let mut rx = bus.subscribe();

    // 2. Operation that fails 2 times before succeeding
    let flaky = |endpoint: &'static str| async move {
        let attempt = FAIL_COUNT.fetch_add(1, Ordering::Relaxed) + 1;
        println!("[flaky] attempt {attempt} → {endpoint}");

        if attempt <= 2 {
            Err(format!("boom #{attempt}"))
        } else {
            Ok(attempt)
        }
    };

    // 3. Runner: at most 5 attempts, exponential backoff capped at 2s
    let mut runner = RetryRunner::builder(flaky)
        .name("flaky")
        .max_attempts(5)
        .backoff(
            BackoffPolicy::exponential(Duration::from_millis(100)).with_max(Duration::from_secs(2)),
        )
        .with_bus(bus)
        .build()?;

    let attempts = runner.run("db://primary").await?;
    println!(
        "[main] succeeded after {attempts} attempts (tried={})",
        runner.tried()
    );

    while let Ok(ev) = rx.try_recv() {
        if ev.kind == EventKind::BackoffScheduled {
            println!(
                "[main] backoff after attempt {:?}: {:?}ms",
                ev.attempt, ev.delay_ms
            );
        }
    }

    // 4. A runner is single-use
    let again = runner.run("db://primary").await;
    println!("[main] second run: {again:?}");
    Ok(())
}
