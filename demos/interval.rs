//! # Example: interval
//!
//! Runs a slow action on a fixed pulse, stops it gracefully, then shows how
//! abort detaches an in-flight action. Events are printed by [`LogWriter`].
//!
//! ## Run
//! ```bash
//! cargo run --example interval --features logging
//! ```

use std::{sync::Arc, time::Duration};

use pacer::{ActionFn, Bus, Config, IntervalScheduler, LogWriter, Subscribe, SubscriberSet};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let bus = Bus::from_config(&Config::default());
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let set = SubscriberSet::listen(subs, &bus);

    // ============================================================
    // Demo 1: graceful stop waits for the in-flight action
    // ============================================================
    let tick = ActionFn::arc("tick", || async {
        tokio::time::sleep(Duration::from_millis(150)).await;
    });
    let mut sched = IntervalScheduler::builder(Duration::from_millis(100), tick)
        .with_bus(bus.clone())
        .build()?;

    sched.start();
    tokio::time::sleep(Duration::from_secs(1)).await;
    sched.stop()?;
    sched.join().await;
    println!(" ─► stopped after {} dispatches", sched.started());

    // ============================================================
    // Demo 2: abort releases the dispatcher immediately
    // ============================================================
    let slow = ActionFn::arc("slow", || async {
        tokio::time::sleep(Duration::from_secs(2)).await;
        println!("{:>4}[slow] finished (detached)", "");
    });
    let mut sched = IntervalScheduler::builder(Duration::from_millis(500), slow)
        .with_bus(bus.clone())
        .build()?;

    sched.start();
    tokio::time::sleep(Duration::from_millis(700)).await;
    sched.abort()?;
    sched.join().await;
    println!(" ─► aborted after {} dispatches", sched.started());

    if let Err(e) = sched.abort() {
        println!(" ─► second abort: {e} ({})", e.as_label());
    }

    tokio::time::sleep(Duration::from_secs(2)).await;
    set.shutdown().await;
    Ok(())
}
