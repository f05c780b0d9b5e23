//! Periodic gate poller.
//!
//! On each tick:
//! - Asks the gate `should_update()`. `false` → nothing this tick.
//! - Takes the gate's exclusion lock (if any) for the duration of the attempt.
//! - Runs `reconcile_fn().await`.
//! - `Ok` → `set_dirty(false)`. `Err` → gate left dirty; the retry interval
//!   governs the next attempt.
//!
//! A zero poll interval is refused at spawn time. The task runs until its `JoinHandle` is aborted or the runtime shuts down.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rsy_gate::Clock;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::SharedGate;

/// Counters exposed by a running poller.
#[derive(Debug, Default)]
pub struct PollerStats {
    attempts: AtomicU64,
    successes: AtomicU64,
    failures: AtomicU64,
}

impl PollerStats {
    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn successes(&self) -> u64 {
        self.successes.load(Ordering::SeqCst)
    }

    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::SeqCst)
    }
}

/// Spawn a task that polls `gate` every `interval` and reconciles on demand.
///
/// `name` only labels log lines. A zero `interval` is rejected.
pub fn spawn_gate_poller<C, F, Fut>(
    name: impl Into<String>,
    gate: SharedGate<C>,
    interval: Duration,
    reconcile_fn: F,
) -> anyhow::Result<(JoinHandle<()>, Arc<PollerStats>)>
where
    C: Clock + Send + 'static,
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    let name = name.into();
    if interval.is_zero() {
        anyhow::bail!("gate poller {name}: poll interval must be non-zero");
    }
    let stats = Arc::new(PollerStats::default());
    let task_stats = Arc::clone(&stats);

    let handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            if !gate.should_update() {
                continue;
            }

            // should_update already returned false while the lock was held,
            // so try_acquire only loses to a holder that raced in since.
            let lock = gate.exclusion_lock();
            let _guard = match lock.as_ref().map(|l| l.try_acquire()) {
                Some(None) => {
                    debug!(gate = %name, "reconcile skipped: exclusion lock taken");
                    continue;
                }
                Some(guard) => guard,
                None => None,
            };

            task_stats.attempts.fetch_add(1, Ordering::SeqCst);
            debug!(gate = %name, "reconcile attempt");
            match reconcile_fn().await {
                Ok(()) => {
                    gate.set_dirty(false);
                    task_stats.successes.fetch_add(1, Ordering::SeqCst);
                    debug!(gate = %name, "reconcile ok; gate clean");
                }
                Err(err) => {
                    task_stats.failures.fetch_add(1, Ordering::SeqCst);
                    let error = format!("{err:#}");
                    warn!(gate = %name, %error, "reconcile failed; will retry");
                }
            }
        }
    });

    Ok((handle, stats))
}
