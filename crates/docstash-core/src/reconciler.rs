//! Polling reconciler
//!
//! Fixed-interval safety net alongside the change bus: publishes an
//! unconditional refresh signal so that views converge even when a mutation
//! path forgot to publish. Cost is a constant low rate of background
//! re-reads, acceptable at the expected collection sizes. This is a
//! deliberate, documented reconciliation policy - removing it would require
//! auditing every mutation path for a missed publish first.
//!
//! Consumers must tolerate being refreshed with unchanged data.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::bus::{ChangeBus, ChangeOrigin};

/// Handle to a running reconciler task
pub struct ReconcilerHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl ReconcilerHandle {
    /// Stop the reconciler and wait for the task to finish
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        let _ = self.task.await;
    }
}

/// Spawn a background task publishing `Reconciler` ticks at a fixed interval
pub fn spawn_reconciler(interval: Duration, bus: ChangeBus) -> ReconcilerHandle {
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick fires immediately; consumers already fetched on
        // mount, so skip it.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    debug!("Reconciler tick");
                    bus.publish(ChangeOrigin::Reconciler);
                }
                res = shutdown_rx.changed() => {
                    // A dropped handle closes the channel; stop either way
                    if res.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }
    });

    ReconcilerHandle {
        shutdown: shutdown_tx,
        task,
    }
}
