//! Change notification bus
//!
//! Propagates "the collection changed" signals to every live consumer.
//! Two independent channels feed it, because no single signal covers both
//! cases:
//!
//! - `CrossContext`: the collection file was modified by another process
//!   (published by the file watcher).
//! - `InProcess`: a mutating repository call in this process (published by
//!   the facade itself, which the watcher cannot attribute).
//!
//! The reconciler's periodic tick is published here too, so consumers have
//! one place to listen. Consumers re-fetch the full collection on any event
//! rather than applying diffs - correctness over efficiency, collection
//! sizes are small.

use tokio::sync::broadcast;
use tracing::debug;

/// Channel capacity; a lagged consumer coalesces into one refresh anyway
const BUS_CAPACITY: usize = 64;

/// Where a change signal came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOrigin {
    /// A mutation performed through the facade in this process
    InProcess,
    /// The collection file changed under another process
    CrossContext,
    /// The polling reconciler's fixed-interval tick
    Reconciler,
}

/// A single change notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeEvent {
    pub origin: ChangeOrigin,
}

/// Publish-subscribe service for collection change signals
#[derive(Clone)]
pub struct ChangeBus {
    tx: broadcast::Sender<ChangeEvent>,
}

impl ChangeBus {
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(BUS_CAPACITY);
        Self { tx }
    }

    /// Publish a change signal to every live subscription
    ///
    /// Publishing with no subscribers is fine - mutations don't care who is
    /// listening.
    pub fn publish(&self, origin: ChangeOrigin) {
        debug!("Publishing change event: {:?}", origin);
        let _ = self.tx.send(ChangeEvent { origin });
    }

    /// Open a new subscription
    ///
    /// Dropping the subscription unsubscribes; consumers must drop theirs on
    /// teardown so updates never reach an unmounted view.
    pub fn subscribe(&self) -> ChangeSubscription {
        ChangeSubscription {
            rx: self.tx.subscribe(),
        }
    }

    /// Number of live subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for ChangeBus {
    fn default() -> Self {
        Self::new()
    }
}

/// A disposable handle to the stream of change events
pub struct ChangeSubscription {
    rx: broadcast::Receiver<ChangeEvent>,
}

impl ChangeSubscription {
    /// Wait for the next change event
    ///
    /// Returns `None` once the bus has shut down. A subscriber that fell
    /// behind resumes with the oldest retained event; since consumers
    /// re-fetch the whole collection per event, missed signals collapse
    /// into the next refresh.
    pub async fn recv(&mut self) -> Option<ChangeEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!("Change subscription lagged, skipped {} events", skipped);
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_reaches_subscriber() {
        let bus = ChangeBus::new();
        let mut sub = bus.subscribe();

        bus.publish(ChangeOrigin::InProcess);

        let event = sub.recv().await.unwrap();
        assert_eq!(event.origin, ChangeOrigin::InProcess);
    }

    #[tokio::test]
    async fn test_all_subscribers_receive() {
        let bus = ChangeBus::new();
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();

        bus.publish(ChangeOrigin::CrossContext);

        assert_eq!(first.recv().await.unwrap().origin, ChangeOrigin::CrossContext);
        assert_eq!(second.recv().await.unwrap().origin, ChangeOrigin::CrossContext);
    }

    #[tokio::test]
    async fn test_late_subscriber_misses_earlier_events() {
        let bus = ChangeBus::new();
        bus.publish(ChangeOrigin::InProcess);

        let mut sub = bus.subscribe();
        bus.publish(ChangeOrigin::Reconciler);

        // Only the event published after subscribing is delivered
        assert_eq!(sub.recv().await.unwrap().origin, ChangeOrigin::Reconciler);
    }

    #[tokio::test]
    async fn test_drop_unsubscribes() {
        let bus = ChangeBus::new();
        let sub = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 1);

        drop(sub);
        assert_eq!(bus.subscriber_count(), 0);

        // Publishing into the void is not an error
        bus.publish(ChangeOrigin::InProcess);
    }
}
