//! Latest-message state broadcaster
//!
//! A single mutable slot holding the most recently received message, backed
//! by a `tokio::sync::watch` channel. The channel is the one serialization
//! point for the slot and the subscriber set: publishes are totally ordered,
//! each subscriber sees its own stream in publish order, and a subscriber
//! that falls behind observes only the newest value (last-write-wins).
//! Notification happens on the subscribers' own tasks, so a slow consumer
//! never stalls a publisher or another consumer.

use tokio::sync::watch;

/// Initial slot value before any message has arrived
const INITIAL_MESSAGE: &str = "";

/// Holds the latest message and fans updates out to subscribers
pub struct Broadcaster {
    tx: watch::Sender<String>,
}

impl Broadcaster {
    /// Create a broadcaster holding the initial empty message
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(INITIAL_MESSAGE.to_string());
        Self { tx }
    }

    /// Replace the latest message and notify every active subscription
    ///
    /// Never fails; a publish with no subscribers still updates the slot so
    /// later subscribers observe it.
    pub fn publish(&self, value: impl Into<String>) {
        self.tx.send_replace(value.into());
    }

    /// The current latest message
    pub fn latest(&self) -> String {
        self.tx.borrow().clone()
    }

    /// Attach a subscription
    ///
    /// The subscription's first `recv()` yields the then-current value
    /// immediately, even if no publish has happened yet; every later
    /// `recv()` waits for a change.
    pub fn subscribe(&self) -> Subscription {
        Subscription {
            rx: self.tx.subscribe(),
            delivered_current: false,
        }
    }

    /// Number of attached subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Restore the initial empty message, notifying subscribers
    pub fn reset(&self) {
        self.tx.send_replace(INITIAL_MESSAGE.to_string());
    }
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::new()
    }
}

/// A live registration for latest-message updates
///
/// Obtained from [`Broadcaster::subscribe`]. The stream is infinite and not
/// restartable: it ends only when the subscription (or its broadcaster) is
/// dropped.
pub struct Subscription {
    rx: watch::Receiver<String>,
    delivered_current: bool,
}

impl Subscription {
    /// Receive the next observable value
    ///
    /// The first call returns the current value without waiting. Later
    /// calls wait for a publish; rapid publishes may coalesce, but the
    /// final value observed after things settle always equals the last one
    /// published. Returns `None` once the broadcaster is gone.
    pub async fn recv(&mut self) -> Option<String> {
        if !self.delivered_current {
            self.delivered_current = true;
            return Some(self.rx.borrow_and_update().clone());
        }

        match self.rx.changed().await {
            Ok(()) => Some(self.rx.borrow_and_update().clone()),
            Err(_) => None,
        }
    }

    /// Detach from the broadcaster
    ///
    /// Consuming the handle makes a double-unsubscribe unrepresentable;
    /// dropping the subscription has the same effect.
    pub fn unsubscribe(self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscriber_receives_initial_empty_value() {
        let broadcaster = Broadcaster::new();
        let mut sub = broadcaster.subscribe();
        assert_eq!(sub.recv().await.as_deref(), Some(""));
    }

    #[tokio::test]
    async fn test_publish_updates_latest() {
        let broadcaster = Broadcaster::new();
        assert_eq!(broadcaster.latest(), "");
        broadcaster.publish("hello");
        assert_eq!(broadcaster.latest(), "hello");
    }

    #[tokio::test]
    async fn test_subscriber_observes_publishes_in_order() {
        let broadcaster = Broadcaster::new();
        let mut sub = broadcaster.subscribe();
        assert_eq!(sub.recv().await.as_deref(), Some(""));

        broadcaster.publish("first");
        assert_eq!(sub.recv().await.as_deref(), Some("first"));

        broadcaster.publish("second");
        assert_eq!(sub.recv().await.as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn test_late_subscriber_gets_current_value_immediately() {
        let broadcaster = Broadcaster::new();
        broadcaster.publish("already here");

        let mut sub = broadcaster.subscribe();
        assert_eq!(sub.recv().await.as_deref(), Some("already here"));
    }

    #[tokio::test]
    async fn test_rapid_publishes_settle_on_last_value() {
        let broadcaster = Broadcaster::new();
        let mut sub = broadcaster.subscribe();
        assert_eq!(sub.recv().await.as_deref(), Some(""));

        // The subscriber never polled between these, so intermediate values
        // may coalesce; the settled value must be the last one.
        broadcaster.publish("m1");
        broadcaster.publish("m2");
        broadcaster.publish("m3");

        assert_eq!(sub.recv().await.as_deref(), Some("m3"));
    }

    #[tokio::test]
    async fn test_multiple_subscribers_each_see_updates() {
        let broadcaster = Broadcaster::new();
        let mut a = broadcaster.subscribe();
        let mut b = broadcaster.subscribe();
        assert_eq!(broadcaster.subscriber_count(), 2);

        assert_eq!(a.recv().await.as_deref(), Some(""));
        assert_eq!(b.recv().await.as_deref(), Some(""));

        broadcaster.publish("fanout");
        assert_eq!(a.recv().await.as_deref(), Some("fanout"));
        assert_eq!(b.recv().await.as_deref(), Some("fanout"));
    }

    #[tokio::test]
    async fn test_unsubscribe_detaches() {
        let broadcaster = Broadcaster::new();
        let sub = broadcaster.subscribe();
        assert_eq!(broadcaster.subscriber_count(), 1);

        sub.unsubscribe();
        assert_eq!(broadcaster.subscriber_count(), 0);

        // Publishing with nobody attached still updates the slot.
        broadcaster.publish("nobody listening");
        assert_eq!(broadcaster.latest(), "nobody listening");
    }

    #[tokio::test]
    async fn test_reset_restores_initial_value() {
        let broadcaster = Broadcaster::new();
        broadcaster.publish("state");
        broadcaster.reset();
        assert_eq!(broadcaster.latest(), "");

        let mut sub = broadcaster.subscribe();
        assert_eq!(sub.recv().await.as_deref(), Some(""));
    }

    #[tokio::test]
    async fn test_recv_ends_when_broadcaster_dropped() {
        let broadcaster = Broadcaster::new();
        let mut sub = broadcaster.subscribe();
        assert_eq!(sub.recv().await.as_deref(), Some(""));

        drop(broadcaster);
        assert_eq!(sub.recv().await, None);
    }
}
