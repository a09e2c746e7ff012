//! Tally events and the in-process event bus.
//!
//! The bus fans tally updates out to any number of subscribers (admin
//! dashboards). It is deliberately one-way: registration publishes after its
//! transaction commits, so a rolled-back transaction never leaks an event.
//!
//! Backpressure policy is drop-oldest: a subscriber that falls behind skips
//! the oldest buffered events and resumes at the newest, which is correct for
//! tallies because a later count always supersedes an earlier one. A stalled
//! subscriber never blocks the publisher or other subscribers.

use serde::Serialize;
use tokio::sync::broadcast;

/// An event on the tally topic. Serialised shapes match the subscriber wire
/// protocol (`type` tag plus payload fields).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TallyEvent {
    /// Current tally sent to a subscriber on connect.
    Snapshot { run_id: i64, count: i64 },
    /// The count for a run changed.
    TallyUpdate { run_id: i64, count: i64 },
    /// A registration was admitted; carries the runner for dashboards that
    /// show a live feed.
    RegistrationSuccess {
        run_id: i64,
        count: i64,
        runner_name: String,
    },
}

impl TallyEvent {
    pub fn run_id(&self) -> i64 {
        match self {
            TallyEvent::Snapshot { run_id, .. }
            | TallyEvent::TallyUpdate { run_id, .. }
            | TallyEvent::RegistrationSuccess { run_id, .. } => *run_id,
        }
    }

    pub fn count(&self) -> i64 {
        match self {
            TallyEvent::Snapshot { count, .. }
            | TallyEvent::TallyUpdate { count, .. }
            | TallyEvent::RegistrationSuccess { count, .. } => *count,
        }
    }
}

/// In-process publish/subscribe bus for tally events.
///
/// Cloning is cheap and shares the underlying channel. Each subscriber holds
/// a bounded buffer of `capacity` events; dropping the receiver unsubscribes
/// and releases the buffer.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<TallyEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Registers a new subscriber. Events published after this call are
    /// delivered in publish order, subject to the drop-oldest policy.
    pub fn subscribe(&self) -> broadcast::Receiver<TallyEvent> {
        self.sender.subscribe()
    }

    /// Publishes an event to all current subscribers. Never blocks; returns
    /// the number of subscribers the event was delivered to (zero when no
    /// dashboard is connected, which is not an error).
    pub fn publish(&self, event: TallyEvent) -> usize {
        match self.sender.send(event) {
            Ok(n) => n,
            Err(_) => 0,
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::broadcast::error::RecvError;

    #[tokio::test]
    async fn test_subscriber_receives_in_publish_order() {
        let bus = EventBus::new(16);
        let mut sub = bus.subscribe();

        for count in 1..=3 {
            bus.publish(TallyEvent::TallyUpdate { run_id: 7, count });
        }

        for expected in 1..=3 {
            let event = sub.recv().await.unwrap();
            assert_eq!(event.count(), expected);
            assert_eq!(event.run_id(), 7);
        }
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_ok() {
        let bus = EventBus::new(16);
        assert_eq!(bus.publish(TallyEvent::Snapshot { run_id: 1, count: 0 }), 0);
    }

    #[tokio::test]
    async fn test_slow_subscriber_drops_oldest_and_resumes_at_newest() {
        let bus = EventBus::new(2);
        let mut sub = bus.subscribe();

        for count in 1..=5 {
            bus.publish(TallyEvent::TallyUpdate { run_id: 1, count });
        }

        // Buffer held only the newest two; the lag is reported once and the
        // subscriber continues from there.
        match sub.recv().await {
            Err(RecvError::Lagged(missed)) => assert_eq!(missed, 3),
            other => panic!("expected lag, got {:?}", other),
        }
        assert_eq!(sub.recv().await.unwrap().count(), 4);
        assert_eq!(sub.recv().await.unwrap().count(), 5);
    }

    #[tokio::test]
    async fn test_independent_subscribers() {
        let bus = EventBus::new(16);
        let mut a = bus.subscribe();
        let mut b = bus.subscribe();

        assert_eq!(
            bus.publish(TallyEvent::TallyUpdate { run_id: 1, count: 1 }),
            2
        );
        assert_eq!(a.recv().await.unwrap().count(), 1);
        assert_eq!(b.recv().await.unwrap().count(), 1);

        drop(a);
        assert_eq!(bus.subscriber_count(), 1);
        assert_eq!(
            bus.publish(TallyEvent::TallyUpdate { run_id: 1, count: 2 }),
            1
        );
    }

    #[test]
    fn test_event_serialisation_shapes() {
        let update = serde_json::to_value(TallyEvent::TallyUpdate { run_id: 3, count: 12 }).unwrap();
        assert_eq!(update["type"], "tally_update");
        assert_eq!(update["run_id"], 3);
        assert_eq!(update["count"], 12);

        let success = serde_json::to_value(TallyEvent::RegistrationSuccess {
            run_id: 3,
            count: 13,
            runner_name: "12345678".into(),
        })
        .unwrap();
        assert_eq!(success["type"], "registration_success");
        assert_eq!(success["runner_name"], "12345678");

        let snapshot = serde_json::to_value(TallyEvent::Snapshot { run_id: 3, count: 13 }).unwrap();
        assert_eq!(snapshot["type"], "snapshot");
    }
}
