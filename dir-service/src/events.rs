//! In-process event bus feeding the `Events` RPC (spec.md §4.7's service
//! list). Push/Delete/Publish/Unpublish/Sign all emit here; subscribers
//! that fall behind simply miss the oldest events (per
//! `tokio::sync::broadcast`'s lagging-receiver semantics) rather than
//! stalling the publisher.

use dir_types::RecordEvent;
use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 1024;

#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<RecordEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    pub fn publish(&self, event: RecordEvent) {
        // No active subscribers is not an error; the event is simply dropped.
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RecordEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscriber_receives_published_event() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();
        bus.publish(RecordEvent::RecordPushed { cid: "cid1".into() });
        let event = rx.recv().await.unwrap();
        assert_eq!(event.cid(), "cid1");
    }

    #[test]
    fn publish_with_no_subscribers_does_not_panic() {
        let bus = EventBus::new();
        bus.publish(RecordEvent::RecordDeleted { cid: "cid1".into() });
    }
}
