//! Broadcaster port
//!
//! Lifecycle events leave the core through this port. A transport layer
//! (terminal progress, websocket, ...) subscribes on the other side.

use council_domain::EventEnvelope;
use tokio::sync::broadcast;

/// Receives every lifecycle event of every request
///
/// Called from the orchestrator and from the round join loop as each worker
/// finishes, so implementations must not block for long.
pub trait Broadcaster: Send + Sync {
    fn broadcast(&self, envelope: &EventEnvelope);
}

/// No-op broadcaster for silent runs
pub struct NoBroadcast;

impl Broadcaster for NoBroadcast {
    fn broadcast(&self, _envelope: &EventEnvelope) {}
}

/// Fans events out over a tokio broadcast channel
///
/// Sending with no subscribers is not an error; slow subscribers lag and
/// lose the oldest events.
pub struct ChannelBroadcaster {
    sender: broadcast::Sender<EventEnvelope>,
}

impl ChannelBroadcaster {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.sender.subscribe()
    }
}

impl Default for ChannelBroadcaster {
    fn default() -> Self {
        Self::new(256)
    }
}

impl Broadcaster for ChannelBroadcaster {
    fn broadcast(&self, envelope: &EventEnvelope) {
        let _ = self.sender.send(envelope.clone());
    }
}

/// Forwards every event to several broadcasters
pub struct CompositeBroadcaster {
    targets: Vec<std::sync::Arc<dyn Broadcaster>>,
}

impl CompositeBroadcaster {
    pub fn new(targets: Vec<std::sync::Arc<dyn Broadcaster>>) -> Self {
        Self { targets }
    }
}

impl Broadcaster for CompositeBroadcaster {
    fn broadcast(&self, envelope: &EventEnvelope) {
        for target in &self.targets {
            target.broadcast(envelope);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use council_domain::{CouncilEvent, RequestId};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_channel_delivers_to_subscribers() {
        let channel = ChannelBroadcaster::new(8);
        let mut rx = channel.subscribe();

        channel.broadcast(&EventEnvelope::new(RequestId::new("r"), CouncilEvent::Clear));

        let received = rx.recv().await.unwrap();
        assert_eq!(received.event, CouncilEvent::Clear);
        assert_eq!(received.request_id.as_str(), "r");
    }

    #[test]
    fn test_send_without_subscribers_is_silent() {
        ChannelBroadcaster::default()
            .broadcast(&EventEnvelope::new(RequestId::new("r"), CouncilEvent::RankingStart));
    }

    #[tokio::test]
    async fn test_composite_forwards_to_all() {
        let a = Arc::new(ChannelBroadcaster::new(4));
        let b = Arc::new(ChannelBroadcaster::new(4));
        let (mut rx_a, mut rx_b) = (a.subscribe(), b.subscribe());
        let composite = CompositeBroadcaster::new(vec![a, b, Arc::new(NoBroadcast)]);

        composite.broadcast(&EventEnvelope::new(RequestId::new("r"), CouncilEvent::Clear));

        assert_eq!(rx_a.recv().await.unwrap().event, CouncilEvent::Clear);
        assert_eq!(rx_b.recv().await.unwrap().event, CouncilEvent::Clear);
    }
}
