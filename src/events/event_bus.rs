use super::types::{EventKind, PlayerEvent};
use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{RwLock, broadcast};
use tracing::trace;

/// Event subscriber handle
pub struct EventSubscriber {
    receiver: broadcast::Receiver<PlayerEvent>,
    filter: Option<EventFilter>,
}

impl EventSubscriber {
    /// Create a new subscriber with an optional filter
    pub fn new(receiver: broadcast::Receiver<PlayerEvent>, filter: Option<EventFilter>) -> Self {
        Self { receiver, filter }
    }

    /// Receive the next event matching the filter
    pub async fn recv(&mut self) -> Result<PlayerEvent> {
        loop {
            let event = self.receiver.recv().await?;

            // Check if event matches filter
            if let Some(ref filter) = self.filter {
                if filter.matches(&event) {
                    return Ok(event);
                }
            } else {
                return Ok(event);
            }
        }
    }

    /// Try to receive without blocking
    pub fn try_recv(&mut self) -> Result<Option<PlayerEvent>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if let Some(ref filter) = self.filter {
                        if filter.matches(&event) {
                            return Ok(Some(event));
                        }
                        // Continue to next event
                    } else {
                        return Ok(Some(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return Ok(None),
                Err(e) => return Err(e.into()),
            }
        }
    }
}

/// Event filter for selective subscription
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    kinds: Option<Vec<EventKind>>,
}

impl EventFilter {
    pub fn new() -> Self {
        Self { kinds: None }
    }

    pub fn with_kinds(mut self, kinds: Vec<EventKind>) -> Self {
        self.kinds = Some(kinds);
        self
    }

    pub fn matches(&self, event: &PlayerEvent) -> bool {
        if let Some(ref kinds) = self.kinds
            && !kinds.contains(&event.kind())
        {
            return false;
        }

        true
    }
}

/// Broadcast bus carrying the events of a single player instance.
///
/// The controller publishes, the application drains. Delivery order per
/// instance follows publish order; slow subscribers that overrun the buffer
/// lose oldest events first.
#[derive(Debug)]
pub struct EventBus {
    sender: broadcast::Sender<PlayerEvent>,
    stats: Arc<RwLock<EventBusStats>>,
}

#[derive(Debug, Default)]
pub struct EventBusStats {
    pub total_events: u64,
    pub events_by_kind: HashMap<&'static str, u64>,
    pub subscriber_count: usize,
    pub dropped_events: u64,
}

impl EventBus {
    /// Create a new event bus with specified buffer capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);

        Self {
            sender,
            stats: Arc::new(RwLock::new(EventBusStats::default())),
        }
    }

    /// Publish an event to all subscribers
    pub async fn publish(&self, event: PlayerEvent) -> Result<()> {
        trace!("Publishing event: {}", event.kind().as_str());

        // Update stats
        {
            let mut stats = self.stats.write().await;
            stats.total_events += 1;
            *stats
                .events_by_kind
                .entry(event.kind().as_str())
                .or_insert(0) += 1;
        }

        match self.sender.send(event) {
            Ok(_count) => Ok(()),
            Err(_) => {
                // No subscribers is normal, don't log
                let mut stats = self.stats.write().await;
                stats.dropped_events += 1;
                Ok(())
            }
        }
    }

    /// Subscribe to all events
    pub fn subscribe(&self) -> EventSubscriber {
        EventSubscriber::new(self.sender.subscribe(), None)
    }

    /// Subscribe with a filter
    pub fn subscribe_filtered(&self, filter: EventFilter) -> EventSubscriber {
        EventSubscriber::new(self.sender.subscribe(), Some(filter))
    }

    /// Subscribe to specific event kinds
    pub fn subscribe_to_kinds(&self, kinds: Vec<EventKind>) -> EventSubscriber {
        let filter = EventFilter::new().with_kinds(kinds);
        self.subscribe_filtered(filter)
    }

    /// Get current subscriber count
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Get event bus statistics
    pub async fn get_stats(&self) -> EventBusStats {
        let stats = self.stats.read().await;
        EventBusStats {
            total_events: stats.total_events,
            events_by_kind: stats.events_by_kind.clone(),
            subscriber_count: self.subscriber_count(),
            dropped_events: stats.dropped_events,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_event_bus_publish_subscribe() {
        let bus = EventBus::new(16);
        let mut subscriber = bus.subscribe();

        bus.publish(PlayerEvent::LoadStart).await.unwrap();

        let event = subscriber.recv().await.unwrap();
        assert_eq!(event, PlayerEvent::LoadStart);
    }

    #[tokio::test]
    async fn test_event_filter() {
        let bus = EventBus::new(16);

        // Subscribe only to progress events
        let mut progress_subscriber = bus.subscribe_to_kinds(vec![EventKind::Progress]);

        bus.publish(PlayerEvent::LoadStart).await.unwrap();
        bus.publish(PlayerEvent::Progress { progress: 4.0 })
            .await
            .unwrap();

        // Should only receive the progress event
        let event = progress_subscriber.recv().await.unwrap();
        assert_eq!(event, PlayerEvent::Progress { progress: 4.0 });
    }

    #[tokio::test]
    async fn test_publish_order_is_preserved() {
        let bus = EventBus::new(16);
        let mut subscriber = bus.subscribe();

        bus.publish(PlayerEvent::LoadStart).await.unwrap();
        bus.publish(PlayerEvent::Load { duration: None }).await.unwrap();
        bus.publish(PlayerEvent::Error {
            error: "boom".into(),
        })
        .await
        .unwrap();

        assert_eq!(subscriber.recv().await.unwrap(), PlayerEvent::LoadStart);
        assert_eq!(
            subscriber.recv().await.unwrap(),
            PlayerEvent::Load { duration: None }
        );
        assert_eq!(
            subscriber.recv().await.unwrap(),
            PlayerEvent::Error {
                error: "boom".into()
            }
        );
    }

    #[tokio::test]
    async fn test_event_stats() {
        let bus = EventBus::new(16);

        bus.publish(PlayerEvent::LoadStart).await.unwrap();
        bus.publish(PlayerEvent::Progress { progress: 1.0 })
            .await
            .unwrap();
        bus.publish(PlayerEvent::Progress { progress: 2.0 })
            .await
            .unwrap();

        let stats = bus.get_stats().await;
        assert_eq!(stats.total_events, 3);
        assert_eq!(stats.events_by_kind.get("onLoadStart"), Some(&1));
        assert_eq!(stats.events_by_kind.get("onProgress"), Some(&2));
    }
}
