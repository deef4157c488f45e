//! Broadcast-backed event bus.

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use enrollhub_core::config::EventsConfig;
use enrollhub_core::events::DomainEvent;
use enrollhub_core::traits::EventPublisher;

/// Fan-out of domain events to in-process subscribers.
///
/// Sending never blocks; a subscriber that falls more than `buffer_size`
/// events behind skips the oldest ones.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<DomainEvent>,
}

impl EventBus {
    /// Create a bus holding at most `buffer_size` undelivered events per subscriber.
    pub fn new(buffer_size: usize) -> Self {
        let (sender, _) = broadcast::channel(buffer_size.max(1));
        Self { sender }
    }

    /// Create a bus sized from configuration.
    pub fn from_config(config: &EventsConfig) -> Self {
        Self::new(config.buffer_size)
    }

    /// Subscribe to every event published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.sender.subscribe()
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Spawn a task that writes every event to the log until the bus closes.
    pub fn spawn_logger(&self) -> JoinHandle<()> {
        let mut receiver = self.subscribe();
        tokio::spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(event) => {
                        let payload = serde_json::to_string(&event.payload).unwrap_or_default();
                        info!(
                            event_id = %event.id,
                            event = event.name(),
                            organization_id = %event.organization_id,
                            payload = %payload,
                            "Domain event"
                        );
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Event logger lagged behind");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        debug!("Event bus closed, logger stopping");
                        break;
                    }
                }
            }
        })
    }
}

impl EventPublisher for EventBus {
    fn publish(&self, event: DomainEvent) {
        // No receivers is not an error.
        let _ = self.sender.send(event);
    }
}
