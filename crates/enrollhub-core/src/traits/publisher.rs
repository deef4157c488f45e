//! Event publisher trait.

use crate::events::DomainEvent;

/// Sink for committed domain events.
///
/// Publishing is fire-and-forget: it must not block and must not fail the
/// operation that produced the event, since that operation has already
/// committed.
pub trait EventPublisher: Send + Sync + 'static {
    /// Publish an event to all current subscribers.
    fn publish(&self, event: DomainEvent);
}
