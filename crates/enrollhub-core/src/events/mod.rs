//! Domain events emitted by EnrollHub operations.
//!
//! Events are published only after the unit of work that produced them has
//! committed. Collaborators (notifications, billing, audit) subscribe to
//! them; nothing inside the admission engine waits on a consumer.

pub mod admission;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::id::OrganizationId;

pub use admission::AdmissionEvent;

/// Wrapper for all domain events with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    /// Unique event ID.
    pub id: Uuid,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// The tenant the event belongs to.
    pub organization_id: OrganizationId,
    /// The user who caused the event (if applicable).
    pub actor_id: Option<Uuid>,
    /// The event payload.
    pub payload: EventPayload,
}

/// Union of all domain event types.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event")]
pub enum EventPayload {
    /// An admission-related event.
    Admission(AdmissionEvent),
}

impl DomainEvent {
    /// Create a new domain event.
    pub fn new(
        organization_id: OrganizationId,
        actor_id: Option<Uuid>,
        payload: EventPayload,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            organization_id,
            actor_id,
            payload,
        }
    }

    /// Convenience constructor for admission events.
    pub fn admission(
        organization_id: OrganizationId,
        actor_id: Option<Uuid>,
        event: AdmissionEvent,
    ) -> Self {
        Self::new(organization_id, actor_id, EventPayload::Admission(event))
    }

    /// Short name of the event for log lines.
    pub fn name(&self) -> &'static str {
        match &self.payload {
            EventPayload::Admission(event) => event.name(),
        }
    }
}
