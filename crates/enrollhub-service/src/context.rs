//! Request context carrying the calling organization and actor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use enrollhub_core::types::id::OrganizationId;

/// Context for the current request.
///
/// Resolved by the surrounding auth layer and passed into every service
/// method so that each operation is scoped to one organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The organization the caller acts within.
    pub organization_id: OrganizationId,
    /// The acting user, if known.
    pub actor_id: Option<Uuid>,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(organization_id: OrganizationId, actor_id: Option<Uuid>) -> Self {
        Self {
            organization_id,
            actor_id,
            request_time: Utc::now(),
        }
    }

    /// Context for system-initiated work (CLI, startup recovery).
    pub fn system(organization_id: OrganizationId) -> Self {
        Self::new(organization_id, None)
    }
}
