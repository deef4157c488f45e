//! Administrative class status transitions.

use std::sync::Arc;

use tracing::info;

use enrollhub_core::error::AdmissionError;
use enrollhub_core::events::{AdmissionEvent, DomainEvent};
use enrollhub_core::result::AdmissionResult;
use enrollhub_core::traits::EventPublisher;
use enrollhub_core::types::id::ClassId;
use enrollhub_database::store::AdmissionStore;
use enrollhub_entity::class::{Class, ClassStatus};

use crate::context::RequestContext;

/// Applies manual lifecycle transitions under the class lock.
#[derive(Clone)]
pub struct ClassLifecycleService {
    store: Arc<dyn AdmissionStore>,
    events: Arc<dyn EventPublisher>,
}

impl std::fmt::Debug for ClassLifecycleService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassLifecycleService").finish()
    }
}

impl ClassLifecycleService {
    /// Creates a new lifecycle service.
    pub fn new(store: Arc<dyn AdmissionStore>, events: Arc<dyn EventPublisher>) -> Self {
        Self { store, events }
    }

    /// Move the class to `target`.
    ///
    /// Opening a class whose seats are all taken lands on `FULL`.
    pub async fn change_status(
        &self,
        ctx: &RequestContext,
        class_id: ClassId,
        target: ClassStatus,
    ) -> AdmissionResult<Class> {
        let mut unit = self.store.begin(class_id).await?;
        if unit.class().organization_id != ctx.organization_id {
            return Err(AdmissionError::ClassNotFound(class_id));
        }

        let from = unit.class().status;
        if !from.can_transition_to(target) {
            return Err(AdmissionError::InvalidStatusTransition {
                class_id,
                from: from.to_string(),
                to: target.to_string(),
            });
        }

        let effective = if target == ClassStatus::OpenForEnrollment && unit.class().is_at_capacity() {
            ClassStatus::Full
        } else {
            target
        };

        unit.set_status(effective).await?;
        let class = unit.class().clone();
        unit.commit().await?;

        info!(
            class_id = %class_id,
            from = %from,
            to = %effective,
            requested = %target,
            "Class status changed"
        );

        self.events.publish(DomainEvent::admission(
            ctx.organization_id,
            ctx.actor_id,
            AdmissionEvent::ClassStatusChanged {
                class_id,
                from: from.to_string(),
                to: effective.to_string(),
            },
        ));

        Ok(class)
    }
}
