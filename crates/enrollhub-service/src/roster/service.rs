//! Roster, waitlist, and capacity queries.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use enrollhub_core::error::AdmissionError;
use enrollhub_core::result::AdmissionResult;
use enrollhub_core::types::id::{ClassId, StudentId};
use enrollhub_database::store::AdmissionStore;
use enrollhub_entity::class::{CapacitySnapshot, Class};
use enrollhub_entity::enrollment::Enrollment;
use enrollhub_entity::waitlist::WaitlistEntry;

use crate::context::RequestContext;

/// A student's place in the served order of a waitlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitlistPosition {
    /// The waiting entry.
    pub entry: WaitlistEntry,
    /// 1-based rank in serving order (priority tier first).
    pub rank: usize,
    /// Total number of waiting entries.
    pub queue_length: usize,
}

/// Read-only views of a class's enrollments and queue.
///
/// Reads are not taken inside an admission unit, so they may trail a
/// concurrent commit by one operation.
#[derive(Clone)]
pub struct RosterService {
    store: Arc<dyn AdmissionStore>,
}

impl std::fmt::Debug for RosterService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RosterService").finish()
    }
}

impl RosterService {
    /// Creates a new roster service.
    pub fn new(store: Arc<dyn AdmissionStore>) -> Self {
        Self { store }
    }

    /// Fetch a class visible to the caller.
    pub async fn get_class(&self, ctx: &RequestContext, class_id: ClassId) -> AdmissionResult<Class> {
        self.store
            .find_class(class_id)
            .await?
            .filter(|class| class.organization_id == ctx.organization_id)
            .ok_or(AdmissionError::ClassNotFound(class_id))
    }

    /// `ACTIVE` enrollments, oldest first.
    pub async fn list_roster(
        &self,
        ctx: &RequestContext,
        class_id: ClassId,
    ) -> AdmissionResult<Vec<Enrollment>> {
        self.get_class(ctx, class_id).await?;
        Ok(self.store.list_roster(class_id).await?)
    }

    /// `WAITING` entries in serving order.
    pub async fn list_waitlist(
        &self,
        ctx: &RequestContext,
        class_id: ClassId,
    ) -> AdmissionResult<Vec<WaitlistEntry>> {
        self.get_class(ctx, class_id).await?;
        Ok(self.store.list_waiting(class_id).await?)
    }

    /// Seats, queue length, and minimum-enrollment status.
    pub async fn capacity(
        &self,
        ctx: &RequestContext,
        class_id: ClassId,
    ) -> AdmissionResult<CapacitySnapshot> {
        let class = self.get_class(ctx, class_id).await?;
        let waiting = self.store.list_waiting(class_id).await?;
        Ok(CapacitySnapshot::new(&class, waiting.len() as i64))
    }

    /// Where the student stands in the queue.
    pub async fn waitlist_position(
        &self,
        ctx: &RequestContext,
        class_id: ClassId,
        student_id: StudentId,
    ) -> AdmissionResult<WaitlistPosition> {
        let waiting = self.list_waitlist(ctx, class_id).await?;
        let queue_length = waiting.len();

        waiting
            .into_iter()
            .enumerate()
            .find(|(_, entry)| entry.student_id == student_id)
            .map(|(idx, entry)| WaitlistPosition {
                entry,
                rank: idx + 1,
                queue_length,
            })
            .ok_or(AdmissionError::WaitlistEntryNotFound {
                class_id,
                student_id,
            })
    }
}
