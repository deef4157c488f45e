//! Waitlist entry model and queue ordering.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use enrollhub_core::types::id::{ClassId, OrganizationId, StudentId, WaitlistEntryId};

use super::status::WaitlistStatus;

/// A student's place in a class's waitlist.
///
/// `position` is assigned once at insertion (`max + 1` for the class) and is
/// never reassigned or reused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct WaitlistEntry {
    /// Unique entry identifier.
    pub id: WaitlistEntryId,
    /// Owning organization.
    pub organization_id: OrganizationId,
    /// The class.
    pub class_id: ClassId,
    /// The student.
    pub student_id: StudentId,
    /// Arrival order within the class.
    pub position: i32,
    /// Priority tier flag; priority entries are served first.
    pub is_priority: bool,
    /// Current status.
    pub status: WaitlistStatus,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Who added the entry.
    pub added_by: Option<Uuid>,
    /// When the entry was promoted into an enrollment.
    pub enrolled_at: Option<DateTime<Utc>>,
    /// When the entry was removed from the queue.
    pub removed_at: Option<DateTime<Utc>>,
    /// When the entry was created.
    pub created_at: DateTime<Utc>,
    /// When the entry was last updated.
    pub updated_at: DateTime<Utc>,
}

impl WaitlistEntry {
    /// Whether the entry is still waiting for a seat.
    pub fn is_waiting(&self) -> bool {
        self.status == WaitlistStatus::Waiting
    }

    /// Mark the entry as promoted.
    pub fn mark_enrolled(&mut self, now: DateTime<Utc>) {
        self.status = WaitlistStatus::Enrolled;
        self.enrolled_at = Some(now);
        self.updated_at = now;
    }

    /// Mark the entry as removed from the queue.
    pub fn mark_removed(&mut self, now: DateTime<Utc>) {
        self.status = WaitlistStatus::Removed;
        self.removed_at = Some(now);
        self.updated_at = now;
    }
}

/// Data supplied when a student joins the waitlist.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewWaitlistEntry {
    /// Serve ahead of non-priority entries.
    pub is_priority: bool,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Who is adding the entry.
    pub added_by: Option<Uuid>,
}

impl NewWaitlistEntry {
    /// Build the `WAITING` row at the given position.
    pub fn into_entry(
        self,
        organization_id: OrganizationId,
        class_id: ClassId,
        student_id: StudentId,
        position: i32,
        now: DateTime<Utc>,
    ) -> WaitlistEntry {
        WaitlistEntry {
            id: WaitlistEntryId::new(),
            organization_id,
            class_id,
            student_id,
            position,
            is_priority: self.is_priority,
            status: WaitlistStatus::Waiting,
            notes: self.notes,
            added_by: self.added_by,
            enrolled_at: None,
            removed_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Serving order: priority tier first, then ascending position.
pub fn queue_order(a: &WaitlistEntry, b: &WaitlistEntry) -> Ordering {
    b.is_priority
        .cmp(&a.is_priority)
        .then_with(|| a.position.cmp(&b.position))
}

/// Sort entries into serving order.
pub fn sort_queue(entries: &mut [WaitlistEntry]) {
    entries.sort_by(queue_order);
}
