//! Enrollment entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use enrollhub_core::types::id::{ClassId, EnrollmentId, OrganizationId, StudentId};

use super::status::EnrollmentStatus;

/// Note stamped on enrollments created by waitlist promotion.
pub const AUTO_ENROLL_NOTE: &str = "auto-enrolled from waitlist";

/// A student's enrollment in a class.
///
/// At most one `ACTIVE` row exists per (student, class); earlier rows for the
/// same pair are kept as history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Enrollment {
    /// Unique enrollment identifier.
    pub id: EnrollmentId,
    /// Owning organization.
    pub organization_id: OrganizationId,
    /// The class.
    pub class_id: ClassId,
    /// The student.
    pub student_id: StudentId,
    /// Current status.
    pub status: EnrollmentStatus,
    /// Free-form notes supplied with the enrollment.
    pub notes: Option<String>,
    /// Who performed the enrollment (None = system).
    pub enrolled_by: Option<Uuid>,
    /// When the seat was taken.
    pub enrolled_at: DateTime<Utc>,
    /// When the student withdrew.
    pub withdrawn_at: Option<DateTime<Utc>>,
    /// Why the student withdrew.
    pub withdrawal_reason: Option<String>,
    /// When the row was created.
    pub created_at: DateTime<Utc>,
    /// When the row was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Enrollment {
    /// Whether this row holds a seat.
    pub fn is_active(&self) -> bool {
        self.status == EnrollmentStatus::Active
    }

    /// Build a fresh `ACTIVE` row.
    pub fn activate(
        organization_id: OrganizationId,
        class_id: ClassId,
        student_id: StudentId,
        terms: &EnrollmentTerms,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: EnrollmentId::new(),
            organization_id,
            class_id,
            student_id,
            status: EnrollmentStatus::Active,
            notes: terms.notes.clone(),
            enrolled_by: terms.enrolled_by,
            enrolled_at: now,
            withdrawn_at: None,
            withdrawal_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Transition to `WITHDRAWN`, stamping reason and time.
    pub fn withdraw(&mut self, reason: Option<String>, now: DateTime<Utc>) {
        self.status = EnrollmentStatus::Withdrawn;
        self.withdrawal_reason = reason;
        self.withdrawn_at = Some(now);
        self.updated_at = now;
    }
}

/// Caller-supplied terms of an enrollment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollmentTerms {
    /// Free-form notes.
    pub notes: Option<String>,
    /// Who is performing the enrollment (None = system).
    pub enrolled_by: Option<Uuid>,
}

impl EnrollmentTerms {
    /// Terms used when the engine promotes a waitlisted student.
    pub fn auto_from_waitlist() -> Self {
        Self {
            notes: Some(AUTO_ENROLL_NOTE.to_string()),
            enrolled_by: None,
        }
    }
}
