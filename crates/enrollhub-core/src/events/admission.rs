//! Admission-related domain events.

use serde::{Deserialize, Serialize};

use crate::types::id::{ClassId, EnrollmentId, StudentId, WaitlistEntryId};

/// Events related to class enrollment and the waitlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AdmissionEvent {
    /// A student was enrolled directly.
    StudentEnrolled {
        /// The class.
        class_id: ClassId,
        /// The student.
        student_id: StudentId,
        /// The new enrollment.
        enrollment_id: EnrollmentId,
        /// Seats taken after the enrollment.
        current_enrollment: i32,
    },
    /// A student withdrew from a class.
    StudentWithdrawn {
        /// The class.
        class_id: ClassId,
        /// The student.
        student_id: StudentId,
        /// The withdrawn enrollment.
        enrollment_id: EnrollmentId,
        /// The stated reason, if any.
        reason: Option<String>,
    },
    /// A student joined the waitlist.
    StudentWaitlisted {
        /// The class.
        class_id: ClassId,
        /// The student.
        student_id: StudentId,
        /// The new waitlist entry.
        entry_id: WaitlistEntryId,
        /// Insertion position within the class.
        position: i32,
        /// Whether the entry is in the priority tier.
        is_priority: bool,
    },
    /// A waitlisted student took a seat freed by a withdrawal.
    StudentPromoted {
        /// The class.
        class_id: ClassId,
        /// The promoted student.
        student_id: StudentId,
        /// The enrollment created for the promoted student.
        enrollment_id: EnrollmentId,
        /// The waitlist entry that was consumed.
        entry_id: WaitlistEntryId,
    },
    /// The class lifecycle status changed.
    ClassStatusChanged {
        /// The class.
        class_id: ClassId,
        /// Previous status.
        from: String,
        /// New status.
        to: String,
    },
}

impl AdmissionEvent {
    /// Short name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            Self::StudentEnrolled { .. } => "student_enrolled",
            Self::StudentWithdrawn { .. } => "student_withdrawn",
            Self::StudentWaitlisted { .. } => "student_waitlisted",
            Self::StudentPromoted { .. } => "student_promoted",
            Self::ClassStatusChanged { .. } => "class_status_changed",
        }
    }

    /// The class the event concerns.
    pub fn class_id(&self) -> ClassId {
        match self {
            Self::StudentEnrolled { class_id, .. }
            | Self::StudentWithdrawn { class_id, .. }
            | Self::StudentWaitlisted { class_id, .. }
            | Self::StudentPromoted { class_id, .. }
            | Self::ClassStatusChanged { class_id, .. } => *class_id,
        }
    }
}
