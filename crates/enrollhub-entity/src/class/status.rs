//! Class lifecycle status.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a class offering.
///
/// `DRAFT → OPEN_FOR_ENROLLMENT → FULL → IN_PROGRESS → COMPLETED`, with
/// `CANCELLED` and `ON_HOLD` reachable from any non-terminal state. The
/// `OPEN_FOR_ENROLLMENT ↔ FULL` edge is driven by capacity only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "class_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ClassStatus {
    /// Being prepared; not visible for enrollment.
    Draft,
    /// Accepting enrollments.
    OpenForEnrollment,
    /// Every seat is taken.
    Full,
    /// Sessions have started.
    InProgress,
    /// The class has finished.
    Completed,
    /// The class was called off.
    Cancelled,
    /// Temporarily suspended.
    OnHold,
}

impl ClassStatus {
    /// Check if the class is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Whether new students may be admitted (seat availability decided separately).
    pub fn accepts_enrollment(&self) -> bool {
        matches!(self, Self::OpenForEnrollment | Self::Full | Self::InProgress)
    }

    /// Whether an administrator may move the class from `self` to `target`.
    ///
    /// `OPEN_FOR_ENROLLMENT ↔ FULL` is never a manual transition.
    pub fn can_transition_to(&self, target: ClassStatus) -> bool {
        if *self == target || self.is_terminal() {
            return false;
        }
        match (self, target) {
            (_, Self::Cancelled | Self::OnHold) => true,
            (Self::Draft, Self::OpenForEnrollment) => true,
            (Self::OpenForEnrollment | Self::Full, Self::InProgress) => true,
            (Self::InProgress, Self::Completed) => true,
            (Self::OnHold, Self::OpenForEnrollment | Self::InProgress) => true,
            _ => false,
        }
    }

    /// Return the status as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::OpenForEnrollment => "open_for_enrollment",
            Self::Full => "full",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::OnHold => "on_hold",
        }
    }
}

impl fmt::Display for ClassStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
