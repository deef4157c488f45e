//! Enrollment status.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of an enrollment record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "enrollment_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentStatus {
    /// Holds a seat in the class.
    Active,
    /// Left the class; the seat was released.
    Withdrawn,
    /// Finished the class.
    Completed,
    /// Moved to another class.
    Transferred,
    /// Temporarily absent.
    OnLeave,
}

impl EnrollmentStatus {
    /// Return the status as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Withdrawn => "withdrawn",
            Self::Completed => "completed",
            Self::Transferred => "transferred",
            Self::OnLeave => "on_leave",
        }
    }
}

impl fmt::Display for EnrollmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
