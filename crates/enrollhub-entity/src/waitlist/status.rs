//! Waitlist entry status.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a waitlist entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "waitlist_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum WaitlistStatus {
    /// Waiting for a seat.
    Waiting,
    /// Promoted into an enrollment.
    Enrolled,
    /// Dropped from the queue (e.g. enrolled directly).
    Removed,
}

impl WaitlistStatus {
    /// Return the status as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::Enrolled => "enrolled",
            Self::Removed => "removed",
        }
    }
}

impl fmt::Display for WaitlistStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
