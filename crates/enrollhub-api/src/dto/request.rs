//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use enrollhub_core::error::AppError;
use enrollhub_entity::class::ClassStatus;

/// Direct enrollment request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EnrollRequest {
    /// Student to enroll.
    pub student_id: Uuid,
    /// Notes stored on the enrollment.
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

/// Withdrawal request body.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct WithdrawRequest {
    /// Why the student is leaving.
    #[validate(length(max = 2000))]
    pub reason: Option<String>,
}

/// Waitlist join request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AddToWaitlistRequest {
    /// Student to queue.
    pub student_id: Uuid,
    /// Serve ahead of non-priority entries.
    #[serde(default)]
    pub is_priority: bool,
    /// Notes stored on the entry.
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

/// Status change request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeStatusRequest {
    /// Target status (snake_case).
    pub status: ClassStatus,
}

/// Run `validator` rules, mapping failures to a validation error.
pub fn validate_request<T: Validate>(req: &T) -> Result<(), AppError> {
    req.validate()
        .map_err(|e| AppError::validation(format!("Validation failed: {e}")))
}
