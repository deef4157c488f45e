//! Student directory trait consumed by the admission engine.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::id::{OrganizationId, StudentId};

/// Read-only view over the student records owned by the wider backend.
///
/// The admission engine never mutates students; it only needs to know that a
/// student exists inside the caller's organization before admitting them.
#[async_trait]
pub trait StudentDirectory: Send + Sync + 'static {
    /// Check whether the student exists and belongs to the organization.
    async fn student_exists(
        &self,
        organization_id: OrganizationId,
        student_id: StudentId,
    ) -> AppResult<bool>;
}
