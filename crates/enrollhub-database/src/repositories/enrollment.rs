//! Enrollment repository.

use sqlx::{PgConnection, PgPool};

use enrollhub_core::error::{AdmissionError, AppError, ErrorKind};
use enrollhub_core::result::{AdmissionResult, AppResult};
use enrollhub_core::types::id::{ClassId, StudentId};
use enrollhub_entity::enrollment::{Enrollment, EnrollmentStatus};

use super::violates;

/// Partial unique index allowing one `active` row per (class, student).
const ONE_ACTIVE_PER_PAIR: &str = "enrollments_one_active_per_pair";

/// Repository for enrollment reads outside of an admission unit.
#[derive(Debug, Clone)]
pub struct EnrollmentRepository {
    pool: PgPool,
}

impl EnrollmentRepository {
    /// Create a new enrollment repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Active enrollments of a class, oldest first.
    pub async fn list_active(&self, class_id: ClassId) -> AppResult<Vec<Enrollment>> {
        sqlx::query_as::<_, Enrollment>(
            "SELECT * FROM enrollments WHERE class_id = $1 AND status = 'active' \
             ORDER BY enrolled_at ASC, id ASC",
        )
        .bind(class_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list roster", e))
    }
}

/// The student's active row in the class.
pub async fn find_active(
    conn: &mut PgConnection,
    class_id: ClassId,
    student_id: StudentId,
) -> AdmissionResult<Option<Enrollment>> {
    let enrollment = sqlx::query_as::<_, Enrollment>(
        "SELECT * FROM enrollments WHERE class_id = $1 AND student_id = $2 AND status = 'active'",
    )
    .bind(class_id)
    .bind(student_id)
    .fetch_optional(conn)
    .await
    .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find enrollment", e))?;
    Ok(enrollment)
}

/// Whether any row with `status` exists for the pair.
pub async fn exists(
    conn: &mut PgConnection,
    class_id: ClassId,
    student_id: StudentId,
    status: EnrollmentStatus,
) -> AdmissionResult<bool> {
    let found = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM enrollments \
         WHERE class_id = $1 AND student_id = $2 AND status = $3)",
    )
    .bind(class_id)
    .bind(student_id)
    .bind(status)
    .fetch_one(conn)
    .await
    .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to check enrollment", e))?;
    Ok(found)
}

/// Insert a row; a second active row for the pair is `AlreadyEnrolled`.
pub async fn insert(conn: &mut PgConnection, enrollment: &Enrollment) -> AdmissionResult<Enrollment> {
    sqlx::query_as::<_, Enrollment>(
        "INSERT INTO enrollments (id, organization_id, class_id, student_id, status, notes, \
         enrolled_by, enrolled_at, withdrawn_at, withdrawal_reason, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) RETURNING *",
    )
    .bind(enrollment.id)
    .bind(enrollment.organization_id)
    .bind(enrollment.class_id)
    .bind(enrollment.student_id)
    .bind(enrollment.status)
    .bind(&enrollment.notes)
    .bind(enrollment.enrolled_by)
    .bind(enrollment.enrolled_at)
    .bind(enrollment.withdrawn_at)
    .bind(&enrollment.withdrawal_reason)
    .bind(enrollment.created_at)
    .bind(enrollment.updated_at)
    .fetch_one(conn)
    .await
    .map_err(|e| {
        if violates(&e, ONE_ACTIVE_PER_PAIR) {
            AdmissionError::AlreadyEnrolled {
                class_id: enrollment.class_id,
                student_id: enrollment.student_id,
            }
        } else {
            AppError::with_source(ErrorKind::Database, "Failed to create enrollment", e).into()
        }
    })
}

/// Move the active row to `withdrawn`. Returns `None` if there was none.
pub async fn withdraw(
    conn: &mut PgConnection,
    class_id: ClassId,
    student_id: StudentId,
    reason: Option<&str>,
) -> AdmissionResult<Option<Enrollment>> {
    let enrollment = sqlx::query_as::<_, Enrollment>(
        "UPDATE enrollments SET status = 'withdrawn', withdrawal_reason = $3, \
         withdrawn_at = NOW(), updated_at = NOW() \
         WHERE class_id = $1 AND student_id = $2 AND status = 'active' RETURNING *",
    )
    .bind(class_id)
    .bind(student_id)
    .bind(reason)
    .fetch_optional(conn)
    .await
    .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to withdraw enrollment", e))?;
    Ok(enrollment)
}

/// Number of active rows for the class.
pub async fn count_active(conn: &mut PgConnection, class_id: ClassId) -> AdmissionResult<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM enrollments WHERE class_id = $1 AND status = 'active'",
    )
    .bind(class_id)
    .fetch_one(conn)
    .await
    .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count enrollments", e))?;
    Ok(count)
}
