//! Class repository.

use chrono::Utc;
use sqlx::{PgConnection, PgPool};

use enrollhub_core::error::{AppError, ErrorKind};
use enrollhub_core::result::{AdmissionResult, AppResult};
use enrollhub_core::types::id::ClassId;
use enrollhub_entity::class::{Class, ClassStatus, NewClass};

/// Repository for class rows outside of an admission unit.
#[derive(Debug, Clone)]
pub struct ClassRepository {
    pool: PgPool,
}

impl ClassRepository {
    /// Create a new class repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a class by ID.
    pub async fn find_by_id(&self, id: ClassId) -> AppResult<Option<Class>> {
        sqlx::query_as::<_, Class>("SELECT * FROM classes WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find class", e))
    }

    /// Insert a new class.
    pub async fn create(&self, new_class: NewClass) -> AppResult<Class> {
        new_class.validate().map_err(AppError::validation)?;
        let class = new_class.into_class(ClassId::new(), Utc::now());

        sqlx::query_as::<_, Class>(
            "INSERT INTO classes (id, organization_id, name, min_capacity, max_capacity, \
             current_enrollment, status, waitlist_enabled, auto_enroll_from_waitlist, \
             created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) RETURNING *",
        )
        .bind(class.id)
        .bind(class.organization_id)
        .bind(&class.name)
        .bind(class.min_capacity)
        .bind(class.max_capacity)
        .bind(class.current_enrollment)
        .bind(class.status)
        .bind(class.waitlist_enabled)
        .bind(class.auto_enroll_from_waitlist)
        .bind(class.created_at)
        .bind(class.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create class", e))
    }

    /// List every class ID.
    pub async fn list_ids(&self) -> AppResult<Vec<ClassId>> {
        sqlx::query_scalar::<_, ClassId>("SELECT id FROM classes ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list classes", e))
    }
}

/// Lock a class row for the rest of the transaction.
pub async fn lock(conn: &mut PgConnection, id: ClassId) -> AdmissionResult<Option<Class>> {
    let class = sqlx::query_as::<_, Class>("SELECT * FROM classes WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(conn)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to lock class", e))?;
    Ok(class)
}

/// Take one seat if one is free. Returns the updated row, or `None` when full.
pub async fn try_reserve_seat(conn: &mut PgConnection, id: ClassId) -> AdmissionResult<Option<Class>> {
    let class = sqlx::query_as::<_, Class>(
        "UPDATE classes SET current_enrollment = current_enrollment + 1, updated_at = NOW() \
         WHERE id = $1 AND current_enrollment < max_capacity RETURNING *",
    )
    .bind(id)
    .fetch_optional(conn)
    .await
    .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to reserve seat", e))?;
    Ok(class)
}

/// Give one seat back, floored at zero; a full class reopens.
pub async fn release_seat(conn: &mut PgConnection, id: ClassId) -> AdmissionResult<Class> {
    let class = sqlx::query_as::<_, Class>(
        "UPDATE classes SET current_enrollment = GREATEST(current_enrollment - 1, 0), \
         status = CASE WHEN status = 'full' THEN 'open_for_enrollment'::class_status ELSE status END, \
         updated_at = NOW() \
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .fetch_one(conn)
    .await
    .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to release seat", e))?;
    Ok(class)
}

/// Move an open class to `full` when no seat is left.
pub async fn mark_full_if_at_capacity(
    conn: &mut PgConnection,
    id: ClassId,
) -> AdmissionResult<Option<Class>> {
    let class = sqlx::query_as::<_, Class>(
        "UPDATE classes SET status = 'full', updated_at = NOW() \
         WHERE id = $1 AND status = 'open_for_enrollment' \
         AND current_enrollment >= max_capacity RETURNING *",
    )
    .bind(id)
    .fetch_optional(conn)
    .await
    .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update class status", e))?;
    Ok(class)
}

/// Overwrite the lifecycle status.
pub async fn set_status(
    conn: &mut PgConnection,
    id: ClassId,
    status: ClassStatus,
) -> AdmissionResult<Class> {
    let class = sqlx::query_as::<_, Class>(
        "UPDATE classes SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(status)
    .fetch_one(conn)
    .await
    .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update class status", e))?;
    Ok(class)
}

/// Overwrite the enrollment counter.
pub async fn set_enrollment_count(
    conn: &mut PgConnection,
    id: ClassId,
    count: i32,
) -> AdmissionResult<Class> {
    let class = sqlx::query_as::<_, Class>(
        "UPDATE classes SET current_enrollment = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(count)
    .fetch_one(conn)
    .await
    .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to set enrollment count", e))?;
    Ok(class)
}
