//! Waitlist repository.

use sqlx::{PgConnection, PgPool};

use enrollhub_core::error::{AdmissionError, AppError, ErrorKind};
use enrollhub_core::result::{AdmissionResult, AppResult};
use enrollhub_core::types::id::{ClassId, StudentId, WaitlistEntryId};
use enrollhub_entity::waitlist::WaitlistEntry;

use super::violates;

/// Partial unique index allowing one `waiting` entry per (class, student).
const ONE_WAITING_PER_PAIR: &str = "waitlist_one_waiting_per_pair";

/// Serving order shared by every queue read.
const QUEUE_ORDER: &str = "ORDER BY is_priority DESC, position ASC";

/// Repository for waitlist reads outside of an admission unit.
#[derive(Debug, Clone)]
pub struct WaitlistRepository {
    pool: PgPool,
}

impl WaitlistRepository {
    /// Create a new waitlist repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Waiting entries of a class in serving order.
    pub async fn list_waiting(&self, class_id: ClassId) -> AppResult<Vec<WaitlistEntry>> {
        sqlx::query_as::<_, WaitlistEntry>(&format!(
            "SELECT * FROM waitlist_entries WHERE class_id = $1 AND status = 'waiting' {QUEUE_ORDER}"
        ))
        .bind(class_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list waitlist", e))
    }
}

/// The next free position: one past the highest ever assigned in the class.
pub async fn next_position(conn: &mut PgConnection, class_id: ClassId) -> AdmissionResult<i32> {
    let position = sqlx::query_scalar::<_, i32>(
        "SELECT COALESCE(MAX(position), 0) + 1 FROM waitlist_entries WHERE class_id = $1",
    )
    .bind(class_id)
    .fetch_one(conn)
    .await
    .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to compute position", e))?;
    Ok(position)
}

/// Insert an entry; a second waiting entry for the pair is `AlreadyWaitlisted`.
pub async fn insert(conn: &mut PgConnection, entry: &WaitlistEntry) -> AdmissionResult<WaitlistEntry> {
    sqlx::query_as::<_, WaitlistEntry>(
        "INSERT INTO waitlist_entries (id, organization_id, class_id, student_id, position, \
         is_priority, status, notes, added_by, enrolled_at, removed_at, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) RETURNING *",
    )
    .bind(entry.id)
    .bind(entry.organization_id)
    .bind(entry.class_id)
    .bind(entry.student_id)
    .bind(entry.position)
    .bind(entry.is_priority)
    .bind(entry.status)
    .bind(&entry.notes)
    .bind(entry.added_by)
    .bind(entry.enrolled_at)
    .bind(entry.removed_at)
    .bind(entry.created_at)
    .bind(entry.updated_at)
    .fetch_one(conn)
    .await
    .map_err(|e| {
        if violates(&e, ONE_WAITING_PER_PAIR) {
            AdmissionError::AlreadyWaitlisted {
                class_id: entry.class_id,
                student_id: entry.student_id,
            }
        } else {
            AppError::with_source(ErrorKind::Database, "Failed to create waitlist entry", e).into()
        }
    })
}

/// Lock and return the entry served next.
pub async fn next_waiting(
    conn: &mut PgConnection,
    class_id: ClassId,
) -> AdmissionResult<Option<WaitlistEntry>> {
    let entry = sqlx::query_as::<_, WaitlistEntry>(&format!(
        "SELECT * FROM waitlist_entries WHERE class_id = $1 AND status = 'waiting' \
         {QUEUE_ORDER} LIMIT 1 FOR UPDATE"
    ))
    .bind(class_id)
    .fetch_optional(conn)
    .await
    .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to read waitlist head", e))?;
    Ok(entry)
}

/// Mark the student's waiting entry `removed`.
pub async fn remove_waiting(
    conn: &mut PgConnection,
    class_id: ClassId,
    student_id: StudentId,
) -> AdmissionResult<Option<WaitlistEntry>> {
    let entry = sqlx::query_as::<_, WaitlistEntry>(
        "UPDATE waitlist_entries SET status = 'removed', removed_at = NOW(), updated_at = NOW() \
         WHERE class_id = $1 AND student_id = $2 AND status = 'waiting' RETURNING *",
    )
    .bind(class_id)
    .bind(student_id)
    .fetch_optional(conn)
    .await
    .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to remove waitlist entry", e))?;
    Ok(entry)
}

/// Mark a waiting entry `enrolled`. Returns `None` if it was not waiting.
pub async fn mark_enrolled(
    conn: &mut PgConnection,
    entry_id: WaitlistEntryId,
) -> AdmissionResult<Option<WaitlistEntry>> {
    let entry = sqlx::query_as::<_, WaitlistEntry>(
        "UPDATE waitlist_entries SET status = 'enrolled', enrolled_at = NOW(), updated_at = NOW() \
         WHERE id = $1 AND status = 'waiting' RETURNING *",
    )
    .bind(entry_id)
    .fetch_optional(conn)
    .await
    .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to promote waitlist entry", e))?;
    Ok(entry)
}
