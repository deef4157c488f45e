//! Student directories backing the admission engine's existence checks.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use sqlx::PgPool;

use enrollhub_core::error::{AppError, ErrorKind};
use enrollhub_core::result::AppResult;
use enrollhub_core::traits::StudentDirectory;
use enrollhub_core::types::id::{OrganizationId, StudentId};

use crate::store::StoreDispatch;

/// Directory reading the `students` table.
#[derive(Debug, Clone)]
pub struct PgStudentDirectory {
    pool: PgPool,
}

impl PgStudentDirectory {
    /// Create a new directory over the pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert or move a student record.
    pub async fn register(
        &self,
        organization_id: OrganizationId,
        student_id: StudentId,
        display_name: &str,
    ) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO students (id, organization_id, display_name) VALUES ($1, $2, $3) \
             ON CONFLICT (id) DO UPDATE SET organization_id = EXCLUDED.organization_id, \
             display_name = EXCLUDED.display_name",
        )
        .bind(student_id)
        .bind(organization_id)
        .bind(display_name)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to register student", e))?;
        Ok(())
    }
}

#[async_trait]
impl StudentDirectory for PgStudentDirectory {
    async fn student_exists(
        &self,
        organization_id: OrganizationId,
        student_id: StudentId,
    ) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM students WHERE id = $1 AND organization_id = $2)",
        )
        .bind(student_id)
        .bind(organization_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to look up student", e))
    }
}

/// Process-local directory; students must be registered explicitly.
#[derive(Debug, Clone, Default)]
pub struct MemoryStudentDirectory {
    students: Arc<DashMap<StudentId, OrganizationId>>,
}

impl MemoryStudentDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a student as belonging to the organization.
    pub fn register(&self, organization_id: OrganizationId, student_id: StudentId) {
        self.students.insert(student_id, organization_id);
    }

    /// Forget a student.
    pub fn unregister(&self, student_id: StudentId) {
        self.students.remove(&student_id);
    }
}

#[async_trait]
impl StudentDirectory for MemoryStudentDirectory {
    async fn student_exists(
        &self,
        organization_id: OrganizationId,
        student_id: StudentId,
    ) -> AppResult<bool> {
        Ok(self
            .students
            .get(&student_id)
            .is_some_and(|org| *org.value() == organization_id))
    }
}

/// Directory matching the configured store backend.
#[derive(Debug, Clone)]
pub enum DirectoryDispatch {
    /// Reads the `students` table.
    Postgres(PgStudentDirectory),
    /// Process-local registrations.
    Memory(MemoryStudentDirectory),
}

impl DirectoryDispatch {
    /// Pick the directory that shares the store's backend.
    ///
    /// The memory variant starts empty.
    pub fn for_store(store: &StoreDispatch) -> Self {
        match store {
            StoreDispatch::Postgres(pg) => Self::Postgres(PgStudentDirectory::new(pg.pool().clone())),
            StoreDispatch::Memory(_) => Self::Memory(MemoryStudentDirectory::new()),
        }
    }
}

#[async_trait]
impl StudentDirectory for DirectoryDispatch {
    async fn student_exists(
        &self,
        organization_id: OrganizationId,
        student_id: StudentId,
    ) -> AppResult<bool> {
        match self {
            Self::Postgres(inner) => inner.student_exists(organization_id, student_id).await,
            Self::Memory(inner) => inner.student_exists(organization_id, student_id).await,
        }
    }
}
