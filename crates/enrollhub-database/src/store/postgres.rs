//! PostgreSQL admission store.
//!
//! A unit is one transaction that starts with `SELECT ... FOR UPDATE` on the
//! class row. Every other unit for the same class blocks on that lock until
//! commit or rollback, which serializes admission decisions per class across
//! every process sharing the database. Seat increments are additionally
//! guarded by `current_enrollment < max_capacity` in the `UPDATE` itself.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, info};

use enrollhub_core::error::{AdmissionError, AppError, ErrorKind};
use enrollhub_core::result::{AdmissionResult, AppResult};
use enrollhub_core::types::id::{ClassId, StudentId, WaitlistEntryId};
use enrollhub_entity::class::{Class, ClassStatus, NewClass};
use enrollhub_entity::enrollment::{Enrollment, EnrollmentStatus, EnrollmentTerms};
use enrollhub_entity::waitlist::{NewWaitlistEntry, WaitlistEntry};

use crate::connection::DatabasePool;
use crate::repositories::{
    ClassRepository, EnrollmentRepository, WaitlistRepository, class, enrollment, waitlist,
};

use super::{AdmissionStore, AdmissionUnit, ClassRegistry, EnrollmentLedger, WaitlistQueue};

/// Admission store backed by PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgAdmissionStore {
    db: DatabasePool,
    classes: ClassRepository,
    enrollments: EnrollmentRepository,
    waitlist: WaitlistRepository,
}

impl PgAdmissionStore {
    /// Build the store over an open pool.
    pub fn new(db: DatabasePool) -> Self {
        let pool = db.pool().clone();
        Self {
            classes: ClassRepository::new(pool.clone()),
            enrollments: EnrollmentRepository::new(pool.clone()),
            waitlist: WaitlistRepository::new(pool),
            db,
        }
    }

    /// The underlying sqlx pool.
    pub fn pool(&self) -> &PgPool {
        self.db.pool()
    }

    /// The pool wrapper.
    pub fn database(&self) -> &DatabasePool {
        &self.db
    }
}

#[async_trait]
impl AdmissionStore for PgAdmissionStore {
    async fn begin(&self, class_id: ClassId) -> AdmissionResult<Box<dyn AdmissionUnit>> {
        let mut tx = self.db.pool().begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let class = class::lock(&mut tx, class_id)
            .await?
            .ok_or(AdmissionError::ClassNotFound(class_id))?;

        debug!(class_id = %class_id, "Class row locked");
        Ok(Box::new(PgAdmissionUnit { tx, class }))
    }

    async fn find_class(&self, class_id: ClassId) -> AppResult<Option<Class>> {
        self.classes.find_by_id(class_id).await
    }

    async fn create_class(&self, new_class: NewClass) -> AppResult<Class> {
        let class = self.classes.create(new_class).await?;
        info!(class_id = %class.id, max_capacity = class.max_capacity, "Class created");
        Ok(class)
    }

    async fn list_class_ids(&self) -> AppResult<Vec<ClassId>> {
        self.classes.list_ids().await
    }

    async fn list_roster(&self, class_id: ClassId) -> AppResult<Vec<Enrollment>> {
        self.enrollments.list_active(class_id).await
    }

    async fn list_waiting(&self, class_id: ClassId) -> AppResult<Vec<WaitlistEntry>> {
        self.waitlist.list_waiting(class_id).await
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.db.health_check().await
    }
}

/// One open transaction holding the class row lock.
struct PgAdmissionUnit {
    tx: Transaction<'static, Postgres>,
    class: Class,
}

#[async_trait]
impl ClassRegistry for PgAdmissionUnit {
    fn class(&self) -> &Class {
        &self.class
    }

    async fn try_reserve_seat(&mut self) -> AdmissionResult<bool> {
        match class::try_reserve_seat(&mut self.tx, self.class.id).await? {
            Some(updated) => {
                self.class = updated;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn release_seat(&mut self) -> AdmissionResult<()> {
        self.class = class::release_seat(&mut self.tx, self.class.id).await?;
        Ok(())
    }

    async fn mark_full_if_at_capacity(&mut self) -> AdmissionResult<bool> {
        match class::mark_full_if_at_capacity(&mut self.tx, self.class.id).await? {
            Some(updated) => {
                self.class = updated;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn set_status(&mut self, status: ClassStatus) -> AdmissionResult<()> {
        self.class = class::set_status(&mut self.tx, self.class.id, status).await?;
        Ok(())
    }

    async fn set_enrollment_count(&mut self, count: i32) -> AdmissionResult<()> {
        if count < 0 || count > self.class.max_capacity {
            return Err(AdmissionError::InvariantViolation(format!(
                "enrollment count {count} outside 0..={} for class {}",
                self.class.max_capacity, self.class.id
            )));
        }
        self.class = class::set_enrollment_count(&mut self.tx, self.class.id, count).await?;
        Ok(())
    }
}

#[async_trait]
impl EnrollmentLedger for PgAdmissionUnit {
    async fn find_active(&mut self, student_id: StudentId) -> AdmissionResult<Option<Enrollment>> {
        enrollment::find_active(&mut self.tx, self.class.id, student_id).await
    }

    async fn exists(
        &mut self,
        student_id: StudentId,
        status: EnrollmentStatus,
    ) -> AdmissionResult<bool> {
        enrollment::exists(&mut self.tx, self.class.id, student_id, status).await
    }

    async fn create(
        &mut self,
        student_id: StudentId,
        terms: &EnrollmentTerms,
    ) -> AdmissionResult<Enrollment> {
        let row = Enrollment::activate(
            self.class.organization_id,
            self.class.id,
            student_id,
            terms,
            Utc::now(),
        );
        enrollment::insert(&mut self.tx, &row).await
    }

    async fn withdraw(
        &mut self,
        student_id: StudentId,
        reason: Option<String>,
    ) -> AdmissionResult<Enrollment> {
        enrollment::withdraw(&mut self.tx, self.class.id, student_id, reason.as_deref())
            .await?
            .ok_or(AdmissionError::NotActivelyEnrolled {
                class_id: self.class.id,
                student_id,
            })
    }

    async fn count_active(&mut self) -> AdmissionResult<i64> {
        enrollment::count_active(&mut self.tx, self.class.id).await
    }
}

#[async_trait]
impl WaitlistQueue for PgAdmissionUnit {
    async fn enqueue(
        &mut self,
        student_id: StudentId,
        entry: NewWaitlistEntry,
    ) -> AdmissionResult<WaitlistEntry> {
        let class_id = self.class.id;
        if enrollment::find_active(&mut self.tx, class_id, student_id)
            .await?
            .is_some()
        {
            return Err(AdmissionError::AlreadyEnrolled {
                class_id,
                student_id,
            });
        }

        let position = waitlist::next_position(&mut self.tx, class_id).await?;
        let row = entry.into_entry(
            self.class.organization_id,
            class_id,
            student_id,
            position,
            Utc::now(),
        );
        waitlist::insert(&mut self.tx, &row).await
    }

    async fn dequeue_next(&mut self) -> AdmissionResult<Option<WaitlistEntry>> {
        waitlist::next_waiting(&mut self.tx, self.class.id).await
    }

    async fn remove(&mut self, student_id: StudentId) -> AdmissionResult<Option<WaitlistEntry>> {
        waitlist::remove_waiting(&mut self.tx, self.class.id, student_id).await
    }

    async fn mark_enrolled(&mut self, entry_id: WaitlistEntryId) -> AdmissionResult<WaitlistEntry> {
        waitlist::mark_enrolled(&mut self.tx, entry_id)
            .await?
            .ok_or_else(|| {
                AdmissionError::InvariantViolation(format!(
                    "waitlist entry {entry_id} is not waiting"
                ))
            })
    }
}

#[async_trait]
impl AdmissionUnit for PgAdmissionUnit {
    async fn commit(self: Box<Self>) -> AdmissionResult<()> {
        self.tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit admission", e)
        })?;
        Ok(())
    }
}
