//! In-memory admission store using one Tokio mutex per class.
//!
//! Suitable for single-node deployments and tests. A unit works on a staged
//! copy of its class shard and writes it back on commit, so a unit dropped
//! mid-operation leaves the shard untouched.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{info, warn};

use enrollhub_core::error::{AdmissionError, AppError};
use enrollhub_core::result::{AdmissionResult, AppResult};
use enrollhub_core::types::id::{ClassId, StudentId, WaitlistEntryId};
use enrollhub_entity::class::{Class, ClassStatus, NewClass};
use enrollhub_entity::enrollment::{Enrollment, EnrollmentStatus, EnrollmentTerms};
use enrollhub_entity::waitlist::{NewWaitlistEntry, WaitlistEntry, sort_queue};

use super::{AdmissionStore, AdmissionUnit, ClassRegistry, EnrollmentLedger, WaitlistQueue};

/// Everything the engine knows about one class.
#[derive(Debug, Clone)]
struct ClassShard {
    /// The class row.
    class: Class,
    /// Every enrollment row ever created for the class.
    enrollments: Vec<Enrollment>,
    /// Every waitlist entry ever created for the class.
    waitlist: Vec<WaitlistEntry>,
}

/// In-memory admission store.
#[derive(Debug, Clone, Default)]
pub struct MemoryAdmissionStore {
    /// Class ID → shard guarded by its own mutex.
    shards: Arc<DashMap<ClassId, Arc<Mutex<ClassShard>>>>,
}

impl MemoryAdmissionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn shard(&self, class_id: ClassId) -> Option<Arc<Mutex<ClassShard>>> {
        self.shards
            .get(&class_id)
            .map(|entry| Arc::clone(entry.value()))
    }
}

#[async_trait]
impl AdmissionStore for MemoryAdmissionStore {
    async fn begin(&self, class_id: ClassId) -> AdmissionResult<Box<dyn AdmissionUnit>> {
        let shard = self
            .shard(class_id)
            .ok_or(AdmissionError::ClassNotFound(class_id))?;

        let guard = shard.lock_owned().await;
        let staged = guard.clone();

        Ok(Box::new(MemoryAdmissionUnit { guard, staged }))
    }

    async fn find_class(&self, class_id: ClassId) -> AppResult<Option<Class>> {
        match self.shard(class_id) {
            Some(shard) => Ok(Some(shard.lock().await.class.clone())),
            None => Ok(None),
        }
    }

    async fn create_class(&self, new_class: NewClass) -> AppResult<Class> {
        new_class.validate().map_err(AppError::validation)?;

        let class = new_class.into_class(ClassId::new(), Utc::now());
        self.shards.insert(
            class.id,
            Arc::new(Mutex::new(ClassShard {
                class: class.clone(),
                enrollments: Vec::new(),
                waitlist: Vec::new(),
            })),
        );

        info!(class_id = %class.id, max_capacity = class.max_capacity, "Class created");
        Ok(class)
    }

    async fn list_class_ids(&self) -> AppResult<Vec<ClassId>> {
        let mut ids: Vec<ClassId> = self.shards.iter().map(|entry| *entry.key()).collect();
        ids.sort();
        Ok(ids)
    }

    async fn list_roster(&self, class_id: ClassId) -> AppResult<Vec<Enrollment>> {
        let Some(shard) = self.shard(class_id) else {
            return Ok(Vec::new());
        };
        let shard = shard.lock().await;

        let mut roster: Vec<Enrollment> = shard
            .enrollments
            .iter()
            .filter(|e| e.is_active())
            .cloned()
            .collect();
        roster.sort_by_key(|e| e.enrolled_at);
        Ok(roster)
    }

    async fn list_waiting(&self, class_id: ClassId) -> AppResult<Vec<WaitlistEntry>> {
        let Some(shard) = self.shard(class_id) else {
            return Ok(Vec::new());
        };
        let shard = shard.lock().await;

        let mut waiting: Vec<WaitlistEntry> = shard
            .waitlist
            .iter()
            .filter(|e| e.is_waiting())
            .cloned()
            .collect();
        sort_queue(&mut waiting);
        Ok(waiting)
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}

/// A unit holding one class's mutex and a staged copy of its shard.
struct MemoryAdmissionUnit {
    /// Exclusive access to the committed shard.
    guard: OwnedMutexGuard<ClassShard>,
    /// Working copy; written back on commit.
    staged: ClassShard,
}

impl MemoryAdmissionUnit {
    fn class_id(&self) -> ClassId {
        self.staged.class.id
    }

    fn active_index(&self, student_id: StudentId) -> Option<usize> {
        self.staged
            .enrollments
            .iter()
            .position(|e| e.student_id == student_id && e.is_active())
    }

    fn waiting_index(&self, student_id: StudentId) -> Option<usize> {
        self.staged
            .waitlist
            .iter()
            .position(|e| e.student_id == student_id && e.is_waiting())
    }
}

#[async_trait]
impl ClassRegistry for MemoryAdmissionUnit {
    fn class(&self) -> &Class {
        &self.staged.class
    }

    async fn try_reserve_seat(&mut self) -> AdmissionResult<bool> {
        let class = &mut self.staged.class;
        if !class.has_free_seat() {
            return Ok(false);
        }
        class.current_enrollment += 1;
        class.updated_at = Utc::now();
        Ok(true)
    }

    async fn release_seat(&mut self) -> AdmissionResult<()> {
        let class = &mut self.staged.class;
        if class.current_enrollment == 0 {
            warn!(class_id = %class.id, "Released a seat on an empty class, counter stays at zero");
        }
        class.current_enrollment = (class.current_enrollment - 1).max(0);
        if class.status == ClassStatus::Full {
            class.status = ClassStatus::OpenForEnrollment;
        }
        class.updated_at = Utc::now();
        Ok(())
    }

    async fn mark_full_if_at_capacity(&mut self) -> AdmissionResult<bool> {
        let class = &mut self.staged.class;
        if class.status == ClassStatus::OpenForEnrollment && class.is_at_capacity() {
            class.status = ClassStatus::Full;
            class.updated_at = Utc::now();
            return Ok(true);
        }
        Ok(false)
    }

    async fn set_status(&mut self, status: ClassStatus) -> AdmissionResult<()> {
        let class = &mut self.staged.class;
        class.status = status;
        class.updated_at = Utc::now();
        Ok(())
    }

    async fn set_enrollment_count(&mut self, count: i32) -> AdmissionResult<()> {
        let class = &mut self.staged.class;
        if count < 0 || count > class.max_capacity {
            return Err(AdmissionError::InvariantViolation(format!(
                "enrollment count {count} outside 0..={} for class {}",
                class.max_capacity, class.id
            )));
        }
        class.current_enrollment = count;
        class.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl EnrollmentLedger for MemoryAdmissionUnit {
    async fn find_active(&mut self, student_id: StudentId) -> AdmissionResult<Option<Enrollment>> {
        Ok(self
            .active_index(student_id)
            .map(|idx| self.staged.enrollments[idx].clone()))
    }

    async fn exists(
        &mut self,
        student_id: StudentId,
        status: EnrollmentStatus,
    ) -> AdmissionResult<bool> {
        Ok(self
            .staged
            .enrollments
            .iter()
            .any(|e| e.student_id == student_id && e.status == status))
    }

    async fn create(
        &mut self,
        student_id: StudentId,
        terms: &EnrollmentTerms,
    ) -> AdmissionResult<Enrollment> {
        if self.active_index(student_id).is_some() {
            return Err(AdmissionError::AlreadyEnrolled {
                class_id: self.class_id(),
                student_id,
            });
        }

        let class = &self.staged.class;
        let enrollment =
            Enrollment::activate(class.organization_id, class.id, student_id, terms, Utc::now());
        self.staged.enrollments.push(enrollment.clone());
        Ok(enrollment)
    }

    async fn withdraw(
        &mut self,
        student_id: StudentId,
        reason: Option<String>,
    ) -> AdmissionResult<Enrollment> {
        let idx = self
            .active_index(student_id)
            .ok_or(AdmissionError::NotActivelyEnrolled {
                class_id: self.class_id(),
                student_id,
            })?;

        let enrollment = &mut self.staged.enrollments[idx];
        enrollment.withdraw(reason, Utc::now());
        Ok(enrollment.clone())
    }

    async fn count_active(&mut self) -> AdmissionResult<i64> {
        Ok(self
            .staged
            .enrollments
            .iter()
            .filter(|e| e.is_active())
            .count() as i64)
    }
}

#[async_trait]
impl WaitlistQueue for MemoryAdmissionUnit {
    async fn enqueue(
        &mut self,
        student_id: StudentId,
        entry: NewWaitlistEntry,
    ) -> AdmissionResult<WaitlistEntry> {
        let class_id = self.class_id();
        if self.active_index(student_id).is_some() {
            return Err(AdmissionError::AlreadyEnrolled {
                class_id,
                student_id,
            });
        }
        if self.waiting_index(student_id).is_some() {
            return Err(AdmissionError::AlreadyWaitlisted {
                class_id,
                student_id,
            });
        }

        let position = self
            .staged
            .waitlist
            .iter()
            .map(|e| e.position)
            .max()
            .unwrap_or(0)
            + 1;

        let entry = entry.into_entry(
            self.staged.class.organization_id,
            class_id,
            student_id,
            position,
            Utc::now(),
        );
        self.staged.waitlist.push(entry.clone());
        Ok(entry)
    }

    async fn dequeue_next(&mut self) -> AdmissionResult<Option<WaitlistEntry>> {
        let mut waiting: Vec<WaitlistEntry> = self
            .staged
            .waitlist
            .iter()
            .filter(|e| e.is_waiting())
            .cloned()
            .collect();
        sort_queue(&mut waiting);
        Ok(waiting.into_iter().next())
    }

    async fn remove(&mut self, student_id: StudentId) -> AdmissionResult<Option<WaitlistEntry>> {
        let Some(idx) = self.waiting_index(student_id) else {
            return Ok(None);
        };
        let entry = &mut self.staged.waitlist[idx];
        entry.mark_removed(Utc::now());
        Ok(Some(entry.clone()))
    }

    async fn mark_enrolled(&mut self, entry_id: WaitlistEntryId) -> AdmissionResult<WaitlistEntry> {
        let entry = self
            .staged
            .waitlist
            .iter_mut()
            .find(|e| e.id == entry_id && e.is_waiting())
            .ok_or_else(|| {
                AdmissionError::InvariantViolation(format!(
                    "waitlist entry {entry_id} is not waiting"
                ))
            })?;
        entry.mark_enrolled(Utc::now());
        Ok(entry.clone())
    }
}

#[async_trait]
impl AdmissionUnit for MemoryAdmissionUnit {
    async fn commit(self: Box<Self>) -> AdmissionResult<()> {
        let MemoryAdmissionUnit { mut guard, staged } = *self;
        *guard = staged;
        Ok(())
    }
}
