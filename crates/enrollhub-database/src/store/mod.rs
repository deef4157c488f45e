//! Atomic admission units over the class registry, enrollment ledger, and
//! waitlist queue.
//!
//! An [`AdmissionUnit`] is opened for exactly one class. While it is open no
//! other unit for the same class can observe or mutate that class's seats,
//! enrollments, or waitlist; units for different classes never contend.
//! Dropping a unit without calling [`AdmissionUnit::commit`] discards every
//! change made through it.
//!
//! Two implementations are provided:
//! - PostgreSQL (row lock on the class plus conditional seat updates)
//! - In-memory (one `tokio::sync::Mutex` per class over a staged copy)

pub mod dispatch;
pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use enrollhub_core::result::{AdmissionResult, AppResult};
use enrollhub_core::types::id::{ClassId, StudentId, WaitlistEntryId};
use enrollhub_entity::class::{Class, ClassStatus, NewClass};
use enrollhub_entity::enrollment::{Enrollment, EnrollmentStatus, EnrollmentTerms};
use enrollhub_entity::waitlist::{NewWaitlistEntry, WaitlistEntry};

pub use dispatch::StoreDispatch;
pub use memory::MemoryAdmissionStore;
pub use postgres::PgAdmissionStore;

/// Owner of a class's capacity, status, and enrollment counter.
///
/// These are the only mutation points for `current_enrollment`.
#[async_trait]
pub trait ClassRegistry: Send {
    /// The locked class row as of the last registry mutation.
    fn class(&self) -> &Class;

    /// Take one seat if `current_enrollment < max_capacity`.
    ///
    /// Check and increment happen as one step; returns `false` without
    /// mutating anything when no seat is free.
    async fn try_reserve_seat(&mut self) -> AdmissionResult<bool>;

    /// Give one seat back, floored at zero. A `FULL` class reopens.
    async fn release_seat(&mut self) -> AdmissionResult<()>;

    /// Move an open class to `FULL` when every seat is taken.
    ///
    /// Returns whether the status changed.
    async fn mark_full_if_at_capacity(&mut self) -> AdmissionResult<bool>;

    /// Overwrite the lifecycle status.
    async fn set_status(&mut self, status: ClassStatus) -> AdmissionResult<()>;

    /// Overwrite the counter with a recomputed value (reconciliation only).
    async fn set_enrollment_count(&mut self, count: i32) -> AdmissionResult<()>;
}

/// Owner of enrollment rows and their lifecycle.
#[async_trait]
pub trait EnrollmentLedger: Send {
    /// The student's `ACTIVE` enrollment in the unit's class, if any.
    async fn find_active(&mut self, student_id: StudentId) -> AdmissionResult<Option<Enrollment>>;

    /// Whether a row with the given status exists for the pair.
    async fn exists(
        &mut self,
        student_id: StudentId,
        status: EnrollmentStatus,
    ) -> AdmissionResult<bool>;

    /// Create an `ACTIVE` row; `AlreadyEnrolled` if one exists.
    async fn create(
        &mut self,
        student_id: StudentId,
        terms: &EnrollmentTerms,
    ) -> AdmissionResult<Enrollment>;

    /// Move the `ACTIVE` row to `WITHDRAWN`; `NotActivelyEnrolled` if none.
    async fn withdraw(
        &mut self,
        student_id: StudentId,
        reason: Option<String>,
    ) -> AdmissionResult<Enrollment>;

    /// Number of `ACTIVE` rows for the class (source of truth for the counter).
    async fn count_active(&mut self) -> AdmissionResult<i64>;
}

/// Owner of the ordered, priority-aware waitlist.
#[async_trait]
pub trait WaitlistQueue: Send {
    /// Append a `WAITING` entry at `max(position) + 1`.
    ///
    /// Fails with `AlreadyWaitlisted` or `AlreadyEnrolled`.
    async fn enqueue(
        &mut self,
        student_id: StudentId,
        entry: NewWaitlistEntry,
    ) -> AdmissionResult<WaitlistEntry>;

    /// The `WAITING` entry served next: priority first, then lowest position.
    async fn dequeue_next(&mut self) -> AdmissionResult<Option<WaitlistEntry>>;

    /// Mark the student's `WAITING` entry `REMOVED`, returning it if present.
    async fn remove(&mut self, student_id: StudentId) -> AdmissionResult<Option<WaitlistEntry>>;

    /// Mark a `WAITING` entry `ENROLLED`.
    async fn mark_enrolled(&mut self, entry_id: WaitlistEntryId) -> AdmissionResult<WaitlistEntry>;
}

/// One atomic admission step scoped to a single class.
#[async_trait]
pub trait AdmissionUnit: ClassRegistry + EnrollmentLedger + WaitlistQueue + Send {
    /// Make every change performed through this unit visible at once.
    async fn commit(self: Box<Self>) -> AdmissionResult<()>;
}

/// Factory for admission units plus read-only queries.
#[async_trait]
pub trait AdmissionStore: Send + Sync + 'static {
    /// Open a unit for the class, waiting for any unit already holding it.
    ///
    /// Fails with `ClassNotFound` if the class does not exist.
    async fn begin(&self, class_id: ClassId) -> AdmissionResult<Box<dyn AdmissionUnit>>;

    /// Fetch a class without locking it.
    async fn find_class(&self, class_id: ClassId) -> AppResult<Option<Class>>;

    /// Insert a new class.
    async fn create_class(&self, new_class: NewClass) -> AppResult<Class>;

    /// Identifiers of every class.
    async fn list_class_ids(&self) -> AppResult<Vec<ClassId>>;

    /// `ACTIVE` enrollments of a class, oldest first.
    async fn list_roster(&self, class_id: ClassId) -> AppResult<Vec<Enrollment>>;

    /// `WAITING` entries of a class in serving order.
    async fn list_waiting(&self, class_id: ClassId) -> AppResult<Vec<WaitlistEntry>>;

    /// Check that the backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}
