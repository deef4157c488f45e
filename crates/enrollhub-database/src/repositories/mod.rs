//! SQL access for classes, enrollments, and waitlist entries.
//!
//! Each repository owns a pool for lock-free reads. The free functions in
//! each module run inside an open transaction and are what
//! [`PgAdmissionStore`](crate::store::PgAdmissionStore) composes into an
//! admission unit.

pub mod class;
pub mod enrollment;
pub mod waitlist;

pub use class::ClassRepository;
pub use enrollment::EnrollmentRepository;
pub use waitlist::WaitlistRepository;

/// Whether `err` is a unique violation of the named constraint or index.
pub(crate) fn violates(err: &sqlx::Error, constraint: &str) -> bool {
    match err {
        sqlx::Error::Database(db) => {
            db.is_unique_violation() && db.constraint() == Some(constraint)
        }
        _ => false,
    }
}
