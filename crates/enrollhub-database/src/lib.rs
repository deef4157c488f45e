//! # enrollhub-database
//!
//! Persistence for the admission engine: the unit-of-work traits spanning
//! the class registry, enrollment ledger, and waitlist queue, plus their
//! PostgreSQL and in-memory implementations and the student directories.

pub mod connection;
pub mod directory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use directory::{DirectoryDispatch, MemoryStudentDirectory, PgStudentDirectory};
pub use store::{
    AdmissionStore, AdmissionUnit, ClassRegistry, EnrollmentLedger, MemoryAdmissionStore,
    PgAdmissionStore, StoreDispatch, WaitlistQueue,
};
