//! # enrollhub-service
//!
//! Business logic for EnrollHub. The [`AdmissionController`] owns every
//! enroll, withdraw, promote, and waitlist transition; the remaining services
//! provide read models, lifecycle changes, and counter reconciliation.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references.

pub mod admission;
pub mod class;
pub mod context;
pub mod events;
pub mod roster;

#[cfg(test)]
mod testing;

pub use admission::{AdmissionController, PromotedStudent, WithdrawOutcome};
pub use class::{ClassLifecycleService, EnrollmentReconciler, ReconcileReport, ReconcileSummary};
pub use context::RequestContext;
pub use events::EventBus;
pub use roster::{RosterService, WaitlistPosition};
