//! Class lifecycle changes and enrollment counter reconciliation.

pub mod lifecycle;
pub mod reconciler;

pub use lifecycle::ClassLifecycleService;
pub use reconciler::{EnrollmentReconciler, ReconcileReport, ReconcileSummary};
