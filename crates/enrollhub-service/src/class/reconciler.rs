//! Enrollment counter reconciliation.
//!
//! `current_enrollment` is a cache of the number of `ACTIVE` enrollments.
//! The reconciler recounts the ledger under the class lock, detects drift,
//! and repairs the counter and the `OPEN_FOR_ENROLLMENT`/`FULL` status.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use enrollhub_core::error::AdmissionError;
use enrollhub_core::result::AdmissionResult;
use enrollhub_core::types::id::{ClassId, OrganizationId};
use enrollhub_database::store::AdmissionStore;
use enrollhub_entity::class::ClassStatus;

use crate::context::RequestContext;

/// What one reconciliation pass found and fixed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileReport {
    /// The class.
    pub class_id: ClassId,
    /// Counter value before the pass.
    pub recorded: i32,
    /// Number of `ACTIVE` enrollments.
    pub actual: i32,
    /// `recorded - actual`.
    pub drift: i32,
    /// Status before the pass.
    pub status_before: ClassStatus,
    /// Status after the pass.
    pub status_after: ClassStatus,
}

impl ReconcileReport {
    /// Whether anything was changed.
    pub fn repaired(&self) -> bool {
        self.drift != 0 || self.status_before != self.status_after
    }
}

/// Result of reconciling every class.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReconcileSummary {
    /// Classes that were checked.
    pub reports: Vec<ReconcileReport>,
    /// Classes that could not be reconciled.
    pub failed: Vec<ClassId>,
}

impl ReconcileSummary {
    /// Number of classes that needed a repair.
    pub fn repaired_count(&self) -> usize {
        self.reports.iter().filter(|r| r.repaired()).count()
    }
}

/// Detects and corrects drift between the counter and the ledger.
#[derive(Clone)]
pub struct EnrollmentReconciler {
    store: Arc<dyn AdmissionStore>,
}

impl std::fmt::Debug for EnrollmentReconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnrollmentReconciler").finish()
    }
}

impl EnrollmentReconciler {
    /// Creates a new reconciler.
    pub fn new(store: Arc<dyn AdmissionStore>) -> Self {
        Self { store }
    }

    /// Reconcile a class of the caller's organization.
    pub async fn reconcile(
        &self,
        ctx: &RequestContext,
        class_id: ClassId,
    ) -> AdmissionResult<ReconcileReport> {
        self.reconcile_scoped(Some(ctx.organization_id), class_id)
            .await
    }

    /// Reconcile any class (CLI and startup recovery).
    pub async fn reconcile_class(&self, class_id: ClassId) -> AdmissionResult<ReconcileReport> {
        self.reconcile_scoped(None, class_id).await
    }

    /// Reconcile every class, continuing past failures.
    pub async fn reconcile_all(&self) -> AdmissionResult<ReconcileSummary> {
        let class_ids = self.store.list_class_ids().await?;
        let mut summary = ReconcileSummary::default();

        for class_id in class_ids {
            match self.reconcile_class(class_id).await {
                Ok(report) => summary.reports.push(report),
                Err(e) => {
                    error!(class_id = %class_id, error = %e, "Failed to reconcile class");
                    summary.failed.push(class_id);
                }
            }
        }

        info!(
            checked = summary.reports.len(),
            repaired = summary.repaired_count(),
            failed = summary.failed.len(),
            "Enrollment reconciliation completed"
        );
        Ok(summary)
    }

    async fn reconcile_scoped(
        &self,
        organization_id: Option<OrganizationId>,
        class_id: ClassId,
    ) -> AdmissionResult<ReconcileReport> {
        let mut unit = self.store.begin(class_id).await?;
        if organization_id.is_some_and(|org| org != unit.class().organization_id) {
            return Err(AdmissionError::ClassNotFound(class_id));
        }

        let recorded = unit.class().current_enrollment;
        let max_capacity = unit.class().max_capacity;
        let status_before = unit.class().status;
        let actual = i32::try_from(unit.count_active().await?).map_err(|_| {
            AdmissionError::InvariantViolation(format!(
                "active enrollment count of class {class_id} does not fit a counter"
            ))
        })?;

        if actual > max_capacity {
            warn!(
                class_id = %class_id,
                actual,
                max_capacity,
                "Active enrollments exceed capacity, refusing to repair"
            );
            return Err(AdmissionError::InvariantViolation(format!(
                "class {class_id} has {actual} active enrollments for {max_capacity} seats"
            )));
        }

        if recorded != actual {
            warn!(
                class_id = %class_id,
                recorded,
                actual,
                delta = recorded - actual,
                "Enrollment counter drift detected, reconciling"
            );
            unit.set_enrollment_count(actual).await?;
        }

        let reopen = unit.class().status == ClassStatus::Full && unit.class().has_free_seat();
        if reopen {
            unit.set_status(ClassStatus::OpenForEnrollment).await?;
        } else {
            unit.mark_full_if_at_capacity().await?;
        }
        let status_after = unit.class().status;

        unit.commit().await?;

        let report = ReconcileReport {
            class_id,
            recorded,
            actual,
            drift: recorded - actual,
            status_before,
            status_after,
        };
        if report.repaired() {
            info!(
                class_id = %class_id,
                drift = report.drift,
                status_before = %status_before,
                status_after = %status_after,
                "Class reconciled"
            );
        }
        Ok(report)
    }
}
