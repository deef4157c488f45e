//! Enrollment counter reconciliation command.

use std::sync::Arc;

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use enrollhub_core::error::AppError;
use enrollhub_core::types::id::ClassId;
use enrollhub_service::class::{EnrollmentReconciler, ReconcileReport};

/// Arguments for the reconcile command
#[derive(Debug, Args)]
pub struct ReconcileArgs {
    /// Reconcile a single class instead of every class
    #[arg(long = "class")]
    pub class_id: Option<String>,
}

/// Reconcile report row for table output
#[derive(Debug, Serialize, Tabled)]
struct ReportRow {
    /// Class ID
    class_id: String,
    /// Counter before
    recorded: i32,
    /// Active enrollments
    actual: i32,
    /// Drift
    drift: i32,
    /// Status before
    status_before: String,
    /// Status after
    status_after: String,
}

impl From<&ReconcileReport> for ReportRow {
    fn from(r: &ReconcileReport) -> Self {
        Self {
            class_id: r.class_id.to_string(),
            recorded: r.recorded,
            actual: r.actual,
            drift: r.drift,
            status_before: r.status_before.to_string(),
            status_after: r.status_after.to_string(),
        }
    }
}

/// Execute the reconcile command
pub async fn execute(
    args: &ReconcileArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let store = Arc::new(super::connect_store(config_path).await?);
    let reconciler = EnrollmentReconciler::new(store.clone());

    let (reports, failed) = match &args.class_id {
        Some(raw) => {
            let class_id: ClassId = super::parse_id(raw)?;
            (vec![reconciler.reconcile_class(class_id).await?], Vec::new())
        }
        None => {
            let summary = reconciler.reconcile_all().await?;
            (summary.reports, summary.failed)
        }
    };

    let rows: Vec<ReportRow> = reports.iter().map(ReportRow::from).collect();
    output::print_list(&rows, format);

    let repaired = reports.iter().filter(|r| r.repaired()).count();
    for class_id in &failed {
        output::print_warning(&format!("Class {class_id} could not be reconciled"));
    }
    output::print_success(&format!(
        "Checked {} class(es), repaired {repaired}",
        reports.len()
    ));

    store.close().await;
    Ok(())
}
