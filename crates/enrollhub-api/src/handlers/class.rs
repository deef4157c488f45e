//! Class capacity, status, roster, and reconciliation handlers.

use axum::Json;
use axum::extract::{Path, State};

use enrollhub_core::types::id::ClassId;
use enrollhub_entity::class::{CapacitySnapshot, Class};
use enrollhub_entity::enrollment::Enrollment;
use enrollhub_service::class::ReconcileReport;

use crate::dto::request::ChangeStatusRequest;
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::OrgContext;
use crate::extractors::path::parse_id;
use crate::state::AppState;

/// GET /api/classes/{class_id}/capacity
pub async fn get_capacity(
    State(state): State<AppState>,
    ctx: OrgContext,
    Path(class_id): Path<String>,
) -> Result<Json<ApiResponse<CapacitySnapshot>>, ApiError> {
    let class_id: ClassId = parse_id(&class_id)?;
    let snapshot = state.roster.capacity(&ctx, class_id).await?;
    Ok(Json(ApiResponse::ok(snapshot)))
}

/// PUT /api/classes/{class_id}/status
pub async fn change_status(
    State(state): State<AppState>,
    ctx: OrgContext,
    Path(class_id): Path<String>,
    Json(req): Json<ChangeStatusRequest>,
) -> Result<Json<ApiResponse<Class>>, ApiError> {
    let class_id: ClassId = parse_id(&class_id)?;
    let class = state
        .lifecycle
        .change_status(&ctx, class_id, req.status)
        .await?;
    Ok(Json(ApiResponse::ok(class)))
}

/// GET /api/classes/{class_id}/roster
pub async fn list_roster(
    State(state): State<AppState>,
    ctx: OrgContext,
    Path(class_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<Enrollment>>>, ApiError> {
    let class_id: ClassId = parse_id(&class_id)?;
    let roster = state.roster.list_roster(&ctx, class_id).await?;
    Ok(Json(ApiResponse::ok(roster)))
}

/// POST /api/classes/{class_id}/reconcile
pub async fn reconcile(
    State(state): State<AppState>,
    ctx: OrgContext,
    Path(class_id): Path<String>,
) -> Result<Json<ApiResponse<ReconcileReport>>, ApiError> {
    let class_id: ClassId = parse_id(&class_id)?;
    let report = state.reconciler.reconcile(&ctx, class_id).await?;
    Ok(Json(ApiResponse::ok(report)))
}
