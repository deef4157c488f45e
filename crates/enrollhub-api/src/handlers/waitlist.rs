//! Waitlist handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use enrollhub_core::types::id::{ClassId, StudentId};
use enrollhub_entity::waitlist::{NewWaitlistEntry, WaitlistEntry};
use enrollhub_service::roster::WaitlistPosition;

use crate::dto::request::{AddToWaitlistRequest, validate_request};
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::OrgContext;
use crate::extractors::path::parse_id;
use crate::state::AppState;

/// GET /api/classes/{class_id}/waitlist
pub async fn list_waitlist(
    State(state): State<AppState>,
    ctx: OrgContext,
    Path(class_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<WaitlistEntry>>>, ApiError> {
    let class_id: ClassId = parse_id(&class_id)?;
    let entries = state.roster.list_waitlist(&ctx, class_id).await?;
    Ok(Json(ApiResponse::ok(entries)))
}

/// POST /api/classes/{class_id}/waitlist
pub async fn add_to_waitlist(
    State(state): State<AppState>,
    ctx: OrgContext,
    Path(class_id): Path<String>,
    Json(req): Json<AddToWaitlistRequest>,
) -> Result<(StatusCode, Json<ApiResponse<WaitlistEntry>>), ApiError> {
    validate_request(&req)?;
    let class_id: ClassId = parse_id(&class_id)?;

    let entry = NewWaitlistEntry {
        is_priority: req.is_priority,
        notes: req.notes,
        added_by: ctx.actor_id,
    };
    let entry = state
        .admission
        .add_to_waitlist(&ctx, class_id, StudentId::from_uuid(req.student_id), entry)
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(entry))))
}

/// GET /api/classes/{class_id}/waitlist/{student_id}
pub async fn get_position(
    State(state): State<AppState>,
    ctx: OrgContext,
    Path((class_id, student_id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<WaitlistPosition>>, ApiError> {
    let class_id: ClassId = parse_id(&class_id)?;
    let student_id: StudentId = parse_id(&student_id)?;
    let position = state
        .roster
        .waitlist_position(&ctx, class_id, student_id)
        .await?;
    Ok(Json(ApiResponse::ok(position)))
}
