//! Enrollment and withdrawal handlers.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use enrollhub_core::error::AppError;
use enrollhub_core::types::id::{ClassId, StudentId};
use enrollhub_entity::enrollment::{Enrollment, EnrollmentTerms};
use enrollhub_service::admission::WithdrawOutcome;

use crate::dto::request::{EnrollRequest, WithdrawRequest, validate_request};
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::OrgContext;
use crate::extractors::path::parse_id;
use crate::state::AppState;

/// POST /api/classes/{class_id}/enrollments
pub async fn enroll(
    State(state): State<AppState>,
    ctx: OrgContext,
    Path(class_id): Path<String>,
    Json(req): Json<EnrollRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Enrollment>>), ApiError> {
    validate_request(&req)?;
    let class_id: ClassId = parse_id(&class_id)?;

    let terms = EnrollmentTerms {
        notes: req.notes,
        enrolled_by: ctx.actor_id,
    };
    let enrollment = state
        .admission
        .enroll(&ctx, class_id, StudentId::from_uuid(req.student_id), terms)
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(enrollment))))
}

/// POST /api/classes/{class_id}/enrollments/{student_id}/withdraw
///
/// The body is optional; an empty request withdraws without a reason.
pub async fn withdraw(
    State(state): State<AppState>,
    ctx: OrgContext,
    Path((class_id, student_id)): Path<(String, String)>,
    body: Bytes,
) -> Result<Json<ApiResponse<WithdrawOutcome>>, ApiError> {
    let req: WithdrawRequest = if body.is_empty() {
        WithdrawRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::validation(format!("Invalid request body: {e}")))?
    };
    validate_request(&req)?;
    let class_id: ClassId = parse_id(&class_id)?;
    let student_id: StudentId = parse_id(&student_id)?;

    let outcome = state
        .admission
        .withdraw(&ctx, class_id, student_id, req.reason)
        .await?;

    Ok(Json(ApiResponse::ok(outcome)))
}
