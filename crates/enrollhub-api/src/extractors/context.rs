//! `OrgContext` extractor: resolves the calling organization and actor from headers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use enrollhub_core::error::AppError;
use enrollhub_core::types::id::OrganizationId;
use enrollhub_service::context::RequestContext;

use crate::error::ApiError;
use crate::state::AppState;

/// Header naming the organization the caller acts within.
pub const ORGANIZATION_HEADER: &str = "x-organization-id";
/// Header naming the acting user.
pub const ACTOR_HEADER: &str = "x-actor-id";

/// Organization-scoped request context available in handlers.
///
/// Authentication happens upstream; this only reads the identities the
/// gateway forwards.
#[derive(Debug, Clone)]
pub struct OrgContext(pub RequestContext);

impl std::ops::Deref for OrgContext {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for OrgContext {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let organization_id = header_uuid(parts, ORGANIZATION_HEADER)?
            .map(OrganizationId::from_uuid)
            .ok_or_else(|| {
                AppError::validation(format!("Missing {ORGANIZATION_HEADER} header"))
            })?;

        let actor_id = header_uuid(parts, ACTOR_HEADER)?;

        Ok(OrgContext(RequestContext::new(organization_id, actor_id)))
    }
}

fn header_uuid(parts: &Parts, name: &str) -> Result<Option<Uuid>, AppError> {
    let Some(value) = parts.headers.get(name) else {
        return Ok(None);
    };

    let raw = value
        .to_str()
        .map_err(|_| AppError::validation(format!("Invalid {name} header")))?;

    Uuid::parse_str(raw.trim())
        .map(Some)
        .map_err(|_| AppError::validation(format!("Invalid {name} header: {raw}")))
}
