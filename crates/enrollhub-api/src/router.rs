//! Route definitions for the EnrollHub HTTP API.
//!
//! All routes are organized by domain and mounted under `/api`.
//! Every class route is scoped to the organization named by the
//! `x-organization-id` header.

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post, put},
};

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the Axum router with all routes and the request logging middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(class_routes())
        .merge(enrollment_routes())
        .merge(waitlist_routes())
        .merge(health_routes());

    Router::new()
        .nest("/api", api_routes)
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Capacity, lifecycle, roster, and reconciliation
fn class_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/classes/{class_id}/capacity",
            get(handlers::class::get_capacity),
        )
        .route(
            "/classes/{class_id}/status",
            put(handlers::class::change_status),
        )
        .route(
            "/classes/{class_id}/roster",
            get(handlers::class::list_roster),
        )
        .route(
            "/classes/{class_id}/reconcile",
            post(handlers::class::reconcile),
        )
}

/// Direct enrollment and withdrawal
fn enrollment_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/classes/{class_id}/enrollments",
            post(handlers::enrollment::enroll),
        )
        .route(
            "/classes/{class_id}/enrollments/{student_id}/withdraw",
            post(handlers::enrollment::withdraw),
        )
}

/// Waitlist queue and positions
fn waitlist_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/classes/{class_id}/waitlist",
            get(handlers::waitlist::list_waitlist).post(handlers::waitlist::add_to_waitlist),
        )
        .route(
            "/classes/{class_id}/waitlist/{student_id}",
            get(handlers::waitlist::get_position),
        )
}

/// Health check
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
