//! # enrollhub-api
//!
//! HTTP API layer for EnrollHub built on Axum.
//!
//! Exposes the admission engine over JSON: enrollment, withdrawal, waitlist,
//! roster, capacity, lifecycle, and reconciliation endpoints, plus request
//! logging, CORS, and error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, serve};
pub use error::ApiError;
pub use state::AppState;
