//! # enrollhub-core
//!
//! Core crate for EnrollHub. Contains configuration schemas, typed
//! identifiers, domain events, collaborator traits, and the unified error
//! system shared by the admission engine and its surfaces.
//!
//! This crate has **no** internal dependencies on other EnrollHub crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{AdmissionError, AppError, ErrorKind};
pub use result::{AdmissionResult, AppResult};
