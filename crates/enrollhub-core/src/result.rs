//! Convenience result type aliases for EnrollHub.

use crate::error::{AdmissionError, AppError};

/// A specialized `Result` type for infrastructure and API operations.
pub type AppResult<T> = Result<T, AppError>;

/// A specialized `Result` type for admission engine operations.
pub type AdmissionResult<T> = Result<T, AdmissionError>;
