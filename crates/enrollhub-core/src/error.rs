//! Unified application error types for EnrollHub.
//!
//! Infrastructure and API code propagates [`AppError`]. The admission engine
//! reports business outcomes through the closed [`AdmissionError`] taxonomy,
//! which converts into `AppError` at the application boundary.

use std::fmt;
use thiserror::Error;

use crate::types::id::{ClassId, StudentId};

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// The requested resource was not found.
    NotFound,
    /// Input validation failed.
    Validation,
    /// A conflict occurred (duplicate entry, no capacity left, etc.).
    Conflict,
    /// A business rule blocked the action.
    Precondition,
    /// An internal server error occurred.
    Internal,
    /// A database error occurred.
    Database,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// The service is temporarily unavailable.
    ServiceUnavailable,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::Conflict => write!(f, "CONFLICT"),
            Self::Precondition => write!(f, "PRECONDITION"),
            Self::Internal => write!(f, "INTERNAL"),
            Self::Database => write!(f, "DATABASE"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::ServiceUnavailable => write!(f, "SERVICE_UNAVAILABLE"),
        }
    }
}

/// The unified application error used throughout EnrollHub.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Create a precondition error.
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Precondition, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create a service-unavailable error.
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ServiceUnavailable, message)
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

/// Coarse classification of admission failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum AdmissionErrorCategory {
    /// A referenced record is absent.
    NotFound,
    /// The request collides with existing state.
    Conflict,
    /// A business rule blocked the action.
    Precondition,
    /// A structural invariant would have been broken.
    Invariant,
    /// The backing store failed.
    Infrastructure,
}

/// Outcome taxonomy of the admission engine.
///
/// Every variant is local to a single operation; the unit of work it was
/// raised in is rolled back before the error reaches the caller.
#[derive(Debug, Error)]
pub enum AdmissionError {
    /// The class does not exist, is cancelled, or belongs to another organization.
    #[error("Class {0} not found")]
    ClassNotFound(ClassId),

    /// The student does not exist in the caller's organization.
    #[error("Student {0} not found")]
    StudentNotFound(StudentId),

    /// No active enrollment exists for the pair.
    #[error("No active enrollment for student {student_id} in class {class_id}")]
    EnrollmentNotFound {
        /// Class identifier.
        class_id: ClassId,
        /// Student identifier.
        student_id: StudentId,
    },

    /// The student has no waiting entry in the class.
    #[error("Student {student_id} is not waiting for class {class_id}")]
    WaitlistEntryNotFound {
        /// Class identifier.
        class_id: ClassId,
        /// Student identifier.
        student_id: StudentId,
    },

    /// The student already holds an active enrollment in the class.
    #[error("Student {student_id} is already enrolled in class {class_id}")]
    AlreadyEnrolled {
        /// Class identifier.
        class_id: ClassId,
        /// Student identifier.
        student_id: StudentId,
    },

    /// The student is already waiting for a seat in the class.
    #[error("Student {student_id} is already on the waitlist for class {class_id}")]
    AlreadyWaitlisted {
        /// Class identifier.
        class_id: ClassId,
        /// Student identifier.
        student_id: StudentId,
    },

    /// No seat is left in the class.
    #[error("Class {0} is full")]
    ClassFull(ClassId),

    /// The class does not accept waitlist entries.
    #[error("Waitlist is disabled for class {0}")]
    WaitlistDisabled(ClassId),

    /// The class status does not allow new enrollments.
    #[error("Class {class_id} is not accepting enrollments (status: {status})")]
    EnrollmentClosed {
        /// Class identifier.
        class_id: ClassId,
        /// Current class status.
        status: String,
    },

    /// The ledger was asked to withdraw a pair with no active row.
    #[error("Student {student_id} is not actively enrolled in class {class_id}")]
    NotActivelyEnrolled {
        /// Class identifier.
        class_id: ClassId,
        /// Student identifier.
        student_id: StudentId,
    },

    /// The requested lifecycle transition is not allowed.
    #[error("Class {class_id} cannot move from {from} to {to}")]
    InvalidStatusTransition {
        /// Class identifier.
        class_id: ClassId,
        /// Current status.
        from: String,
        /// Requested status.
        to: String,
    },

    /// A capacity or uniqueness invariant would have been broken.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// The backing store failed.
    #[error(transparent)]
    Store(#[from] AppError),
}

impl AdmissionError {
    /// Classify the error into its taxonomy category.
    pub fn category(&self) -> AdmissionErrorCategory {
        match self {
            Self::ClassNotFound(_)
            | Self::StudentNotFound(_)
            | Self::EnrollmentNotFound { .. }
            | Self::WaitlistEntryNotFound { .. } => AdmissionErrorCategory::NotFound,
            Self::AlreadyEnrolled { .. } | Self::AlreadyWaitlisted { .. } | Self::ClassFull(_) => {
                AdmissionErrorCategory::Conflict
            }
            Self::WaitlistDisabled(_)
            | Self::EnrollmentClosed { .. }
            | Self::NotActivelyEnrolled { .. }
            | Self::InvalidStatusTransition { .. } => AdmissionErrorCategory::Precondition,
            Self::InvariantViolation(_) => AdmissionErrorCategory::Invariant,
            Self::Store(_) => AdmissionErrorCategory::Infrastructure,
        }
    }

    /// Stable machine-readable code for API consumers.
    pub fn code(&self) -> &'static str {
        match self {
            Self::ClassNotFound(_) => "CLASS_NOT_FOUND",
            Self::StudentNotFound(_) => "STUDENT_NOT_FOUND",
            Self::EnrollmentNotFound { .. } => "ENROLLMENT_NOT_FOUND",
            Self::WaitlistEntryNotFound { .. } => "WAITLIST_ENTRY_NOT_FOUND",
            Self::AlreadyEnrolled { .. } => "ALREADY_ENROLLED",
            Self::AlreadyWaitlisted { .. } => "ALREADY_WAITLISTED",
            Self::ClassFull(_) => "CLASS_FULL",
            Self::WaitlistDisabled(_) => "WAITLIST_DISABLED",
            Self::EnrollmentClosed { .. } => "ENROLLMENT_CLOSED",
            Self::NotActivelyEnrolled { .. } => "NOT_ACTIVELY_ENROLLED",
            Self::InvalidStatusTransition { .. } => "INVALID_STATUS_TRANSITION",
            Self::InvariantViolation(_) => "INVARIANT_VIOLATION",
            Self::Store(_) => "STORE_ERROR",
        }
    }
}

impl From<AdmissionError> for AppError {
    fn from(err: AdmissionError) -> Self {
        if let AdmissionError::Store(inner) = err {
            return inner;
        }
        let kind = match err.category() {
            AdmissionErrorCategory::NotFound => ErrorKind::NotFound,
            AdmissionErrorCategory::Conflict => ErrorKind::Conflict,
            AdmissionErrorCategory::Precondition => ErrorKind::Precondition,
            AdmissionErrorCategory::Invariant | AdmissionErrorCategory::Infrastructure => {
                ErrorKind::Internal
            }
        };
        Self::new(kind, err.to_string())
    }
}
