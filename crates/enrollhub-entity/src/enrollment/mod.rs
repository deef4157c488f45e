//! Enrollment ledger entities.

pub mod model;
pub mod status;

pub use model::{AUTO_ENROLL_NOTE, Enrollment, EnrollmentTerms};
pub use status::EnrollmentStatus;
