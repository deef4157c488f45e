//! Enroll, withdraw, promote, and waitlist transitions.

pub mod controller;
pub mod outcome;

pub use controller::AdmissionController;
pub use outcome::{PromotedStudent, WithdrawOutcome};
