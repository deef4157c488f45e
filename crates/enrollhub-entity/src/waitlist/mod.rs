//! Waitlist queue entities.

pub mod model;
pub mod status;

pub use model::{NewWaitlistEntry, WaitlistEntry, queue_order, sort_queue};
pub use status::WaitlistStatus;
