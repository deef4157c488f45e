//! Read models over the roster and waitlist.

pub mod service;

pub use service::{RosterService, WaitlistPosition};
