//! HTTP request handlers organized by domain.

pub mod class;
pub mod enrollment;
pub mod health;
pub mod waitlist;
