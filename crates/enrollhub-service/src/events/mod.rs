//! In-process delivery of committed domain events.

pub mod bus;

pub use bus::EventBus;
