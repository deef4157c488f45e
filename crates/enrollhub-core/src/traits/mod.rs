//! Core traits defined in `enrollhub-core` and implemented by other crates.

pub mod directory;
pub mod publisher;

pub use directory::StudentDirectory;
pub use publisher::EventPublisher;
