//! Class offering entities.

pub mod model;
pub mod status;

pub use model::{CapacitySnapshot, Class, NewClass};
pub use status::ClassStatus;
