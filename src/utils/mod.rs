//! Small shared helpers.

pub mod json;
pub mod throttle;

pub use throttle::Throttle;
