//! Foundation module - Shared domain primitives.

mod ids;
mod timestamp;

pub use ids::SessionId;
pub use timestamp::Timestamp;
