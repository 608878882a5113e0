//! HTTP handlers for simplifier-service.

pub mod health;
pub mod metrics;
pub mod simplify;

pub use health::{health_check, readiness_check};
pub use simplify::simplify;
