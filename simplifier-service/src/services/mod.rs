pub mod metrics;
pub mod providers;
pub mod simplifier;

pub use simplifier::{build_prompt, truncate_chars, SimplifyError, Simplifier};
