//! Small shared types used throughout the pipeline engine.

pub mod cc;
pub mod error;

pub use cc::Cc;
pub use error::{SimError, SimResult};
