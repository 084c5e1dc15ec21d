//! Domain models for the Mill Records Platform
//!
//! Re-exports models from the shared crate

pub use shared::models::*;
