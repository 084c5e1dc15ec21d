//! Shared types and models for the Mill Records Platform
//!
//! This crate contains the domain vocabulary shared between the backend
//! and other components of the system.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
