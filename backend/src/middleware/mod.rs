//! Request middleware for the Mill Records Platform

pub mod auth;

pub use auth::{auth_middleware, AuthUser};
