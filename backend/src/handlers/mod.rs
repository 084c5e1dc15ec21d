//! HTTP handlers for the Mill Records Platform

pub mod health;
pub mod ledger;
pub mod records;
pub mod reporting;

pub use health::*;
pub use ledger::*;
pub use records::*;
pub use reporting::*;
