//! Business logic services for the Mill Records Platform

pub mod ledger;
pub mod records;
pub mod reporting;
pub mod sequence;

pub use ledger::LedgerService;
pub use records::RecordService;
pub use reporting::ReportingService;
pub use sequence::{MemorySequencer, PgSequencer, Sequencer};
