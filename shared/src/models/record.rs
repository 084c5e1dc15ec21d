//! Transaction record payloads

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Fields accepted when creating a transaction record
///
/// The same shape is used for every record kind; which fields are required
/// or allowed is decided by the kind's configuration at validation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordDraft {
    pub record_date: NaiveDate,
    pub party_name: String,
    pub broker_name: Option<String>,
    pub vehicle_number: Option<String>,
    pub variety: Option<String>,
    /// Only consulted for kinds whose commodity comes from the payload
    pub commodity_name: Option<String>,
    pub quantity: Decimal,
    pub bag_count: i64,
    pub rate: Option<Decimal>,
    pub note: Option<String>,
}

/// Partial update of a transaction record
///
/// Absent fields keep their stored value. The commodity of a goods record
/// and an assigned document number are immutable after creation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordPatch {
    pub record_date: Option<NaiveDate>,
    pub party_name: Option<String>,
    pub broker_name: Option<String>,
    pub vehicle_number: Option<String>,
    pub variety: Option<String>,
    pub quantity: Option<Decimal>,
    pub bag_count: Option<i64>,
    pub rate: Option<Decimal>,
    pub note: Option<String>,
}
