//! Config-driven validation for transaction record payloads
//!
//! One validator covers every record kind; the kind's configuration decides
//! which fields are required, which are rejected, and which are ignored.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::{CommoditySource, KindConfig, RecordDraft};

/// A rejected payload field
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

fn reject(field: &'static str, message: impl Into<String>) -> FieldError {
    FieldError {
        field,
        message: message.into(),
    }
}

/// Validate a record payload against its kind configuration
pub fn validate_draft(config: &KindConfig, draft: &RecordDraft) -> Result<(), FieldError> {
    if draft.party_name.trim().is_empty() {
        return Err(reject("party_name", "Party name cannot be empty"));
    }

    if draft.quantity < Decimal::ZERO {
        return Err(reject("quantity", "Quantity cannot be negative"));
    }

    if draft.bag_count < 0 {
        return Err(reject("bag_count", "Bag count cannot be negative"));
    }

    if let Some(rate) = draft.rate {
        if rate < Decimal::ZERO {
            return Err(reject("rate", "Rate cannot be negative"));
        }
    }

    match &config.commodity {
        CommoditySource::FromPayload => {
            if draft
                .commodity_name
                .as_deref()
                .map_or(true, |n| n.trim().is_empty())
            {
                return Err(reject(
                    "commodity_name",
                    "Commodity name is required for this record kind",
                ));
            }
        }
        CommoditySource::Fixed(commodity) => {
            if draft.commodity_name.is_some() {
                return Err(reject(
                    "commodity_name",
                    format!("Commodity is fixed to {} for this record kind", commodity),
                ));
            }
        }
    }

    if !config.tracks_variety && draft.variety.is_some() {
        return Err(reject(
            "variety",
            "Variety is not tracked for this record kind",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecordKind;
    use chrono::NaiveDate;

    fn draft() -> RecordDraft {
        RecordDraft {
            record_date: NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
            party_name: "Sharma Traders".to_string(),
            broker_name: None,
            vehicle_number: None,
            variety: None,
            commodity_name: None,
            quantity: Decimal::new(1200, 1),
            bag_count: 30,
            rate: None,
            note: None,
        }
    }

    #[test]
    fn accepts_well_formed_paddy_purchase() {
        let config = RecordKind::PaddyPurchase.config();
        let mut d = draft();
        d.variety = Some("Mota".to_string());
        assert!(validate_draft(&config, &d).is_ok());
    }

    #[test]
    fn rejects_negative_quantity() {
        let config = RecordKind::PaddyPurchase.config();
        let mut d = draft();
        d.quantity = Decimal::new(-5, 0);
        let err = validate_draft(&config, &d).unwrap_err();
        assert_eq!(err.field, "quantity");
    }

    #[test]
    fn goods_kinds_require_a_commodity_name() {
        let config = RecordKind::GoodsPurchase.config();
        let err = validate_draft(&config, &draft()).unwrap_err();
        assert_eq!(err.field, "commodity_name");
    }

    #[test]
    fn variety_rejected_where_not_tracked() {
        let config = RecordKind::GunnyInward.config();
        let mut d = draft();
        d.variety = Some("Mota".to_string());
        let err = validate_draft(&config, &d).unwrap_err();
        assert_eq!(err.field, "variety");
    }
}
