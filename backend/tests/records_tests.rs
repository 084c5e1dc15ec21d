//! Record kind configuration and event derivation tests
//!
//! The per-kind configuration table drives ledger direction, commodity
//! resolution, variety tracking, and document prefixes; these tests pin
//! its shape and the record-to-event mapping built from it.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;
use uuid::Uuid;

use mill_records_backend::services::records::{derive_event, event_note, SourceRecord};
use shared::models::{Commodity, CommoditySource, Direction, RecordDraft, RecordKind};
use shared::validation::validate_draft;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn record(kind: RecordKind) -> SourceRecord {
    let config = kind.config();
    SourceRecord {
        id: Uuid::new_v4(),
        mill_id: Uuid::new_v4(),
        kind: config.slug.to_string(),
        record_date: NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
        party_name: "Sharma Traders".to_string(),
        broker_name: None,
        vehicle_number: None,
        variety: config.tracks_variety.then(|| "Mota".to_string()),
        commodity_name: matches!(config.commodity, CommoditySource::FromPayload)
            .then(|| "Diesel".to_string()),
        quantity: dec("120.5"),
        bag_count: 30,
        rate: Some(dec("2150.00")),
        note: None,
        document_number: None,
        created_by: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[test]
fn purchases_and_inwards_credit_sales_and_outwards_debit() {
    for kind in RecordKind::ALL {
        let config = kind.config();
        let expected = match config.action {
            "Purchase" | "Inward" => Direction::Credit,
            "Sale" | "Outward" => Direction::Debit,
            other => panic!("unexpected action label {}", other),
        };
        assert_eq!(config.direction, expected, "kind {}", config.slug);
    }
}

#[test]
fn variety_is_tracked_only_for_paddy_and_rice() {
    for kind in RecordKind::ALL {
        let config = kind.config();
        let expected = matches!(
            config.commodity,
            CommoditySource::Fixed(Commodity::Paddy) | CommoditySource::Fixed(Commodity::Rice)
        );
        assert_eq!(config.tracks_variety, expected, "kind {}", config.slug);
    }
}

#[test]
fn only_goods_kinds_take_commodity_from_payload() {
    for kind in RecordKind::ALL {
        let config = kind.config();
        let from_payload = matches!(config.commodity, CommoditySource::FromPayload);
        let is_goods = matches!(kind, RecordKind::GoodsPurchase | RecordKind::GoodsSale);
        assert_eq!(from_payload, is_goods, "kind {}", config.slug);
    }
}

#[test]
fn goods_kinds_carry_no_document_prefix() {
    for kind in RecordKind::ALL {
        let config = kind.config();
        let is_goods = matches!(kind, RecordKind::GoodsPurchase | RecordKind::GoodsSale);
        assert_eq!(config.doc_prefix.is_none(), is_goods, "kind {}", config.slug);
    }
}

#[test]
fn derived_event_mirrors_the_record() {
    let kind = RecordKind::PaddyPurchase;
    let config = kind.config();
    let source = record(kind);

    let event = derive_event(&config, &source, source.created_by);

    assert_eq!(event.event_date, source.record_date);
    assert_eq!(event.commodity, Commodity::Paddy);
    assert_eq!(event.variety.as_deref(), Some("Mota"));
    assert_eq!(event.direction, Direction::Credit);
    assert_eq!(event.action, "Purchase");
    assert_eq!(event.quantity, source.quantity);
    assert_eq!(event.bag_count, source.bag_count);
    assert_eq!(event.source_kind, kind);
    assert_eq!(event.source_id, source.id);
}

#[test]
fn goods_events_take_the_payload_commodity() {
    let kind = RecordKind::GoodsSale;
    let source = record(kind);

    let event = derive_event(&kind.config(), &source, None);

    assert_eq!(event.commodity, Commodity::Other("Diesel".to_string()));
    assert_eq!(event.direction, Direction::Debit);
}

#[test]
fn event_note_carries_the_party() {
    assert_eq!(event_note("Sharma Traders", None), "Sharma Traders");
    assert_eq!(
        event_note("Sharma Traders", Some("lorry 2 of 3")),
        "Sharma Traders - lorry 2 of 3"
    );
    assert_eq!(event_note("Sharma Traders", Some("   ")), "Sharma Traders");
}

#[test]
fn drafts_validate_against_their_kind() {
    let draft = RecordDraft {
        record_date: NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
        party_name: "Gupta & Sons".to_string(),
        broker_name: Some("R. Verma".to_string()),
        vehicle_number: Some("CG04-1234".to_string()),
        variety: Some("Sarna".to_string()),
        commodity_name: None,
        quantity: dec("80"),
        bag_count: 20,
        rate: None,
        note: None,
    };

    assert!(validate_draft(&RecordKind::PaddyPurchase.config(), &draft).is_ok());

    // The same payload is rejected where variety is not tracked
    let err = validate_draft(&RecordKind::FrkPurchase.config(), &draft).unwrap_err();
    assert_eq!(err.field, "variety");
}

#[test]
fn fixed_kinds_reject_a_payload_commodity() {
    let mut draft = RecordDraft {
        record_date: NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
        party_name: "Gupta & Sons".to_string(),
        broker_name: None,
        vehicle_number: None,
        variety: None,
        commodity_name: Some("Paddy".to_string()),
        quantity: dec("80"),
        bag_count: 20,
        rate: None,
        note: None,
    };

    let err = validate_draft(&RecordKind::GunnyInward.config(), &draft).unwrap_err();
    assert_eq!(err.field, "commodity_name");

    draft.commodity_name = None;
    assert!(validate_draft(&RecordKind::GunnyInward.config(), &draft).is_ok());
}
