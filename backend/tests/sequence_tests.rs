//! Document numbering tests
//!
//! Tests for the sequencer and document number assignment:
//! - Serial uniqueness under concurrent writers
//! - Serial reset at each day boundary
//! - PREFIX-DDMMYY-SERIAL formatting

use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;
use uuid::Uuid;

use mill_records_backend::services::sequence::{
    assign_document_number, MemorySequencer, SequenceKey, Sequencer,
};
use shared::models::RecordKind;

fn key(mill_id: Uuid, kind: RecordKind, y: i32, m: u32, d: u32) -> SequenceKey {
    SequenceKey {
        mill_id,
        kind,
        date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
    }
}

#[tokio::test]
async fn serials_start_at_one_and_increment() {
    let sequencer = MemorySequencer::new();
    let key = key(Uuid::new_v4(), RecordKind::PaddyPurchase, 2024, 3, 5);

    assert_eq!(sequencer.next(&key).await.unwrap(), 1);
    assert_eq!(sequencer.next(&key).await.unwrap(), 2);
    assert_eq!(sequencer.next(&key).await.unwrap(), 3);
}

#[tokio::test]
async fn first_serial_of_a_new_day_is_one() {
    let sequencer = MemorySequencer::new();
    let mill_id = Uuid::new_v4();

    let monday = key(mill_id, RecordKind::RiceSale, 2024, 3, 4);
    let tuesday = key(mill_id, RecordKind::RiceSale, 2024, 3, 5);

    sequencer.next(&monday).await.unwrap();
    sequencer.next(&monday).await.unwrap();

    assert_eq!(sequencer.next(&tuesday).await.unwrap(), 1);

    let number = assign_document_number(&sequencer, &tuesday).await.unwrap();
    assert_eq!(number.as_deref(), Some("RCS-050324-02"));
}

#[tokio::test]
async fn mills_and_kinds_have_independent_streams() {
    let sequencer = MemorySequencer::new();
    let mill_a = Uuid::new_v4();
    let mill_b = Uuid::new_v4();

    let a_purchase = key(mill_a, RecordKind::PaddyPurchase, 2024, 3, 5);
    let a_sale = key(mill_a, RecordKind::RiceSale, 2024, 3, 5);
    let b_purchase = key(mill_b, RecordKind::PaddyPurchase, 2024, 3, 5);

    assert_eq!(sequencer.next(&a_purchase).await.unwrap(), 1);
    assert_eq!(sequencer.next(&a_purchase).await.unwrap(), 2);
    assert_eq!(sequencer.next(&a_sale).await.unwrap(), 1);
    assert_eq!(sequencer.next(&b_purchase).await.unwrap(), 1);
}

#[tokio::test]
async fn concurrent_assignments_yield_distinct_serials() {
    let sequencer = Arc::new(MemorySequencer::new());
    let shared_key = key(Uuid::new_v4(), RecordKind::PaddyPurchase, 2024, 3, 5);

    let mut handles = Vec::new();
    for _ in 0..25 {
        let sequencer = sequencer.clone();
        let key = shared_key.clone();
        handles.push(tokio::spawn(
            async move { sequencer.next(&key).await.unwrap() },
        ));
    }

    let mut serials = HashSet::new();
    for handle in handles {
        let serial = handle.await.unwrap();
        assert!(serials.insert(serial), "serial {} minted twice", serial);
    }
    assert_eq!(serials.len(), 25);
}

#[tokio::test]
async fn concurrent_document_numbers_are_distinct() {
    let sequencer = Arc::new(MemorySequencer::new());
    let shared_key = key(Uuid::new_v4(), RecordKind::GunnyOutward, 2024, 7, 19);

    let mut handles = Vec::new();
    for _ in 0..10 {
        let sequencer = sequencer.clone();
        let key = shared_key.clone();
        handles.push(tokio::spawn(async move {
            assign_document_number(sequencer.as_ref(), &key)
                .await
                .unwrap()
                .unwrap()
        }));
    }

    let mut numbers = HashSet::new();
    for handle in handles {
        assert!(numbers.insert(handle.await.unwrap()));
    }
    assert_eq!(numbers.len(), 10);
}

#[tokio::test]
async fn sequential_paddy_purchases_number_in_order() {
    let sequencer = MemorySequencer::new();
    let key = key(Uuid::new_v4(), RecordKind::PaddyPurchase, 2024, 3, 5);

    for expected in ["PDP-050324-01", "PDP-050324-02", "PDP-050324-03"] {
        let number = assign_document_number(&sequencer, &key).await.unwrap();
        assert_eq!(number.as_deref(), Some(expected));
    }
}

#[tokio::test]
async fn kinds_without_prefix_get_no_document_number() {
    let sequencer = MemorySequencer::new();
    let key = key(Uuid::new_v4(), RecordKind::GoodsPurchase, 2024, 3, 5);

    let number = assign_document_number(&sequencer, &key).await.unwrap();
    assert_eq!(number, None);
}

#[tokio::test]
async fn serials_are_never_reused() {
    let sequencer = MemorySequencer::new();
    let key = key(Uuid::new_v4(), RecordKind::PaddyInward, 2024, 3, 5);

    sequencer.next(&key).await.unwrap();
    sequencer.next(&key).await.unwrap();

    // The record that consumed serial 2 being deleted changes nothing:
    // the counter only moves forward.
    assert_eq!(sequencer.next(&key).await.unwrap(), 3);
}

#[tokio::test]
async fn serials_widen_past_two_digits() {
    let sequencer = MemorySequencer::new();
    let key = key(Uuid::new_v4(), RecordKind::RiceOutward, 2024, 3, 5);

    for _ in 0..99 {
        sequencer.next(&key).await.unwrap();
    }

    let number = assign_document_number(&sequencer, &key).await.unwrap();
    assert_eq!(number.as_deref(), Some("RCO-050324-100"));
}
