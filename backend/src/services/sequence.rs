//! Document sequence generation
//!
//! Daily serials come from a `Sequencer`, a single atomic-increment
//! primitive keyed by (mill, record kind, day). The Postgres implementation
//! is one upsert statement, so two concurrent writers can never observe the
//! same counter value. The seam is a trait so the counter store can be
//! swapped without touching the rest of the storage layer.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use shared::models::{format_document_number, RecordKind};

use crate::error::{AppError, AppResult};

/// Counter identity: one independent serial stream per key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SequenceKey {
    pub mill_id: Uuid,
    pub kind: RecordKind,
    pub date: NaiveDate,
}

/// Hands out daily serials, starting at 1 for the first call on a key
///
/// Serials are reserved permanently: deleting the record that consumed one
/// never returns it to the pool.
#[async_trait]
pub trait Sequencer: Send + Sync {
    async fn next(&self, key: &SequenceKey) -> AppResult<i64>;
}

const MAX_CONFLICT_RETRIES: u32 = 3;

/// Postgres-backed sequencer over the `document_sequences` counter table
#[derive(Clone)]
pub struct PgSequencer {
    db: PgPool,
}

impl PgSequencer {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Sequencer for PgSequencer {
    async fn next(&self, key: &SequenceKey) -> AppResult<i64> {
        let mut attempt = 0;
        loop {
            let result = sqlx::query_scalar::<_, i64>(
                r#"
                INSERT INTO document_sequences (mill_id, kind, seq_date, last_serial)
                VALUES ($1, $2, $3, 1)
                ON CONFLICT (mill_id, kind, seq_date)
                DO UPDATE SET last_serial = document_sequences.last_serial + 1
                RETURNING last_serial
                "#,
            )
            .bind(key.mill_id)
            .bind(key.kind.slug())
            .bind(key.date)
            .fetch_one(&self.db)
            .await;

            match result {
                Ok(serial) => return Ok(serial),
                Err(err) if is_unique_violation(&err) && attempt < MAX_CONFLICT_RETRIES => {
                    attempt += 1;
                    tracing::warn!(
                        mill_id = %key.mill_id,
                        kind = %key.kind,
                        attempt,
                        "document sequence upsert conflicted, retrying"
                    );
                }
                Err(err) if is_unique_violation(&err) => {
                    return Err(AppError::DuplicateEntry("document sequence".to_string()));
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}

/// Postgres unique-constraint violation (SQLSTATE 23505)
fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db.code().as_deref() == Some("23505"),
        _ => false,
    }
}

/// Mutex-guarded in-memory sequencer for tests and single-process setups
#[derive(Default)]
pub struct MemorySequencer {
    counters: Mutex<HashMap<SequenceKey, i64>>,
}

impl MemorySequencer {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Sequencer for MemorySequencer {
    async fn next(&self, key: &SequenceKey) -> AppResult<i64> {
        let mut counters = self
            .counters
            .lock()
            .map_err(|_| AppError::Internal("sequence counter lock poisoned".to_string()))?;
        let serial = counters.entry(key.clone()).or_insert(0);
        *serial += 1;
        Ok(*serial)
    }
}

/// Mint the document number for a new record, if its kind carries one
pub async fn assign_document_number(
    sequencer: &dyn Sequencer,
    key: &SequenceKey,
) -> AppResult<Option<String>> {
    let config = key.kind.config();
    let Some(prefix) = config.doc_prefix else {
        return Ok(None);
    };
    let serial = sequencer.next(key).await?;
    Ok(Some(format_document_number(prefix, key.date, serial)))
}
