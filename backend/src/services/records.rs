//! Generic transaction record service
//!
//! One service covers every transaction kind; a `KindConfig` entry supplies
//! the parts that differ between kinds (ledger direction, commodity source,
//! document prefix, variety tracking). Creating, updating, or deleting a
//! record keeps its mirrored stock event in sync. Mirror failures are
//! logged with the identifying keys and never fail the record operation:
//! the business document's durability comes first, and drift between the
//! two stores is repaired by a later reconciliation pass.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use shared::models::{
    Commodity, CommoditySource, KindConfig, RecordDraft, RecordKind, RecordPatch,
};
use shared::types::{PaginatedResponse, Pagination, PaginationMeta, SortOrder};
use shared::validation::validate_draft;

use crate::error::{AppError, AppResult};

use super::ledger::{EventSync, LedgerService, NewStockEvent};
use super::sequence::{assign_document_number, SequenceKey, Sequencer};

/// Record service for one configured transaction kind
#[derive(Clone)]
pub struct RecordService {
    db: PgPool,
    sequencer: Arc<dyn Sequencer>,
    config: KindConfig,
}

/// A persisted transaction record
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SourceRecord {
    pub id: Uuid,
    pub mill_id: Uuid,
    pub kind: String,
    pub record_date: NaiveDate,
    pub party_name: String,
    pub broker_name: Option<String>,
    pub vehicle_number: Option<String>,
    pub variety: Option<String>,
    pub commodity_name: Option<String>,
    pub quantity: Decimal,
    pub bag_count: i64,
    pub rate: Option<Decimal>,
    pub note: Option<String>,
    pub document_number: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Filters for record listings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecordFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub search: Option<String>,
}

/// Kind-level aggregate computed over the source records themselves
#[derive(Debug, Clone, Default, Serialize, sqlx::FromRow)]
pub struct RecordSummary {
    pub record_count: i64,
    pub total_quantity: Decimal,
    pub total_bags: i64,
}

/// Derive the stock event a record mirrors into the ledger
pub fn derive_event(
    config: &KindConfig,
    record: &SourceRecord,
    recorded_by: Option<Uuid>,
) -> NewStockEvent {
    let commodity = match &config.commodity {
        CommoditySource::Fixed(commodity) => commodity.clone(),
        CommoditySource::FromPayload => {
            Commodity::from(record.commodity_name.clone().unwrap_or_default())
        }
    };

    NewStockEvent {
        event_date: record.record_date,
        commodity,
        variety: record.variety.clone(),
        direction: config.direction,
        action: config.action.to_string(),
        quantity: record.quantity,
        bag_count: record.bag_count,
        source_kind: config.kind,
        source_id: record.id,
        note: Some(event_note(&record.party_name, record.note.as_deref())),
        recorded_by,
    }
}

/// Ledger note carries the party name so event search can match on it
pub fn event_note(party: &str, note: Option<&str>) -> String {
    match note {
        Some(n) if !n.trim().is_empty() => format!("{} - {}", party, n),
        _ => party.to_string(),
    }
}

impl RecordService {
    /// Create a record service for one transaction kind
    pub fn new(db: PgPool, sequencer: Arc<dyn Sequencer>, kind: RecordKind) -> Self {
        Self {
            db,
            sequencer,
            config: kind.config(),
        }
    }

    pub fn kind(&self) -> RecordKind {
        self.config.kind
    }

    fn ledger(&self) -> LedgerService {
        LedgerService::new(self.db.clone())
    }

    /// Create a record, assign its document number, and mirror it
    pub async fn create(
        &self,
        mill_id: Uuid,
        draft: RecordDraft,
        actor_id: Uuid,
    ) -> AppResult<SourceRecord> {
        validate_draft(&self.config, &draft)?;

        let document_number = assign_document_number(
            self.sequencer.as_ref(),
            &SequenceKey {
                mill_id,
                kind: self.config.kind,
                date: draft.record_date,
            },
        )
        .await?;

        let record = sqlx::query_as::<_, SourceRecord>(
            r#"
            INSERT INTO source_records (
                mill_id, kind, record_date, party_name, broker_name, vehicle_number,
                variety, commodity_name, quantity, bag_count, rate, note,
                document_number, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING id, mill_id, kind, record_date, party_name, broker_name,
                      vehicle_number, variety, commodity_name, quantity, bag_count,
                      rate, note, document_number, created_by, created_at, updated_at
            "#,
        )
        .bind(mill_id)
        .bind(self.config.slug)
        .bind(draft.record_date)
        .bind(&draft.party_name)
        .bind(&draft.broker_name)
        .bind(&draft.vehicle_number)
        .bind(&draft.variety)
        .bind(&draft.commodity_name)
        .bind(draft.quantity)
        .bind(draft.bag_count)
        .bind(draft.rate)
        .bind(&draft.note)
        .bind(&document_number)
        .bind(actor_id)
        .fetch_one(&self.db)
        .await?;

        let event = derive_event(&self.config, &record, Some(actor_id));
        if let Err(err) = self.ledger().record(mill_id, event).await {
            tracing::error!(
                mill_id = %mill_id,
                kind = %self.config.slug,
                source_id = %record.id,
                error = %err,
                "failed to mirror record into stock ledger"
            );
        }

        Ok(record)
    }

    /// Fetch one record, scoped to the mill
    pub async fn get_by_id(&self, mill_id: Uuid, id: Uuid) -> AppResult<SourceRecord> {
        sqlx::query_as::<_, SourceRecord>(
            r#"
            SELECT id, mill_id, kind, record_date, party_name, broker_name,
                   vehicle_number, variety, commodity_name, quantity, bag_count,
                   rate, note, document_number, created_by, created_at, updated_at
            FROM source_records
            WHERE id = $1 AND mill_id = $2 AND kind = $3
            "#,
        )
        .bind(id)
        .bind(mill_id)
        .bind(self.config.slug)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Record".to_string()))
    }

    /// Paginated record listing with free-text search over party and note
    pub async fn list(
        &self,
        mill_id: Uuid,
        filter: &RecordFilter,
        pagination: &Pagination,
        sort: SortOrder,
    ) -> AppResult<PaginatedResponse<SourceRecord>> {
        let (start, end) = shared::types::DateRange {
            start_date: filter.start_date,
            end_date: filter.end_date,
        }
        .bounds();
        let pattern = filter
            .search
            .as_deref()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", s));

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM source_records
            WHERE mill_id = $1 AND kind = $2
              AND record_date BETWEEN $3 AND $4
              AND ($5::text IS NULL OR party_name ILIKE $5 OR note ILIKE $5)
            "#,
        )
        .bind(mill_id)
        .bind(self.config.slug)
        .bind(start)
        .bind(end)
        .bind(&pattern)
        .fetch_one(&self.db)
        .await?;

        // Sort key is fixed; only the direction comes from the caller.
        let query = format!(
            r#"
            SELECT id, mill_id, kind, record_date, party_name, broker_name,
                   vehicle_number, variety, commodity_name, quantity, bag_count,
                   rate, note, document_number, created_by, created_at, updated_at
            FROM source_records
            WHERE mill_id = $1 AND kind = $2
              AND record_date BETWEEN $3 AND $4
              AND ($5::text IS NULL OR party_name ILIKE $5 OR note ILIKE $5)
            ORDER BY record_date {order}, created_at {order}
            LIMIT $6 OFFSET $7
            "#,
            order = sort.as_sql()
        );

        let records = sqlx::query_as::<_, SourceRecord>(&query)
            .bind(mill_id)
            .bind(self.config.slug)
            .bind(start)
            .bind(end)
            .bind(&pattern)
            .bind(pagination.limit())
            .bind(pagination.offset())
            .fetch_all(&self.db)
            .await?;

        Ok(PaginatedResponse {
            data: records,
            pagination: PaginationMeta {
                page: pagination.page.max(1),
                per_page: pagination.per_page,
                total,
            },
        })
    }

    /// Update a record and re-sync its mirrored event
    ///
    /// The document number never changes once assigned.
    pub async fn update(
        &self,
        mill_id: Uuid,
        id: Uuid,
        patch: RecordPatch,
        _actor_id: Uuid,
    ) -> AppResult<SourceRecord> {
        let existing = self.get_by_id(mill_id, id).await?;

        let merged = RecordDraft {
            record_date: patch.record_date.unwrap_or(existing.record_date),
            party_name: patch.party_name.clone().unwrap_or(existing.party_name),
            broker_name: patch.broker_name.clone().or(existing.broker_name),
            vehicle_number: patch.vehicle_number.clone().or(existing.vehicle_number),
            variety: patch.variety.clone().or(existing.variety),
            commodity_name: existing.commodity_name,
            quantity: patch.quantity.unwrap_or(existing.quantity),
            bag_count: patch.bag_count.unwrap_or(existing.bag_count),
            rate: patch.rate.or(existing.rate),
            note: patch.note.clone().or(existing.note),
        };
        validate_draft(&self.config, &merged)?;

        let record = sqlx::query_as::<_, SourceRecord>(
            r#"
            UPDATE source_records
            SET record_date = $1, party_name = $2, broker_name = $3,
                vehicle_number = $4, variety = $5, quantity = $6, bag_count = $7,
                rate = $8, note = $9, updated_at = NOW()
            WHERE id = $10 AND mill_id = $11 AND kind = $12
            RETURNING id, mill_id, kind, record_date, party_name, broker_name,
                      vehicle_number, variety, commodity_name, quantity, bag_count,
                      rate, note, document_number, created_by, created_at, updated_at
            "#,
        )
        .bind(merged.record_date)
        .bind(&merged.party_name)
        .bind(&merged.broker_name)
        .bind(&merged.vehicle_number)
        .bind(&merged.variety)
        .bind(merged.quantity)
        .bind(merged.bag_count)
        .bind(merged.rate)
        .bind(&merged.note)
        .bind(id)
        .bind(mill_id)
        .bind(self.config.slug)
        .fetch_one(&self.db)
        .await?;

        let touches_mirror = patch.record_date.is_some()
            || patch.quantity.is_some()
            || patch.bag_count.is_some()
            || patch.variety.is_some()
            || patch.party_name.is_some()
            || patch.note.is_some();

        if touches_mirror {
            let sync = EventSync {
                event_date: record.record_date,
                quantity: record.quantity,
                bag_count: record.bag_count,
                variety: record.variety.clone(),
                note: Some(event_note(&record.party_name, record.note.as_deref())),
            };
            match self
                .ledger()
                .update_by_ref(self.config.kind, record.id, sync)
                .await
            {
                Ok(true) => {}
                Ok(false) => tracing::warn!(
                    mill_id = %mill_id,
                    kind = %self.config.slug,
                    source_id = %record.id,
                    "no mirrored stock event found to update"
                ),
                Err(err) => tracing::error!(
                    mill_id = %mill_id,
                    kind = %self.config.slug,
                    source_id = %record.id,
                    error = %err,
                    "failed to sync mirrored stock event"
                ),
            }
        }

        Ok(record)
    }

    /// Delete a record and cascade the ledger mirror
    pub async fn delete(&self, mill_id: Uuid, id: Uuid) -> AppResult<()> {
        let result =
            sqlx::query("DELETE FROM source_records WHERE id = $1 AND mill_id = $2 AND kind = $3")
                .bind(id)
                .bind(mill_id)
                .bind(self.config.slug)
                .execute(&self.db)
                .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Record".to_string()));
        }

        if let Err(err) = self.ledger().delete_by_ref(self.config.kind, id).await {
            tracing::error!(
                mill_id = %mill_id,
                kind = %self.config.slug,
                source_id = %id,
                error = %err,
                "failed to delete mirrored stock event"
            );
        }

        Ok(())
    }

    /// Delete many records, ignoring ids that match nothing
    ///
    /// Each id is processed independently; there is no rollback of the ones
    /// already deleted when a later one fails. Returns how many records
    /// actually went away.
    pub async fn bulk_delete(&self, mill_id: Uuid, ids: &[Uuid]) -> AppResult<u64> {
        let mut deleted = 0;
        let mut refs = Vec::new();
        for id in ids {
            let result = sqlx::query(
                "DELETE FROM source_records WHERE id = $1 AND mill_id = $2 AND kind = $3",
            )
            .bind(id)
            .bind(mill_id)
            .bind(self.config.slug)
            .execute(&self.db)
            .await;

            match result {
                Ok(res) if res.rows_affected() > 0 => {
                    deleted += 1;
                    refs.push((self.config.kind, *id));
                }
                Ok(_) => {}
                Err(err) => {
                    tracing::error!(
                        mill_id = %mill_id,
                        kind = %self.config.slug,
                        source_id = %id,
                        error = %err,
                        "failed to delete record"
                    );
                }
            }
        }

        if let Err(err) = self.ledger().bulk_delete_by_refs(&refs).await {
            tracing::error!(
                mill_id = %mill_id,
                kind = %self.config.slug,
                error = %err,
                "failed to delete mirrored stock events"
            );
        }

        Ok(deleted)
    }

    /// Aggregate over the source records of this kind in a date window
    pub async fn summary(
        &self,
        mill_id: Uuid,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> AppResult<RecordSummary> {
        let (start, end) = shared::types::DateRange {
            start_date,
            end_date,
        }
        .bounds();

        let summary = sqlx::query_as::<_, RecordSummary>(
            r#"
            SELECT COUNT(*) as record_count,
                   COALESCE(SUM(quantity), 0) as total_quantity,
                   COALESCE(SUM(bag_count), 0)::bigint as total_bags
            FROM source_records
            WHERE mill_id = $1 AND kind = $2 AND record_date BETWEEN $3 AND $4
            "#,
        )
        .bind(mill_id)
        .bind(self.config.slug)
        .bind(start)
        .bind(end)
        .fetch_one(&self.db)
        .await?;

        Ok(summary)
    }
}
