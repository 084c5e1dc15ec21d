//! Stock ledger service
//!
//! Append-only log of stock movements and the queries derived from it.
//! Every event mirrors exactly one source record, located through the
//! unique (source_kind, source_id) pair. The ledger never reaches back
//! into source-record storage.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use shared::models::{Commodity, Direction, RecordKind};
use shared::types::{PaginatedResponse, Pagination, PaginationMeta, SortOrder};

use crate::error::{AppError, AppResult};

/// Ledger service over the shared `stock_events` collection
#[derive(Clone)]
pub struct LedgerService {
    db: PgPool,
}

/// One ledger entry mirroring a source record's stock effect
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct StockEvent {
    pub id: Uuid,
    pub mill_id: Uuid,
    pub event_date: NaiveDate,
    pub commodity: String,
    pub variety: Option<String>,
    pub direction: String,
    pub action: String,
    pub quantity: Decimal,
    pub bag_count: i64,
    pub source_kind: String,
    pub source_id: Uuid,
    pub note: Option<String>,
    pub recorded_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Input for recording a stock event
#[derive(Debug, Clone)]
pub struct NewStockEvent {
    pub event_date: NaiveDate,
    pub commodity: Commodity,
    pub variety: Option<String>,
    pub direction: Direction,
    pub action: String,
    pub quantity: Decimal,
    pub bag_count: i64,
    pub source_kind: RecordKind,
    pub source_id: Uuid,
    pub note: Option<String>,
    pub recorded_by: Option<Uuid>,
}

/// Re-derived fields pushed onto a mirrored event after its source changes
#[derive(Debug, Clone)]
pub struct EventSync {
    pub event_date: NaiveDate,
    pub quantity: Decimal,
    pub bag_count: i64,
    pub variety: Option<String>,
    pub note: Option<String>,
}

/// Filters for balance queries
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BalanceFilter {
    pub commodity: Option<String>,
    pub variety: Option<String>,
    pub as_of: Option<NaiveDate>,
}

/// Net position of one (commodity, variety) pair
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct BalanceEntry {
    pub commodity: String,
    pub variety: Option<String>,
    pub total_credit: Decimal,
    pub total_debit: Decimal,
    pub balance: Decimal,
    pub total_bags: i64,
}

/// Filters for movement summaries
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SummaryFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub commodity: Option<String>,
    pub variety: Option<String>,
}

/// Aggregate movement over a window
#[derive(Debug, Clone, Default, Serialize, sqlx::FromRow)]
pub struct LedgerSummary {
    pub transaction_count: i64,
    pub total_credit: Decimal,
    pub total_debit: Decimal,
    pub net_movement: Decimal,
    pub total_bags: i64,
}

/// Filters for action-restricted aggregation
#[derive(Debug, Clone, Default)]
pub struct ActionFilter {
    pub actions: Vec<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Movement of one (commodity, variety) pair restricted to named actions
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ActionBreakdown {
    pub commodity: String,
    pub variety: Option<String>,
    pub total_credit: Decimal,
    pub total_debit: Decimal,
    pub net_movement: Decimal,
    pub total_bags: i64,
    pub transaction_count: i64,
}

/// Filters for the raw event listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub search: Option<String>,
}

/// Reject an event that would corrupt the ledger before it is persisted
pub fn validate_new_event(event: &NewStockEvent) -> Result<(), AppError> {
    if event.quantity < Decimal::ZERO {
        return Err(AppError::Validation {
            field: "quantity".to_string(),
            message: "Quantity cannot be negative".to_string(),
        });
    }
    if event.bag_count < 0 {
        return Err(AppError::Validation {
            field: "bag_count".to_string(),
            message: "Bag count cannot be negative".to_string(),
        });
    }
    if event.commodity.name().trim().is_empty() {
        return Err(AppError::Validation {
            field: "commodity".to_string(),
            message: "Commodity cannot be empty".to_string(),
        });
    }
    Ok(())
}

impl LedgerService {
    /// Create a new LedgerService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Persist a stock event
    pub async fn record(&self, mill_id: Uuid, event: NewStockEvent) -> AppResult<StockEvent> {
        validate_new_event(&event)?;

        let result = sqlx::query_as::<_, StockEvent>(
            r#"
            INSERT INTO stock_events (
                mill_id, event_date, commodity, variety, direction, action,
                quantity, bag_count, source_kind, source_id, note, recorded_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING id, mill_id, event_date, commodity, variety, direction, action,
                      quantity, bag_count, source_kind, source_id, note, recorded_by,
                      created_at
            "#,
        )
        .bind(mill_id)
        .bind(event.event_date)
        .bind(event.commodity.name())
        .bind(&event.variety)
        .bind(event.direction.as_str())
        .bind(&event.action)
        .bind(event.quantity)
        .bind(event.bag_count)
        .bind(event.source_kind.slug())
        .bind(event.source_id)
        .bind(&event.note)
        .bind(event.recorded_by)
        .fetch_one(&self.db)
        .await;

        match result {
            Ok(stored) => Ok(stored),
            Err(sqlx::Error::Database(db)) if db.code().as_deref() == Some("23505") => Err(
                AppError::DuplicateEntry("stock event for source record".to_string()),
            ),
            Err(err) => Err(err.into()),
        }
    }

    /// Re-save the mutable fields of the event mirroring a source record
    ///
    /// Returns false when no event carries the ref. Missing mirrors are a
    /// known consistency gap, not an error; the caller decides what to log.
    pub async fn update_by_ref(
        &self,
        source_kind: RecordKind,
        source_id: Uuid,
        sync: EventSync,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE stock_events
            SET event_date = $3, quantity = $4, bag_count = $5, variety = $6, note = $7
            WHERE source_kind = $1 AND source_id = $2
            "#,
        )
        .bind(source_kind.slug())
        .bind(source_id)
        .bind(sync.event_date)
        .bind(sync.quantity)
        .bind(sync.bag_count)
        .bind(&sync.variety)
        .bind(&sync.note)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete the event mirroring a source record; no-op when already gone
    pub async fn delete_by_ref(&self, source_kind: RecordKind, source_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM stock_events WHERE source_kind = $1 AND source_id = $2")
            .bind(source_kind.slug())
            .bind(source_id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete the mirrors of many source records, one ref at a time
    ///
    /// Not a batch: each ref succeeds or fails on its own, and a failure is
    /// logged without blocking the rest. Returns how many events went away.
    pub async fn bulk_delete_by_refs(&self, refs: &[(RecordKind, Uuid)]) -> AppResult<u64> {
        let mut deleted = 0;
        for (kind, source_id) in refs {
            match self.delete_by_ref(*kind, *source_id).await {
                Ok(true) => deleted += 1,
                Ok(false) => {}
                Err(err) => {
                    tracing::error!(
                        kind = %kind,
                        source_id = %source_id,
                        error = %err,
                        "failed to delete mirrored stock event"
                    );
                }
            }
        }
        Ok(deleted)
    }

    /// Net balance per (commodity, variety), optionally as of a cutoff date
    pub async fn balance(
        &self,
        mill_id: Uuid,
        filter: &BalanceFilter,
    ) -> AppResult<Vec<BalanceEntry>> {
        let entries = sqlx::query_as::<_, BalanceEntry>(
            r#"
            SELECT commodity, variety,
                   COALESCE(SUM(CASE WHEN direction = 'credit' THEN quantity ELSE 0 END), 0) as total_credit,
                   COALESCE(SUM(CASE WHEN direction = 'debit' THEN quantity ELSE 0 END), 0) as total_debit,
                   COALESCE(SUM(CASE WHEN direction = 'credit' THEN quantity ELSE -quantity END), 0) as balance,
                   COALESCE(SUM(CASE WHEN direction = 'credit' THEN bag_count ELSE -bag_count END), 0)::bigint as total_bags
            FROM stock_events
            WHERE mill_id = $1
              AND ($2::text IS NULL OR commodity = $2)
              AND ($3::text IS NULL OR variety = $3)
              AND ($4::date IS NULL OR event_date <= $4)
            GROUP BY commodity, variety
            ORDER BY commodity, variety
            "#,
        )
        .bind(mill_id)
        .bind(&filter.commodity)
        .bind(&filter.variety)
        .bind(filter.as_of)
        .fetch_all(&self.db)
        .await?;

        Ok(entries)
    }

    /// Aggregate movement over a window; zeroed when nothing matches
    pub async fn summary(
        &self,
        mill_id: Uuid,
        filter: &SummaryFilter,
    ) -> AppResult<LedgerSummary> {
        let (start, end) = window(filter.start_date, filter.end_date);

        let summary = sqlx::query_as::<_, LedgerSummary>(
            r#"
            SELECT COUNT(*) as transaction_count,
                   COALESCE(SUM(CASE WHEN direction = 'credit' THEN quantity ELSE 0 END), 0) as total_credit,
                   COALESCE(SUM(CASE WHEN direction = 'debit' THEN quantity ELSE 0 END), 0) as total_debit,
                   COALESCE(SUM(CASE WHEN direction = 'credit' THEN quantity ELSE -quantity END), 0) as net_movement,
                   COALESCE(SUM(bag_count), 0)::bigint as total_bags
            FROM stock_events
            WHERE mill_id = $1
              AND event_date BETWEEN $2 AND $3
              AND ($4::text IS NULL OR commodity = $4)
              AND ($5::text IS NULL OR variety = $5)
            "#,
        )
        .bind(mill_id)
        .bind(start)
        .bind(end)
        .bind(&filter.commodity)
        .bind(&filter.variety)
        .fetch_one(&self.db)
        .await?;

        Ok(summary)
    }

    /// Movement per (commodity, variety) restricted to the named actions
    pub async fn by_action(
        &self,
        mill_id: Uuid,
        filter: &ActionFilter,
    ) -> AppResult<Vec<ActionBreakdown>> {
        if filter.actions.is_empty() {
            return Err(AppError::Validation {
                field: "actions".to_string(),
                message: "At least one action is required".to_string(),
            });
        }

        let (start, end) = window(filter.start_date, filter.end_date);

        let rows = sqlx::query_as::<_, ActionBreakdown>(
            r#"
            SELECT commodity, variety,
                   COALESCE(SUM(CASE WHEN direction = 'credit' THEN quantity ELSE 0 END), 0) as total_credit,
                   COALESCE(SUM(CASE WHEN direction = 'debit' THEN quantity ELSE 0 END), 0) as total_debit,
                   COALESCE(SUM(CASE WHEN direction = 'credit' THEN quantity ELSE -quantity END), 0) as net_movement,
                   COALESCE(SUM(bag_count), 0)::bigint as total_bags,
                   COUNT(*) as transaction_count
            FROM stock_events
            WHERE mill_id = $1
              AND action = ANY($2)
              AND event_date BETWEEN $3 AND $4
            GROUP BY commodity, variety
            ORDER BY commodity, variety
            "#,
        )
        .bind(mill_id)
        .bind(&filter.actions)
        .bind(start)
        .bind(end)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    /// Paginated raw event listing with free-text search
    pub async fn list(
        &self,
        mill_id: Uuid,
        filter: &EventFilter,
        pagination: &Pagination,
        sort: SortOrder,
    ) -> AppResult<PaginatedResponse<StockEvent>> {
        let (start, end) = window(filter.start_date, filter.end_date);
        let pattern = filter
            .search
            .as_deref()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", s));

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM stock_events
            WHERE mill_id = $1
              AND event_date BETWEEN $2 AND $3
              AND ($4::text IS NULL OR commodity ILIKE $4 OR note ILIKE $4)
            "#,
        )
        .bind(mill_id)
        .bind(start)
        .bind(end)
        .bind(&pattern)
        .fetch_one(&self.db)
        .await?;

        // Sort key is fixed; only the direction comes from the caller.
        let query = format!(
            r#"
            SELECT id, mill_id, event_date, commodity, variety, direction, action,
                   quantity, bag_count, source_kind, source_id, note, recorded_by,
                   created_at
            FROM stock_events
            WHERE mill_id = $1
              AND event_date BETWEEN $2 AND $3
              AND ($4::text IS NULL OR commodity ILIKE $4 OR note ILIKE $4)
            ORDER BY event_date {order}, created_at {order}
            LIMIT $5 OFFSET $6
            "#,
            order = sort.as_sql()
        );

        let events = sqlx::query_as::<_, StockEvent>(&query)
            .bind(mill_id)
            .bind(start)
            .bind(end)
            .bind(&pattern)
            .bind(pagination.limit())
            .bind(pagination.offset())
            .fetch_all(&self.db)
            .await?;

        Ok(PaginatedResponse {
            data: events,
            pagination: PaginationMeta {
                page: pagination.page.max(1),
                per_page: pagination.per_page,
                total,
            },
        })
    }
}

fn window(start: Option<NaiveDate>, end: Option<NaiveDate>) -> (NaiveDate, NaiveDate) {
    shared::types::DateRange {
        start_date: start,
        end_date: end,
    }
    .bounds()
}
