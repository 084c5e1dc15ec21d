//! Reporting service composing ledger aggregates into cross-cutting views
//!
//! Pure reads over the stock ledger; source-record storage is never
//! consulted. Empty windows come back as zeroed totals, not errors.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use shared::types::DateRange;

use crate::error::{AppError, AppResult};

use super::ledger::{
    ActionBreakdown, ActionFilter, BalanceEntry, BalanceFilter, LedgerService, LedgerSummary,
    SummaryFilter,
};

/// Reporting service
#[derive(Clone)]
pub struct ReportingService {
    db: PgPool,
}

/// Net position of a single commodity, with its per-variety breakdown
#[derive(Debug, Clone, Serialize)]
pub struct CommodityPosition {
    pub commodity: String,
    pub total_credit: Decimal,
    pub total_debit: Decimal,
    pub balance: Decimal,
    pub total_bags: i64,
    pub varieties: Vec<BalanceEntry>,
}

/// Action-restricted movement for one day
#[derive(Debug, Clone, Serialize)]
pub struct DailyPosition {
    pub date: NaiveDate,
    pub actions: Vec<String>,
    pub groups: Vec<ActionBreakdown>,
}

/// Mill-wide overview for dashboards
#[derive(Debug, Clone, Serialize)]
pub struct MillOverview {
    pub event_count: i64,
    pub commodity_count: i64,
    pub total_credit: Decimal,
    pub total_debit: Decimal,
    pub positions: Vec<BalanceEntry>,
}

/// Fold per-variety balances into one commodity position
///
/// An empty entry list yields a zeroed position, so a commodity with no
/// ledger history still reports cleanly.
pub fn fold_position(commodity: &str, entries: Vec<BalanceEntry>) -> CommodityPosition {
    let mut position = CommodityPosition {
        commodity: commodity.to_string(),
        total_credit: Decimal::ZERO,
        total_debit: Decimal::ZERO,
        balance: Decimal::ZERO,
        total_bags: 0,
        varieties: Vec::new(),
    };
    for entry in &entries {
        position.total_credit += entry.total_credit;
        position.total_debit += entry.total_debit;
        position.balance += entry.balance;
        position.total_bags += entry.total_bags;
    }
    position.varieties = entries;
    position
}

impl ReportingService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    fn ledger(&self) -> LedgerService {
        LedgerService::new(self.db.clone())
    }

    /// Current (or as-of) balance of every commodity and variety
    pub async fn stock_position(
        &self,
        mill_id: Uuid,
        as_of: Option<NaiveDate>,
    ) -> AppResult<Vec<BalanceEntry>> {
        self.ledger()
            .balance(
                mill_id,
                &BalanceFilter {
                    commodity: None,
                    variety: None,
                    as_of,
                },
            )
            .await
    }

    /// Position of one commodity, zeroed when it has no events
    pub async fn commodity_position(
        &self,
        mill_id: Uuid,
        commodity: &str,
        as_of: Option<NaiveDate>,
    ) -> AppResult<CommodityPosition> {
        let entries = self
            .ledger()
            .balance(
                mill_id,
                &BalanceFilter {
                    commodity: Some(commodity.to_string()),
                    variety: None,
                    as_of,
                },
            )
            .await?;

        Ok(fold_position(commodity, entries))
    }

    /// Aggregate movement over a window, optionally per commodity
    pub async fn movement_summary(
        &self,
        mill_id: Uuid,
        range: DateRange,
        commodity: Option<String>,
    ) -> AppResult<LedgerSummary> {
        self.ledger()
            .summary(
                mill_id,
                &SummaryFilter {
                    start_date: range.start_date,
                    end_date: range.end_date,
                    commodity,
                    variety: None,
                },
            )
            .await
    }

    /// One day's movement restricted to the named actions
    pub async fn daily_position(
        &self,
        mill_id: Uuid,
        date: NaiveDate,
        actions: Vec<String>,
    ) -> AppResult<DailyPosition> {
        let groups = self
            .ledger()
            .by_action(
                mill_id,
                &ActionFilter {
                    actions: actions.clone(),
                    start_date: Some(date),
                    end_date: Some(date),
                },
            )
            .await?;

        Ok(DailyPosition {
            date,
            actions,
            groups,
        })
    }

    /// Whole-mill overview composed from ledger aggregates
    pub async fn mill_overview(&self, mill_id: Uuid) -> AppResult<MillOverview> {
        let summary = self
            .ledger()
            .summary(mill_id, &SummaryFilter::default())
            .await?;
        let positions = self.stock_position(mill_id, None).await?;

        let mut commodities: Vec<&str> = positions.iter().map(|p| p.commodity.as_str()).collect();
        commodities.dedup();

        Ok(MillOverview {
            event_count: summary.transaction_count,
            commodity_count: commodities.len() as i64,
            total_credit: summary.total_credit,
            total_debit: summary.total_debit,
            positions,
        })
    }

    /// Serialize report rows to CSV for download
    pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for record in data {
            wtr.serialize(record)
                .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
        }
        let csv_data = String::from_utf8(
            wtr.into_inner()
                .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?,
        )
        .map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))?;
        Ok(csv_data)
    }
}
