//! # Bill Repository
//!
//! Read-side access to committed bills, their line items and the legacy
//! `transactions` mirror.
//!
//! ## Bill Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  bills                 bill_items (bill_id → bills.id)                  │
//! │  ├── bill_number  ───► ├── line 1                                       │
//! │  ├── total_amount      ├── line 2                                       │
//! │  └── total_discount    └── ...                                          │
//! │                                                                         │
//! │  transactions   one row per bill item, no bill reference                │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Writes happen only through [`crate::SqliteRecordStore`].

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};

use tally_core::{Bill, BillItem, BillNumber, LegacyTransaction, Receipt};

use crate::error::{DbError, DbResult};

/// Repository for bill database operations.
#[derive(Debug, Clone)]
pub struct BillRepository {
    pool: SqlitePool,
}

// =============================================================================
// Row Types
// =============================================================================

#[derive(Debug, FromRow)]
struct BillRow {
    id: String,
    bill_number: String,
    total_amount_cents: i64,
    total_discount_cents: i64,
    created_at: DateTime<Utc>,
}

impl From<BillRow> for Bill {
    fn from(row: BillRow) -> Self {
        Bill {
            id: row.id,
            bill_number: BillNumber::new(row.bill_number),
            total_amount_cents: row.total_amount_cents,
            total_discount_cents: row.total_discount_cents,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct BillItemRow {
    id: String,
    bill_id: String,
    item_id: String,
    item_name: String,
    quantity: i64,
    effective_price_cents: i64,
    discount_applied_cents: i64,
    subtotal_cents: i64,
    created_at: DateTime<Utc>,
}

impl From<BillItemRow> for BillItem {
    fn from(row: BillItemRow) -> Self {
        BillItem {
            id: row.id,
            bill_id: row.bill_id,
            item_id: row.item_id,
            item_name: row.item_name,
            quantity: row.quantity,
            effective_price_cents: row.effective_price_cents,
            discount_applied_cents: row.discount_applied_cents,
            subtotal_cents: row.subtotal_cents,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct TransactionRow {
    id: String,
    item_name: String,
    quantity: i64,
    effective_price_cents: i64,
    discount_applied_cents: i64,
    subtotal_cents: i64,
    created_at: DateTime<Utc>,
}

impl From<TransactionRow> for LegacyTransaction {
    fn from(row: TransactionRow) -> Self {
        LegacyTransaction {
            id: row.id,
            item_name: row.item_name,
            quantity: row.quantity,
            effective_price_cents: row.effective_price_cents,
            discount_applied_cents: row.discount_applied_cents,
            subtotal_cents: row.subtotal_cents,
            created_at: row.created_at,
        }
    }
}

// =============================================================================
// Queries
// =============================================================================

impl BillRepository {
    /// Creates a new BillRepository.
    pub fn new(pool: SqlitePool) -> Self {
        BillRepository { pool }
    }

    /// Gets a bill by its human-facing number.
    pub async fn get_by_number(&self, number: &str) -> DbResult<Option<Bill>> {
        let row: Option<BillRow> = sqlx::query_as(
            r#"
            SELECT id, bill_number, total_amount_cents, total_discount_cents, created_at
            FROM bills
            WHERE bill_number = ?1
            "#,
        )
        .bind(number)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Bill::from))
    }

    /// Line items of a bill in insertion order (the cart's line order).
    pub async fn get_items(&self, bill_id: &str) -> DbResult<Vec<BillItem>> {
        let rows: Vec<BillItemRow> = sqlx::query_as(
            r#"
            SELECT id, bill_id, item_id, item_name, quantity,
                   effective_price_cents, discount_applied_cents, subtotal_cents, created_at
            FROM bill_items
            WHERE bill_id = ?1
            ORDER BY rowid
            "#,
        )
        .bind(bill_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(BillItem::from).collect())
    }

    /// Rebuilds the receipt of a committed bill.
    pub async fn receipt(&self, number: &str) -> DbResult<Receipt> {
        let bill = self
            .get_by_number(number)
            .await?
            .ok_or_else(|| DbError::not_found("Bill", number))?;
        let items = self.get_items(&bill.id).await?;

        Ok(Receipt::from_bill(&bill, &items))
    }

    /// Most recent bills first.
    pub async fn list_recent(&self, limit: i64) -> DbResult<Vec<Bill>> {
        let rows: Vec<BillRow> = sqlx::query_as(
            r#"
            SELECT id, bill_number, total_amount_cents, total_discount_cents, created_at
            FROM bills
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Bill::from).collect())
    }

    /// Counts committed bills.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bills")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Counts bill items across all bills.
    pub async fn count_items(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bill_items")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Most recent legacy mirror rows first.
    pub async fn legacy_transactions(&self, limit: i64) -> DbResult<Vec<LegacyTransaction>> {
        let rows: Vec<TransactionRow> = sqlx::query_as(
            r#"
            SELECT id, item_name, quantity,
                   effective_price_cents, discount_applied_cents, subtotal_cents, created_at
            FROM transactions
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(LegacyTransaction::from).collect())
    }

    /// Counts legacy mirror rows.
    pub async fn count_legacy_transactions(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transactions")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
