//! # SQLite Record Store
//!
//! [`RecordStore`] over a SQLite pool. Each unit of work is one SQLite
//! transaction, so a checkout's bill header, bill items and legacy mirror
//! rows become visible together or not at all.
//!
//! ## Transaction Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  begin()  ──► pool.begin()        BEGIN                                 │
//! │  insert() ──► INSERT ... (tx)     invisible to other connections        │
//! │  commit() ──► tx.commit()         COMMIT                                │
//! │  rollback() / drop ──►            ROLLBACK                              │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::debug;
use uuid::Uuid;

use tally_checkout::{
    NewBill, NewBillItem, NewTransaction, Record, RecordId, RecordStore, StoreError, StoreResult,
    Table, UnitOfWork,
};

use crate::error::{Constraint, DbError};

/// Checkout writes backed by SQLite transactions.
#[derive(Debug, Clone)]
pub struct SqliteRecordStore {
    pool: SqlitePool,
}

impl SqliteRecordStore {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteRecordStore { pool }
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn begin(&self) -> StoreResult<Box<dyn UnitOfWork>> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::from(DbError::from(e)))?;

        Ok(Box::new(SqliteUnit { tx }))
    }
}

/// One open SQLite transaction. sqlx rolls it back if dropped unfinished.
struct SqliteUnit {
    tx: Transaction<'static, Sqlite>,
}

/// Attributes constraint failures to the table being written.
fn insert_error(table: Table, err: sqlx::Error) -> StoreError {
    match DbError::from(err) {
        DbError::ConstraintViolation {
            kind: Constraint::ForeignKey | Constraint::Check | Constraint::NotNull,
            detail,
        } => StoreError::Rejected { table, reason: detail },
        other => other.into(),
    }
}

impl SqliteUnit {
    async fn insert_bill(&mut self, bill: NewBill) -> StoreResult<RecordId> {
        let id = Uuid::new_v4().to_string();

        sqlx::query(
            r#"
            INSERT INTO bills (
                id, bill_number, total_amount_cents, total_discount_cents, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&id)
        .bind(bill.bill_number.as_str())
        .bind(bill.total_amount_cents)
        .bind(bill.total_discount_cents)
        .bind(bill.created_at)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| insert_error(Table::Bills, e))?;

        debug!(bill_id = %id, bill_number = %bill.bill_number, "Bill header staged");
        Ok(id)
    }

    async fn insert_bill_item(&mut self, item: NewBillItem) -> StoreResult<RecordId> {
        let id = Uuid::new_v4().to_string();

        sqlx::query(
            r#"
            INSERT INTO bill_items (
                id, bill_id, item_id, item_name, quantity,
                effective_price_cents, discount_applied_cents, subtotal_cents, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&id)
        .bind(&item.bill_id)
        .bind(&item.item_id)
        .bind(&item.item_name)
        .bind(item.quantity)
        .bind(item.effective_price_cents)
        .bind(item.discount_applied_cents)
        .bind(item.subtotal_cents)
        .bind(item.created_at)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| insert_error(Table::BillItems, e))?;

        Ok(id)
    }

    async fn insert_transaction(&mut self, row: NewTransaction) -> StoreResult<RecordId> {
        let id = Uuid::new_v4().to_string();

        sqlx::query(
            r#"
            INSERT INTO transactions (
                id, item_name, quantity,
                effective_price_cents, discount_applied_cents, subtotal_cents, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&id)
        .bind(&row.item_name)
        .bind(row.quantity)
        .bind(row.effective_price_cents)
        .bind(row.discount_applied_cents)
        .bind(row.subtotal_cents)
        .bind(row.created_at)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| insert_error(Table::Transactions, e))?;

        Ok(id)
    }
}

#[async_trait]
impl UnitOfWork for SqliteUnit {
    async fn insert(&mut self, record: Record) -> StoreResult<RecordId> {
        match record {
            Record::Bill(bill) => self.insert_bill(bill).await,
            Record::BillItem(item) => self.insert_bill_item(item).await,
            Record::Transaction(row) => self.insert_transaction(row).await,
        }
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| StoreError::from(DbError::from(e)))
    }

    async fn rollback(self: Box<Self>) -> StoreResult<()> {
        self.tx
            .rollback()
            .await
            .map_err(|e| StoreError::from(DbError::from(e)))
    }
}
