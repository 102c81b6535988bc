//! # Record Store
//!
//! The transactional boundary the checkout committer writes through.
//!
//! ## Unit of Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  store.begin() ──► UnitOfWork                                           │
//! │                      │                                                  │
//! │                      ├── insert(Record::Bill)          → bill id        │
//! │                      ├── insert_many(Record::BillItem) → item ids       │
//! │                      ├── insert_many(Record::Transaction)               │
//! │                      │                                                  │
//! │                      ├── commit()   everything becomes visible at once  │
//! │                      └── rollback() nothing becomes visible             │
//! │                                                                         │
//! │  Dropping a unit without commit() is a rollback.                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Implementations: `tally_db::SqliteRecordStore` and
//! [`crate::MemoryRecordStore`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt;

use tally_core::BillNumber;

use crate::error::StoreResult;

/// Store-assigned identity of a written record.
pub type RecordId = String;

// =============================================================================
// Tables
// =============================================================================

/// The three tables a checkout writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Bills,
    BillItems,
    /// Legacy reporting mirror.
    Transactions,
}

impl Table {
    /// Stable table name.
    pub const fn name(&self) -> &'static str {
        match self {
            Table::Bills => "bills",
            Table::BillItems => "bill_items",
            Table::Transactions => "transactions",
        }
    }

    /// Inverse of [`Table::name`].
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "bills" => Some(Table::Bills),
            "bill_items" => Some(Table::BillItems),
            "transactions" => Some(Table::Transactions),
            _ => None,
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Records
// =============================================================================

/// Bill header to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBill {
    pub bill_number: BillNumber,
    pub total_amount_cents: i64,
    pub total_discount_cents: i64,
    pub created_at: DateTime<Utc>,
}

/// Bill line to insert; `bill_id` is the id returned for the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBillItem {
    pub bill_id: RecordId,
    pub item_id: String,
    pub item_name: String,
    pub quantity: i64,
    pub effective_price_cents: i64,
    pub discount_applied_cents: i64,
    pub subtotal_cents: i64,
    pub created_at: DateTime<Utc>,
}

/// Legacy mirror row; no bill reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    pub item_name: String,
    pub quantity: i64,
    pub effective_price_cents: i64,
    pub discount_applied_cents: i64,
    pub subtotal_cents: i64,
    pub created_at: DateTime<Utc>,
}

/// A row to write, tagged with its table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Bill(NewBill),
    BillItem(NewBillItem),
    Transaction(NewTransaction),
}

impl Record {
    pub fn table(&self) -> Table {
        match self {
            Record::Bill(_) => Table::Bills,
            Record::BillItem(_) => Table::BillItems,
            Record::Transaction(_) => Table::Transactions,
        }
    }
}

// =============================================================================
// Traits
// =============================================================================

/// A transactional store that can open units of work.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Opens a new unit of work.
    async fn begin(&self) -> StoreResult<Box<dyn UnitOfWork>>;
}

/// An open transaction. Writes are invisible to everyone else until
/// [`UnitOfWork::commit`] returns `Ok`.
#[async_trait]
pub trait UnitOfWork: Send {
    /// Writes one record, returning its store-assigned id.
    async fn insert(&mut self, record: Record) -> StoreResult<RecordId>;

    /// Writes several records in order. Stops at the first failure.
    async fn insert_many(&mut self, records: Vec<Record>) -> StoreResult<Vec<RecordId>> {
        let mut ids = Vec::with_capacity(records.len());
        for record in records {
            ids.push(self.insert(record).await?);
        }
        Ok(ids)
    }

    /// Publishes every write atomically.
    async fn commit(self: Box<Self>) -> StoreResult<()>;

    /// Discards every write.
    async fn rollback(self: Box<Self>) -> StoreResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_names_round_trip() {
        for table in [Table::Bills, Table::BillItems, Table::Transactions] {
            assert_eq!(Table::from_name(table.name()), Some(table));
        }
        assert_eq!(Table::from_name("sales"), None);
        assert_eq!(Table::BillItems.to_string(), "bill_items");
    }
}
