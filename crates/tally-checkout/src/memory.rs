//! # In-Memory Record Store
//!
//! A [`RecordStore`] backed by three vectors behind a tokio mutex.
//!
//! ## Isolation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  MemoryUnit (one per begin)            Shared (one per store)           │
//! │  ──────────────────────────            ──────────────────────           │
//! │  staged.bills        ─┐                tables.bills                     │
//! │  staged.bill_items    ├── commit() ──► tables.bill_items                │
//! │  staged.transactions ─┘   (mutex,      tables.transactions              │
//! │                            re-check                                     │
//! │                            bill_number)                                 │
//! │                                                                         │
//! │  rollback() / drop ──► staged rows discarded                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! [`FaultPlan`] injects failures and delays so every abort path of the
//! committer can be exercised without a database.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use tally_core::{Bill, BillItem, LegacyTransaction};

use crate::error::{StoreError, StoreResult};
use crate::store::{Record, RecordId, RecordStore, Table, UnitOfWork};

// =============================================================================
// Fault Injection
// =============================================================================

/// Failures to inject into a [`MemoryRecordStore`].
#[derive(Debug, Clone, Default)]
pub struct FaultPlan {
    /// Every insert into this table is rejected.
    pub fail_on_table: Option<Table>,
    /// Inserts after the first `n` of a unit fail with `Unavailable`.
    pub fail_after_inserts: Option<usize>,
    /// `commit()` fails with `Unavailable`.
    pub fail_commit: bool,
    /// `begin()` fails with `Unavailable`.
    pub unavailable: bool,
    /// Every insert sleeps this long first.
    pub insert_delay: Option<Duration>,
    /// `commit()` publishes, then sleeps this long before acknowledging.
    pub commit_ack_delay: Option<Duration>,
}

impl FaultPlan {
    pub fn fail_on(mut self, table: Table) -> Self {
        self.fail_on_table = Some(table);
        self
    }

    pub fn fail_after(mut self, inserts: usize) -> Self {
        self.fail_after_inserts = Some(inserts);
        self
    }

    pub fn fail_commit(mut self) -> Self {
        self.fail_commit = true;
        self
    }

    pub fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }

    pub fn delay_inserts(mut self, delay: Duration) -> Self {
        self.insert_delay = Some(delay);
        self
    }

    pub fn delay_commit_ack(mut self, delay: Duration) -> Self {
        self.commit_ack_delay = Some(delay);
        self
    }
}

// =============================================================================
// Store
// =============================================================================

#[derive(Debug, Default)]
struct Tables {
    bills: Vec<Bill>,
    bill_items: Vec<BillItem>,
    transactions: Vec<LegacyTransaction>,
}

#[derive(Debug, Default)]
struct Counters {
    begins: AtomicUsize,
    commits: AtomicUsize,
    rollbacks: AtomicUsize,
    inserts: AtomicUsize,
}

#[derive(Debug, Default)]
struct Shared {
    tables: Mutex<Tables>,
    faults: FaultPlan,
    counters: Counters,
}

/// In-memory [`RecordStore`]. Clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryRecordStore {
    shared: Arc<Shared>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store that misbehaves according to `faults`.
    pub fn with_faults(faults: FaultPlan) -> Self {
        MemoryRecordStore {
            shared: Arc::new(Shared {
                faults,
                ..Shared::default()
            }),
        }
    }

    /// Committed bills.
    pub async fn bills(&self) -> Vec<Bill> {
        self.shared.tables.lock().await.bills.clone()
    }

    /// Committed bill items.
    pub async fn bill_items(&self) -> Vec<BillItem> {
        self.shared.tables.lock().await.bill_items.clone()
    }

    /// Committed bill items belonging to one bill.
    pub async fn items_for_bill(&self, bill_id: &str) -> Vec<BillItem> {
        self.shared
            .tables
            .lock()
            .await
            .bill_items
            .iter()
            .filter(|i| i.bill_id == bill_id)
            .cloned()
            .collect()
    }

    /// Committed legacy mirror rows.
    pub async fn transactions(&self) -> Vec<LegacyTransaction> {
        self.shared.tables.lock().await.transactions.clone()
    }

    /// Units opened so far (including ones that failed to open).
    pub fn begin_count(&self) -> usize {
        self.shared.counters.begins.load(Ordering::SeqCst)
    }

    pub fn commit_count(&self) -> usize {
        self.shared.counters.commits.load(Ordering::SeqCst)
    }

    /// Explicit rollbacks plus units dropped without commit.
    pub fn rollback_count(&self) -> usize {
        self.shared.counters.rollbacks.load(Ordering::SeqCst)
    }

    /// Insert calls across all units, successful or not.
    pub fn insert_count(&self) -> usize {
        self.shared.counters.inserts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn begin(&self) -> StoreResult<Box<dyn UnitOfWork>> {
        self.shared.counters.begins.fetch_add(1, Ordering::SeqCst);

        if self.shared.faults.unavailable {
            return Err(StoreError::Unavailable("memory store marked unavailable".to_string()));
        }

        Ok(Box::new(MemoryUnit {
            shared: Arc::clone(&self.shared),
            staged: Tables::default(),
            inserts: 0,
            finished: false,
        }))
    }
}

// =============================================================================
// Unit of Work
// =============================================================================

struct MemoryUnit {
    shared: Arc<Shared>,
    staged: Tables,
    inserts: usize,
    finished: bool,
}

impl MemoryUnit {
    async fn bill_number_taken(&self, number: &tally_core::BillNumber) -> bool {
        if self.staged.bills.iter().any(|b| &b.bill_number == number) {
            return true;
        }
        let tables = self.shared.tables.lock().await;
        tables.bills.iter().any(|b| &b.bill_number == number)
    }

    async fn bill_exists(&self, bill_id: &str) -> bool {
        if self.staged.bills.iter().any(|b| b.id == bill_id) {
            return true;
        }
        let tables = self.shared.tables.lock().await;
        tables.bills.iter().any(|b| b.id == bill_id)
    }
}

#[async_trait]
impl UnitOfWork for MemoryUnit {
    async fn insert(&mut self, record: Record) -> StoreResult<RecordId> {
        self.shared.counters.inserts.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.shared.faults.insert_delay {
            tokio::time::sleep(delay).await;
        }

        let table = record.table();
        self.inserts += 1;

        if self.shared.faults.fail_on_table == Some(table) {
            return Err(StoreError::Rejected {
                table,
                reason: "injected failure".to_string(),
            });
        }
        if let Some(limit) = self.shared.faults.fail_after_inserts {
            if self.inserts > limit {
                return Err(StoreError::Unavailable(format!(
                    "injected failure after {} inserts",
                    limit
                )));
            }
        }

        let id = Uuid::new_v4().to_string();
        match record {
            Record::Bill(bill) => {
                if self.bill_number_taken(&bill.bill_number).await {
                    return Err(StoreError::Duplicate {
                        table,
                        field: "bill_number".to_string(),
                    });
                }
                self.staged.bills.push(Bill {
                    id: id.clone(),
                    bill_number: bill.bill_number,
                    total_amount_cents: bill.total_amount_cents,
                    total_discount_cents: bill.total_discount_cents,
                    created_at: bill.created_at,
                });
            }
            Record::BillItem(item) => {
                if !self.bill_exists(&item.bill_id).await {
                    return Err(StoreError::Rejected {
                        table,
                        reason: format!("unknown bill id {}", item.bill_id),
                    });
                }
                self.staged.bill_items.push(BillItem {
                    id: id.clone(),
                    bill_id: item.bill_id,
                    item_id: item.item_id,
                    item_name: item.item_name,
                    quantity: item.quantity,
                    effective_price_cents: item.effective_price_cents,
                    discount_applied_cents: item.discount_applied_cents,
                    subtotal_cents: item.subtotal_cents,
                    created_at: item.created_at,
                });
            }
            Record::Transaction(tx) => {
                self.staged.transactions.push(LegacyTransaction {
                    id: id.clone(),
                    item_name: tx.item_name,
                    quantity: tx.quantity,
                    effective_price_cents: tx.effective_price_cents,
                    discount_applied_cents: tx.discount_applied_cents,
                    subtotal_cents: tx.subtotal_cents,
                    created_at: tx.created_at,
                });
            }
        }

        debug!(table = %table, id = %id, "Staged record");
        Ok(id)
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let mut unit = self;

        if unit.shared.faults.fail_commit {
            return Err(StoreError::Unavailable("injected commit failure".to_string()));
        }

        let shared = Arc::clone(&unit.shared);
        let mut tables = shared.tables.lock().await;

        // Another unit may have committed the same number since insert
        for staged in &unit.staged.bills {
            if tables.bills.iter().any(|b| b.bill_number == staged.bill_number) {
                return Err(StoreError::Duplicate {
                    table: Table::Bills,
                    field: "bill_number".to_string(),
                });
            }
        }

        let staged = std::mem::take(&mut unit.staged);
        tables.bills.extend(staged.bills);
        tables.bill_items.extend(staged.bill_items);
        tables.transactions.extend(staged.transactions);

        unit.finished = true;
        shared.counters.commits.fetch_add(1, Ordering::SeqCst);
        drop(tables);

        if let Some(delay) = shared.faults.commit_ack_delay {
            tokio::time::sleep(delay).await;
        }
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> StoreResult<()> {
        let mut unit = self;
        unit.finished = true;
        unit.shared.counters.rollbacks.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl Drop for MemoryUnit {
    fn drop(&mut self) {
        if !self.finished {
            self.shared.counters.rollbacks.fetch_add(1, Ordering::SeqCst);
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
