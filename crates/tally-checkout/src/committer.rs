//! # Checkout Committer
//!
//! Persists a cart snapshot as one bill, its items and their legacy
//! mirror rows, all inside a single unit of work.
//!
//! ## Commit Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  checkout(snapshot)                                                     │
//! │       │                                                                 │
//! │       ├── empty? ──────────────────────────► Err(EmptyCart)             │
//! │       │                                      (store never touched)      │
//! │       ▼                                                                 │
//! │  ┌─ attempt n: stage (bounded by config.timeout) ────────────────────┐  │
//! │  │  bill_number = generator.next_number()                           │  │
//! │  │  unit = store.begin()                                            │  │
//! │  │  bill_id = unit.insert(Bill)                                     │  │
//! │  │  unit.insert_many(BillItem × N, bill_id)                         │  │
//! │  │  unit.insert_many(Transaction × N)                               │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │       ├── timeout ─────────────────────────► Err(Persistence(TimedOut)) │
//! │       ▼                                                                 │
//! │  ┌─ commit (bounded by config.commit_timeout) ───────────────────────┐  │
//! │  │  unit.commit()                                                   │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │       ├── Ok ──────────────────────────────► Ok(bill_number)            │
//! │       ├── timeout ─────────────────────────► Err(OutcomeUnknown)        │
//! │       ├── duplicate bill_number, n < max ──► attempt n + 1              │
//! │       └── any other failure ───────────────► Err(Persistence(..))       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every failure while staging rolls the unit back, explicitly or by
//! dropping it. Once `commit()` has been sent the committer cannot take it
//! back, so a late acknowledgement is reported as `OutcomeUnknown` and
//! never retried under a fresh bill number.
//! The committer never touches the cart; the session clears it on success.

use chrono::Utc;
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use tally_core::{BillNumber, CartSnapshot};

use crate::bill_number::{BillNumberGenerator, TimestampUuidGenerator};
use crate::config::CheckoutConfig;
use crate::error::{CheckoutError, CheckoutResult, StoreError, StoreResult};
use crate::store::{NewBill, NewBillItem, NewTransaction, Record, RecordStore, UnitOfWork};

/// Commits cart snapshots to a [`RecordStore`].
///
/// Cheap to clone; clones share the store and the generator, so many
/// sessions can check out concurrently.
pub struct CheckoutCommitter<S: ?Sized> {
    store: Arc<S>,
    numbers: Arc<dyn BillNumberGenerator>,
    config: CheckoutConfig,
}

impl<S: ?Sized> Clone for CheckoutCommitter<S> {
    fn clone(&self) -> Self {
        CheckoutCommitter {
            store: Arc::clone(&self.store),
            numbers: Arc::clone(&self.numbers),
            config: self.config,
        }
    }
}

impl<S: RecordStore + ?Sized> CheckoutCommitter<S> {
    /// Creates a committer with the default generator and configuration.
    pub fn new(store: Arc<S>) -> Self {
        CheckoutCommitter {
            store,
            numbers: Arc::new(TimestampUuidGenerator),
            config: CheckoutConfig::default(),
        }
    }

    pub fn with_generator(mut self, numbers: Arc<dyn BillNumberGenerator>) -> Self {
        self.numbers = numbers;
        self
    }

    pub fn with_config(mut self, config: CheckoutConfig) -> Self {
        self.config = config;
        self
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn config(&self) -> &CheckoutConfig {
        &self.config
    }

    /// Commits `snapshot` and returns the bill number printed on the receipt.
    ///
    /// ## Errors
    /// - `EmptyCart` when the snapshot has no lines (no store calls)
    /// - `Persistence(TimedOut)` when staging an attempt exceeds `timeout`
    /// - `OutcomeUnknown` when `commit()` does not answer within
    ///   `commit_timeout`; the bill may be saved under the returned number
    /// - `Persistence(Duplicate)` when every attempt collided on bill number
    /// - `Persistence(..)` for any other store failure
    pub async fn checkout(&self, snapshot: &CartSnapshot) -> CheckoutResult<BillNumber> {
        if snapshot.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            let bill_number = self.numbers.next_number();
            debug!(bill_number = %bill_number, attempt, lines = snapshot.len(), "Checkout attempt");

            let staged = timeout(self.config.timeout, self.stage(snapshot, &bill_number)).await;
            let result = match staged {
                Ok(Ok(unit)) => match timeout(self.config.commit_timeout, unit.commit()).await {
                    Ok(committed) => committed,
                    Err(_) => {
                        error!(
                            bill_number = %bill_number,
                            after = ?self.config.commit_timeout,
                            "Commit not acknowledged, bill may be saved"
                        );
                        return Err(CheckoutError::OutcomeUnknown {
                            bill_number,
                            after: self.config.commit_timeout,
                        });
                    }
                },
                Ok(Err(err)) => Err(err),
                Err(_) => {
                    warn!(
                        bill_number = %bill_number,
                        after = ?self.config.timeout,
                        "Checkout timed out, unit of work dropped"
                    );
                    return Err(StoreError::TimedOut {
                        after: self.config.timeout,
                    }
                    .into());
                }
            };

            match result {
                Ok(()) => {
                    let totals = snapshot.totals();
                    info!(
                        bill_number = %bill_number,
                        lines = snapshot.len(),
                        total_cents = totals.total_amount.cents(),
                        discount_cents = totals.total_discount.cents(),
                        "Bill committed"
                    );
                    return Ok(bill_number);
                }
                Err(err) if err.is_bill_number_collision() && attempt < max_attempts => {
                    warn!(bill_number = %bill_number, attempt, "Bill number collision, retrying");
                    attempt += 1;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Opens a unit and writes the whole bill into it, rolling back on
    /// failure. The returned unit is ready to commit.
    async fn stage(
        &self,
        snapshot: &CartSnapshot,
        bill_number: &BillNumber,
    ) -> StoreResult<Box<dyn UnitOfWork>> {
        let mut unit = self.store.begin().await?;

        match write_bill(unit.as_mut(), snapshot, bill_number).await {
            Ok(()) => Ok(unit),
            Err(err) => {
                warn!(bill_number = %bill_number, error = %err, "Rolling back checkout");
                if let Err(rollback_err) = unit.rollback().await {
                    warn!(error = %rollback_err, "Rollback failed");
                }
                Err(err)
            }
        }
    }
}

/// Writes header, items and mirrors into an open unit.
async fn write_bill(
    unit: &mut dyn UnitOfWork,
    snapshot: &CartSnapshot,
    bill_number: &BillNumber,
) -> StoreResult<()> {
    let totals = snapshot.totals();
    let created_at = Utc::now();

    let bill_id = unit
        .insert(Record::Bill(NewBill {
            bill_number: bill_number.clone(),
            total_amount_cents: totals.total_amount.cents(),
            total_discount_cents: totals.total_discount.cents(),
            created_at,
        }))
        .await?;
    debug!(bill_id = %bill_id, bill_number = %bill_number, "Bill header written");

    let items = snapshot
        .lines()
        .iter()
        .map(|line| {
            Record::BillItem(NewBillItem {
                bill_id: bill_id.clone(),
                item_id: line.item_id.clone(),
                item_name: line.name.clone(),
                quantity: line.quantity,
                effective_price_cents: line.effective_unit_price.cents(),
                discount_applied_cents: line.discount_applied.cents(),
                subtotal_cents: line.subtotal.cents(),
                created_at,
            })
        })
        .collect();
    let item_ids = unit.insert_many(items).await?;
    debug!(bill_id = %bill_id, count = item_ids.len(), "Bill items written");

    let mirrors = snapshot
        .lines()
        .iter()
        .map(|line| {
            Record::Transaction(NewTransaction {
                item_name: line.name.clone(),
                quantity: line.quantity,
                effective_price_cents: line.effective_unit_price.cents(),
                discount_applied_cents: line.discount_applied.cents(),
                subtotal_cents: line.subtotal.cents(),
                created_at,
            })
        })
        .collect();
    unit.insert_many(mirrors).await?;
    debug!(bill_id = %bill_id, "Legacy transactions written");

    Ok(())
}
