//! # tally-checkout: Checkout Commit Protocol for Tally POS
//!
//! Commits a [`tally_core::CartSnapshot`] as one bill header, one bill item
//! per line and one legacy transaction per line, atomically.
//!
//! ## Module Organization
//! - [`store`] - `RecordStore` / `UnitOfWork` traits and record types
//! - [`committer`] - `CheckoutCommitter` (timeout, collision retry)
//! - [`bill_number`] - Bill number generators
//! - [`memory`] - In-memory store with fault injection
//! - [`config`] - `CheckoutConfig`
//! - [`error`] - `StoreError`, `CheckoutError`
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use tally_checkout::{CheckoutCommitter, MemoryRecordStore};
//! use tally_core::{Cart, CatalogItem};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let store = Arc::new(MemoryRecordStore::new());
//! let committer = CheckoutCommitter::new(Arc::clone(&store));
//!
//! let mut cart = Cart::new();
//! cart.add(&CatalogItem::new("rice", "Basmati Rice", "Grains", 10000, 20.0).unwrap()).unwrap();
//!
//! let bill_number = committer.checkout(&cart.snapshot()).await.unwrap();
//! assert!(bill_number.as_str().starts_with("BILL-"));
//! assert_eq!(store.bills().await.len(), 1);
//! # });
//! ```

pub mod bill_number;
pub mod committer;
pub mod config;
pub mod error;
pub mod memory;
pub mod store;

pub use bill_number::{BillNumberGenerator, SequenceGenerator, TimestampUuidGenerator};
pub use committer::CheckoutCommitter;
pub use config::CheckoutConfig;
pub use error::{CheckoutError, CheckoutResult, StoreError, StoreResult};
pub use memory::{FaultPlan, MemoryRecordStore};
pub use store::{NewBill, NewBillItem, NewTransaction, Record, RecordId, RecordStore, Table, UnitOfWork};
