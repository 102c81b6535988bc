//! # tally-db
//!
//! SQLite persistence for the till, on sqlx.
//!
//! | Piece                 | Reads / writes                                  |
//! |-----------------------|-------------------------------------------------|
//! | [`CatalogRepository`] | `catalog_items`: tabs, search, seeding          |
//! | [`BillRepository`]    | `bills`, `bill_items`, `transactions`: reprints |
//! | [`SqliteRecordStore`] | all three bill tables, one transaction per sale |
//! | [`migrations`]        | schema, embedded at compile time                |
//!
//! Everything hangs off one [`Database`], a cheap-to-clone pool handle.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tally_checkout::CheckoutCommitter;
//! use tally_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::file("path/to/tally.db")).await?;
//!
//! let rice = db.catalog().search("rice", "All").await?;
//! let committer = CheckoutCommitter::new(Arc::new(db.record_store()));
//! ```

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod seed;
pub mod store;

pub use error::{Constraint, DbError, DbResult};
pub use migrations::MigrationStatus;
pub use pool::{Database, DbConfig, DbLocation};
pub use store::SqliteRecordStore;

pub use repository::bill::BillRepository;
pub use repository::catalog::CatalogRepository;
