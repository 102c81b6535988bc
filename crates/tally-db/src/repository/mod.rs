//! # Repository Module
//!
//! Database repository implementations for Tally POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Till command                                                          │
//! │       │                                                                 │
//! │       │  db.catalog().search("rice", "All")                            │
//! │       ▼                                                                 │
//! │  CatalogRepository                  BillRepository                      │
//! │  ├── list_all()                     ├── get_by_number(number)           │
//! │  ├── get_by_id(id)                  ├── get_items(bill_id)              │
//! │  ├── search(query, category)        ├── receipt(number)                 │
//! │  ├── categories()                   ├── list_recent(limit)              │
//! │  ├── insert(item)                   ├── count()                         │
//! │  └── count()                        └── legacy_transactions(limit)      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Bills are only ever written through [`crate::SqliteRecordStore`]; the
//! bill repository is read-only.
//!
//! ## Available Repositories
//!
//! - [`CatalogRepository`](catalog::CatalogRepository) - Catalog listing and search
//! - [`BillRepository`](bill::BillRepository) - Bill lookup and reporting

pub mod bill;
pub mod catalog;
