//! # tally-core
//!
//! Pricing and cart rules for the till, with no I/O of any kind. Storage
//! and the checkout protocol sit on top in `tally-checkout` and `tally-db`;
//! this crate only ever hands them a [`CartSnapshot`].
//!
//! ```text
//!   CatalogItem ──► pricing::compute ──► Cart ──► CartSnapshot ──► (checkout)
//!                                          │
//!                                          └──► CartTotals
//!   Bill + BillItems ──► Receipt  (reprint path)
//! ```
//!
//! - [`money`]: integer minor units
//! - [`types`]: catalog, bill and discount types
//! - [`pricing`]: one discount per unit, identity kept exact
//! - [`cart`]: lines, quantities, limits
//! - [`catalog`]: tab and search filtering over loaded items
//! - [`receipt`]: what gets printed
//! - [`validation`] and [`error`]
//!
//! ## Example Usage
//!
//! ```rust
//! use tally_core::{Cart, CatalogItem};
//!
//! let rice = CatalogItem::new("rice", "Basmati Rice 5kg", "Grains", 10000, 20.0).unwrap();
//!
//! let mut cart = Cart::new();
//! cart.add(&rice).unwrap();
//! cart.add(&rice).unwrap();
//!
//! let totals = cart.totals();
//! assert_eq!(totals.total_amount.cents(), 16000);
//! assert_eq!(totals.total_discount.cents(), 4000);
//! ```

pub mod cart;
pub mod catalog;
pub mod error;
pub mod money;
pub mod pricing;
pub mod receipt;
pub mod types;
pub mod validation;

pub use cart::{Cart, CartLine, CartSnapshot, CartTotals};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use pricing::UnitPricing;
pub use receipt::{Receipt, ReceiptLine};
pub use types::*;

/// Distinct lines a cart may hold; bounds the writes one checkout makes.
pub const MAX_CART_LINES: usize = 100;

/// Largest quantity on one line. Guards against a slipped extra digit.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Highest catalog price in minor units. A full cart of lines at this price
/// and `MAX_ITEM_QUANTITY` still totals well inside `i64`.
pub const MAX_PRICE_CENTS: i64 = 10_000_000_000_000;
