//! # Till Session
//!
//! One cashier's working state: an owned cart plus a handle to the shared
//! checkout committer.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  session.checkout()                                                     │
//! │       │                                                                 │
//! │       ├── cart.snapshot()           detached copy of lines              │
//! │       ├── committer.checkout(snap)  one unit of work                    │
//! │       │        │                                                        │
//! │       │        ├── Ok(bill_number) ──► Receipt::from_snapshot           │
//! │       │        │                       cart.clear()                     │
//! │       │        └── Err(..) ──────────► cart untouched                   │
//! │       ▼                                                                 │
//! │  Receipt                                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Sessions never share a cart. Many sessions can share one committer
//! (and so one store); the committer is cheap to clone.

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};

use tally_checkout::{CheckoutCommitter, CheckoutResult, RecordStore};
use tally_core::{Cart, CartLine, CartTotals, CatalogItem, CoreResult, Receipt};

/// A till session owning its cart.
pub struct Session {
    cart: Cart,
    committer: CheckoutCommitter<dyn RecordStore>,
}

impl Session {
    /// Starts a session with an empty cart.
    pub fn new(committer: CheckoutCommitter<dyn RecordStore>) -> Self {
        Session {
            cart: Cart::new(),
            committer,
        }
    }

    /// Starts a session over `store` with a default committer.
    pub fn with_store(store: Arc<dyn RecordStore>) -> Self {
        Session::new(CheckoutCommitter::new(store))
    }

    /// Read access for rendering.
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn totals(&self) -> CartTotals {
        self.cart.totals()
    }

    pub fn committer(&self) -> &CheckoutCommitter<dyn RecordStore> {
        &self.committer
    }

    /// Adds one unit of `item`.
    pub fn add(&mut self, item: &CatalogItem) -> CoreResult<&CartLine> {
        let line = self.cart.add(item)?;
        debug!(item_id = %line.item_id, quantity = line.quantity, "Added to cart");
        Ok(line)
    }

    /// Sets a line's quantity (values below 1 become 1).
    pub fn update_quantity(&mut self, item_id: &str, quantity: i64) -> CoreResult<&CartLine> {
        let line = self.cart.update_quantity(item_id, quantity)?;
        debug!(item_id = %item_id, quantity = line.quantity, "Quantity updated");
        Ok(line)
    }

    pub fn increment(&mut self, item_id: &str) -> CoreResult<&CartLine> {
        let line = self.cart.increment(item_id)?;
        debug!(item_id = %item_id, quantity = line.quantity, "Quantity incremented");
        Ok(line)
    }

    pub fn decrement(&mut self, item_id: &str) -> CoreResult<&CartLine> {
        let line = self.cart.decrement(item_id)?;
        debug!(item_id = %item_id, quantity = line.quantity, "Quantity decremented");
        Ok(line)
    }

    /// Removes a line. Returns whether anything was removed.
    pub fn remove(&mut self, item_id: &str) -> bool {
        let removed = self.cart.remove(item_id);
        debug!(item_id = %item_id, removed, "Remove from cart");
        removed
    }

    pub fn clear(&mut self) {
        debug!(lines = self.cart.len(), "Cart cleared");
        self.cart.clear();
    }

    /// Commits the cart as a bill.
    ///
    /// On success the cart is emptied and the receipt returned. On any
    /// error the cart is left exactly as it was.
    pub async fn checkout(&mut self) -> CheckoutResult<Receipt> {
        let snapshot = self.cart.snapshot();
        let bill_number = self.committer.checkout(&snapshot).await?;

        let receipt = Receipt::from_snapshot(bill_number, &snapshot, Utc::now());
        self.cart.clear();

        info!(
            bill_number = %receipt.bill_number,
            lines = receipt.lines.len(),
            "Checkout complete, cart cleared"
        );
        Ok(receipt)
    }
}
