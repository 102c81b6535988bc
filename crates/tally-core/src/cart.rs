//! # Cart Store
//!
//! The working set of lines for one till session.
//!
//! | Till action      | Method               | Effect on the line            |
//! |------------------|----------------------|-------------------------------|
//! | tap an item      | `add`                | new line, or quantity + 1     |
//! | type a quantity  | `update_quantity`    | quantity = max(n, 1)          |
//! | + / − buttons    | `increment` / `decrement` | quantity ± 1, never below 1 |
//! | trash icon       | `remove`             | line dropped                  |
//! | pay              | `snapshot`           | none, lines are copied        |
//!
//! ## Invariants
//! - At most one line per catalog item id
//! - Every line has `1 <= quantity <= MAX_ITEM_QUANTITY`
//! - `subtotal + discount_applied == base_price × quantity` on every line
//! - At most `MAX_CART_LINES` lines
//! - A rejected mutation leaves the cart untouched
//!
//! The cart is a plain value. Whoever owns it (the till's `Session`) gets
//! exclusive `&mut` access; there is no lock and no shared instance.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::pricing::{self, UnitPricing};
use crate::types::CatalogItem;
use crate::validation::{validate_cart_size, validate_quantity};
use crate::MAX_CART_LINES;

/// One entry per distinct catalog item. Name, category and per-unit pricing
/// are frozen on the first add; later quantity changes scale those figures
/// and never consult the catalog again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartLine {
    pub item_id: String,
    pub name: String,
    pub category: String,
    pub base_price: Money,
    pub discount_per_unit: Money,
    pub effective_unit_price: Money,
    pub quantity: i64,
    /// discount_per_unit × quantity
    pub discount_applied: Money,
    /// effective_unit_price × quantity
    pub subtotal: Money,
    #[ts(as = "String")]
    pub added_at: DateTime<Utc>,
}

impl CartLine {
    fn from_item(item: &CatalogItem, unit: UnitPricing) -> Self {
        CartLine {
            item_id: item.id.clone(),
            name: item.name.clone(),
            category: item.category.clone(),
            base_price: item.base_price(),
            discount_per_unit: unit.discount_per_unit,
            effective_unit_price: unit.effective_unit_price,
            quantity: 1,
            discount_applied: unit.discount(1),
            subtotal: unit.subtotal(1),
            added_at: Utc::now(),
        }
    }

    /// The per-unit pricing captured at add time.
    #[inline]
    pub fn unit_pricing(&self) -> UnitPricing {
        UnitPricing {
            effective_unit_price: self.effective_unit_price,
            discount_per_unit: self.discount_per_unit,
        }
    }

    fn set_quantity(&mut self, quantity: i64) {
        let unit = self.unit_pricing();
        self.quantity = quantity;
        self.discount_applied = unit.discount(quantity);
        self.subtotal = unit.subtotal(quantity);
    }
}

/// Aggregate figures for a set of lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartTotals {
    /// Σ subtotal (what the customer pays)
    pub total_amount: Money,
    /// Σ discount_applied
    pub total_discount: Money,
    /// Σ quantity
    pub total_item_count: i64,
    /// Number of distinct lines
    pub line_count: usize,
    /// total_amount + total_discount
    pub subtotal_before_discount: Money,
}

impl CartTotals {
    /// Sums the given lines.
    pub fn from_lines(lines: &[CartLine]) -> Self {
        let total_amount: Money = lines.iter().map(|l| l.subtotal).sum();
        let total_discount: Money = lines.iter().map(|l| l.discount_applied).sum();

        CartTotals {
            total_amount,
            total_discount,
            total_item_count: lines.iter().map(|l| l.quantity).sum(),
            line_count: lines.len(),
            subtotal_before_discount: total_amount + total_discount,
        }
    }
}

/// Immutable copy of a cart's lines, handed to the checkout committer.
///
/// Later cart mutations never reach a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartSnapshot {
    lines: Vec<CartLine>,
    #[ts(as = "String")]
    taken_at: DateTime<Utc>,
}

impl CartSnapshot {
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn totals(&self) -> CartTotals {
        CartTotals::from_lines(&self.lines)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn taken_at(&self) -> DateTime<Utc> {
        self.taken_at
    }
}

/// Insertion-ordered cart lines keyed by catalog item id.
#[derive(Debug, Clone)]
pub struct Cart {
    lines: Vec<CartLine>,
    created_at: DateTime<Utc>,
}

impl Cart {
    pub fn new() -> Self {
        Cart {
            lines: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// One more unit of `item`. A known id behaves like
    /// `update_quantity(id, qty + 1)`; a new one is priced and appended.
    ///
    /// ```rust
    /// use tally_core::{Cart, CatalogItem};
    ///
    /// let rice = CatalogItem::new("rice", "Basmati Rice", "Grains", 10000, 20.0).unwrap();
    /// let mut cart = Cart::new();
    ///
    /// cart.add(&rice).unwrap();
    /// let line = cart.add(&rice).unwrap();
    ///
    /// assert_eq!(line.quantity, 2);
    /// assert_eq!(line.subtotal.cents(), 16000);
    /// assert_eq!(line.discount_applied.cents(), 4000);
    /// ```
    pub fn add(&mut self, item: &CatalogItem) -> CoreResult<&CartLine> {
        item.validate()?;

        if let Some(idx) = self.position(&item.id) {
            let next = self.lines[idx].quantity + 1;
            return self.set_quantity_at(idx, next);
        }

        validate_cart_size(self.lines.len())
            .map_err(|_| CoreError::CartTooLarge { max: MAX_CART_LINES })?;

        let unit = pricing::compute(item.base_price(), item.discount_rate());
        let idx = self.lines.len();
        self.lines.push(CartLine::from_item(item, unit));
        Ok(&self.lines[idx])
    }

    /// Sets a line's quantity. Requests below 1 clamp to 1 (`remove` is how
    /// a line goes away); above `MAX_ITEM_QUANTITY` the request is refused
    /// and the line kept. Unknown ids give `ItemNotInCart`.
    pub fn update_quantity(&mut self, item_id: &str, new_quantity: i64) -> CoreResult<&CartLine> {
        let idx = self
            .position(item_id)
            .ok_or_else(|| CoreError::ItemNotInCart(item_id.to_string()))?;
        self.set_quantity_at(idx, new_quantity)
    }

    /// Adds one to an existing line.
    pub fn increment(&mut self, item_id: &str) -> CoreResult<&CartLine> {
        let current = self.quantity_of(item_id)?;
        self.update_quantity(item_id, current + 1)
    }

    /// Takes one off an existing line. A line at 1 stays at 1.
    pub fn decrement(&mut self, item_id: &str) -> CoreResult<&CartLine> {
        let current = self.quantity_of(item_id)?;
        self.update_quantity(item_id, current - 1)
    }

    /// Drops a line. Returns whether anything was removed.
    pub fn remove(&mut self, item_id: &str) -> bool {
        match self.position(item_id) {
            Some(idx) => {
                self.lines.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Freshly summed totals; nothing is cached.
    pub fn totals(&self) -> CartTotals {
        CartTotals::from_lines(&self.lines)
    }

    /// Copies the current lines for checkout.
    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot {
            lines: self.lines.clone(),
            taken_at: Utc::now(),
        }
    }

    /// Empties the cart and restarts its `created_at` clock.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.created_at = Utc::now();
    }

    pub fn get(&self, item_id: &str) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.item_id == item_id)
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// When the cart was created or last cleared.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn position(&self, item_id: &str) -> Option<usize> {
        self.lines.iter().position(|l| l.item_id == item_id)
    }

    fn quantity_of(&self, item_id: &str) -> CoreResult<i64> {
        self.get(item_id)
            .map(|l| l.quantity)
            .ok_or_else(|| CoreError::ItemNotInCart(item_id.to_string()))
    }

    fn set_quantity_at(&mut self, idx: usize, requested: i64) -> CoreResult<&CartLine> {
        let quantity = requested.max(1);
        validate_quantity(quantity)?;

        self.lines[idx].set_quantity(quantity);
        Ok(&self.lines[idx])
    }
}

impl Default for Cart {
    fn default() -> Self {
        Self::new()
    }
}
