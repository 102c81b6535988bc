//! # Till Commands
//!
//! The command layer between a front end and the engine. Each command takes
//! the pieces of state it needs and returns a serializable response or an
//! [`ApiError`].
//!
//! ## Command Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Catalog            Cart                      Bills                     │
//! │  ───────            ────                      ─────                     │
//! │  list_catalog       get_cart                  checkout                  │
//! │  list_categories    add_to_cart               reprint_receipt           │
//! │                     update_cart_item                                    │
//! │                     increment_cart_item                                 │
//! │                     decrement_cart_item                                 │
//! │                     remove_from_cart                                    │
//! │                     clear_cart                                          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All amounts in responses are integer minor units; the front end formats
//! them with [`AppConfig::format_currency`].

use serde::{Deserialize, Serialize};
use tracing::debug;

use tally_core::validation::validate_search_query;
use tally_core::{catalog, Cart, CartLine, CartTotals, CatalogItem, Receipt, ReceiptLine};
use tally_db::Database;

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::session::Session;

// =============================================================================
// Response Types
// =============================================================================

/// A catalog entry as the item grid shows it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItemDto {
    pub id: String,
    pub name: String,
    pub category: String,
    pub base_price_cents: i64,
    pub effective_price_cents: i64,
    /// Discount percentage for the "% OFF" badge (e.g. 12.5)
    pub discount_percentage: f64,
}

impl From<&CatalogItem> for CatalogItemDto {
    fn from(item: &CatalogItem) -> Self {
        let pricing = tally_core::pricing::compute(item.base_price(), item.discount_rate());
        CatalogItemDto {
            id: item.id.clone(),
            name: item.name.clone(),
            category: item.category.clone(),
            base_price_cents: item.base_price_cents,
            effective_price_cents: pricing.effective_unit_price.cents(),
            discount_percentage: item.discount_rate().percentage(),
        }
    }
}

/// One cart line.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineDto {
    pub item_id: String,
    pub name: String,
    pub category: String,
    pub quantity: i64,
    pub base_price_cents: i64,
    pub effective_unit_price_cents: i64,
    pub discount_per_unit_cents: i64,
    pub discount_applied_cents: i64,
    pub subtotal_cents: i64,
}

impl From<&CartLine> for CartLineDto {
    fn from(line: &CartLine) -> Self {
        CartLineDto {
            item_id: line.item_id.clone(),
            name: line.name.clone(),
            category: line.category.clone(),
            quantity: line.quantity,
            base_price_cents: line.base_price.cents(),
            effective_unit_price_cents: line.effective_unit_price.cents(),
            discount_per_unit_cents: line.discount_per_unit.cents(),
            discount_applied_cents: line.discount_applied.cents(),
            subtotal_cents: line.subtotal.cents(),
        }
    }
}

/// Aggregate cart figures.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartTotalsDto {
    pub total_amount_cents: i64,
    pub total_discount_cents: i64,
    pub subtotal_before_discount_cents: i64,
    pub total_item_count: i64,
    pub line_count: usize,
}

impl From<CartTotals> for CartTotalsDto {
    fn from(totals: CartTotals) -> Self {
        CartTotalsDto {
            total_amount_cents: totals.total_amount.cents(),
            total_discount_cents: totals.total_discount.cents(),
            subtotal_before_discount_cents: totals.subtotal_before_discount.cents(),
            total_item_count: totals.total_item_count,
            line_count: totals.line_count,
        }
    }
}

/// Cart response including lines and totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub lines: Vec<CartLineDto>,
    pub totals: CartTotalsDto,
}

impl From<&Cart> for CartResponse {
    fn from(cart: &Cart) -> Self {
        CartResponse {
            lines: cart.lines().iter().map(CartLineDto::from).collect(),
            totals: cart.totals().into(),
        }
    }
}

/// One printed receipt line: "qty × effective price", discount, subtotal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptLineDto {
    pub name: String,
    pub quantity: i64,
    pub effective_unit_price_cents: i64,
    pub discount_applied_cents: i64,
    pub subtotal_cents: i64,
}

impl From<&ReceiptLine> for ReceiptLineDto {
    fn from(line: &ReceiptLine) -> Self {
        ReceiptLineDto {
            name: line.name.clone(),
            quantity: line.quantity,
            effective_unit_price_cents: line.effective_unit_price.cents(),
            discount_applied_cents: line.discount_applied.cents(),
            subtotal_cents: line.subtotal.cents(),
        }
    }
}

/// Everything the receipt printer needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptResponse {
    pub bill_number: String,
    pub store_name: String,
    /// RFC 3339, UTC
    pub timestamp: String,
    pub lines: Vec<ReceiptLineDto>,
    pub subtotal_before_discount: i64,
    pub total_discount: i64,
    pub total_amount: i64,
}

impl ReceiptResponse {
    pub fn new(receipt: &Receipt, config: &AppConfig) -> Self {
        ReceiptResponse {
            bill_number: receipt.bill_number.to_string(),
            store_name: config.store_name.clone(),
            timestamp: receipt.issued_at.to_rfc3339(),
            lines: receipt.lines.iter().map(ReceiptLineDto::from).collect(),
            subtotal_before_discount: receipt.subtotal_before_discount.cents(),
            total_discount: receipt.total_discount.cents(),
            total_amount: receipt.total_amount.cents(),
        }
    }
}

// =============================================================================
// Catalog Commands
// =============================================================================

/// Catalog items matching a name query within a category tab.
///
/// An empty query lists the whole tab; `"All"` is every category. Names are
/// matched with full Unicode case folding, so "éclair" finds "Éclair".
pub async fn list_catalog(
    db: &Database,
    query: &str,
    category: &str,
) -> Result<Vec<CatalogItemDto>, ApiError> {
    debug!(query = %query, category = %category, "list_catalog command");

    let query = validate_search_query(query)?;
    let items = db.catalog().list_all().await?;
    Ok(catalog::filter_items(&items, &query, category)
        .into_iter()
        .map(CatalogItemDto::from)
        .collect())
}

/// Category tabs, "All" first, then alphabetical.
pub async fn list_categories(db: &Database) -> Result<Vec<String>, ApiError> {
    debug!("list_categories command");
    let items = db.catalog().list_all().await?;
    Ok(catalog::categories(&items))
}

// =============================================================================
// Cart Commands
// =============================================================================

/// Gets the current cart contents.
pub fn get_cart(session: &Session) -> CartResponse {
    CartResponse::from(session.cart())
}

/// Adds one unit of a catalog item to the cart.
///
/// ## Behavior
/// - Item already in cart: quantity increases by one
/// - Item not in cart: added as a new line, priced at the current catalog price
pub async fn add_to_cart(
    db: &Database,
    session: &mut Session,
    item_id: &str,
) -> Result<CartResponse, ApiError> {
    debug!(item_id = %item_id, "add_to_cart command");

    let item = db
        .catalog()
        .get_by_id(item_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Item", item_id))?;

    session.add(&item)?;
    Ok(get_cart(session))
}

/// Sets the quantity of a line. Quantities below 1 are raised to 1.
pub fn update_cart_item(
    session: &mut Session,
    item_id: &str,
    quantity: i64,
) -> Result<CartResponse, ApiError> {
    debug!(item_id = %item_id, quantity, "update_cart_item command");

    session.update_quantity(item_id, quantity)?;
    Ok(get_cart(session))
}

pub fn increment_cart_item(session: &mut Session, item_id: &str) -> Result<CartResponse, ApiError> {
    session.increment(item_id)?;
    Ok(get_cart(session))
}

/// Never drops a line below quantity 1; use `remove_from_cart` for that.
pub fn decrement_cart_item(session: &mut Session, item_id: &str) -> Result<CartResponse, ApiError> {
    session.decrement(item_id)?;
    Ok(get_cart(session))
}

/// Removes a line. Removing an absent item is not an error.
pub fn remove_from_cart(session: &mut Session, item_id: &str) -> CartResponse {
    debug!(item_id = %item_id, "remove_from_cart command");
    session.remove(item_id);
    get_cart(session)
}

/// Clears all lines from the cart.
pub fn clear_cart(session: &mut Session) -> CartResponse {
    debug!("clear_cart command");
    session.clear();
    get_cart(session)
}

// =============================================================================
// Bill Commands
// =============================================================================

/// Commits the cart and returns the receipt.
///
/// The cart is cleared only when the bill was saved.
pub async fn checkout(session: &mut Session, config: &AppConfig) -> Result<ReceiptResponse, ApiError> {
    debug!(lines = session.cart().len(), "checkout command");

    let receipt = session.checkout().await?;
    Ok(ReceiptResponse::new(&receipt, config))
}

/// Rebuilds the receipt of an earlier bill.
pub async fn reprint_receipt(
    db: &Database,
    config: &AppConfig,
    bill_number: &str,
) -> Result<ReceiptResponse, ApiError> {
    debug!(bill_number = %bill_number, "reprint_receipt command");

    let receipt = db.bills().receipt(bill_number).await?;
    Ok(ReceiptResponse::new(&receipt, config))
}
