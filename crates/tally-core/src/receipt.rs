//! # Receipt Model
//!
//! The data a receipt shows, assembled either from the snapshot that was
//! just committed or from a stored bill (reprint).
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │  Bill No: BILL-20260101120000-1a2b3c │
//! │  01 Jan 2026, 12:00                  │
//! │  ──────────────────────────────────  │
//! │  Basmati Rice 5kg                    │
//! │    2 × 80.00             160.00      │
//! │    Discount              -40.00      │
//! │  ──────────────────────────────────  │
//! │  Subtotal                200.00      │
//! │  Total Discount          -40.00      │
//! │  Grand Total             160.00      │
//! └──────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::CartSnapshot;
use crate::money::Money;
use crate::types::{Bill, BillItem, BillNumber};

/// One printed line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReceiptLine {
    pub name: String,
    pub quantity: i64,
    pub effective_unit_price: Money,
    pub discount_applied: Money,
    pub subtotal: Money,
}

/// A complete receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Receipt {
    pub bill_number: BillNumber,
    #[ts(as = "String")]
    pub issued_at: DateTime<Utc>,
    pub lines: Vec<ReceiptLine>,
    /// total_amount + total_discount
    pub subtotal_before_discount: Money,
    pub total_discount: Money,
    /// Grand total
    pub total_amount: Money,
}

impl Receipt {
    /// Builds the receipt for a snapshot that was just committed.
    pub fn from_snapshot(bill_number: BillNumber, snapshot: &CartSnapshot, issued_at: DateTime<Utc>) -> Self {
        let totals = snapshot.totals();
        let lines = snapshot
            .lines()
            .iter()
            .map(|l| ReceiptLine {
                name: l.name.clone(),
                quantity: l.quantity,
                effective_unit_price: l.effective_unit_price,
                discount_applied: l.discount_applied,
                subtotal: l.subtotal,
            })
            .collect();

        Receipt {
            bill_number,
            issued_at,
            lines,
            subtotal_before_discount: totals.subtotal_before_discount,
            total_discount: totals.total_discount,
            total_amount: totals.total_amount,
        }
    }

    /// Rebuilds a receipt from stored rows.
    ///
    /// Totals come from the bill header, not from re-summing the items.
    pub fn from_bill(bill: &Bill, items: &[BillItem]) -> Self {
        let lines = items
            .iter()
            .map(|i| ReceiptLine {
                name: i.item_name.clone(),
                quantity: i.quantity,
                effective_unit_price: Money::from_cents(i.effective_price_cents),
                discount_applied: i.discount_applied(),
                subtotal: i.subtotal(),
            })
            .collect();

        Receipt {
            bill_number: bill.bill_number.clone(),
            issued_at: bill.created_at,
            lines,
            subtotal_before_discount: bill.total_amount() + bill.total_discount(),
            total_discount: bill.total_discount(),
            total_amount: bill.total_amount(),
        }
    }

    /// Σ quantity across lines.
    pub fn item_count(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }
}
