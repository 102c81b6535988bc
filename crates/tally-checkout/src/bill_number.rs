//! # Bill Numbers
//!
//! ```text
//!   BILL-20260312143005-9f86d081
//!        └─────┬──────┘ └──┬───┘
//!        UTC timestamp   8 hex chars of a v4 UUID
//! ```
//!
//! The timestamp keeps numbers sortable and readable on a receipt; the UUID
//! suffix makes two tills committing in the same second practically never
//! collide. The store's UNIQUE constraint catches the rest and the
//! committer retries with a fresh number.

use chrono::Utc;
use std::sync::atomic::{AtomicUsize, Ordering};
use uuid::Uuid;

use tally_core::BillNumber;

/// Source of bill numbers for the committer.
pub trait BillNumberGenerator: Send + Sync {
    fn next_number(&self) -> BillNumber;
}

/// Default generator: `BILL-<yyyymmddHHMMSS>-<8 hex>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimestampUuidGenerator;

impl BillNumberGenerator for TimestampUuidGenerator {
    fn next_number(&self) -> BillNumber {
        let suffix = Uuid::new_v4().simple().to_string();
        BillNumber::new(format!(
            "BILL-{}-{}",
            Utc::now().format("%Y%m%d%H%M%S"),
            &suffix[..8]
        ))
    }
}

/// Hands out a fixed list of numbers, then falls back to
/// [`TimestampUuidGenerator`]. Used to reproduce collisions.
#[derive(Debug, Default)]
pub struct SequenceGenerator {
    numbers: Vec<BillNumber>,
    next: AtomicUsize,
}

impl SequenceGenerator {
    pub fn new<I, T>(numbers: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        SequenceGenerator {
            numbers: numbers.into_iter().map(|n| BillNumber::new(n)).collect(),
            next: AtomicUsize::new(0),
        }
    }
}

impl BillNumberGenerator for SequenceGenerator {
    fn next_number(&self) -> BillNumber {
        let idx = self.next.fetch_add(1, Ordering::Relaxed);
        self.numbers
            .get(idx)
            .cloned()
            .unwrap_or_else(|| TimestampUuidGenerator.next_number())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_timestamp_uuid_format() {
        let number = TimestampUuidGenerator.next_number();
        let parts: Vec<&str> = number.as_str().split('-').collect();

        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "BILL");
        assert_eq!(parts[1].len(), 14);
        assert!(parts[1].chars().all(|c| c.is_ascii_digit()));
        assert_eq!(parts[2].len(), 8);
        assert!(parts[2].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_same_second_numbers_differ() {
        let numbers: HashSet<_> = (0..1000).map(|_| TimestampUuidGenerator.next_number()).collect();
        assert_eq!(numbers.len(), 1000);
    }

    #[test]
    fn test_sequence_then_fallback() {
        let generator = SequenceGenerator::new(["BILL-A", "BILL-B"]);
        assert_eq!(generator.next_number().as_str(), "BILL-A");
        assert_eq!(generator.next_number().as_str(), "BILL-B");
        assert!(generator.next_number().as_str().starts_with("BILL-2"));
    }
}
