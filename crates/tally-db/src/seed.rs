//! # Grocery Catalog Seed
//!
//! A small grocery catalog for development and demos, shared by the
//! `seed` binary and the till's `--seed` flag.
//!
//! Prices are in paise and discounts in percent. A handful of items carry
//! no discount so the till shows both cases.

use tracing::{info, warn};

use tally_core::CatalogItem;

use crate::error::DbResult;
use crate::pool::Database;

/// (category, [(id, name, base price in paise, discount %)])
const CATALOG: &[(&str, &[(&str, &str, i64, f64)])] = &[
    (
        "Dairy",
        &[
            ("dairy-milk-1l", "Toned Milk 1L", 5_400, 0.0),
            ("dairy-curd-400", "Fresh Curd 400g", 3_500, 5.0),
            ("dairy-paneer-200", "Paneer 200g", 9_000, 10.0),
            ("dairy-butter-100", "Salted Butter 100g", 5_600, 0.0),
            ("dairy-ghee-500", "Cow Ghee 500ml", 36_500, 12.5),
        ],
    ),
    (
        "Grains",
        &[
            ("grain-rice-5kg", "Basmati Rice 5kg", 60_000, 10.0),
            ("grain-atta-5kg", "Whole Wheat Atta 5kg", 32_000, 0.0),
            ("grain-dal-1kg", "Toor Dal 1kg", 16_500, 8.0),
            ("grain-poha-500", "Thick Poha 500g", 4_800, 0.0),
        ],
    ),
    (
        "Beverages",
        &[
            ("bev-tea-250", "Assam Tea 250g", 14_000, 15.0),
            ("bev-coffee-100", "Filter Coffee 100g", 11_500, 5.0),
            ("bev-juice-1l", "Mixed Fruit Juice 1L", 9_900, 20.0),
            ("bev-water-1l", "Mineral Water 1L", 2_000, 0.0),
        ],
    ),
    (
        "Snacks",
        &[
            ("snk-chips-50", "Salted Chips 50g", 2_000, 0.0),
            ("snk-biscuit-200", "Glucose Biscuits 200g", 3_000, 10.0),
            ("snk-namkeen-400", "Bhujia 400g", 10_500, 25.0),
        ],
    ),
    (
        "Household",
        &[
            ("hh-soap-4", "Bath Soap (4 pack)", 18_000, 33.0),
            ("hh-detergent-1kg", "Detergent Powder 1kg", 12_500, 0.0),
            ("hh-dishwash-500", "Dishwash Liquid 500ml", 11_000, 15.0),
        ],
    ),
];

/// Every seed item, validated. Entries that fail validation are skipped.
pub fn grocery_catalog() -> Vec<CatalogItem> {
    let mut items = Vec::new();

    for (category, entries) in CATALOG {
        for (id, name, price, discount) in entries.iter() {
            match CatalogItem::new(*id, *name, *category, *price, *discount) {
                Ok(item) => items.push(item),
                Err(e) => warn!(id = %id, error = %e, "Skipping invalid seed item"),
            }
        }
    }

    items
}

/// Inserts the grocery catalog unless the catalog already has items.
///
/// Returns the number of items inserted (0 when skipped).
pub async fn seed_catalog(db: &Database) -> DbResult<usize> {
    let existing = db.catalog().count().await?;
    if existing > 0 {
        info!(existing, "Catalog already populated, skipping seed");
        return Ok(0);
    }

    let catalog = db.catalog();
    let mut inserted = 0;
    for item in grocery_catalog() {
        catalog.insert(&item).await?;
        inserted += 1;
    }

    info!(inserted, "Catalog seeded");
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DbConfig;

    #[test]
    fn test_every_entry_is_valid() {
        let expected: usize = CATALOG.iter().map(|(_, entries)| entries.len()).sum();
        let items = grocery_catalog();
        assert_eq!(items.len(), expected);
        assert!(items.iter().any(|i| i.has_discount()));
        assert!(items.iter().any(|i| !i.has_discount()));
    }

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let first = seed_catalog(&db).await.unwrap();
        assert_eq!(first, grocery_catalog().len());

        let second = seed_catalog(&db).await.unwrap();
        assert_eq!(second, 0);
        assert_eq!(db.catalog().count().await.unwrap() as usize, first);
    }
}
