//! # Catalog Helpers
//!
//! Pure filtering over a loaded catalog, for the category tabs and the
//! search box. The database-backed equivalents live in
//! `tally_db::CatalogRepository`.

use crate::types::CatalogItem;

/// Pseudo-category that matches every item.
pub const ALL_CATEGORIES: &str = "All";

/// Category tabs: "All" first, then each distinct category in the order it
/// first appears in `items`.
///
/// ## Example
/// ```rust
/// use tally_core::catalog::categories;
/// use tally_core::CatalogItem;
///
/// let items = vec![
///     CatalogItem::new("a", "Apple", "Fruit", 100, 0.0).unwrap(),
///     CatalogItem::new("b", "Bread", "Bakery", 100, 0.0).unwrap(),
///     CatalogItem::new("c", "Cherry", "Fruit", 100, 0.0).unwrap(),
/// ];
/// assert_eq!(categories(&items), vec!["All", "Fruit", "Bakery"]);
/// ```
pub fn categories(items: &[CatalogItem]) -> Vec<String> {
    let mut out = vec![ALL_CATEGORIES.to_string()];
    for item in items {
        if !out.iter().any(|c| c == &item.category) {
            out.push(item.category.clone());
        }
    }
    out
}

/// Items whose name contains `query` (case-insensitive) and whose category
/// equals `category`. An empty query matches every name; `"All"` matches
/// every category.
pub fn filter_items<'a>(items: &'a [CatalogItem], query: &str, category: &str) -> Vec<&'a CatalogItem> {
    let needle = query.trim().to_lowercase();

    items
        .iter()
        .filter(|item| category == ALL_CATEGORIES || item.category == category)
        .filter(|item| needle.is_empty() || item.name.to_lowercase().contains(&needle))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<CatalogItem> {
        vec![
            CatalogItem::new("rice", "Basmati Rice 5kg", "Grains", 60000, 10.0).unwrap(),
            CatalogItem::new("atta", "Whole Wheat Atta", "Grains", 32000, 0.0).unwrap(),
            CatalogItem::new("milk", "Toned Milk 1L", "Dairy", 5400, 0.0).unwrap(),
            CatalogItem::new("paneer", "Fresh Paneer", "Dairy", 9000, 5.0).unwrap(),
        ]
    }

    #[test]
    fn test_categories_starts_with_all() {
        assert_eq!(categories(&catalog()), vec!["All", "Grains", "Dairy"]);
        assert_eq!(categories(&[]), vec!["All"]);
    }

    #[test]
    fn test_filter_by_category() {
        let items = catalog();
        let dairy = filter_items(&items, "", "Dairy");
        assert_eq!(dairy.len(), 2);
        assert_eq!(filter_items(&items, "", "All").len(), 4);
        assert!(filter_items(&items, "", "Snacks").is_empty());
    }

    #[test]
    fn test_filter_by_name_is_case_insensitive() {
        let items = catalog();
        let hits = filter_items(&items, "  RICE ", "All");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "rice");

        assert!(filter_items(&items, "milk", "Grains").is_empty());
        assert_eq!(filter_items(&items, "milk", "Dairy").len(), 1);
    }
}
