//! # Catalog Repository
//!
//! Read access to the catalog for the till, plus `insert` for seeding.
//!
//! Listing order is always (category, name), which is also the order the
//! category tabs appear in.

use chrono::Utc;
use sqlx::{FromRow, SqlitePool};
use tracing::debug;

use tally_core::catalog::ALL_CATEGORIES;
use tally_core::validation::validate_search_query;
use tally_core::CatalogItem;

use crate::error::{DbError, DbResult};

/// Repository for catalog database operations.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

#[derive(Debug, FromRow)]
struct CatalogRow {
    id: String,
    name: String,
    category: String,
    base_price_cents: i64,
    discount_bps: i64,
}

impl TryFrom<CatalogRow> for CatalogItem {
    type Error = DbError;

    fn try_from(row: CatalogRow) -> DbResult<Self> {
        let discount_bps = u32::try_from(row.discount_bps).map_err(|_| {
            DbError::CorruptRow(format!("catalog item {} has discount_bps {}", row.id, row.discount_bps))
        })?;

        Ok(CatalogItem {
            id: row.id,
            name: row.name,
            category: row.category,
            base_price_cents: row.base_price_cents,
            discount_bps,
        })
    }
}

fn into_items(rows: Vec<CatalogRow>) -> DbResult<Vec<CatalogItem>> {
    rows.into_iter().map(CatalogItem::try_from).collect()
}

/// Escapes LIKE wildcards so user input matches literally.
fn like_pattern(query: &str) -> String {
    let escaped = query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

impl CatalogRepository {
    /// Creates a new CatalogRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CatalogRepository { pool }
    }

    /// Every item, ordered by category then name.
    pub async fn list_all(&self) -> DbResult<Vec<CatalogItem>> {
        let rows: Vec<CatalogRow> = sqlx::query_as(
            r#"
            SELECT id, name, category, base_price_cents, discount_bps
            FROM catalog_items
            ORDER BY category, name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        into_items(rows)
    }

    /// Gets an item by id.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<CatalogItem>> {
        let row: Option<CatalogRow> = sqlx::query_as(
            r#"
            SELECT id, name, category, base_price_cents, discount_bps
            FROM catalog_items
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(CatalogItem::try_from).transpose()
    }

    /// Name search within a category tab, done by SQLite.
    ///
    /// ## Matching
    /// - `query`: substring of the name; empty matches all
    /// - `category`: exact match, `"All"` matches every category
    ///
    /// `LIKE` folds ASCII case only: "rice" finds "Rice" but "éclair" does
    /// not find "Éclair". The till filters `list_all` with
    /// `tally_core::catalog::filter_items`, which folds Unicode case.
    pub async fn search(&self, query: &str, category: &str) -> DbResult<Vec<CatalogItem>> {
        let query = validate_search_query(query).map_err(|e| DbError::QueryFailed(e.to_string()))?;
        debug!(query = %query, category = %category, "Searching catalog");

        let rows: Vec<CatalogRow> = sqlx::query_as(
            r#"
            SELECT id, name, category, base_price_cents, discount_bps
            FROM catalog_items
            WHERE (?1 = '' OR name LIKE ?2 ESCAPE '\')
              AND (?3 = ?4 OR category = ?3)
            ORDER BY category, name
            "#,
        )
        .bind(&query)
        .bind(like_pattern(&query))
        .bind(category)
        .bind(ALL_CATEGORIES)
        .fetch_all(&self.pool)
        .await?;

        into_items(rows)
    }

    /// Category tabs: "All" followed by each distinct category.
    pub async fn categories(&self) -> DbResult<Vec<String>> {
        let rows: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT DISTINCT category
            FROM catalog_items
            ORDER BY category
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut categories = Vec::with_capacity(rows.len() + 1);
        categories.push(ALL_CATEGORIES.to_string());
        categories.extend(rows);
        Ok(categories)
    }

    /// Inserts an item. Callers validate with `CatalogItem::validate` first;
    /// the table's CHECK constraints reject anything that slips through.
    pub async fn insert(&self, item: &CatalogItem) -> DbResult<()> {
        debug!(id = %item.id, name = %item.name, "Inserting catalog item");

        sqlx::query(
            r#"
            INSERT INTO catalog_items (
                id, name, category, base_price_cents, discount_bps, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&item.id)
        .bind(&item.name)
        .bind(&item.category)
        .bind(item.base_price_cents)
        .bind(item.discount_bps)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Counts catalog items.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM catalog_items")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    async fn seeded() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let items = [
            CatalogItem::new("milk", "Toned Milk 1L", "Dairy", 5400, 0.0).unwrap(),
            CatalogItem::new("rice", "Basmati Rice 5kg", "Grains", 60000, 10.0).unwrap(),
            CatalogItem::new("atta", "Whole Wheat Atta", "Grains", 32000, 0.0).unwrap(),
            CatalogItem::new("curd", "Fresh Curd 400g", "Dairy", 3500, 5.0).unwrap(),
            CatalogItem::new("pct", "100% Juice", "Beverages", 9900, 0.0).unwrap(),
        ];
        for item in &items {
            db.catalog().insert(item).await.unwrap();
        }
        db
    }

    #[tokio::test]
    async fn test_list_all_ordered_by_category_then_name() {
        let db = seeded().await;
        let ids: Vec<String> = db
            .catalog()
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.id)
            .collect();

        assert_eq!(ids, vec!["pct", "curd", "milk", "rice", "atta"]);
    }

    #[tokio::test]
    async fn test_get_by_id() {
        let db = seeded().await;
        let rice = db.catalog().get_by_id("rice").await.unwrap().unwrap();
        assert_eq!(rice.discount_bps, 1000);
        assert!(db.catalog().get_by_id("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_search() {
        let db = seeded().await;
        let catalog = db.catalog();

        assert_eq!(catalog.search("", "All").await.unwrap().len(), 5);
        assert_eq!(catalog.search("", "Dairy").await.unwrap().len(), 2);
        assert_eq!(catalog.search("RICE", "All").await.unwrap()[0].id, "rice");
        assert!(catalog.search("rice", "Dairy").await.unwrap().is_empty());

        // Wildcards in user input match literally
        let pct = catalog.search("100%", "All").await.unwrap();
        assert_eq!(pct.len(), 1);
        assert!(catalog.search("_", "All").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_folds_ascii_case_only() {
        let db = seeded().await;
        let eclair = CatalogItem::new("eclair", "Éclair", "Bakery", 8_000, 0.0).unwrap();
        db.catalog().insert(&eclair).await.unwrap();

        assert_eq!(db.catalog().search("ÉCLAIR", "All").await.unwrap().len(), 1);
        assert!(db.catalog().search("éclair", "All").await.unwrap().is_empty());

        let all = db.catalog().list_all().await.unwrap();
        assert_eq!(tally_core::catalog::filter_items(&all, "éclair", "All").len(), 1);
    }

    #[tokio::test]
    async fn test_categories_and_count() {
        let db = seeded().await;
        assert_eq!(
            db.catalog().categories().await.unwrap(),
            vec!["All", "Beverages", "Dairy", "Grains"]
        );
        assert_eq!(db.catalog().count().await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_duplicate_id_rejected() {
        let db = seeded().await;
        let dup = CatalogItem::new("milk", "Another Milk", "Dairy", 100, 0.0).unwrap();
        let err = db.catalog().insert(&dup).await.unwrap_err();
        assert_eq!(err.unique_field(), Some("catalog_items.id"));
    }
}
