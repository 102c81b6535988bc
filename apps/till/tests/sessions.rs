//! Several till sessions checking out against one SQLite database.

use std::collections::HashSet;
use std::sync::Arc;

use tally_checkout::{CheckoutCommitter, RecordStore};
use tally_db::seed::seed_catalog;
use tally_db::{Database, DbConfig};
use tally_till::commands;
use tally_till::{AppConfig, ErrorCode, Session};

async fn seeded_db() -> Database {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    seed_catalog(&db).await.unwrap();
    db
}

#[tokio::test]
async fn test_concurrent_sessions_get_distinct_bill_numbers() {
    let db = seeded_db().await;
    let store: Arc<dyn RecordStore> = Arc::new(db.record_store());
    let committer = CheckoutCommitter::new(store);

    let mut handles = Vec::new();
    for n in 0..6 {
        let db = db.clone();
        let mut session = Session::new(committer.clone());
        handles.push(tokio::spawn(async move {
            commands::add_to_cart(&db, &mut session, "bev-tea-250").await.unwrap();
            if n % 2 == 0 {
                commands::add_to_cart(&db, &mut session, "snk-chips-50").await.unwrap();
            }
            let receipt = commands::checkout(&mut session, &AppConfig::default()).await.unwrap();
            assert!(session.cart().is_empty());
            receipt.bill_number
        }));
    }

    let mut numbers = HashSet::new();
    for handle in handles {
        numbers.insert(handle.await.unwrap());
    }

    assert_eq!(numbers.len(), 6);
    assert_eq!(db.bills().count().await.unwrap(), 6);
    // three sessions bought one line, three bought two
    assert_eq!(db.bills().count_items().await.unwrap(), 9);
    assert_eq!(db.bills().count_legacy_transactions().await.unwrap(), 9);
}

#[tokio::test]
async fn test_failed_checkout_keeps_cart_for_retry() {
    let db = seeded_db().await;
    let mut session = Session::with_store(Arc::new(db.record_store()));
    let config = AppConfig::default();

    commands::add_to_cart(&db, &mut session, "dairy-ghee-500").await.unwrap();
    commands::update_cart_item(&mut session, "dairy-ghee-500", 2).unwrap();
    let before = commands::get_cart(&session);

    sqlx_rename(&db, "transactions", "transactions_offline").await;
    let err = commands::checkout(&mut session, &config).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::PersistenceError);

    let after = commands::get_cart(&session);
    assert_eq!(after.lines.len(), 1);
    assert_eq!(after.lines[0].quantity, 2);
    assert_eq!(after.totals.total_amount_cents, before.totals.total_amount_cents);
    assert_eq!(db.bills().count().await.unwrap(), 0);

    sqlx_rename(&db, "transactions_offline", "transactions").await;
    let receipt = commands::checkout(&mut session, &config).await.unwrap();
    assert_eq!(receipt.total_amount, before.totals.total_amount_cents);
    assert!(commands::get_cart(&session).lines.is_empty());
    assert_eq!(db.bills().count().await.unwrap(), 1);
}

async fn sqlx_rename(db: &Database, from: &str, to: &str) {
    let sql = format!("ALTER TABLE {} RENAME TO {}", from, to);
    sqlx::query(&sql).execute(db.pool()).await.unwrap();
}
