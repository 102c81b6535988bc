//! Checkout commit protocol against the in-memory record store.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tally_checkout::{
    CheckoutCommitter, CheckoutConfig, CheckoutError, FaultPlan, MemoryRecordStore,
    SequenceGenerator, StoreError, Table,
};
use tally_core::{Cart, CatalogItem};

fn rice() -> CatalogItem {
    CatalogItem::new("rice", "Basmati Rice 5kg", "Grains", 10000, 20.0).unwrap()
}

fn dal() -> CatalogItem {
    CatalogItem::new("dal", "Toor Dal 1kg", "Pulses", 16500, 0.0).unwrap()
}

fn ghee() -> CatalogItem {
    CatalogItem::new("ghee", "Cow Ghee 500ml", "Dairy", 32500, 12.5).unwrap()
}

fn two_line_cart() -> Cart {
    let mut cart = Cart::new();
    cart.add(&rice()).unwrap();
    cart.add(&rice()).unwrap();
    cart.add(&dal()).unwrap();
    cart
}

async fn assert_nothing_visible(store: &MemoryRecordStore) {
    assert!(store.bills().await.is_empty());
    assert!(store.bill_items().await.is_empty());
    assert!(store.transactions().await.is_empty());
}

#[tokio::test]
async fn test_worked_example() {
    let store = Arc::new(MemoryRecordStore::new());
    let committer = CheckoutCommitter::new(Arc::clone(&store));

    let mut cart = Cart::new();
    cart.add(&rice()).unwrap();
    cart.add(&rice()).unwrap();

    let snapshot = cart.snapshot();
    let bill_number = committer.checkout(&snapshot).await.unwrap();

    // A later addition to the live cart never reaches the bill
    cart.add(&dal()).unwrap();

    let bills = store.bills().await;
    assert_eq!(bills.len(), 1);
    assert_eq!(bills[0].bill_number, bill_number);
    assert_eq!(bills[0].total_amount_cents, 16000);
    assert_eq!(bills[0].total_discount_cents, 4000);

    let items = store.items_for_bill(&bills[0].id).await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].quantity, 2);
    assert_eq!(items[0].effective_price_cents, 8000);
    assert_eq!(items[0].discount_applied_cents, 4000);
    assert_eq!(items[0].subtotal_cents, 16000);
}

#[tokio::test]
async fn test_empty_cart_touches_nothing() {
    let store = Arc::new(MemoryRecordStore::new());
    let committer = CheckoutCommitter::new(Arc::clone(&store));

    let err = committer.checkout(&Cart::new().snapshot()).await.unwrap_err();

    assert_eq!(err, CheckoutError::EmptyCart);
    assert_eq!(store.begin_count(), 0);
    assert_eq!(store.insert_count(), 0);
}

#[tokio::test]
async fn test_success_writes_header_items_and_mirrors() {
    let store = Arc::new(MemoryRecordStore::new());
    let committer = CheckoutCommitter::new(Arc::clone(&store));

    let mut cart = two_line_cart();
    cart.add(&ghee()).unwrap();
    committer.checkout(&cart.snapshot()).await.unwrap();

    let bills = store.bills().await;
    let items = store.items_for_bill(&bills[0].id).await;
    let mirrors = store.transactions().await;

    assert_eq!(bills.len(), 1);
    assert_eq!(items.len(), 3);
    assert_eq!(mirrors.len(), 3);

    let item_total: i64 = items.iter().map(|i| i.subtotal_cents).sum();
    let item_discount: i64 = items.iter().map(|i| i.discount_applied_cents).sum();
    assert_eq!(bills[0].total_amount_cents, item_total);
    assert_eq!(bills[0].total_discount_cents, item_discount);

    // Items keep cart order and mirrors copy them field for field
    let names: Vec<&str> = items.iter().map(|i| i.item_name.as_str()).collect();
    assert_eq!(names, vec!["Basmati Rice 5kg", "Toor Dal 1kg", "Cow Ghee 500ml"]);
    for (item, mirror) in items.iter().zip(&mirrors) {
        assert_eq!(item.item_name, mirror.item_name);
        assert_eq!(item.quantity, mirror.quantity);
        assert_eq!(item.subtotal_cents, mirror.subtotal_cents);
        assert_eq!(item.discount_applied_cents, mirror.discount_applied_cents);
    }
}

#[tokio::test]
async fn test_bill_write_failure_writes_nothing() {
    let store = Arc::new(MemoryRecordStore::with_faults(
        FaultPlan::default().fail_on(Table::Bills),
    ));
    let committer = CheckoutCommitter::new(Arc::clone(&store));

    let err = committer.checkout(&two_line_cart().snapshot()).await.unwrap_err();

    assert!(matches!(
        err,
        CheckoutError::Persistence(StoreError::Rejected { table: Table::Bills, .. })
    ));
    assert!(!err.is_retriable());
    assert_nothing_visible(&store).await;
    assert_eq!(store.rollback_count(), 1);
}

#[tokio::test]
async fn test_mid_item_failure_writes_nothing() {
    // Header + first item succeed, second item fails
    let store = Arc::new(MemoryRecordStore::with_faults(FaultPlan::default().fail_after(2)));
    let committer = CheckoutCommitter::new(Arc::clone(&store));

    let err = committer.checkout(&two_line_cart().snapshot()).await.unwrap_err();

    assert!(matches!(err, CheckoutError::Persistence(StoreError::Unavailable(_))));
    assert!(err.is_retriable());
    assert_nothing_visible(&store).await;
}

#[tokio::test]
async fn test_mirror_failure_writes_nothing() {
    let store = Arc::new(MemoryRecordStore::with_faults(
        FaultPlan::default().fail_on(Table::Transactions),
    ));
    let committer = CheckoutCommitter::new(Arc::clone(&store));

    let err = committer.checkout(&two_line_cart().snapshot()).await.unwrap_err();

    assert!(matches!(
        err,
        CheckoutError::Persistence(StoreError::Rejected { table: Table::Transactions, .. })
    ));
    assert_nothing_visible(&store).await;
}

#[tokio::test]
async fn test_commit_failure_writes_nothing() {
    let store = Arc::new(MemoryRecordStore::with_faults(FaultPlan::default().fail_commit()));
    let committer = CheckoutCommitter::new(Arc::clone(&store));

    assert!(committer.checkout(&two_line_cart().snapshot()).await.is_err());
    assert_nothing_visible(&store).await;
}

#[tokio::test]
async fn test_unavailable_store() {
    let store = Arc::new(MemoryRecordStore::with_faults(FaultPlan::default().unavailable()));
    let committer = CheckoutCommitter::new(Arc::clone(&store));

    let err = committer.checkout(&two_line_cart().snapshot()).await.unwrap_err();
    assert!(matches!(err, CheckoutError::Persistence(StoreError::Unavailable(_))));
    assert_eq!(store.insert_count(), 0);
}

#[tokio::test]
async fn test_collision_retries_with_fresh_number() {
    let store = Arc::new(MemoryRecordStore::new());

    let first = CheckoutCommitter::new(Arc::clone(&store))
        .with_generator(Arc::new(SequenceGenerator::new(["BILL-TAKEN"])));
    first.checkout(&two_line_cart().snapshot()).await.unwrap();

    let second = CheckoutCommitter::new(Arc::clone(&store))
        .with_generator(Arc::new(SequenceGenerator::new(["BILL-TAKEN", "BILL-FRESH"])));
    let number = second.checkout(&two_line_cart().snapshot()).await.unwrap();

    assert_eq!(number.as_str(), "BILL-FRESH");
    assert_eq!(store.bills().await.len(), 2);
    // The collided attempt left no orphan rows
    assert_eq!(store.bill_items().await.len(), 4);
    assert_eq!(store.transactions().await.len(), 4);
}

#[tokio::test]
async fn test_exhausted_collisions_escalate() {
    let store = Arc::new(MemoryRecordStore::new());

    let seed = CheckoutCommitter::new(Arc::clone(&store))
        .with_generator(Arc::new(SequenceGenerator::new(["BILL-TAKEN"])));
    seed.checkout(&two_line_cart().snapshot()).await.unwrap();

    let committer = CheckoutCommitter::new(Arc::clone(&store))
        .with_generator(Arc::new(SequenceGenerator::new([
            "BILL-TAKEN",
            "BILL-TAKEN",
            "BILL-TAKEN",
        ])))
        .with_config(CheckoutConfig::default().with_max_attempts(3));

    let err = committer.checkout(&two_line_cart().snapshot()).await.unwrap_err();

    assert!(matches!(
        err,
        CheckoutError::Persistence(StoreError::Duplicate { table: Table::Bills, .. })
    ));
    assert_eq!(store.bills().await.len(), 1);
    // One seed unit plus three attempts
    assert_eq!(store.begin_count(), 4);
}

#[tokio::test]
async fn test_slow_store_times_out() {
    let store = Arc::new(MemoryRecordStore::with_faults(
        FaultPlan::default().delay_inserts(Duration::from_millis(500)),
    ));
    let committer = CheckoutCommitter::new(Arc::clone(&store))
        .with_config(CheckoutConfig::default().with_timeout(Duration::from_millis(50)));

    let err = committer.checkout(&two_line_cart().snapshot()).await.unwrap_err();

    assert_eq!(
        err,
        CheckoutError::Persistence(StoreError::TimedOut {
            after: Duration::from_millis(50)
        })
    );
    assert!(err.is_retriable());
    assert_nothing_visible(&store).await;
    assert_eq!(store.rollback_count(), 1);
}

#[tokio::test]
async fn test_late_commit_ack_reports_unknown_outcome() {
    let store = Arc::new(MemoryRecordStore::with_faults(
        FaultPlan::default().delay_commit_ack(Duration::from_millis(200)),
    ));
    let committer = CheckoutCommitter::new(Arc::clone(&store)).with_config(
        CheckoutConfig::default()
            .with_timeout(Duration::from_millis(50))
            .with_commit_timeout(Duration::from_millis(50)),
    );

    let err = committer.checkout(&two_line_cart().snapshot()).await.unwrap_err();

    // The store applied the bill before the ack went missing
    let bills = store.bills().await;
    assert_eq!(bills.len(), 1);
    assert_eq!(
        err,
        CheckoutError::OutcomeUnknown {
            bill_number: bills[0].bill_number.clone(),
            after: Duration::from_millis(50),
        }
    );
    assert!(!err.is_retriable());
    assert_eq!(store.begin_count(), 1);
    assert_eq!(store.rollback_count(), 0);
}

#[tokio::test]
async fn test_staging_timeout_does_not_cover_commit() {
    let store = Arc::new(MemoryRecordStore::with_faults(
        FaultPlan::default().delay_commit_ack(Duration::from_millis(200)),
    ));
    let committer = CheckoutCommitter::new(Arc::clone(&store))
        .with_config(CheckoutConfig::default().with_timeout(Duration::from_millis(50)));

    let bill_number = committer.checkout(&two_line_cart().snapshot()).await.unwrap();

    let bills = store.bills().await;
    assert_eq!(bills.len(), 1);
    assert_eq!(bills[0].bill_number, bill_number);
}

#[tokio::test]
async fn test_concurrent_checkouts_get_distinct_numbers() {
    let store = Arc::new(MemoryRecordStore::new());
    let committer = CheckoutCommitter::new(Arc::clone(&store));

    let mut handles = Vec::new();
    for _ in 0..20 {
        let committer = committer.clone();
        handles.push(tokio::spawn(async move {
            committer.checkout(&two_line_cart().snapshot()).await
        }));
    }

    let mut numbers = HashSet::new();
    for handle in handles {
        numbers.insert(handle.await.unwrap().unwrap());
    }

    assert_eq!(numbers.len(), 20);
    assert_eq!(store.bills().await.len(), 20);
    assert_eq!(store.bill_items().await.len(), 40);
}

#[tokio::test]
async fn test_snapshot_reusable_after_failure() {
    let failing = Arc::new(MemoryRecordStore::with_faults(FaultPlan::default().fail_commit()));
    let healthy = Arc::new(MemoryRecordStore::new());
    let snapshot = two_line_cart().snapshot();

    assert!(CheckoutCommitter::new(failing).checkout(&snapshot).await.is_err());
    CheckoutCommitter::new(Arc::clone(&healthy))
        .checkout(&snapshot)
        .await
        .unwrap();

    assert_eq!(healthy.bills().await[0].total_amount_cents, 16000 + 16500);
}
