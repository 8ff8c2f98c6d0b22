use chrono::{TimeZone, Utc};
use datafono_mock::application::lifecycle::{
    DriverMode, TransactionLifecycle, TransactionRequest,
};
use datafono_mock::application::store::TransactionStore;
use datafono_mock::application::vault::TokenVault;
use datafono_mock::domain::ports::PersistenceAdapterArc;
use datafono_mock::domain::transaction::TransactionStatus;
use datafono_mock::infrastructure::clock::ManualClock;
use datafono_mock::infrastructure::json_file::JsonFileAdapter;
use datafono_mock::infrastructure::random::SeededSource;
use rust_decimal_macros::dec;
use std::sync::Arc;
use tempfile::tempdir;

fn lifecycle_over(
    store: TransactionStore,
    clock: Arc<ManualClock>,
    seed: u64,
) -> TransactionLifecycle {
    let vault = TokenVault::new(clock.clone());
    TransactionLifecycle::new(
        store,
        vault,
        clock,
        Arc::new(SeededSource::new(seed)),
        DriverMode::Lazy,
    )
}

#[tokio::test]
async fn test_store_survives_restart() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("transaction-store.json");
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2023, 1, 1, 10, 0, 0).unwrap(),
    ));

    // First run: create a payment and resolve it
    {
        let adapter: PersistenceAdapterArc = Arc::new(JsonFileAdapter::new(&path));
        let store = TransactionStore::open(adapter).await;
        let lifecycle = lifecycle_over(store.clone(), clock.clone(), 7);

        lifecycle
            .create_payment(TransactionRequest {
                order_id: "ORDER1".into(),
                amount: dec!(100.50),
                device_type: None,
                tokenization: None,
                transaction_id: None,
            })
            .await
            .unwrap();
        lifecycle.resolve_now("ORDER1").await.unwrap();
    }

    // Second run over the same file recovers the terminal transaction
    let adapter: PersistenceAdapterArc = Arc::new(JsonFileAdapter::new(&path));
    let reopened = TransactionStore::open(adapter).await;

    let tx = reopened.get("ORDER1").await.expect("recovered after restart");
    assert!(tx.status.is_terminal());
    assert_eq!(tx.amount, dec!(100.50));
    assert!(!reopened.is_busy().await);
}

#[tokio::test]
async fn test_pending_transaction_recovers_as_pending() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("transaction-store.json");
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2023, 1, 1, 10, 0, 0).unwrap(),
    ));

    {
        let adapter: PersistenceAdapterArc = Arc::new(JsonFileAdapter::new(&path));
        let store = TransactionStore::open(adapter).await;
        let lifecycle = lifecycle_over(store.clone(), clock.clone(), 7);
        lifecycle
            .create_payment(TransactionRequest {
                order_id: "ORDER1".into(),
                amount: dec!(10),
                device_type: None,
                tokenization: None,
                transaction_id: None,
            })
            .await
            .unwrap();
        // The in-memory processing claim must not leak into the document
        store.claim_if_pending("ORDER1").await.unwrap();
    }

    let adapter: PersistenceAdapterArc = Arc::new(JsonFileAdapter::new(&path));
    let reopened = TransactionStore::open(adapter).await;
    let tx = reopened.get("ORDER1").await.unwrap();
    assert_eq!(tx.status, TransactionStatus::Pending);

    // And it can still be resolved after the restart
    let lifecycle = lifecycle_over(reopened.clone(), clock, 7);
    let resolved = lifecycle.resolve_now("ORDER1").await.unwrap().unwrap();
    assert!(resolved.status.is_terminal());
}

#[tokio::test]
async fn test_corrupt_store_file_starts_empty() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("transaction-store.json");
    std::fs::write(&path, "{ definitely not json").unwrap();

    let adapter: PersistenceAdapterArc = Arc::new(JsonFileAdapter::new(&path));
    let store = TransactionStore::open(adapter).await;
    assert!(store.all().await.is_empty());
}
