mod common;

use async_trait::async_trait;
use common::{CallLog, RecordingStore};
use rust_decimal_macros::dec;
use tradie_checkout::application::subscription::SubscriptionOverview;
use tradie_checkout::domain::payment::{Plan, USER_SUBSCRIPTION_KEY};
use tradie_checkout::domain::ports::{LocalStore, PlanDirectory};
use tradie_checkout::error::Result;

struct FakeCatalog;

#[async_trait]
impl PlanDirectory for FakeCatalog {
    async fn plans(&self) -> Result<Vec<Plan>> {
        Ok(vec![
            Plan {
                id: 1,
                name: "Free Trial".to_string(),
                price: dec!(0.00),
                currency: "AUD".to_string(),
                invoice_interval: Some("month".to_string()),
            },
            Plan {
                id: 2,
                name: "Monthly".to_string(),
                price: dec!(44.99),
                currency: "AUD".to_string(),
                invoice_interval: Some("month".to_string()),
            },
        ])
    }
}

fn overview(store: RecordingStore) -> SubscriptionOverview {
    SubscriptionOverview::new(Box::new(FakeCatalog), Box::new(store))
}

const STORED_RECORD: &str = r#"{
    "planName": "Monthly",
    "planPrice": "44.99",
    "planCurrency": "AUD",
    "paymentMethod": "Bpoint",
    "paymentReference": "BPOINT-TOKEN-1",
    "cardLast4": "0366",
    "purchasedAt": "2025-06-15T00:00:00Z"
}"#;

#[tokio::test]
async fn test_no_record_means_no_active_subscription() {
    let store = RecordingStore::new(CallLog::default());
    assert!(overview(store).active_subscription().await.unwrap().is_none());
}

#[tokio::test]
async fn test_reads_back_stored_record() {
    let store = RecordingStore::new(CallLog::default());
    store.set(USER_SUBSCRIPTION_KEY, STORED_RECORD).await.unwrap();

    let record = overview(store)
        .active_subscription()
        .await
        .unwrap()
        .expect("record should decode");
    assert_eq!(record.plan_name, "Monthly");
    assert_eq!(record.card_last4.as_deref(), Some("0366"));
}

#[tokio::test]
async fn test_corrupt_record_is_treated_as_absent() {
    let store = RecordingStore::new(CallLog::default());
    store.set(USER_SUBSCRIPTION_KEY, "not-json").await.unwrap();
    assert!(overview(store).active_subscription().await.unwrap().is_none());
}

#[tokio::test]
async fn test_active_plan_matched_by_name() {
    let store = RecordingStore::new(CallLog::default());
    store.set(USER_SUBSCRIPTION_KEY, STORED_RECORD).await.unwrap();
    let overview = overview(store);

    let plans = overview.plans().await.unwrap();
    assert_eq!(plans.len(), 2);
    assert!(!overview.is_active_plan(&plans[0]).await.unwrap());
    assert!(overview.is_active_plan(&plans[1]).await.unwrap());
}
