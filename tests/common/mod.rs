#![allow(dead_code)]

use async_trait::async_trait;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::time::{Duration, sleep};
use tradie_checkout::application::checkout::CheckoutRequest;
use tradie_checkout::domain::card::CardInput;
use tradie_checkout::domain::payment::{
    CardAttachment, PaymentMethod, PaymentRecord, PaymentRecordRequest, PlanSelection,
};
use tradie_checkout::domain::ports::{LocalStore, Notifier, PaymentGateway};
use tradie_checkout::error::{CheckoutError, Result};

/// Records every backend/store interaction in submission order.
#[derive(Default, Clone)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    pub fn push(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count_of(&self, prefix: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }
}

/// Scripted gateway: succeeds by default; individual steps can be told
/// to fail, and `delay` slows every call down for in-flight tests.
pub struct ScriptedGateway {
    pub log: CallLog,
    pub fail_auth: bool,
    pub fail_attach: bool,
    pub fail_record: bool,
    pub delay: Duration,
}

impl ScriptedGateway {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            fail_auth: false,
            fail_attach: false,
            fail_record: false,
            delay: Duration::ZERO,
        }
    }
}

#[async_trait]
impl PaymentGateway for ScriptedGateway {
    async fn auth_key(&self, panel_id: u32) -> Result<String> {
        sleep(self.delay).await;
        self.log.push(format!("auth_key:{panel_id}"));
        if self.fail_auth {
            return Err(CheckoutError::Backend("auth service unavailable".to_string()));
        }
        Ok("AUTH-KEY-1".to_string())
    }

    async fn attach_card(&self, _card: &CardInput, auth_key: &str) -> Result<CardAttachment> {
        sleep(self.delay).await;
        self.log.push(format!("attach_card:{auth_key}"));
        if self.fail_attach {
            return Err(CheckoutError::Backend("attach rejected".to_string()));
        }
        Ok(CardAttachment {
            token: Some("BPOINT-TOKEN-1".to_string()),
            reference: None,
        })
    }

    async fn record_payment(&self, request: &PaymentRecordRequest) -> Result<PaymentRecord> {
        sleep(self.delay).await;
        self.log.push(format!("record_payment:{}", request.reference));
        if self.fail_record {
            return Err(CheckoutError::Backend("recording rejected".to_string()));
        }
        Ok(PaymentRecord {
            id: 42,
            status: Some("Payment recorded successfully".to_string()),
        })
    }
}

/// In-memory store that records writes in the shared call log and can
/// be scripted to fail its next N `set` calls.
#[derive(Clone)]
pub struct RecordingStore {
    pub log: CallLog,
    entries: Arc<Mutex<HashMap<String, String>>>,
    failing_sets: Arc<AtomicUsize>,
}

impl RecordingStore {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            entries: Arc::new(Mutex::new(HashMap::new())),
            failing_sets: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// The next `count` calls to `set` will fail.
    pub fn fail_next_sets(&self, count: usize) {
        self.failing_sets.store(count, Ordering::SeqCst);
    }

    pub fn value(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }
}

#[async_trait]
impl LocalStore for RecordingStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.log.push(format!("set:{key}"));
        if self
            .failing_sets
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(CheckoutError::Store("disk full".to_string()));
        }
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }
}

/// Notifier that records deliveries and can be told to fail.
pub struct RecordingNotifier {
    pub log: CallLog,
    pub fail: bool,
}

impl RecordingNotifier {
    pub fn new(log: CallLog) -> Self {
        Self { log, fail: false }
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, title: &str, _body: &str) -> Result<()> {
        self.log.push(format!("notify:{title}"));
        if self.fail {
            return Err(CheckoutError::Backend("notification channel down".to_string()));
        }
        Ok(())
    }
}

pub fn monthly_plan() -> PlanSelection {
    PlanSelection {
        id: Some(2),
        name: "Monthly".to_string(),
        price: dec!(44.99),
        currency: "AUD".to_string(),
    }
}

pub fn valid_card() -> CardInput {
    CardInput {
        name: "Jane Cardholder".to_string(),
        number: "4532 0151 1283 0366".to_string(),
        expire_month: "06".to_string(),
        expire_year: "30".to_string(),
        cvn: "123".to_string(),
    }
}

pub fn bpoint_request() -> CheckoutRequest {
    CheckoutRequest {
        plan: monthly_plan(),
        method: PaymentMethod::Bpoint,
        card: valid_card(),
    }
}

pub fn cash_request() -> CheckoutRequest {
    CheckoutRequest {
        plan: monthly_plan(),
        method: PaymentMethod::Cash,
        card: CardInput::default(),
    }
}
