use crate::domain::card::{self, CardInput, ValidationResult};
use crate::domain::payment::{
    PaymentMethod, PaymentRecord, PaymentRecordRequest, PlanSelection, SubscriptionRecord,
    USER_SUBSCRIPTION_KEY,
};
use crate::domain::ports::{LocalStoreBox, NotifierBox, PaymentGatewayBox};
use crate::error::{CheckoutError, Result};
use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{Mutex, watch};
use tracing::{error, info, warn};

/// Where a checkout attempt currently stands. Published through
/// [`CheckoutSequencer::subscribe`] so the presentation layer can render
/// progress without reaching into the sequencer.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AttemptPhase {
    #[default]
    Idle,
    Validating,
    Authorizing,
    Attaching,
    Recording,
    Persisting,
    Notifying,
    Succeeded,
    Failed(FailureReason),
}

/// Why an attempt ended in `Failed`.
#[derive(Debug, Clone, PartialEq)]
pub enum FailureReason {
    Validation(ValidationResult),
    Authorization(String),
    Attach(String),
    Recording(String),
    UnknownMethod,
}

impl From<FailureReason> for CheckoutError {
    fn from(reason: FailureReason) -> Self {
        match reason {
            FailureReason::Validation(result) => CheckoutError::Validation(result),
            FailureReason::Authorization(message) => CheckoutError::Authorization(message),
            FailureReason::Attach(message) => CheckoutError::Attach(message),
            FailureReason::Recording(message) => CheckoutError::Recording(message),
            FailureReason::UnknownMethod => CheckoutError::UnknownMethod,
        }
    }
}

/// One submission of the payment form.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutRequest {
    pub plan: PlanSelection,
    pub method: PaymentMethod,
    /// Ignored unless the method collects card details.
    pub card: CardInput,
}

/// What a successful attempt produced.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutOutcome {
    pub record: PaymentRecord,
    pub subscription: SubscriptionRecord,
    /// False when the backend record exists but the local write failed;
    /// the next launch reconciles against the backend.
    pub persisted: bool,
}

/// Drives a single checkout attempt from plan/method selection to a
/// persisted subscription record, in the strict order the backend
/// expects: validate locally, authorize, attach, record, persist,
/// notify. At most one attempt runs at a time.
pub struct CheckoutSequencer {
    gateway: PaymentGatewayBox,
    store: LocalStoreBox,
    notifier: NotifierBox,
    panel_id: u32,
    in_flight: Mutex<()>,
    attempt_seq: AtomicU64,
    phase: watch::Sender<AttemptPhase>,
}

impl CheckoutSequencer {
    pub fn new(
        gateway: PaymentGatewayBox,
        store: LocalStoreBox,
        notifier: NotifierBox,
        panel_id: u32,
    ) -> Self {
        let (phase, _) = watch::channel(AttemptPhase::Idle);
        Self {
            gateway,
            store,
            notifier,
            panel_id,
            in_flight: Mutex::new(()),
            attempt_seq: AtomicU64::new(0),
            phase,
        }
    }

    /// Observe phase transitions for the current and future attempts.
    pub fn subscribe(&self) -> watch::Receiver<AttemptPhase> {
        self.phase.subscribe()
    }

    /// The phase the sequencer is currently in.
    pub fn phase(&self) -> AttemptPhase {
        self.phase.borrow().clone()
    }

    /// Runs one attempt end to end. Returns `AttemptInProgress` without
    /// any side effect if a previous attempt has not yet reached a
    /// terminal state (a double-tapped submit must not charge twice).
    pub async fn complete_payment(&self, request: CheckoutRequest) -> Result<CheckoutOutcome> {
        let _attempt_guard = self
            .in_flight
            .try_lock()
            .map_err(|_| CheckoutError::AttemptInProgress)?;
        let attempt = self.attempt_seq.fetch_add(1, Ordering::SeqCst) + 1;
        info!(attempt, method = ?request.method, plan = %request.plan.name, "starting checkout attempt");

        let reference = match request.method {
            PaymentMethod::Cash => format!("CASH-{}", Utc::now().timestamp_millis()),
            PaymentMethod::Stripe => {
                // Opaque provider token; no card data leaves the process.
                self.enter(AttemptPhase::Attaching);
                format!("STRIPE-TOKEN-{}", Utc::now().timestamp_millis())
            }
            PaymentMethod::Bpoint => {
                self.enter(AttemptPhase::Validating);
                let result = card::validate(&request.card, Utc::now().date_naive());
                if !result.is_valid() {
                    return Err(self.fail(FailureReason::Validation(result)));
                }

                self.enter(AttemptPhase::Authorizing);
                let auth_key = match self.gateway.auth_key(self.panel_id).await {
                    Ok(key) => key,
                    Err(err) => {
                        return Err(
                            self.fail(FailureReason::Authorization(err.backend_message()))
                        );
                    }
                };

                self.enter(AttemptPhase::Attaching);
                match self.gateway.attach_card(&request.card, &auth_key).await {
                    Ok(attachment) => attachment.payment_reference(),
                    Err(err) => {
                        return Err(self.fail(FailureReason::Attach(err.backend_message())));
                    }
                }
            }
            PaymentMethod::Afterpay => {
                return Err(self.fail(FailureReason::UnknownMethod));
            }
        };

        self.enter(AttemptPhase::Recording);
        let record_request = PaymentRecordRequest {
            plan: request.plan.clone(),
            reference: reference.clone(),
            method: request.method,
        };
        let record = match self.gateway.record_payment(&record_request).await {
            Ok(record) => record,
            Err(err) => {
                return Err(self.fail(FailureReason::Recording(err.backend_message())));
            }
        };
        info!(attempt, record_id = record.id, "payment recorded");

        self.enter(AttemptPhase::Persisting);
        let subscription = SubscriptionRecord {
            plan_name: request.plan.name.clone(),
            plan_price: request.plan.price,
            plan_currency: request.plan.currency.clone(),
            payment_method: request.method,
            payment_reference: reference,
            card_last4: if request.method.is_card() {
                request.card.last4()
            } else {
                None
            },
            purchased_at: Utc::now(),
        };
        let persisted = self.persist(attempt, &subscription).await;

        self.enter(AttemptPhase::Notifying);
        let body = format!("Your payment for {} was successful.", subscription.plan_name);
        if let Err(err) = self.notifier.notify("Payment Successful", &body).await {
            warn!(attempt, %err, "payment notification failed");
        }

        self.enter(AttemptPhase::Succeeded);
        Ok(CheckoutOutcome {
            record,
            subscription,
            persisted,
        })
    }

    fn enter(&self, phase: AttemptPhase) {
        self.phase.send_replace(phase);
    }

    fn fail(&self, reason: FailureReason) -> CheckoutError {
        self.enter(AttemptPhase::Failed(reason.clone()));
        reason.into()
    }

    /// Local persistence never fails the attempt: the backend record is
    /// authoritative and is not rolled back. One retry, then give up
    /// and let the next launch reconcile.
    async fn persist(&self, attempt: u64, subscription: &SubscriptionRecord) -> bool {
        // A newer attempt owns the store now; drop this stale write.
        if self.attempt_seq.load(Ordering::SeqCst) != attempt {
            warn!(attempt, "attempt superseded; skipping local subscription write");
            return false;
        }
        let encoded = match serde_json::to_string(subscription) {
            Ok(encoded) => encoded,
            Err(err) => {
                error!(attempt, %err, "subscription record failed to encode; backend record stands");
                return false;
            }
        };
        if let Err(err) = self.store.set(USER_SUBSCRIPTION_KEY, &encoded).await {
            warn!(attempt, %err, "local subscription write failed; retrying once");
            if let Err(err) = self.store.set(USER_SUBSCRIPTION_KEY, &encoded).await {
                error!(attempt, %err, "local subscription write failed after retry; backend record stands");
                return false;
            }
        }
        true
    }
}
