use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Storage key for the active subscription record.
pub const USER_SUBSCRIPTION_KEY: &str = "USER_SUBSCRIPTION";

/// Payment methods offered at checkout.
///
/// Wire codes match the backend's method table: Cash 0, Stripe 1,
/// Afterpay 3, Bpoint 4. Afterpay exists in the table but is not
/// supported by the flow.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
pub enum PaymentMethod {
    Cash,
    Stripe,
    Afterpay,
    Bpoint,
}

impl PaymentMethod {
    /// Numeric code sent to the record-payment endpoint.
    pub fn code(&self) -> u8 {
        match self {
            PaymentMethod::Cash => 0,
            PaymentMethod::Stripe => 1,
            PaymentMethod::Afterpay => 3,
            PaymentMethod::Bpoint => 4,
        }
    }

    /// Whether the method collects card details through the app's own form.
    pub fn uses_card_form(&self) -> bool {
        matches!(self, PaymentMethod::Bpoint)
    }

    /// Whether the method is card-backed at all.
    pub fn is_card(&self) -> bool {
        matches!(self, PaymentMethod::Stripe | PaymentMethod::Bpoint)
    }
}

/// A plan as offered by the backend catalog.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Plan {
    pub id: i64,
    pub name: String,
    pub price: Decimal,
    pub currency: String,
    #[serde(default)]
    pub invoice_interval: Option<String>,
}

/// The plan the user picked, as handed to the checkout sequencer.
#[derive(Debug, PartialEq, Clone)]
pub struct PlanSelection {
    pub id: Option<i64>,
    pub name: String,
    pub price: Decimal,
    pub currency: String,
}

impl From<&Plan> for PlanSelection {
    fn from(plan: &Plan) -> Self {
        Self {
            id: Some(plan.id),
            name: plan.name.clone(),
            price: plan.price,
            currency: plan.currency.clone(),
        }
    }
}

/// Token or reference returned by the attach-payment-method call.
#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct CardAttachment {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub reference: Option<String>,
}

impl CardAttachment {
    /// The reference to record: token first, then reference, then the
    /// gateway's legacy success marker.
    pub fn payment_reference(&self) -> String {
        self.token
            .clone()
            .or_else(|| self.reference.clone())
            .unwrap_or_else(|| "BPOINT-SUCCESS".to_string())
    }
}

/// Input to the record-payment endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentRecordRequest {
    pub plan: PlanSelection,
    pub reference: String,
    pub method: PaymentMethod,
}

/// The authoritative payment record created by the backend.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct PaymentRecord {
    pub id: i64,
    #[serde(default, alias = "message")]
    pub status: Option<String>,
}

/// The single locally persisted subscription. Written only after the
/// backend confirms the payment record; last write wins, no history.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionRecord {
    pub plan_name: String,
    pub plan_price: Decimal,
    pub plan_currency: String,
    pub payment_method: PaymentMethod,
    pub payment_reference: String,
    pub card_last4: Option<String>,
    pub purchased_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_method_codes() {
        assert_eq!(PaymentMethod::Cash.code(), 0);
        assert_eq!(PaymentMethod::Stripe.code(), 1);
        assert_eq!(PaymentMethod::Afterpay.code(), 3);
        assert_eq!(PaymentMethod::Bpoint.code(), 4);
    }

    #[test]
    fn test_only_bpoint_uses_card_form() {
        assert!(PaymentMethod::Bpoint.uses_card_form());
        assert!(!PaymentMethod::Stripe.uses_card_form());
        assert!(PaymentMethod::Stripe.is_card());
        assert!(!PaymentMethod::Cash.is_card());
    }

    #[test]
    fn test_attachment_reference_fallback() {
        let both = CardAttachment {
            token: Some("tok_1".to_string()),
            reference: Some("ref_1".to_string()),
        };
        assert_eq!(both.payment_reference(), "tok_1");

        let reference_only = CardAttachment {
            token: None,
            reference: Some("ref_1".to_string()),
        };
        assert_eq!(reference_only.payment_reference(), "ref_1");

        assert_eq!(CardAttachment::default().payment_reference(), "BPOINT-SUCCESS");
    }

    #[test]
    fn test_subscription_record_field_names() {
        let record = SubscriptionRecord {
            plan_name: "Monthly".to_string(),
            plan_price: dec!(44.99),
            plan_currency: "AUD".to_string(),
            payment_method: PaymentMethod::Bpoint,
            payment_reference: "BPOINT-TOKEN-1".to_string(),
            card_last4: Some("0366".to_string()),
            purchased_at: "2025-06-15T00:00:00Z".parse().unwrap(),
        };
        let json = serde_json::to_string(&record).unwrap();
        for key in [
            "planName",
            "planPrice",
            "planCurrency",
            "paymentMethod",
            "paymentReference",
            "cardLast4",
            "purchasedAt",
        ] {
            assert!(json.contains(key), "missing {key} in {json}");
        }

        let back: SubscriptionRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_payment_record_accepts_message_alias() {
        let record: PaymentRecord =
            serde_json::from_str(r#"{"id": 7, "message": "Payment recorded successfully"}"#)
                .unwrap();
        assert_eq!(record.id, 7);
        assert_eq!(record.status.as_deref(), Some("Payment recorded successfully"));
    }
}
