use crate::domain::payment::{Plan, SubscriptionRecord, USER_SUBSCRIPTION_KEY};
use crate::domain::ports::{LocalStoreBox, PlanDirectoryBox};
use crate::error::Result;
use tracing::warn;

/// Read model behind the subscription screen: the locally persisted
/// active record plus the backend plan catalog.
pub struct SubscriptionOverview {
    plans: PlanDirectoryBox,
    store: LocalStoreBox,
}

impl SubscriptionOverview {
    pub fn new(plans: PlanDirectoryBox, store: LocalStoreBox) -> Self {
        Self { plans, store }
    }

    /// The active subscription, if one was recorded on this device.
    /// A record that no longer decodes is treated as absent.
    pub async fn active_subscription(&self) -> Result<Option<SubscriptionRecord>> {
        let Some(raw) = self.store.get(USER_SUBSCRIPTION_KEY).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(record) => Ok(Some(record)),
            Err(err) => {
                warn!(%err, "stored subscription record is not decodable; ignoring");
                Ok(None)
            }
        }
    }

    /// The backend plan catalog.
    pub async fn plans(&self) -> Result<Vec<Plan>> {
        self.plans.plans().await
    }

    /// Whether `plan` is the currently active one. Matched by plan
    /// name, which is how the subscription screen highlights it.
    pub async fn is_active_plan(&self, plan: &Plan) -> Result<bool> {
        Ok(self
            .active_subscription()
            .await?
            .is_some_and(|record| record.plan_name == plan.name))
    }
}
