use super::card::CardInput;
use super::payment::{CardAttachment, PaymentRecord, PaymentRecordRequest, Plan};
use super::registration::{NewAddress, NewBusiness, NewOrganizationOwner, NewUser};
use crate::error::Result;
use async_trait::async_trait;

/// The three backend operations the checkout flow consumes.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Obtains a short-lived authorization key for an explicit card attach.
    async fn auth_key(&self, panel_id: u32) -> Result<String>;

    /// Sends card data to the gateway; returns the token/reference to
    /// record. The only operation that carries a raw PAN.
    async fn attach_card(&self, card: &CardInput, auth_key: &str) -> Result<CardAttachment>;

    /// Creates the authoritative payment record.
    async fn record_payment(&self, request: &PaymentRecordRequest) -> Result<PaymentRecord>;
}

/// Read side of the backend plan catalog.
#[async_trait]
pub trait PlanDirectory: Send + Sync {
    async fn plans(&self) -> Result<Vec<Plan>>;
}

/// Backend writes issued by the registration wizard, one per step.
/// Each returns the created resource id the next step needs.
#[async_trait]
pub trait RegistrationApi: Send + Sync {
    async fn create_user(&self, user: &NewUser) -> Result<String>;

    async fn create_address(&self, user_id: &str, address: &NewAddress) -> Result<String>;

    async fn create_business(
        &self,
        user_id: &str,
        address_id: &str,
        business: &NewBusiness,
    ) -> Result<String>;

    /// The backend does not always echo an id for the owner link.
    async fn create_organization_owner(
        &self,
        user_id: &str,
        address_id: Option<&str>,
        business_id: &str,
        owner: &NewOrganizationOwner,
    ) -> Result<Option<String>>;
}

/// Device-local key-value store (string keys and values).
#[async_trait]
pub trait LocalStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> Result<()>;
    async fn remove(&self, key: &str) -> Result<()>;
}

/// Local user-facing acknowledgment (toast/push). Best-effort: callers
/// ignore failures.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, title: &str, body: &str) -> Result<()>;
}

pub type PaymentGatewayBox = Box<dyn PaymentGateway>;
pub type PlanDirectoryBox = Box<dyn PlanDirectory>;
pub type RegistrationApiBox = Box<dyn RegistrationApi>;
pub type LocalStoreBox = Box<dyn LocalStore>;
pub type NotifierBox = Box<dyn Notifier>;
