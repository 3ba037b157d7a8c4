use crate::config::BackendConfig;
use crate::domain::card::CardInput;
use crate::domain::payment::{CardAttachment, PaymentRecord, PaymentRecordRequest, Plan};
use crate::domain::ports::{PaymentGateway, PlanDirectory, RegistrationApi};
use crate::domain::registration::{NewAddress, NewBusiness, NewOrganizationOwner, NewUser};
use crate::error::{CheckoutError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

/// Panel marker the mobile client sends on every wizard write.
const CLIENT_PANEL: &str = "0";

/// REST client for the Tradie+ backend.
///
/// Implements the payment gateway, the plan catalog and the
/// registration endpoints over one shared `reqwest::Client`. Writes are
/// form-encoded the way the backend expects; card data goes out over
/// TLS only and is never logged.
pub struct HttpBackend {
    client: reqwest::Client,
    config: BackendConfig,
}

/// Responses arrive wrapped in a `{ "data": … }` envelope.
#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Deserialize)]
struct AuthKeyResponse {
    auth_key: String,
}

/// The backend writes ids as numbers or strings depending on the
/// resource.
#[derive(Deserialize)]
#[serde(untagged)]
enum IdValue {
    Number(i64),
    Text(String),
}

impl IdValue {
    fn into_string(self) -> String {
        match self {
            IdValue::Number(n) => n.to_string(),
            IdValue::Text(s) => s,
        }
    }
}

#[derive(Deserialize)]
struct CreatedResource {
    #[serde(default)]
    id: Option<IdValue>,
}

impl CreatedResource {
    fn id_string(self) -> Option<String> {
        self.id.map(IdValue::into_string)
    }
}

impl HttpBackend {
    pub fn new(config: BackendConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    pub fn from_env() -> Self {
        Self::new(BackendConfig::from_env())
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn apply_headers(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let request = request
            .header("Accept", "application/json")
            .header("client-secret", &self.config.client_secret);
        match &self.config.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        form: &[(&str, String)],
    ) -> Result<T> {
        let url = self.url(path);
        debug!(%url, "backend POST");
        let response = self
            .apply_headers(self.client.post(&url))
            .form(form)
            .send()
            .await
            .map_err(transport_error)?;
        decode(response).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        debug!(%url, "backend GET");
        let response = self
            .apply_headers(self.client.get(&url))
            .send()
            .await
            .map_err(transport_error)?;
        decode(response).await
    }
}

fn transport_error(err: reqwest::Error) -> CheckoutError {
    debug!(%err, "backend transport error");
    CheckoutError::Backend("network error; please try again".to_string())
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(CheckoutError::Backend(error_message(status, &body)));
    }
    response.json::<T>().await.map_err(transport_error)
}

/// Prefer the backend's own message field when it sends one.
fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        message: String,
    }
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed.message,
        Err(_) => format!("backend returned {status}"),
    }
}

#[async_trait]
impl PaymentGateway for HttpBackend {
    async fn auth_key(&self, panel_id: u32) -> Result<String> {
        let form = [("panel_id", panel_id.to_string())];
        let envelope: Envelope<AuthKeyResponse> =
            self.post_form("bpoint-gateways/auth-key", &form).await?;
        Ok(envelope.data.auth_key)
    }

    async fn attach_card(&self, card: &CardInput, auth_key: &str) -> Result<CardAttachment> {
        // The only request carrying raw card details; built inline so
        // the PAN never passes through a loggable value.
        let form = [
            ("card_name", card.name.clone()),
            ("card_number", card.digits()),
            ("card_expire_month", card.expire_month.clone()),
            ("card_expire_year", card.expire_year.clone()),
            ("card_cvn", card.cvn.clone()),
            ("auth_key", auth_key.to_string()),
        ];
        let envelope: Envelope<CardAttachment> = self
            .post_form("bpoint-gateways/attach-payment-method", &form)
            .await?;
        Ok(envelope.data)
    }

    async fn record_payment(&self, request: &PaymentRecordRequest) -> Result<PaymentRecord> {
        let mut form = vec![
            ("plan_name", request.plan.name.clone()),
            ("amount", request.plan.price.to_string()),
            ("currency", request.plan.currency.clone()),
            ("reference", request.reference.clone()),
            ("type", request.method.code().to_string()),
        ];
        if let Some(plan_id) = request.plan.id {
            form.push(("plan_id", plan_id.to_string()));
        }
        let envelope: Envelope<PaymentRecord> = self.post_form("payments", &form).await?;
        Ok(envelope.data)
    }
}

#[async_trait]
impl PlanDirectory for HttpBackend {
    async fn plans(&self) -> Result<Vec<Plan>> {
        let envelope: Envelope<Vec<Plan>> = self.get_json("plans").await?;
        Ok(envelope.data)
    }
}

#[async_trait]
impl RegistrationApi for HttpBackend {
    async fn create_user(&self, user: &NewUser) -> Result<String> {
        let form = [
            ("role_id", NewUser::ROLE_ID.to_string()),
            ("first_name", user.first_name.clone()),
            ("last_name", user.last_name.clone()),
            ("email", user.email.clone()),
            ("phone_number", user.phone_number.clone()),
            ("date_of_birth", user.date_of_birth.clone()),
            ("password", user.password.clone()),
        ];
        let envelope: Envelope<CreatedResource> = self.post_form("users", &form).await?;
        envelope
            .data
            .id_string()
            .ok_or_else(|| CheckoutError::Backend("user id missing from response".to_string()))
    }

    async fn create_address(&self, user_id: &str, address: &NewAddress) -> Result<String> {
        let form = [
            ("user_id", user_id.to_string()),
            ("subpremise", address.subpremise.clone()),
            ("street", address.street.clone()),
            ("suburb", address.suburb.clone()),
            ("state", address.state.clone()),
            ("post_code", address.post_code.clone()),
            ("country", address.country.clone()),
            ("client_panel", CLIENT_PANEL.to_string()),
        ];
        let envelope: Envelope<CreatedResource> = self.post_form("addresses", &form).await?;
        envelope
            .data
            .id_string()
            .ok_or_else(|| CheckoutError::Backend("address id missing from response".to_string()))
    }

    async fn create_business(
        &self,
        user_id: &str,
        address_id: &str,
        business: &NewBusiness,
    ) -> Result<String> {
        let form = [
            ("user_id", user_id.to_string()),
            ("address_id", address_id.to_string()),
            ("name", business.name.clone()),
            ("client_panel", CLIENT_PANEL.to_string()),
        ];
        let envelope: Envelope<CreatedResource> = self.post_form("businesses", &form).await?;
        envelope
            .data
            .id_string()
            .ok_or_else(|| CheckoutError::Backend("business id missing from response".to_string()))
    }

    async fn create_organization_owner(
        &self,
        user_id: &str,
        address_id: Option<&str>,
        business_id: &str,
        owner: &NewOrganizationOwner,
    ) -> Result<Option<String>> {
        let form = [
            ("user_id", user_id.to_string()),
            ("address_id", address_id.unwrap_or_default().to_string()),
            ("type", owner.org_type.code().to_string()),
            ("status", owner.status.code().to_string()),
            ("business_id", business_id.to_string()),
            ("client_panel", CLIENT_PANEL.to_string()),
        ];
        let envelope: Envelope<CreatedResource> =
            self.post_form("organization-owner", &form).await?;
        Ok(envelope.data.id_string())
    }
}
