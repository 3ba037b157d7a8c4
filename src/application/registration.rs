use crate::domain::ports::{LocalStoreBox, RegistrationApiBox};
use crate::domain::registration::{
    NewAddress, NewBusiness, NewOrganizationOwner, NewUser, REGISTRATION_SESSION_KEY,
    RegistrationSession,
};
use crate::error::{CheckoutError, Result};
use tracing::info;

/// The four-step onboarding wizard: user, address, business,
/// organization owner.
///
/// Each step validates its form, performs exactly one backend write,
/// records the returned id on the session, and persists the session
/// snapshot before handing it back. The session travels with the
/// caller; a later step refuses to run until the ids it needs are
/// present.
pub struct RegistrationFlow {
    api: RegistrationApiBox,
    store: LocalStoreBox,
}

impl RegistrationFlow {
    pub fn new(api: RegistrationApiBox, store: LocalStoreBox) -> Self {
        Self { api, store }
    }

    /// Reloads the last persisted session, e.g. after an app restart.
    pub async fn resume(&self) -> Result<RegistrationSession> {
        match self.store.get(REGISTRATION_SESSION_KEY).await? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(RegistrationSession::default()),
        }
    }

    pub async fn submit_user(
        &self,
        mut session: RegistrationSession,
        form: &NewUser,
    ) -> Result<RegistrationSession> {
        let errors = form.validate();
        if !errors.is_empty() {
            return Err(CheckoutError::RegistrationValidation(errors));
        }
        let user_id = self.api.create_user(form).await?;
        info!(%user_id, "user account created");
        session.user_id = Some(user_id);
        self.checkpoint(&session).await?;
        Ok(session)
    }

    pub async fn submit_address(
        &self,
        mut session: RegistrationSession,
        form: &NewAddress,
    ) -> Result<RegistrationSession> {
        let errors = form.validate();
        if !errors.is_empty() {
            return Err(CheckoutError::RegistrationValidation(errors));
        }
        let user_id = session
            .user_id
            .clone()
            .ok_or(CheckoutError::MissingPrerequisite("user_id"))?;
        let address_id = self.api.create_address(&user_id, form).await?;
        info!(%address_id, "address created");
        session.address_id = Some(address_id);
        self.checkpoint(&session).await?;
        Ok(session)
    }

    pub async fn submit_business(
        &self,
        mut session: RegistrationSession,
        form: &NewBusiness,
    ) -> Result<RegistrationSession> {
        let errors = form.validate();
        if !errors.is_empty() {
            return Err(CheckoutError::RegistrationValidation(errors));
        }
        let user_id = session
            .user_id
            .clone()
            .ok_or(CheckoutError::MissingPrerequisite("user_id"))?;
        let address_id = session
            .address_id
            .clone()
            .ok_or(CheckoutError::MissingPrerequisite("address_id"))?;
        let business_id = self.api.create_business(&user_id, &address_id, form).await?;
        info!(%business_id, "business created");
        session.business_id = Some(business_id);
        self.checkpoint(&session).await?;
        Ok(session)
    }

    /// The address id is optional here: the backend accepts an owner
    /// link without one.
    pub async fn submit_organization_owner(
        &self,
        mut session: RegistrationSession,
        form: &NewOrganizationOwner,
    ) -> Result<RegistrationSession> {
        let user_id = session
            .user_id
            .clone()
            .ok_or(CheckoutError::MissingPrerequisite("user_id"))?;
        let business_id = session
            .business_id
            .clone()
            .ok_or(CheckoutError::MissingPrerequisite("business_id"))?;
        let owner_id = self
            .api
            .create_organization_owner(&user_id, session.address_id.as_deref(), &business_id, form)
            .await?;
        info!("organization owner created");
        session.organization_owner_id = owner_id;
        self.checkpoint(&session).await?;
        Ok(session)
    }

    async fn checkpoint(&self, session: &RegistrationSession) -> Result<()> {
        let encoded = serde_json::to_string(session)?;
        self.store.set(REGISTRATION_SESSION_KEY, &encoded).await
    }
}
