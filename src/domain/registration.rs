use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Storage key for the in-progress registration session snapshot.
pub const REGISTRATION_SESSION_KEY: &str = "REGISTRATION_SESSION";

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z\s-]+$").expect("valid name pattern"));

/// Field-keyed errors for one registration step. Empty means valid.
pub type FieldErrors = BTreeMap<&'static str, String>;

/// Step 1: the new user account form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    /// Optional; sent as an empty string when absent.
    pub date_of_birth: String,
    pub password: String,
    pub confirm_password: String,
}

impl NewUser {
    /// Role assigned to self-registered accounts.
    pub const ROLE_ID: &'static str = "13";

    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if self.first_name.is_empty() {
            errors.insert("first_name", "First name is required.".to_string());
        } else if !NAME_RE.is_match(&self.first_name) {
            errors.insert(
                "first_name",
                "First name should not contain numbers or symbols.".to_string(),
            );
        }
        if self.last_name.is_empty() {
            errors.insert("last_name", "Last name is required.".to_string());
        } else if !NAME_RE.is_match(&self.last_name) {
            errors.insert(
                "last_name",
                "Last name should not contain numbers or symbols.".to_string(),
            );
        }
        if self.email.is_empty() {
            errors.insert("email", "Email is required.".to_string());
        }
        if self.phone_number.is_empty() {
            errors.insert("phone_number", "Phone number is required.".to_string());
        }
        if self.password.is_empty() {
            errors.insert("password", "Password is required.".to_string());
        }
        if self.confirm_password.is_empty() {
            errors.insert("confirm_password", "Confirm password is required.".to_string());
        } else if self.password != self.confirm_password {
            errors.insert("confirm_password", "Passwords don't match.".to_string());
        }
        errors
    }
}

/// Step 2: the address form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewAddress {
    pub subpremise: String,
    pub street: String,
    pub suburb: String,
    pub state: String,
    pub post_code: String,
    pub country: String,
}

impl NewAddress {
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if self.street.is_empty() {
            errors.insert("street", "Street is required.".to_string());
        }
        if self.suburb.is_empty() {
            errors.insert("suburb", "Suburb is required.".to_string());
        }
        if self.state.is_empty() {
            errors.insert("state", "State is required.".to_string());
        }
        if self.post_code.is_empty() {
            errors.insert("post_code", "Post code is required.".to_string());
        }
        if self.country.is_empty() {
            errors.insert("country", "Country is required.".to_string());
        }
        errors
    }
}

/// Step 3: business details.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewBusiness {
    pub name: String,
}

impl NewBusiness {
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if self.name.trim().is_empty() {
            errors.insert("name", "Business name is required.".to_string());
        }
        errors
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrganizationType {
    Managed,
    SelfManaged,
}

impl OrganizationType {
    pub fn code(&self) -> u8 {
        match self {
            OrganizationType::Managed => 0,
            OrganizationType::SelfManaged => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrganizationStatus {
    Inactive,
    Active,
}

impl OrganizationStatus {
    pub fn code(&self) -> u8 {
        match self {
            OrganizationStatus::Inactive => 0,
            OrganizationStatus::Active => 1,
        }
    }
}

/// Step 4: the organization-owner link tying the user, address and
/// business together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewOrganizationOwner {
    pub org_type: OrganizationType,
    pub status: OrganizationStatus,
}

impl Default for NewOrganizationOwner {
    fn default() -> Self {
        Self {
            org_type: OrganizationType::SelfManaged,
            status: OrganizationStatus::Active,
        }
    }
}

/// Ids captured across the registration wizard, threaded explicitly
/// between steps rather than read back from ambient storage.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct RegistrationSession {
    pub user_id: Option<String>,
    pub address_id: Option<String>,
    pub business_id: Option<String>,
    pub organization_owner_id: Option<String>,
}
