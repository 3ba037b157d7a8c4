use crate::domain::card::ValidationResult;
use crate::domain::registration::FieldErrors;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CheckoutError>;

/// Crate-wide error taxonomy. Each variant maps to one user-visible
/// failure category; the presentation layer owns the final wording.
#[derive(Error, Debug)]
pub enum CheckoutError {
    /// The card form failed local validation; no network call was made.
    #[error("card validation failed")]
    Validation(ValidationResult),
    #[error("authorization failed: {0}")]
    Authorization(String),
    #[error("card attachment failed: {0}")]
    Attach(String),
    #[error("payment recording failed: {0}")]
    Recording(String),
    #[error("unknown payment method")]
    UnknownMethod,
    /// A submit arrived while another attempt was still in flight.
    #[error("a payment attempt is already in progress")]
    AttemptInProgress,
    /// Raw backend or transport failure, assigned to a checkout step by
    /// the sequencer.
    #[error("{0}")]
    Backend(String),
    #[error("registration validation failed")]
    RegistrationValidation(FieldErrors),
    #[error("missing registration prerequisite: {0}")]
    MissingPrerequisite(&'static str),
    #[error("local store error: {0}")]
    Store(String),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CheckoutError {
    /// The message to carry into a step-specific failure.
    pub fn backend_message(&self) -> String {
        match self {
            CheckoutError::Backend(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for CheckoutError {
    fn from(err: rocksdb::Error) -> Self {
        CheckoutError::Store(err.to_string())
    }
}
