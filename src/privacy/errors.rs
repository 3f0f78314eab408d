use thiserror::Error;

use super::form::FieldError;

pub const NO_PENDING_REQUESTS: &str = "COM_PRIVACY_ERROR_NO_PENDING_REQUESTS";
pub const CONFIRM_TOKEN_EXPIRED: &str = "COM_PRIVACY_ERROR_CONFIRM_TOKEN_EXPIRED";
pub const PENDING_REQUEST_OPEN: &str = "COM_PRIVACY_ERROR_PENDING_REQUEST_OPEN";
pub const STORAGE_FAILURE: &str = "COM_PRIVACY_ERROR_STORAGE_FAILURE";

/// Errors raised by a `RequestStore` adapter.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[cfg(feature = "database")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Request {id} not found")]
    NotFound { id: i64 },

    #[error("Stored request is corrupt: {reason}")]
    Corrupt { reason: String },
}

/// Errors from hashing or verifying a confirmation token.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Token hashing failed: {0}")]
    Hash(String),

    #[error("Stored token hash is malformed: {0}")]
    MalformedHash(String),
}

/// Outcome of a failed confirmation attempt.
///
/// `NoPendingRequest` deliberately covers "no such request", "request not
/// pending" and "wrong token" so a caller cannot tell which emails have
/// requests on file.
#[derive(Debug, Error)]
pub enum ConfirmError {
    #[error("Confirmation input failed validation")]
    ValidationFailed(Vec<FieldError>),

    #[error("There are no pending information requests for this email address.")]
    NoPendingRequest,

    #[error("The confirmation token for your information request has expired. Please submit a new request.")]
    TokenExpired,

    #[error("The information request could not be saved: {0}")]
    Storage(#[from] StoreError),
}

impl ConfirmError {
    /// Language key identifying the primary message.
    pub fn message_key(&self) -> &'static str {
        match self {
            ConfirmError::ValidationFailed(errors) => errors
                .first()
                .map(|e| e.message_key())
                .unwrap_or(super::form::FIELD_INVALID),
            ConfirmError::NoPendingRequest => NO_PENDING_REQUESTS,
            ConfirmError::TokenExpired => CONFIRM_TOKEN_EXPIRED,
            ConfirmError::Storage(_) => STORAGE_FAILURE,
        }
    }

    /// Ordered, user-facing messages ready for display.
    pub fn messages(&self) -> Vec<String> {
        match self {
            ConfirmError::ValidationFailed(errors) => {
                errors.iter().map(|e| e.to_string()).collect()
            }
            other => vec![other.to_string()],
        }
    }
}

/// Errors raised while filing a new request.
#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("Request input failed validation")]
    ValidationFailed(Vec<FieldError>),

    #[error("There is already a pending information request for this email address.")]
    PendingRequestExists,

    #[error(transparent)]
    Hashing(#[from] TokenError),

    #[error("The information request could not be saved: {0}")]
    Storage(#[from] StoreError),
}

impl IntakeError {
    pub fn message_key(&self) -> &'static str {
        match self {
            IntakeError::ValidationFailed(errors) => errors
                .first()
                .map(|e| e.message_key())
                .unwrap_or(super::form::FIELD_INVALID),
            IntakeError::PendingRequestExists => PENDING_REQUEST_OPEN,
            IntakeError::Hashing(_) | IntakeError::Storage(_) => STORAGE_FAILURE,
        }
    }

    pub fn messages(&self) -> Vec<String> {
        match self {
            IntakeError::ValidationFailed(errors) => {
                errors.iter().map(|e| e.to_string()).collect()
            }
            other => vec![other.to_string()],
        }
    }
}
