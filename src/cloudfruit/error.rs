use crate::model::RecordId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CloudError {
    #[error("Account not found. Sign in to an account in Settings.")]
    AccountNotFound,

    #[error("Account status could not be determined.")]
    AccountNotDetermined,

    #[error("Account is restricted.")]
    AccountRestricted,

    #[error("Account is temporarily unavailable.")]
    AccountTemporarilyUnavailable,

    #[error("Account status is unknown.")]
    AccountUnknown,

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Record not found: {0}")]
    RecordNotFound(RecordId),

    #[error("Subscription not found: {0}")]
    SubscriptionNotFound(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Record is missing field '{0}'")]
    MissingField(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Api Error: {0}")]
    Api(String),
}

pub type Result<T> = std::result::Result<T, CloudError>;
