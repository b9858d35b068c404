//! Error types for the notifier.
//!
//! Configuration problems are reported before any network activity; delivery
//! problems are caught at the SMTP boundary and surfaced as a failed send.

use thiserror::Error;

/// Missing or unusable configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("NOTIFICATION_EMAIL must be set as an environment variable")]
    MissingRecipient,

    #[error("SENDER_EMAIL and SENDER_PASSWORD must be set as environment variables")]
    MissingSenderCredentials,
}

/// Errors that can occur while delivering the notification email
#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid SMTP port: {0:?}")]
    InvalidPort(String),

    #[error("invalid email address: {0}")]
    InvalidAddress(#[from] lettre::address::AddressError),

    #[error("failed to build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// Top-level outcome of a notification run
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("notification delivery failed")]
    DeliveryFailed,

    #[error("failed to render preview: {0}")]
    Preview(#[from] serde_json::Error),
}

impl NotifyError {
    /// Process exit code for this failure
    pub fn exit_code(&self) -> u8 {
        1
    }
}
