//! Environment-driven configuration.
//!
//! The notifier takes all of its input from environment variables. The process
//! environment is captured once into an [`Environment`] snapshot so that every
//! later step reads from the same immutable view (and tests can build one from
//! plain pairs).

use std::collections::HashMap;

use crate::error::ConfigError;

pub const NOTIFICATION_EMAIL: &str = "NOTIFICATION_EMAIL";
pub const SENDER_EMAIL: &str = "SENDER_EMAIL";
pub const SENDER_PASSWORD: &str = "SENDER_PASSWORD";
pub const SMTP_SERVER: &str = "SMTP_SERVER";
pub const SMTP_PORT: &str = "SMTP_PORT";

/// Immutable snapshot of environment variables
#[derive(Debug, Clone, Default)]
pub struct Environment {
    vars: HashMap<String, String>,
}

impl Environment {
    /// Capture the current process environment.
    ///
    /// Variables whose name or value is not valid unicode are skipped.
    pub fn from_process() -> Self {
        Self {
            vars: std::env::vars_os()
                .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
                .collect(),
        }
    }

    /// Build an environment from explicit key/value pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Raw value, including the empty string when set but blank
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Value when set (even if empty), otherwise `default`
    pub fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or(default).to_string()
    }

    /// Value only when set and non-empty
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }

    /// Whether the variable is set to a non-empty value
    pub fn is_set(&self, key: &str) -> bool {
        self.get_non_empty(key).is_some()
    }

    /// Recipient address for the notification
    pub fn recipient(&self) -> Result<String, ConfigError> {
        self.get_non_empty(NOTIFICATION_EMAIL)
            .map(str::to_string)
            .ok_or(ConfigError::MissingRecipient)
    }
}

/// SMTP connection settings
#[derive(Clone)]
pub struct SmtpConfig {
    pub host: String,
    /// Kept unparsed; a bad value is reported as a delivery failure
    pub port: String,
    pub sender: Option<String>,
    pub password: Option<String>,
}

impl SmtpConfig {
    pub fn from_env(env: &Environment) -> Self {
        Self {
            host: env.get_or(SMTP_SERVER, &default_smtp_host()),
            port: env.get_or(SMTP_PORT, &default_smtp_port().to_string()),
            sender: env.get_non_empty(SENDER_EMAIL).map(str::to_string),
            password: env.get_non_empty(SENDER_PASSWORD).map(str::to_string),
        }
    }

    /// Sender address and password, if both are configured
    pub fn credentials(&self) -> Result<(&str, &str), ConfigError> {
        match (&self.sender, &self.password) {
            (Some(sender), Some(password)) => Ok((sender.as_str(), password.as_str())),
            _ => Err(ConfigError::MissingSenderCredentials),
        }
    }

    /// Whether a send can be attempted at all
    pub fn is_configured(&self) -> bool {
        self.credentials().is_ok()
    }
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("sender", &self.sender)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".to_string()
}

fn default_smtp_port() -> u16 {
    587
}
