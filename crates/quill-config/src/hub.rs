//! Hub (remote activity server) connection settings.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

fn default_api_url() -> String {
    "http://fedbox.git".to_string()
}

fn default_user_agent() -> String {
    "quill/0.1".to_string()
}

/// Default request timeout in seconds.
const fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HubConfig {
    /// Base URL of the hub's API (e.g., `https://fedbox.example`).
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// `User-Agent` sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Client-side request timeout. `0` leaves deadlines to the caller.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl HubConfig {
    /// Check if the hub config has the minimum required fields.
    pub fn is_configured(&self) -> bool {
        !self.api_url.is_empty()
    }

    /// API URL without a trailing slash.
    pub fn api_url(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }

    /// Ensure the API URL is an absolute http(s) URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotConfigured`] when `api_url` is empty and
    /// [`ConfigError::InvalidValue`] when it has no http(s) scheme.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.is_configured() {
            return Err(ConfigError::NotConfigured {
                section: "hub".into(),
            });
        }
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                field: "hub.api_url".into(),
                reason: format!("'{}' is not an http(s) URL", self.api_url),
            });
        }
        Ok(())
    }
}
