//! Settings describing this deployment (the web front end).

use serde::{Deserialize, Serialize};

fn default_base_url() -> String {
    "http://quill.git".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InstanceConfig {
    /// Public URL of the deployment, used for profile and permalink URLs.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Host name shown to users.
    #[serde(default)]
    pub host_name: String,
}

impl Default for InstanceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            host_name: String::new(),
        }
    }
}

impl InstanceConfig {
    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}
