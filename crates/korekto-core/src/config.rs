//! Scoring service endpoint settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Path appended to the configured endpoint for every scoring call.
pub const SCORE_ITEM_PATH: &str = "scoreItem";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Where and how to reach the scoring service.
///
/// Built once by the host and only ever read afterwards, so a shared
/// reference can be handed to any number of concurrent evaluations.
///
/// Note: Custom Debug impl masks the password to keep it out of logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Base URL of the scoring service.
    #[serde(default)]
    pub endpoint: String,
    /// HTTP timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// Basic-auth user name.
    #[serde(default)]
    pub user: String,
    /// Basic-auth password.
    #[serde(default)]
    pub password: String,
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            timeout: DEFAULT_TIMEOUT_SECS,
            user: String::new(),
            password: String::new(),
        }
    }
}

impl std::fmt::Debug for EndpointConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EndpointConfig")
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .field("user", &self.user)
            .field("password", &"***")
            .finish()
    }
}

impl EndpointConfig {
    pub fn new(
        endpoint: impl Into<String>,
        timeout: u64,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout,
            user: user.into(),
            password: password.into(),
        }
    }

    /// `{endpoint}/scoreItem`, without doubling a trailing slash.
    pub fn score_item_url(&self) -> String {
        format!("{}/{SCORE_ITEM_PATH}", self.endpoint.trim_end_matches('/'))
    }

    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}
