//! API client configuration.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Default base URL of the annealing service.
pub const DEFAULT_HOST: &str = "https://api.quantum-circle.com/qubosolv";

/// Settings shared by every call of an API client session.
#[derive(Clone, Serialize, Deserialize)]
pub struct Configuration {
    /// Base URL, without trailing slash.
    pub host: String,
    /// Bearer token sent with every request.
    #[serde(skip_serializing)]
    pub access_token: Option<String>,
}

impl Configuration {
    /// Configuration for the default host with no token.
    pub fn new() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            access_token: None,
        }
    }

    /// Set the base URL.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the access token.
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Full URL of an endpoint path.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.host, path.trim_start_matches('/'))
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("host", &self.host)
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joining() {
        let config = Configuration::new().with_host("http://127.0.0.1:9000/api/");
        assert_eq!(config.url("/task"), "http://127.0.0.1:9000/api/task");
        assert_eq!(config.url("task"), "http://127.0.0.1:9000/api/task");
    }

    #[test]
    fn test_token_not_serialized_or_printed() {
        let config = Configuration::new().with_access_token("very-secret");
        assert!(!format!("{config:?}").contains("very-secret"));
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("very-secret"));
        assert!(json.contains(DEFAULT_HOST));
    }
}
