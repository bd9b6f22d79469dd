//! Identity provider client.
//!
//! The annealing service sits behind a Keycloak realm. Access tokens are
//! obtained with the OAuth2 resource-owner password grant against the realm's
//! token endpoint, which is looked up through OpenID Connect discovery.
//!
//! # Example
//!
//! ```ignore
//! use qubosolv::auth::{OidcClient, OidcConfig};
//! use qubosolv::Credentials;
//!
//! let client = OidcClient::new(OidcConfig::quantum_circle())?;
//! let token = client
//!     .password_grant(&Credentials::new("alice", "secret"))
//!     .await?;
//! println!("expires in {}s", token.expires_in);
//! ```

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::credentials::Credentials;
use crate::error::{QuboError, QuboResult};

/// Keycloak server of the Quantum Circle service.
pub const SERVER_URL: &str = "https://keycloak.quantum-circle.com/auth/";

/// Public client registered for the solver.
pub const CLIENT_ID: &str = "quantum-client";

/// Realm holding the solver users.
pub const REALM_NAME: &str = "quantum";

/// Default environment variable for [`EnvTokenProvider`].
pub const TOKEN_ENV_VAR: &str = "QUBOSOLV_TOKEN";

/// OpenID Connect provider configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct OidcConfig {
    /// Keycloak base URL (e.g. `https://host/auth/`).
    pub server_url: String,

    /// Realm name.
    pub realm: String,

    /// Client ID.
    pub client_id: String,

    /// Client secret (confidential clients only).
    pub client_secret: Option<String>,

    /// Scopes to request.
    pub scopes: Vec<String>,
}

impl OidcConfig {
    /// Configuration for the Quantum Circle Keycloak.
    pub fn quantum_circle() -> Self {
        Self::custom(SERVER_URL, REALM_NAME, CLIENT_ID)
    }

    /// Create a custom configuration.
    pub fn custom(
        server_url: impl Into<String>,
        realm: impl Into<String>,
        client_id: impl Into<String>,
    ) -> Self {
        Self {
            server_url: server_url.into(),
            realm: realm.into(),
            client_id: client_id.into(),
            client_secret: None,
            scopes: vec!["openid".into()],
        }
    }

    /// Set the client secret.
    pub fn with_client_secret(mut self, secret: impl Into<String>) -> Self {
        self.client_secret = Some(secret.into());
        self
    }

    /// Set the scopes.
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    fn realm_url(&self) -> String {
        format!(
            "{}/realms/{}",
            self.server_url.trim_end_matches('/'),
            self.realm
        )
    }

    /// OpenID Connect discovery document URL.
    pub fn well_known_url(&self) -> String {
        format!("{}/.well-known/openid-configuration", self.realm_url())
    }

    /// Token endpoint in the standard Keycloak layout.
    pub fn token_endpoint(&self) -> String {
        format!("{}/protocol/openid-connect/token", self.realm_url())
    }
}

impl Default for OidcConfig {
    fn default() -> Self {
        Self::quantum_circle()
    }
}

impl std::fmt::Debug for OidcConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OidcConfig")
            .field("server_url", &self.server_url)
            .field("realm", &self.realm)
            .field("client_id", &self.client_id)
            .field(
                "client_secret",
                &self.client_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .field("scopes", &self.scopes)
            .finish()
    }
}

/// Subset of the OpenID Connect discovery document.
#[derive(Debug, Clone, Deserialize)]
pub struct WellKnown {
    pub issuer: String,
    pub token_endpoint: String,
    #[serde(default)]
    pub userinfo_endpoint: Option<String>,
    #[serde(default)]
    pub end_session_endpoint: Option<String>,
}

/// Token endpoint response.
#[derive(Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: u64,
    #[serde(default)]
    pub refresh_expires_in: Option<u64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl std::fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("refresh_expires_in", &self.refresh_expires_in)
            .field("scope", &self.scope)
            .finish()
    }
}

/// Client for the identity provider.
#[derive(Debug, Clone)]
pub struct OidcClient {
    config: OidcConfig,
    client: Client,
}

impl OidcClient {
    /// Create a new client.
    pub fn new(config: OidcConfig) -> QuboResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self { config, client })
    }

    /// Provider configuration.
    pub fn config(&self) -> &OidcConfig {
        &self.config
    }

    /// Fetch the discovery document.
    #[instrument(skip(self))]
    pub async fn well_known(&self) -> QuboResult<WellKnown> {
        let url = self.config.well_known_url();
        debug!("Fetching OIDC discovery from {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(QuboError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }

    /// Exchange username/password for an access token.
    #[instrument(skip(self, credentials), fields(username = %credentials.username))]
    pub async fn password_grant(&self, credentials: &Credentials) -> QuboResult<TokenResponse> {
        let endpoint = match self.well_known().await {
            Ok(doc) => doc.token_endpoint,
            Err(e) => {
                warn!("OIDC discovery failed ({}), using default token endpoint", e);
                self.config.token_endpoint()
            }
        };

        let scope = self.config.scopes.join(" ");
        let mut params = vec![
            ("grant_type", "password"),
            ("client_id", self.config.client_id.as_str()),
            ("username", credentials.username.as_str()),
            ("password", credentials.password.as_str()),
            ("scope", scope.as_str()),
        ];
        if let Some(ref secret) = self.config.client_secret {
            params.push(("client_secret", secret.as_str()));
        }

        debug!("Requesting token from {}", endpoint);
        let response = self.client.post(&endpoint).form(&params).send().await?;
        let status = response.status();

        if status.is_success() {
            let token: TokenResponse = response.json().await?;
            debug!("Token issued, expires in {}s", token.expires_in);
            return Ok(token);
        }

        let message = response.text().await.unwrap_or_default();
        match status {
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(QuboError::AuthFailed(message))
            }
            _ => Err(QuboError::ApiError {
                status: status.as_u16(),
                message,
            }),
        }
    }
}

/// Source of access tokens for the API client.
#[async_trait::async_trait]
pub trait TokenProvider: Send + Sync {
    /// Get an access token.
    async fn get_token(&self) -> QuboResult<String>;
}

/// A token handed in by the caller, used as-is.
#[derive(Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl std::fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("StaticToken([REDACTED])")
    }
}

#[async_trait::async_trait]
impl TokenProvider for StaticToken {
    async fn get_token(&self) -> QuboResult<String> {
        Ok(self.0.clone())
    }
}

/// Password grant with fixed credentials.
#[derive(Debug)]
pub struct PasswordGrant {
    client: OidcClient,
    credentials: Credentials,
}

impl PasswordGrant {
    pub fn new(client: OidcClient, credentials: Credentials) -> Self {
        Self {
            client,
            credentials,
        }
    }
}

#[async_trait::async_trait]
impl TokenProvider for PasswordGrant {
    async fn get_token(&self) -> QuboResult<String> {
        let token = self.client.password_grant(&self.credentials).await?;
        Ok(token.access_token)
    }
}

/// Reads the token from an environment variable.
#[derive(Debug, Clone)]
pub struct EnvTokenProvider {
    env_var: String,
}

impl EnvTokenProvider {
    /// Create a provider reading `env_var`.
    pub fn new(env_var: impl Into<String>) -> Self {
        Self {
            env_var: env_var.into(),
        }
    }
}

impl Default for EnvTokenProvider {
    fn default() -> Self {
        Self::new(TOKEN_ENV_VAR)
    }
}

#[async_trait::async_trait]
impl TokenProvider for EnvTokenProvider {
    async fn get_token(&self) -> QuboResult<String> {
        std::env::var(&self.env_var).map_err(|_| {
            QuboError::Configuration(format!("Environment variable {} not set", self.env_var))
        })
    }
}
