//! User-facing solver.
//!
//! [`SolverBuilder::connect`] turns whatever the caller supplied (token,
//! username/password, credential file) into an access token once; the
//! resulting [`Solver`] then submits any number of problems with it.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::api::{
    Algorithm, DEFAULT_BETA, DEFAULT_TAU, DEFAULT_TEMP_END, DEFAULT_TEMP_START, Matrix, Parameter,
    ProblemApi, Task,
};
use crate::auth::{OidcClient, OidcConfig, PasswordGrant, StaticToken, TokenProvider};
use crate::config::{Configuration, DEFAULT_HOST};
use crate::credentials::CredentialStore;
use crate::error::QuboResult;
use crate::result::SolverResult;

/// Per-call options of [`Solver::solve`].
#[derive(Debug, Clone, PartialEq)]
pub struct SolveParams {
    /// Constant term of the QUBO, added to every returned energy.
    pub offset: f64,
    /// Start temperature.
    pub temp_start: f64,
    /// End temperature.
    pub temp_end: f64,
    /// Cooling ratio: `T_new = tau * T`.
    pub tau: f64,
    /// Acceptance probability scaling: `exp(-dE * beta)`.
    pub beta: f64,
    /// Maximize instead of minimize the energy.
    pub maximize: bool,
    /// Algorithm; `None` leaves the choice to the server.
    pub algorithm: Option<Algorithm>,
}

impl Default for SolveParams {
    fn default() -> Self {
        Self {
            offset: 0.0,
            temp_start: DEFAULT_TEMP_START,
            temp_end: DEFAULT_TEMP_END,
            tau: DEFAULT_TAU,
            beta: DEFAULT_BETA,
            maximize: false,
            algorithm: None,
        }
    }
}

impl SolveParams {
    pub fn with_offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_temp_start(mut self, temp_start: f64) -> Self {
        self.temp_start = temp_start;
        self
    }

    pub fn with_temp_end(mut self, temp_end: f64) -> Self {
        self.temp_end = temp_end;
        self
    }

    pub fn with_tau(mut self, tau: f64) -> Self {
        self.tau = tau;
        self
    }

    pub fn with_beta(mut self, beta: f64) -> Self {
        self.beta = beta;
        self
    }

    pub fn maximize(mut self, maximize: bool) -> Self {
        self.maximize = maximize;
        self
    }

    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = Some(algorithm);
        self
    }

    /// Wire form of the annealing parameters. The offset stays client side.
    pub fn parameter(&self) -> Parameter {
        Parameter {
            temp_start: self.temp_start,
            temp_end: self.temp_end,
            tau: self.tau,
            beta: self.beta,
            maximize: self.maximize,
            algorithm: self.algorithm,
        }
    }
}

/// Collects credentials and endpoints for a [`Solver`].
///
/// The first time, username and password are required; they are written to
/// the credential file so later sessions can connect without them.
#[derive(Default)]
pub struct SolverBuilder {
    username: Option<String>,
    password: Option<String>,
    file: Option<PathBuf>,
    token: Option<String>,
    provider: Option<Arc<dyn TokenProvider>>,
    oidc: Option<OidcConfig>,
    host: Option<String>,
}

impl std::fmt::Debug for SolverBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolverBuilder")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("file", &self.file)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("oidc", &self.oidc)
            .field("host", &self.host)
            .finish_non_exhaustive()
    }
}

impl SolverBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Username for the identity provider.
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Password for the identity provider.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Credential file location (file or directory).
    pub fn credentials_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Access token from the developer portal; skips the password grant.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Custom token source; takes precedence over stored credentials.
    pub fn token_provider(mut self, provider: Arc<dyn TokenProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Identity provider settings (default: Quantum Circle Keycloak).
    pub fn oidc_config(mut self, config: OidcConfig) -> Self {
        self.oidc = Some(config);
        self
    }

    /// API base URL (default: [`DEFAULT_HOST`]).
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Resolve credentials, obtain an access token and build the solver.
    #[instrument(skip(self))]
    pub async fn connect(self) -> QuboResult<Solver> {
        let store = CredentialStore::resolve(self.file.as_ref());
        let has_token = self.token.is_some() || self.provider.is_some();

        if !(has_token && self.username.is_none() && self.password.is_none()) {
            store.accept(self.username.as_deref(), self.password.as_deref())?;
        }

        let provider: Arc<dyn TokenProvider> = match (self.token, self.provider) {
            (Some(token), _) => {
                debug!("Using supplied access token");
                Arc::new(StaticToken::new(token))
            }
            (None, Some(provider)) => provider,
            (None, None) => {
                let credentials = store.load()?;
                let client = OidcClient::new(self.oidc.unwrap_or_default())?;
                Arc::new(PasswordGrant::new(client, credentials))
            }
        };

        let token = provider.get_token().await?;
        let configuration = Configuration::new()
            .with_host(self.host.unwrap_or_else(|| DEFAULT_HOST.to_string()))
            .with_access_token(token);

        info!("Connected to {}", configuration.host);
        Solver::from_configuration(configuration)
    }
}

/// Authorized client for the annealing service.
#[derive(Debug, Clone)]
pub struct Solver {
    api: ProblemApi,
}

impl Solver {
    /// Start configuring a solver.
    pub fn builder() -> SolverBuilder {
        SolverBuilder::new()
    }

    /// Build a solver from a ready configuration (token already set).
    pub fn from_configuration(configuration: Configuration) -> QuboResult<Self> {
        Ok(Self {
            api: ProblemApi::new(configuration)?,
        })
    }

    pub fn configuration(&self) -> &Configuration {
        self.api.configuration()
    }

    /// Solve a QUBO.
    ///
    /// `matrix` must be symmetric or upper triangular. Energies in the
    /// result include `params.offset`.
    #[instrument(skip(self, matrix, params))]
    pub async fn solve(
        &self,
        matrix: impl Into<Matrix>,
        params: &SolveParams,
    ) -> QuboResult<SolverResult> {
        let task = Task::new(matrix, params.parameter());
        let (rows, cols) = task.matrix.shape();
        debug!(
            "Solving {}x{} QUBO (algorithm: {})",
            rows,
            cols,
            params
                .algorithm
                .map_or("server default", |a| a.as_str())
        );

        let response = self.api.task_post(&task).await?;
        let result = SolverResult::from_response(&response, params.offset)?;
        info!("{}", result);
        Ok(result)
    }
}
