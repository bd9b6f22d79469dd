//! REST client for the annealing service.
//!
//! A single endpoint is involved: `POST /task` takes the QUBO matrix together
//! with the annealing parameters and answers with the solution as JSON.
//!
//! ```text
//! POST {host}/task
//! Authorization: Bearer <token>
//!
//! {"matrix": [[-1, 2], [0, -1]],
//!  "parameter": {"temp_start": 5, "temp_end": 0.1, "tau": 0.9999,
//!                "beta": 0.02, "maximize": false, "algorithm": null}}
//! ```

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use ndarray::Array2;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::config::Configuration;
use crate::error::{QuboError, QuboResult};

/// Default start temperature.
pub const DEFAULT_TEMP_START: f64 = 5.0;
/// Default end temperature.
pub const DEFAULT_TEMP_END: f64 = 0.1;
/// Default cooling ratio (`T_new = tau * T`).
pub const DEFAULT_TAU: f64 = 0.9999;
/// Default acceptance scaling (`exp(-dE * beta)`).
pub const DEFAULT_BETA: f64 = 0.02;

/// Dense QUBO matrix, row-major.
///
/// Expected to be symmetric or upper triangular; the shape is passed to the
/// server unchecked.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Matrix(Vec<Vec<f64>>);

impl Matrix {
    pub fn new(rows: Vec<Vec<f64>>) -> Self {
        Self(rows)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `(rows, columns)`, with the width taken from the first row.
    pub fn shape(&self) -> (usize, usize) {
        (self.0.len(), self.0.first().map_or(0, Vec::len))
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.0
    }

    pub fn into_rows(self) -> Vec<Vec<f64>> {
        self.0
    }
}

impl From<Vec<Vec<f64>>> for Matrix {
    fn from(rows: Vec<Vec<f64>>) -> Self {
        Self(rows)
    }
}

impl<const N: usize> From<[[f64; N]; N]> for Matrix {
    fn from(rows: [[f64; N]; N]) -> Self {
        Self(rows.iter().map(|row| row.to_vec()).collect())
    }
}

impl From<&Array2<f64>> for Matrix {
    fn from(array: &Array2<f64>) -> Self {
        Self(array.outer_iter().map(|row| row.to_vec()).collect())
    }
}

impl From<Array2<f64>> for Matrix {
    fn from(array: Array2<f64>) -> Self {
        Self::from(&array)
    }
}

/// Solver algorithm run by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Algorithm {
    /// Exhaustive search.
    #[serde(rename = "bf")]
    BruteForce,
    /// Simulated annealing.
    #[serde(rename = "sa")]
    SimulatedAnnealing,
    /// Simulated quantum annealing.
    #[serde(rename = "sqa")]
    SimulatedQuantumAnnealing,
}

impl Algorithm {
    /// Wire identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BruteForce => "bf",
            Self::SimulatedAnnealing => "sa",
            Self::SimulatedQuantumAnnealing => "sqa",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = QuboError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bf" | "bruteforce" | "brute-force" => Ok(Self::BruteForce),
            "sa" => Ok(Self::SimulatedAnnealing),
            "sqa" => Ok(Self::SimulatedQuantumAnnealing),
            other => Err(QuboError::config(format!(
                "unknown algorithm '{other}' (expected bf, sa or sqa)"
            ))),
        }
    }
}

/// Annealing parameters as sent to the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub temp_start: f64,
    pub temp_end: f64,
    pub tau: f64,
    pub beta: f64,
    pub maximize: bool,
    /// `None` lets the server pick.
    pub algorithm: Option<Algorithm>,
}

impl Default for Parameter {
    fn default() -> Self {
        Self {
            temp_start: DEFAULT_TEMP_START,
            temp_end: DEFAULT_TEMP_END,
            tau: DEFAULT_TAU,
            beta: DEFAULT_BETA,
            maximize: false,
            algorithm: None,
        }
    }
}

/// Request body of `POST /task`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub matrix: Matrix,
    pub parameter: Parameter,
}

impl Task {
    pub fn new(matrix: impl Into<Matrix>, parameter: Parameter) -> Self {
        Self {
            matrix: matrix.into(),
            parameter,
        }
    }
}

/// Client for the problem endpoints.
#[derive(Clone)]
pub struct ProblemApi {
    client: Client,
    configuration: Configuration,
}

impl fmt::Debug for ProblemApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProblemApi")
            .field("configuration", &self.configuration)
            .finish()
    }
}

impl ProblemApi {
    /// Create a client for `configuration`.
    pub fn new(configuration: Configuration) -> QuboResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            configuration,
        })
    }

    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    /// Submit a task and return the parsed JSON answer.
    #[instrument(skip(self, task), fields(size = task.matrix.len()))]
    pub async fn task_post(&self, task: &Task) -> QuboResult<Value> {
        let url = self.configuration.url("/task");
        debug!("Submitting task to {}", url);

        let mut request = self.client.post(&url).json(task);
        if let Some(ref token) = self.configuration.access_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        self.handle_response(response).await
    }

    /// Map the HTTP response to JSON or an error.
    async fn handle_response(&self, response: reqwest::Response) -> QuboResult<Value> {
        let status = response.status();

        if status.is_success() {
            let body: Value = response.json().await?;
            return unwrap_json_string(body);
        }

        let message = response.text().await.unwrap_or_default();
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(QuboError::AuthFailed(message)),
            _ => Err(QuboError::ApiError {
                status: status.as_u16(),
                message,
            }),
        }
    }
}

/// The service may answer with a JSON document encoded as a JSON string.
fn unwrap_json_string(body: Value) -> QuboResult<Value> {
    match body {
        Value::String(inner) => Ok(serde_json::from_str(&inner)?),
        other => Ok(other),
    }
}
