//! Client for the Quantum Circle QUBO annealing service
//!
//! This crate submits QUBO (Quadratic Unconstrained Binary Optimization)
//! problems to a remote annealer and returns the sampled solutions. The
//! annealing itself runs on the service; the client handles credentials,
//! token acquisition, request construction and response decoding.
//!
//! # Authentication
//!
//! The service is protected by a Keycloak realm. On first use, pass username
//! and password; they are stored in a credential file
//! (`<config dir>/qubosolv/client_secrets.json` unless another path is given)
//! and exchanged for an access token via the OAuth2 password grant. Later
//! sessions read the file. A token from the developer portal can be passed
//! instead and is used as-is.
//!
//! # Example
//!
//! ```ignore
//! use qubosolv::{Algorithm, SolveParams, Solver};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let solver = Solver::builder()
//!         .username("alice")
//!         .password("secret")
//!         .connect()
//!         .await?;
//!
//!     // x0 + x1 - 2 x0 x1, upper triangular
//!     let qubo = vec![vec![1.0, -2.0], vec![0.0, 1.0]];
//!     let params = SolveParams::default()
//!         .with_offset(0.5)
//!         .with_algorithm(Algorithm::SimulatedAnnealing);
//!
//!     let result = solver.solve(qubo, &params).await?;
//!     println!("{result}: {:?}", result.optimal_bitstring);
//!     Ok(())
//! }
//! ```
//!
//! A blocking wrapper is available in [`blocking`].
//!
//! # Parameters
//!
//! | Parameter | Default | Meaning |
//! |-----------|---------|---------|
//! | `temp_start` | 5 | Start temperature |
//! | `temp_end` | 0.1 | End temperature |
//! | `tau` | 0.9999 | Cooling ratio, `T_new = tau * T` |
//! | `beta` | 0.02 | Acceptance scaling, `exp(-dE * beta)` |
//! | `maximize` | false | Maximize instead of minimize |
//! | `algorithm` | server default | `bf`, `sa` or `sqa` |

pub mod api;
pub mod auth;
pub mod blocking;
pub mod config;
pub mod credentials;
pub mod error;
pub mod result;
pub mod solver;

pub use api::{Algorithm, Matrix, Parameter, ProblemApi, Task};
pub use auth::{EnvTokenProvider, OidcClient, OidcConfig, StaticToken, TokenProvider};
pub use config::Configuration;
pub use credentials::{CredentialStore, Credentials};
pub use error::{QuboError, QuboResult};
pub use result::{SolverResult, bitstring_to_array};
pub use solver::{SolveParams, Solver, SolverBuilder};
