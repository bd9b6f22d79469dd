//! Blocking solver.
//!
//! Wraps the async [`Solver`](crate::Solver) in a private current-thread
//! runtime. Must not be used from within an async context.
//!
//! ```ignore
//! use qubosolv::{SolveParams, SolverBuilder};
//!
//! let solver = qubosolv::blocking::Solver::connect(
//!     SolverBuilder::new().username("alice").password("secret"),
//! )?;
//! let result = solver.solve(vec![vec![-1.0, 2.0], vec![0.0, -1.0]], &SolveParams::default())?;
//! println!("{result}");
//! ```

use tokio::runtime::{Builder, Runtime};

use crate::api::Matrix;
use crate::config::Configuration;
use crate::error::QuboResult;
use crate::result::SolverResult;
use crate::solver::{SolveParams, SolverBuilder};

/// Synchronous counterpart of [`crate::Solver`].
#[derive(Debug)]
pub struct Solver {
    inner: crate::solver::Solver,
    runtime: Runtime,
}

impl Solver {
    /// Resolve credentials and obtain an access token, blocking.
    pub fn connect(builder: SolverBuilder) -> QuboResult<Self> {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        let inner = runtime.block_on(builder.connect())?;
        Ok(Self { inner, runtime })
    }

    pub fn configuration(&self) -> &Configuration {
        self.inner.configuration()
    }

    /// Solve a QUBO, blocking until the service answers.
    pub fn solve(
        &self,
        matrix: impl Into<Matrix>,
        params: &SolveParams,
    ) -> QuboResult<SolverResult> {
        self.runtime.block_on(self.inner.solve(matrix, params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocking_connect_with_token() {
        let dir = tempfile::tempdir().unwrap();
        let solver = Solver::connect(
            SolverBuilder::new()
                .credentials_file(dir.path())
                .token("blocking-token"),
        )
        .unwrap();
        assert_eq!(
            solver.configuration().access_token.as_deref(),
            Some("blocking-token")
        );
    }

    #[test]
    fn test_blocking_connect_missing_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let err = Solver::connect(SolverBuilder::new().credentials_file(dir.path())).unwrap_err();
        assert!(err.is_configuration());
    }
}
