//! Solve command implementation.

use std::time::Duration;

use anyhow::Result;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use qubosolv::{Algorithm, CredentialStore, SolveParams, SolverBuilder};
use tracing::debug;

use super::common::{load_problem, print_result};

/// Annealing options from the command line.
#[derive(Debug, Clone)]
pub struct SolveOptions {
    pub offset: Option<f64>,
    pub temp_start: f64,
    pub temp_end: f64,
    pub tau: f64,
    pub beta: f64,
    pub maximize: bool,
    pub algorithm: Option<String>,
}

/// Where the credentials and the API live.
#[derive(Debug, Clone, Default)]
pub struct Connection {
    pub token: Option<String>,
    pub file: Option<String>,
    pub host: Option<String>,
}

impl Connection {
    fn builder(self) -> SolverBuilder {
        let mut builder = SolverBuilder::new();
        if let Some(token) = self.token {
            builder = builder.token(token);
        }
        if let Some(file) = self.file {
            builder = builder.credentials_file(file);
        }
        if let Some(host) = self.host {
            builder = builder.host(host);
        }
        builder
    }
}

/// Turn command-line options into solver parameters.
///
/// An explicit `--offset` wins over the offset stored in the input file.
pub fn build_params(options: &SolveOptions, file_offset: Option<f64>) -> Result<SolveParams> {
    let mut params = SolveParams::default()
        .with_offset(options.offset.or(file_offset).unwrap_or(0.0))
        .with_temp_start(options.temp_start)
        .with_temp_end(options.temp_end)
        .with_tau(options.tau)
        .with_beta(options.beta)
        .maximize(options.maximize);

    if let Some(ref name) = options.algorithm {
        let algorithm: Algorithm = name.parse()?;
        params = params.with_algorithm(algorithm);
    }

    Ok(params)
}

/// Execute the solve command.
pub async fn execute(
    input: &str,
    options: &SolveOptions,
    connection: Connection,
    format: &str,
) -> Result<()> {
    let problem = load_problem(input)?;
    let params = build_params(options, problem.offset)?;

    let (rows, cols) = problem.matrix.shape();

    if format != "json" {
        println!(
            "{} Solving {} ({}x{} QUBO, algorithm: {})",
            style("→").cyan().bold(),
            style(input).green(),
            rows,
            cols,
            style(params.algorithm.map_or("server default", |a| a.as_str())).yellow()
        );
    }

    debug!(
        "Connecting (host: {}, token: {}, credential file: {})",
        connection.host.as_deref().unwrap_or(qubosolv::config::DEFAULT_HOST),
        connection.token.is_some(),
        CredentialStore::resolve(connection.file.as_deref()).path().display()
    );

    let solver = connection
        .builder()
        .connect()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to connect: {e}"))?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .map_err(|e| anyhow::anyhow!("Invalid progress template: {e}"))?,
    );
    spinner.set_message("Waiting for the annealer...");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = solver.solve(problem.matrix, &params).await;
    spinner.finish_and_clear();
    let result = result.map_err(|e| anyhow::anyhow!("Solve failed: {e}"))?;

    match format {
        "json" => {
            let json = serde_json::to_string_pretty(&result)
                .map_err(|e| anyhow::anyhow!("JSON serialization failed: {e}"))?;
            println!("{json}");
        }
        _ => print_result(&result),
    }

    Ok(())
}
