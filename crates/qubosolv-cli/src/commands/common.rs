//! Shared helpers for CLI commands.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

use qubosolv::{Matrix, SolverResult};

/// A matrix loaded from disk, with the offset stored next to it (if any).
#[derive(Debug, Clone, PartialEq)]
pub struct Problem {
    pub matrix: Matrix,
    pub offset: Option<f64>,
}

/// Load a QUBO from a JSON file.
///
/// Accepted forms: a bare `[[...], ...]` matrix, or an object
/// `{"matrix": [[...]], "offset": 1.5}`.
pub fn load_problem(path: &str) -> Result<Problem> {
    if !Path::new(path).exists() {
        anyhow::bail!("File not found: {path}");
    }

    let source =
        fs::read_to_string(path).with_context(|| format!("Failed to read file: {path}"))?;
    parse_problem(&source).with_context(|| format!("Invalid QUBO file: {path}"))
}

/// Parse the contents of a QUBO file.
pub fn parse_problem(source: &str) -> Result<Problem> {
    let value: Value = serde_json::from_str(source)?;

    let (matrix, offset) = match value {
        Value::Array(_) => (value, None),
        Value::Object(mut obj) => {
            let matrix = obj
                .remove("matrix")
                .ok_or_else(|| anyhow::anyhow!("missing \"matrix\" key"))?;
            let offset = match obj.get("offset") {
                None | Some(Value::Null) => None,
                Some(v) => Some(
                    v.as_f64()
                        .ok_or_else(|| anyhow::anyhow!("\"offset\" must be a number"))?,
                ),
            };
            (matrix, offset)
        }
        _ => anyhow::bail!("expected a matrix or an object with a \"matrix\" key"),
    };

    let matrix: Matrix = serde_json::from_value(matrix)
        .map_err(|e| anyhow::anyhow!("matrix must be a list of numeric rows: {e}"))?;
    if matrix.is_empty() {
        anyhow::bail!("matrix is empty");
    }

    Ok(Problem { matrix, offset })
}

/// Pretty-print a solver result.
pub fn print_result(result: &SolverResult) {
    use console::style;

    println!(
        "\n{} Optimal energy: {}",
        style("✓").green().bold(),
        style(result.optimal_energy).yellow().bold()
    );
    println!(
        "  Optimal bitstring: {}",
        style(bits_to_string(&result.optimal_bitstring)).cyan()
    );

    println!("\n  Samples ({}):", result.num_samples());
    for (bits, energy) in result.bitstrings.iter().zip(&result.energies).take(16) {
        println!("  {}: {:>12.6}", style(bits_to_string(bits)).cyan(), energy);
    }
    if result.num_samples() > 16 {
        println!("  ... and {} more samples", result.num_samples() - 16);
    }

    println!("\n  Duration: {}", style(result.duration).yellow());
    if let Some(algorithm) = result.solver_config.get("algorithm").and_then(Value::as_str) {
        println!("  Algorithm: {}", style(algorithm).dim());
    }
}

/// Render `[1, 0, 1]` as `101`.
pub fn bits_to_string(bits: &[i8]) -> String {
    bits.iter().map(|b| b.to_string()).collect()
}

/// Mask all but the first character of a secret.
pub fn mask(secret: &str) -> String {
    let mut chars = secret.chars();
    match chars.next() {
        Some(first) => format!("{first}{}", "*".repeat(chars.count())),
        None => String::new(),
    }
}
