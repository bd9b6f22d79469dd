//! Typed view of a solver response.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{QuboError, QuboResult};

/// Outcome of a solve call.
///
/// Energies are shifted by the constant offset of the QUBO.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverResult {
    /// Best assignment found.
    pub optimal_bitstring: Vec<i8>,
    /// Energy of every sample, offset applied.
    pub energies: Vec<f64>,
    /// Every sampled assignment.
    pub bitstrings: Vec<Vec<i8>>,
    /// Energy of the best assignment, offset applied.
    pub optimal_energy: f64,
    /// Run time as reported by the service.
    pub duration: f64,
    /// Solver configuration echoed by the service.
    pub solver_config: Value,
}

impl SolverResult {
    /// Build a result from the raw JSON answer.
    pub fn from_response(response: &Value, offset: f64) -> QuboResult<Self> {
        let optimal_bitstring = match field(response, "opt_bitstring")? {
            Value::String(bs) => bitstring_to_array(bs)?,
            Value::Array(bits) => bits
                .iter()
                .map(|bit| digit(bit, "opt_bitstring"))
                .collect::<QuboResult<_>>()?,
            _ => return Err(wrong_type("opt_bitstring", "string or array")),
        };

        let energies = array(response, "energies")?
            .iter()
            .map(|e| number(e, "energies").map(|e| e + offset))
            .collect::<QuboResult<_>>()?;

        let bitstrings = array(response, "bitstrings")?
            .iter()
            .map(|bs| {
                bs.as_str()
                    .ok_or_else(|| wrong_type("bitstrings", "array of strings"))
                    .and_then(bitstring_to_array)
            })
            .collect::<QuboResult<_>>()?;

        Ok(Self {
            optimal_bitstring,
            energies,
            bitstrings,
            optimal_energy: number(field(response, "opt_energy")?, "opt_energy")? + offset,
            duration: number(field(response, "duration")?, "duration")?,
            solver_config: field(response, "solver_config")?.clone(),
        })
    }

    /// Number of samples returned.
    pub fn num_samples(&self) -> usize {
        self.bitstrings.len()
    }
}

impl fmt::Display for SolverResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SolverResult({})", self.optimal_energy)
    }
}

/// Decode a string of `0`/`1` characters into integers.
pub fn bitstring_to_array(bs: &str) -> QuboResult<Vec<i8>> {
    bs.chars()
        .map(|c| match c.to_digit(10) {
            Some(d) => Ok(d as i8),
            None => Err(QuboError::MalformedResponse(format!(
                "invalid character {c:?} in bitstring {bs:?}"
            ))),
        })
        .collect()
}

fn field<'a>(response: &'a Value, key: &str) -> QuboResult<&'a Value> {
    response
        .get(key)
        .ok_or_else(|| QuboError::MalformedResponse(format!("missing field `{key}`")))
}

fn array<'a>(response: &'a Value, key: &str) -> QuboResult<&'a Vec<Value>> {
    field(response, key)?
        .as_array()
        .ok_or_else(|| wrong_type(key, "array"))
}

fn number(value: &Value, key: &str) -> QuboResult<f64> {
    value.as_f64().ok_or_else(|| wrong_type(key, "number"))
}

/// A single digit given as an integer, a whole float or a numeric string.
fn digit(value: &Value, key: &str) -> QuboResult<i8> {
    let d = match value {
        Value::Number(n) => n.as_f64().filter(|f| f.fract() == 0.0),
        Value::String(s) => s.trim().parse::<i64>().ok().map(|d| d as f64),
        _ => None,
    };
    match d {
        Some(d) if (0.0..=9.0).contains(&d) => Ok(d as i8),
        _ => Err(wrong_type(key, "array of digits")),
    }
}

fn wrong_type(key: &str, expected: &str) -> QuboError {
    QuboError::MalformedResponse(format!("field `{key}` is not a {expected}"))
}
