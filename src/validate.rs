//! Turn a decoded model reply into a typed `MathProblem`.
//!
//! Only `problem_text`, `final_answer`, `hint` and `step_by_step_solution` are
//! read from the reply. Difficulty and topic come from the caller's request.

use serde_json::Value;
use thiserror::Error;

use crate::domain::{Difficulty, MathProblem, ProblemType};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProblemError {
  #[error("model reply is missing string field '{0}'")]
  MissingField(&'static str),
  #[error("model reply has a missing or non-numeric final_answer")]
  InvalidAnswer,
}

pub fn validate_problem(
  value: &Value,
  difficulty: Difficulty,
  problem_type: Option<ProblemType>,
) -> Result<MathProblem, ProblemError> {
  let problem_text = match value.get("problem_text") {
    Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
    _ => return Err(ProblemError::MissingField("problem_text")),
  };

  let final_answer = value
    .get("final_answer")
    .and_then(coerce_number)
    .ok_or(ProblemError::InvalidAnswer)?;

  Ok(MathProblem {
    problem_text,
    final_answer,
    difficulty,
    problem_type,
    hint: optional_string(value, "hint"),
    step_by_step_solution: optional_string(value, "step_by_step_solution"),
  })
}

/// Finite number from a JSON number or a numeric string. Anything else is `None`.
/// Stricter than JS `Number()`: booleans, empty strings and arrays are rejected.
pub fn coerce_number(value: &Value) -> Option<f64> {
  let n = match value {
    Value::Number(n) => n.as_f64()?,
    Value::String(s) => s.trim().parse::<f64>().ok()?,
    _ => return None,
  };
  n.is_finite().then_some(n)
}

fn optional_string(value: &Value, key: &str) -> Option<String> {
  match value.get(key) {
    Some(Value::String(s)) => Some(s.clone()),
    _ => None,
  }
}
