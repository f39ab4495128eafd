//! Public HTTP request/response structs (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::domain::{Difficulty, MathProblem, ProblemSession, ProblemType};

#[derive(Debug, Default, Deserialize)]
pub struct GenerateIn {
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    #[serde(default, rename = "problemType")]
    pub problem_type: Option<ProblemType>,
}

#[derive(Debug, Serialize)]
pub struct GenerateOut {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    pub problem: MathProblem,
}

/// Fields are loose on purpose: presence and type are checked by the handler
/// so that a missing field is a 400 with our own message.
#[derive(Debug, Deserialize)]
pub struct SubmitIn {
    #[serde(default, rename = "sessionId")]
    pub session_id: Option<String>,
    #[serde(default, rename = "userAnswer")]
    pub user_answer: Option<Value>,
    #[serde(default, rename = "hintUsed")]
    pub hint_used: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct SubmitOut {
    #[serde(rename = "isCorrect")]
    pub is_correct: bool,
    pub feedback: String,
    #[serde(rename = "correctAnswer")]
    pub correct_answer: f64,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    /// `?limit=` with no value means the default.
    #[serde(default, deserialize_with = "blank_as_none")]
    pub limit: Option<usize>,
}

fn blank_as_none<'de, D: Deserializer<'de>>(de: D) -> Result<Option<usize>, D::Error> {
    match Option::<String>::deserialize(de)?.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

#[derive(Debug, Serialize)]
pub struct HistoryOut {
    pub sessions: Vec<ProblemSession>,
}

#[derive(Debug, Serialize)]
pub struct ErrorOut {
    pub error: String,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}
