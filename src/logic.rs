//! Request orchestration behind the HTTP handlers.
//!
//! Each operation makes at most one provider call followed by at most one store
//! write, and the write only happens after the provider call succeeded. Nothing
//! is retried and nothing is compensated: if the store write after a successful
//! generation fails, the generated problem is discarded.

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::domain::{ScoreStats, SessionRecord, Submission};
use crate::error::AppError;
use crate::extract::extract_json;
use crate::grading::is_correct;
use crate::prompt::{build_feedback_prompt, build_problem_prompt};
use crate::protocol::{GenerateIn, GenerateOut, HistoryOut, SubmitIn, SubmitOut};
use crate::state::AppState;
use crate::stats::compute_stats;
use crate::util::trunc_for_log;
use crate::validate::{coerce_number, validate_problem};

pub const DEFAULT_HISTORY_LIMIT: usize = 10;
pub const MAX_HISTORY_LIMIT: usize = 100;

#[instrument(level = "info", skip(state), fields(difficulty = ?req.difficulty, problem_type = ?req.problem_type))]
pub async fn generate_problem(state: &AppState, req: GenerateIn) -> Result<GenerateOut, AppError> {
  let difficulty = req.difficulty.unwrap_or_default();
  let provider = state
    .provider
    .as_ref()
    .ok_or_else(|| AppError::Configuration("AI not configured. Missing OPENAI_API_KEY.".into()))?;

  let prompt = build_problem_prompt(&state.prompts, difficulty, req.problem_type);
  let raw = provider.complete(&prompt).await?;
  debug!(target: "problem", raw = %trunc_for_log(&raw, 400), "Raw completion");

  let json_text = extract_json(&raw);
  let value: Value = serde_json::from_str(&json_text)
    .map_err(|e| AppError::Upstream(format!("completion is not decodable JSON: {e}")))?;
  let problem = validate_problem(&value, difficulty, req.problem_type)?;

  let session = SessionRecord {
    id: Uuid::new_v4().to_string(),
    created_at: Utc::now(),
    problem: problem.clone(),
  };
  let session_id = session.id.clone();
  state.store.insert_session(session).await?;

  info!(target: "problem", %session_id, %difficulty, model = %provider.model(), answer = problem.final_answer, "Problem generated");
  Ok(GenerateOut { session_id, problem })
}

#[instrument(level = "info", skip(state, req), fields(session_id = ?req.session_id))]
pub async fn submit_answer(state: &AppState, req: SubmitIn) -> Result<SubmitOut, AppError> {
  let session_id = req.session_id.filter(|s| !s.is_empty());
  let (Some(session_id), Some(raw_answer)) = (session_id, req.user_answer) else {
    return Err(AppError::BadRequest("Missing required fields".into()));
  };
  let user_answer = coerce_number(&raw_answer)
    .ok_or_else(|| AppError::BadRequest("userAnswer must be a number".into()))?;

  let session = state
    .store
    .get_session(&session_id)
    .await?
    .ok_or_else(|| AppError::NotFound("Problem session not found".into()))?;

  let correct_answer = session.problem.final_answer;
  let correct = is_correct(user_answer, correct_answer);

  let provider = state
    .provider
    .as_ref()
    .ok_or_else(|| AppError::Configuration("AI not configured. Missing OPENAI_API_KEY.".into()))?;
  let prompt = build_feedback_prompt(
    &state.prompts,
    &session.problem.problem_text,
    correct_answer,
    user_answer,
    correct,
  );
  // A failed feedback call leaves the attempt unrecorded.
  let feedback = provider.complete(&prompt).await?;
  debug!(target: "submission", %session_id, feedback = %trunc_for_log(&feedback, 200), "Feedback generated");

  let submission = Submission {
    id: Uuid::new_v4().to_string(),
    session_id: session_id.clone(),
    created_at: Utc::now(),
    user_answer,
    is_correct: correct,
    feedback_text: Some(feedback.clone()),
    hint_used: req.hint_used.unwrap_or(false),
  };
  state.store.insert_submission(submission).await?;

  info!(target: "submission", %session_id, user_answer, correct_answer, is_correct = correct, "Answer graded");
  Ok(SubmitOut { is_correct: correct, feedback, correct_answer })
}

#[instrument(level = "info", skip(state))]
pub async fn history(state: &AppState, limit: Option<usize>) -> Result<HistoryOut, AppError> {
  let limit = limit.unwrap_or(DEFAULT_HISTORY_LIMIT).min(MAX_HISTORY_LIMIT);
  let sessions = state.store.recent_sessions(limit).await?;
  Ok(HistoryOut { sessions })
}

#[instrument(level = "info", skip(state))]
pub async fn stats(state: &AppState) -> Result<ScoreStats, AppError> {
  let attempts = state.store.graded_attempts().await?;
  Ok(compute_stats(&attempts))
}
