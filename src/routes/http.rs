//! HTTP endpoint handlers. These are thin wrappers that decode the request,
//! forward to core logic, and turn errors into `{error}` bodies.

use std::sync::Arc;

use axum::{
  body::Bytes,
  extract::{rejection::QueryRejection, Query, State},
  response::IntoResponse,
  Json,
};
use serde::de::DeserializeOwned;
use tracing::{error, info, instrument, warn};

use crate::domain::ScoreStats;
use crate::error::{AppError, PublicError};
use crate::logic;
use crate::protocol::*;
use crate::state::AppState;

const GENERATE_FAILED: &str = "Failed to generate problem. Please try again.";
const SUBMIT_FAILED: &str = "Failed to submit answer. Please try again.";
const HISTORY_FAILED: &str = "Failed to fetch history";
const STATS_FAILED: &str = "Failed to fetch statistics";

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state, body), fields(body_len = body.len()))]
pub async fn http_post_generate(
  State(state): State<Arc<AppState>>,
  body: Bytes,
) -> Result<Json<GenerateOut>, PublicError> {
  let req: GenerateIn = if body.iter().all(u8::is_ascii_whitespace) {
    GenerateIn::default()
  } else {
    decode_body(&body).map_err(|e| e.public(GENERATE_FAILED))?
  };
  match logic::generate_problem(&state, req).await {
    Ok(out) => {
      info!(target: "problem", session_id = %out.session_id, "HTTP problem served");
      Ok(Json(out))
    }
    Err(e) => Err(log_failure("generate", e).public(GENERATE_FAILED)),
  }
}

#[instrument(level = "info", skip(state, body), fields(body_len = body.len()))]
pub async fn http_post_submit(
  State(state): State<Arc<AppState>>,
  body: Bytes,
) -> Result<Json<SubmitOut>, PublicError> {
  let req: SubmitIn = decode_body(&body).map_err(|e| e.public(SUBMIT_FAILED))?;
  logic::submit_answer(&state, req)
    .await
    .map(Json)
    .map_err(|e| log_failure("submit", e).public(SUBMIT_FAILED))
}

#[instrument(level = "info", skip(state, query))]
pub async fn http_get_history(
  State(state): State<Arc<AppState>>,
  query: Result<Query<HistoryQuery>, QueryRejection>,
) -> Result<Json<HistoryOut>, PublicError> {
  let Query(q) = query
    .map_err(|e| AppError::BadRequest(format!("Invalid query: {}", e.body_text())).public(HISTORY_FAILED))?;
  logic::history(&state, q.limit)
    .await
    .map(Json)
    .map_err(|e| log_failure("history", e).public(HISTORY_FAILED))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_stats(
  State(state): State<Arc<AppState>>,
) -> Result<Json<ScoreStats>, PublicError> {
  logic::stats(&state)
    .await
    .map(Json)
    .map_err(|e| log_failure("stats", e).public(STATS_FAILED))
}

fn decode_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, AppError> {
  serde_json::from_slice(body).map_err(|e| AppError::BadRequest(format!("Invalid request body: {e}")))
}

fn log_failure(op: &'static str, e: AppError) -> AppError {
  if e.status().is_server_error() {
    error!(target: "p5math_backend", %op, error = %e, "Request failed");
  } else {
    warn!(target: "p5math_backend", %op, error = %e, "Request rejected");
  }
  e
}
