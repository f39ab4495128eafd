//! Route-boundary error taxonomy and its HTTP mapping.
//!
//! 4xx errors carry their message to the client. 5xx errors carry a generic
//! per-operation message; the detailed cause is logged where it happens.

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use thiserror::Error;

use crate::openai::ProviderError;
use crate::protocol::ErrorOut;
use crate::store::StoreError;
use crate::validate::ProblemError;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("{0}")]
  BadRequest(String),
  #[error("{0}")]
  NotFound(String),
  /// The provider credential is missing.
  #[error("{0}")]
  Configuration(String),
  #[error("upstream: {0}")]
  Upstream(String),
  #[error("validation: {0}")]
  Validation(#[from] ProblemError),
  #[error("persistence: {0}")]
  Persistence(#[from] StoreError),
}

impl From<ProviderError> for AppError {
  fn from(e: ProviderError) -> Self { AppError::Upstream(e.to_string()) }
}

impl AppError {
  pub fn status(&self) -> StatusCode {
    match self {
      AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  /// Replace the message of 5xx errors with `public` before it leaves the process.
  pub fn public(self, public: &str) -> PublicError {
    let status = self.status();
    let message = match self {
      AppError::BadRequest(m) | AppError::NotFound(m) | AppError::Configuration(m) => m,
      _ => public.to_string(),
    };
    PublicError { status, message }
  }
}

/// What the client actually sees.
#[derive(Debug)]
pub struct PublicError {
  pub status: StatusCode,
  pub message: String,
}

impl IntoResponse for PublicError {
  fn into_response(self) -> Response {
    (self.status, Json(ErrorOut { error: self.message })).into_response()
  }
}
