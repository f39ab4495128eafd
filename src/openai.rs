//! Text-completion provider: the `CompletionProvider` seam plus a minimal
//! OpenAI-compatible client behind it.
//!
//! We only call chat.completions and ask for plain text; the model is told to
//! answer with bare JSON when we need structure, and `extract` copes when it
//! doesn't. Calls log model name, latency and token usage (not contents).
//!
//! NOTE: We never log the API key.

use std::time::Instant;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, instrument};

use crate::config::ProviderConfig;

const TEMPERATURE: f32 = 0.7;

#[derive(Debug, Error)]
pub enum ProviderError {
  #[error("provider request failed: {0}")]
  Http(#[from] reqwest::Error),
  #[error("provider HTTP {status}: {message}")]
  Status { status: reqwest::StatusCode, message: String },
  #[error("provider returned an empty completion")]
  Empty,
}

/// Anything that turns a prompt into free text.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
  /// Human-readable model identifier, for logs.
  fn model(&self) -> &str;

  async fn complete(&self, prompt: &str) -> Result<String, ProviderError>;
}

#[derive(Clone)]
pub struct OpenAI {
  client: reqwest::Client,
  api_key: String,
  pub base_url: String,
  pub model: String,
}

impl OpenAI {
  pub fn new(cfg: &ProviderConfig) -> Result<Self, ProviderError> {
    let client = reqwest::Client::builder().timeout(cfg.timeout).build()?;
    Ok(Self {
      client,
      api_key: cfg.api_key.clone(),
      base_url: cfg.base_url.trim_end_matches('/').to_string(),
      model: cfg.model.clone(),
    })
  }
}

#[async_trait]
impl CompletionProvider for OpenAI {
  fn model(&self) -> &str { &self.model }

  #[instrument(level = "info", skip(self, prompt), fields(model = %self.model, prompt_len = prompt.len()))]
  async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
    let url = format!("{}/chat/completions", self.base_url);
    let req = ChatCompletionRequest {
      model: &self.model,
      messages: vec![ChatMessageReq { role: "user", content: prompt }],
      temperature: TEMPERATURE,
    };

    let start = Instant::now();
    let res = self.client.post(&url)
      .header(USER_AGENT, "p5math-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
      .json(&req).send().await?;

    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      let message = extract_openai_error(&body).unwrap_or(body);
      error!(elapsed = ?start.elapsed(), %status, "Completion request rejected");
      return Err(ProviderError::Status { status, message });
    }

    let body: ChatCompletionResponse = res.json().await?;
    if let Some(usage) = &body.usage {
      info!(prompt_tokens = ?usage.prompt_tokens, completion_tokens = ?usage.completion_tokens, total_tokens = ?usage.total_tokens, "OpenAI usage");
    }
    let text = body.choices.into_iter().next()
      .and_then(|c| c.message.content)
      .unwrap_or_default().trim().to_string();

    info!(elapsed = ?start.elapsed(), response_len = text.len(), "Completion received");
    if text.is_empty() {
      return Err(ProviderError::Empty);
    }
    Ok(text)
  }
}

// --- Chat DTOs ---

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
  model: &'a str,
  messages: Vec<ChatMessageReq<'a>>,
  temperature: f32,
}
#[derive(Serialize)]
struct ChatMessageReq<'a> { role: &'a str, content: &'a str }

#[derive(Deserialize)]
struct ChatCompletionResponse {
  choices: Vec<ChatChoice>,
  #[serde(default)] usage: Option<Usage>,
}
#[derive(Deserialize)]
struct ChatChoice { message: ChatMessageResp }
#[derive(Deserialize)]
struct ChatMessageResp { content: Option<String> }
#[derive(Deserialize)]
struct Usage {
  #[serde(default)] prompt_tokens: Option<u32>,
  #[serde(default)] completion_tokens: Option<u32>,
  #[serde(default)] total_tokens: Option<u32>,
}

/// Try to extract a clean error message from OpenAI error body.
fn extract_openai_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap { error: EObj }
  #[derive(Deserialize)]
  struct EObj { message: String }
  serde_json::from_str::<EWrap>(body).ok().map(|w| w.error.message)
}
