//! Shared fixtures for unit and router tests.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::openai::{CompletionProvider, ProviderError};

/// A chatty completion that wraps the object in prose and a code fence.
pub const SAMPLE_COMPLETION: &str = "Here you go:\n```json\n{\"problem_text\":\"Ali has 5 apples...\",\"final_answer\":12,\"hint\":\"Add then subtract\",\"step_by_step_solution\":\"Step1\\nStep2\"}\n```";

/// Replays canned completions in order and records every prompt it saw.
/// Runs dry with `ProviderError::Empty`.
pub struct ScriptedProvider {
  replies: Mutex<Vec<Result<String, ProviderError>>>,
  pub prompts: Mutex<Vec<String>>,
}

impl ScriptedProvider {
  pub fn new(replies: Vec<Result<String, ProviderError>>) -> Self {
    Self { replies: Mutex::new(replies), prompts: Mutex::new(Vec::new()) }
  }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
  fn model(&self) -> &str { "scripted" }

  async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
    self.prompts.lock().unwrap().push(prompt.to_string());
    let mut replies = self.replies.lock().unwrap();
    if replies.is_empty() { Err(ProviderError::Empty) } else { replies.remove(0) }
  }
}
