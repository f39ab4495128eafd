//! Pull a single JSON object out of a free-text model completion.
//!
//! Models are asked for bare JSON but routinely wrap it in prose or code fences.
//! Extraction is best-effort and never fails: text without any `{ ... }` span
//! degrades to a synthetic object carrying the raw text as the problem.
//!
//! The span is first `{` to last `}`. It is not brace-balance aware, so two
//! top-level objects (or stray braces in surrounding prose) produce a span that
//! will not decode; callers treat that as an upstream error.

use serde_json::json;

pub fn extract_json(text: &str) -> String {
  let trimmed = text.trim();
  if trimmed.starts_with('{') && trimmed.ends_with('}') {
    return trimmed.to_string();
  }

  if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
    if end > start {
      return text[start..=end].to_string();
    }
  }

  json!({ "problem_text": text, "final_answer": 0 }).to_string()
}
