//! Runtime configuration: environment variables plus optional prompt overrides
//! loaded from TOML.
//!
//! See `AppConfig` for the env schema and `Prompts` for the TOML schema.

use std::{net::SocketAddr, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{error, info};

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Settings read once at startup and passed down explicitly.
#[derive(Clone, Debug)]
pub struct AppConfig {
  pub addr: SocketAddr,
  pub static_dir: PathBuf,
  /// Snapshot file for the session store; in-memory only when absent.
  pub data_path: Option<PathBuf>,
  /// `None` when OPENAI_API_KEY is not set.
  pub provider: Option<ProviderConfig>,
  pub prompts: Prompts,
}

#[derive(Clone)]
pub struct ProviderConfig {
  pub api_key: String,
  pub base_url: String,
  pub model: String,
  pub timeout: Duration,
}

// Keeps the key out of `{:?}` output.
impl std::fmt::Debug for ProviderConfig {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ProviderConfig")
      .field("base_url", &self.base_url)
      .field("model", &self.model)
      .field("timeout", &self.timeout)
      .finish_non_exhaustive()
  }
}

impl AppConfig {
  pub fn from_env() -> Self {
    let port = env_opt("PORT")
      .and_then(|p| p.parse::<u16>().ok())
      .unwrap_or(DEFAULT_PORT);

    let provider = env_opt("OPENAI_API_KEY").map(|api_key| ProviderConfig {
      api_key,
      base_url: env_opt("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.into()),
      model: env_opt("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.into()),
      timeout: Duration::from_secs(
        env_opt("OPENAI_TIMEOUT_SECS")
          .and_then(|s| s.parse().ok())
          .unwrap_or(DEFAULT_TIMEOUT_SECS),
      ),
    });

    Self {
      addr: SocketAddr::from(([0, 0, 0, 0], port)),
      static_dir: env_opt("STATIC_DIR").map(PathBuf::from).unwrap_or_else(|| "./static".into()),
      data_path: env_opt("DATA_PATH").map(PathBuf::from),
      provider,
      prompts: load_prompts_from_env().unwrap_or_default(),
    }
  }
}

/// Non-empty env var.
fn env_opt(key: &str) -> Option<String> {
  std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Prompt templates. `{key}` placeholders are filled by `util::fill_template`.
///
/// Every field may be overridden from the TOML file at PROMPTS_CONFIG_PATH;
/// omitted fields keep their defaults.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct Prompts {
  /// Placeholders: {topic_line}, {difficulty}, {difficulty_hint}, {topics}.
  pub problem_template: String,
  /// Placeholder: {topic}.
  pub topic_line: String,
  pub any_topic_line: String,
  pub easy_hint: String,
  pub medium_hint: String,
  pub hard_hint: String,
  /// Placeholders: {problem_text}, {correct_answer}, {user_answer}, {result}.
  pub feedback_template: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      problem_template: DEFAULT_PROBLEM_TEMPLATE.trim().into(),
      topic_line: "Topic: {topic}".into(),
      any_topic_line: "Topic: choose any Primary 5 Singapore Mathematics topic.".into(),
      easy_hint: "Use simple numbers and single-step problems. For fractions: proper fractions with denominators up to 10. For decimals: up to 2 decimal places.".into(),
      medium_hint: "Use moderate complexity. For fractions: mixed numbers, addition/subtraction of unlike fractions. For geometry: basic shapes and measurements.".into(),
      hard_hint: "Use challenging problems. For fractions: multiplication/division, complex mixed numbers. For geometry: composite shapes, multi-step calculations.".into(),
      feedback_template: DEFAULT_FEEDBACK_TEMPLATE.trim().into(),
    }
  }
}

const DEFAULT_PROBLEM_TEMPLATE: &str = r#"
You are a Primary 5 Mathematics teacher following the 2021 Singapore Mathematics Syllabus. Create a word problem appropriate for Primary 5 students (ages 10-11).

Constraints:
- {topic_line}
- Difficulty: {difficulty} ({difficulty_hint})
- Create realistic, Singapore-context scenarios (HDB flats, void decks, hawker centres, MRT, school events, etc.)
- The final answer must be a single number (integer or decimal). No units in the final_answer field.

Topic-specific guidelines:
- Addition/Subtraction: Whole numbers up to 100,000, decimals to 3 decimal places
- Multiplication/Division: Up to 4-digit by 2-digit, with decimals
- Fractions: Proper fractions, mixed numbers, addition/subtraction of unlike fractions, simple multiplication/division
- Decimals: Operations with decimals to 3 decimal places, conversion between fractions and decimals
- Percentages: Finding percentages of quantities, expressing fractions as percentages
- Rate: Simple rate problems (speed = distance/time, cost per unit)
- Area: Triangles (1/2 x base x height), rectangles, composite shapes
- Volume: Cubes and cuboids (length x width x height)
- Angles: Angles on a straight line (180 degrees), at a point (360 degrees), vertically opposite angles

Additionally provide:
- A very short helpful hint (one sentence, appropriate for Primary 5 level)
- Step-by-step solution in 2-4 concise steps, each on a new line

Output STRICTLY as a single JSON object with keys: problem_text, final_answer, hint, step_by_step_solution. Do not include markdown fences.

Available topics: {topics}.
"#;

const DEFAULT_FEEDBACK_TEMPLATE: &str = r#"
You are a friendly and encouraging Primary 5 math tutor. Generate personalized feedback for a student who just solved this problem:

Problem: {problem_text}
Correct Answer: {correct_answer}
Student's Answer: {user_answer}
Result: {result}

Guidelines for feedback:
- If correct: Praise the student enthusiastically and briefly explain why their answer is correct
- If incorrect: Be encouraging and supportive. Provide a hint about where they might have gone wrong, and suggest what concept to review. Do NOT give away the full solution directly.
- Keep the feedback concise (2-3 sentences)
- Use age-appropriate language for a Primary 5 student
- Be warm and motivating

Generate ONLY the feedback text (no JSON, no additional formatting):
"#;

/// Load `Prompts` from PROMPTS_CONFIG_PATH. On any IO/parse error, returns None.
pub fn load_prompts_from_env() -> Option<Prompts> {
  let path = env_opt("PROMPTS_CONFIG_PATH")?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<Prompts>(&s) {
      Ok(p) => {
        info!(target: "p5math_backend", %path, "Loaded prompt overrides (TOML)");
        Some(p)
      }
      Err(e) => {
        error!(target: "p5math_backend", %path, error = %e, "Failed to parse prompt TOML; using defaults");
        None
      }
    },
    Err(e) => {
      error!(target: "p5math_backend", %path, error = %e, "Failed to read prompt TOML; using defaults");
      None
    }
  }
}
