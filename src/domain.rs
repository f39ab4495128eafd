//! Domain models used by the backend: difficulty/topic tags, generated problems,
//! persisted sessions and submissions, and the derived score statistics.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How hard the generated problem should be.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
  Easy,
  #[default]
  Medium,
  Hard,
}

impl Difficulty {
  pub fn as_str(self) -> &'static str {
    match self {
      Difficulty::Easy => "easy",
      Difficulty::Medium => "medium",
      Difficulty::Hard => "hard",
    }
  }
}

impl fmt::Display for Difficulty {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Primary 5 topic tags a problem can be generated for.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ProblemType {
  // Basic operations
  Addition,
  Subtraction,
  Multiplication,
  Division,
  // Fractions and decimals
  Fractions,
  Decimals,
  Percentages,
  // Measurement / geometry
  Rate,
  Area,
  Volume,
  Angles,
}

impl ProblemType {
  pub const ALL: [ProblemType; 11] = [
    ProblemType::Addition,
    ProblemType::Subtraction,
    ProblemType::Multiplication,
    ProblemType::Division,
    ProblemType::Fractions,
    ProblemType::Decimals,
    ProblemType::Percentages,
    ProblemType::Rate,
    ProblemType::Area,
    ProblemType::Volume,
    ProblemType::Angles,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      ProblemType::Addition => "addition",
      ProblemType::Subtraction => "subtraction",
      ProblemType::Multiplication => "multiplication",
      ProblemType::Division => "division",
      ProblemType::Fractions => "fractions",
      ProblemType::Decimals => "decimals",
      ProblemType::Percentages => "percentages",
      ProblemType::Rate => "rate",
      ProblemType::Area => "area",
      ProblemType::Volume => "volume",
      ProblemType::Angles => "angles",
    }
  }
}

impl fmt::Display for ProblemType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// A validated, generated word problem. Immutable once built.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MathProblem {
  pub problem_text: String,
  pub final_answer: f64,
  pub difficulty: Difficulty,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub problem_type: Option<ProblemType>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub hint: Option<String>,
  /// Newline-delimited steps.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub step_by_step_solution: Option<String>,
}

/// Stored problem plus identity and creation time.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SessionRecord {
  pub id: String,
  pub created_at: DateTime<Utc>,
  pub problem: MathProblem,
}

/// A graded answer attempt. Exactly one session per submission.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Submission {
  pub id: String,
  pub session_id: String,
  pub created_at: DateTime<Utc>,
  pub user_answer: f64,
  pub is_correct: bool,
  #[serde(default)]
  pub feedback_text: Option<String>,
  #[serde(default)]
  pub hint_used: bool,
}

/// Shape of the submission embedded in a history entry.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SubmissionSummary {
  pub is_correct: bool,
  pub user_answer: f64,
  pub hint_used: bool,
}

impl From<&Submission> for SubmissionSummary {
  fn from(s: &Submission) -> Self {
    Self { is_correct: s.is_correct, user_answer: s.user_answer, hint_used: s.hint_used }
  }
}

/// History entry: the flattened session row with its submission, if any.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ProblemSession {
  pub id: String,
  pub created_at: DateTime<Utc>,
  pub problem_text: String,
  pub correct_answer: f64,
  pub difficulty: Difficulty,
  pub problem_type: Option<ProblemType>,
  pub hint: Option<String>,
  pub step_by_step_solution: Option<String>,
  pub submission: Option<SubmissionSummary>,
}

impl ProblemSession {
  pub fn from_parts(session: &SessionRecord, submission: Option<&Submission>) -> Self {
    let p = &session.problem;
    Self {
      id: session.id.clone(),
      created_at: session.created_at,
      problem_text: p.problem_text.clone(),
      correct_answer: p.final_answer,
      difficulty: p.difficulty,
      problem_type: p.problem_type,
      hint: p.hint.clone(),
      step_by_step_solution: p.step_by_step_solution.clone(),
      submission: submission.map(SubmissionSummary::from),
    }
  }
}

/// A submission joined with the difficulty of the problem it answered.
#[derive(Clone, Debug, PartialEq)]
pub struct GradedAttempt {
  pub created_at: DateTime<Utc>,
  pub is_correct: bool,
  pub difficulty: Difficulty,
}

/// Aggregate progress, recomputed on every read and never persisted.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScoreStats {
  pub total: u32,
  pub correct: u32,
  pub incorrect: u32,
  /// Whole percent, 0..=100.
  pub accuracy: u32,
  pub easy_problems: u32,
  pub medium_problems: u32,
  pub hard_problems: u32,
  pub streak: u32,
  #[serde(rename = "totalXP")]
  pub total_xp: u32,
  pub level: u32,
  pub streak_best: u32,
}

impl Default for ScoreStats {
  fn default() -> Self {
    Self {
      total: 0,
      correct: 0,
      incorrect: 0,
      accuracy: 0,
      easy_problems: 0,
      medium_problems: 0,
      hard_problems: 0,
      streak: 0,
      total_xp: 0,
      level: 1,
      streak_best: 0,
    }
  }
}
