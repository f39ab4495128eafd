//! Prompt construction for problem generation and answer feedback.

use crate::config::Prompts;
use crate::domain::{Difficulty, ProblemType};
use crate::util::fill_template;

pub fn build_problem_prompt(
  prompts: &Prompts,
  difficulty: Difficulty,
  problem_type: Option<ProblemType>,
) -> String {
  let topic_line = match problem_type {
    Some(t) => fill_template(&prompts.topic_line, &[("topic", t.as_str())]),
    None => prompts.any_topic_line.clone(),
  };
  let difficulty_hint = match difficulty {
    Difficulty::Easy => &prompts.easy_hint,
    Difficulty::Medium => &prompts.medium_hint,
    Difficulty::Hard => &prompts.hard_hint,
  };
  let topics = ProblemType::ALL.map(ProblemType::as_str).join(", ");

  fill_template(
    &prompts.problem_template,
    &[
      ("topic_line", &topic_line),
      ("difficulty", difficulty.as_str()),
      ("difficulty_hint", difficulty_hint),
      ("topics", &topics),
    ],
  )
}

pub fn build_feedback_prompt(
  prompts: &Prompts,
  problem_text: &str,
  correct_answer: f64,
  user_answer: f64,
  is_correct: bool,
) -> String {
  fill_template(
    &prompts.feedback_template,
    &[
      ("problem_text", problem_text),
      ("correct_answer", &correct_answer.to_string()),
      ("user_answer", &user_answer.to_string()),
      ("result", if is_correct { "CORRECT" } else { "INCORRECT" }),
    ],
  )
}
