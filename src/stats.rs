//! Progress statistics derived from submission history.
//!
//! Nothing here is cached; `/stats` recomputes from every stored submission.

use crate::domain::{Difficulty, GradedAttempt, ScoreStats};

const XP_PER_CORRECT: u32 = 10;
const XP_PER_LEVEL: u32 = 100;

/// `attempts` must be in chronological order (oldest first).
pub fn compute_stats(attempts: &[GradedAttempt]) -> ScoreStats {
  if attempts.is_empty() {
    return ScoreStats::default();
  }

  let total = attempts.len() as u32;
  let correct = attempts.iter().filter(|a| a.is_correct).count() as u32;
  let count = |d: Difficulty| attempts.iter().filter(|a| a.difficulty == d).count() as u32;

  let mut run = 0u32;
  let mut best = 0u32;
  for a in attempts {
    run = if a.is_correct { run + 1 } else { 0 };
    best = best.max(run);
  }

  let total_xp = correct * XP_PER_CORRECT;
  ScoreStats {
    total,
    correct,
    incorrect: total - correct,
    accuracy: (f64::from(correct) * 100.0 / f64::from(total)).round() as u32,
    easy_problems: count(Difficulty::Easy),
    medium_problems: count(Difficulty::Medium),
    hard_problems: count(Difficulty::Hard),
    // run is the streak ending at the newest attempt
    streak: run,
    total_xp,
    level: total_xp / XP_PER_LEVEL + 1,
    streak_best: best,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::{Duration, TimeZone, Utc};

  fn history(results: &[(bool, Difficulty)]) -> Vec<GradedAttempt> {
    let t0 = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
    results
      .iter()
      .enumerate()
      .map(|(i, &(is_correct, difficulty))| GradedAttempt {
        created_at: t0 + Duration::seconds(i as i64),
        is_correct,
        difficulty,
      })
      .collect()
  }

  #[test]
  fn empty_history_is_level_one_zeros() {
    let s = compute_stats(&[]);
    assert_eq!(s, ScoreStats::default());
    assert_eq!(s.level, 1);
  }

  #[test]
  fn counts_accuracy_and_difficulty_split() {
    use Difficulty::*;
    let s = compute_stats(&history(&[(true, Easy), (false, Medium), (true, Hard)]));
    assert_eq!((s.total, s.correct, s.incorrect), (3, 2, 1));
    assert_eq!(s.accuracy, 67);
    assert_eq!((s.easy_problems, s.medium_problems, s.hard_problems), (1, 1, 1));
    assert_eq!(s.total_xp, 20);
    assert_eq!(s.level, 1);
  }

  #[test]
  fn streaks_come_from_history() {
    use Difficulty::*;
    let s = compute_stats(&history(&[
      (true, Easy), (true, Easy), (true, Easy), (false, Easy), (true, Medium), (true, Medium),
    ]));
    assert_eq!(s.streak, 2);
    assert_eq!(s.streak_best, 3);

    let broken = compute_stats(&history(&[(true, Easy), (false, Easy)]));
    assert_eq!(broken.streak, 0);
    assert_eq!(broken.streak_best, 1);
  }

  #[test]
  fn level_rises_every_hundred_xp() {
    let ten = history(&[(true, Difficulty::Hard); 10]);
    let s = compute_stats(&ten);
    assert_eq!(s.total_xp, 100);
    assert_eq!(s.level, 2);
    assert_eq!(s.accuracy, 100);
  }

  #[test]
  fn stats_are_deterministic() {
    let h = history(&[(true, Difficulty::Easy), (false, Difficulty::Hard)]);
    assert_eq!(compute_stats(&h), compute_stats(&h));
  }
}
