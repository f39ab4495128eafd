//! Tolerance grading of numeric answers.

/// Absolute tolerance. Fixed for every topic.
pub const ANSWER_TOLERANCE: f64 = 0.01;

/// `|user - correct| < 0.01`. No rounding, no relative tolerance.
pub fn is_correct(user_answer: f64, correct_answer: f64) -> bool {
  (user_answer - correct_answer).abs() < ANSWER_TOLERANCE
}

#[cfg(test)]
mod tests {
  use super::*;

  const SAMPLES: [f64; 6] = [0.0, 12.0, -3.5, 0.375, 1000.0, 99999.125];

  #[test]
  fn boundary_just_inside_and_outside() {
    for x in SAMPLES {
      assert!(is_correct(x, x + 0.0099), "{x}");
      assert!(!is_correct(x, x + 0.0101), "{x}");
      assert!(is_correct(x + 0.0099, x), "{x}");
      assert!(!is_correct(x - 0.0101, x), "{x}");
    }
  }

  #[test]
  fn symmetric_in_arguments() {
    for a in SAMPLES {
      for b in SAMPLES {
        assert_eq!(is_correct(a, b), is_correct(b, a));
        assert_eq!(is_correct(a, b + 0.005), is_correct(b + 0.005, a));
      }
    }
  }

  #[test]
  fn equivalent_fraction_rounded_too_far_is_wrong() {
    // 1/3 typed as 0.3
    assert!(!is_correct(0.3, 1.0 / 3.0));
    assert!(is_correct(0.333, 1.0 / 3.0));
  }
}
