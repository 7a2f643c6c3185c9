//! Hydraulic press arithmetic for the Pascal step.
//!
//! F2 = F1 * (S2 / S1). The simulator keeps the last valid output when the
//! control area is not positive, so a half-typed input never blanks the result.

use serde::{Deserialize, Serialize};

use crate::util::round_to;

/// Quick challenge: lift 500 g with an effort equivalent to 100 g.
pub const CHALLENGE_LOAD_GRAMS: f64 = 500.0;
pub const CHALLENGE_EFFORT_GRAMS: f64 = 100.0;

/// Tolerance for parsed challenge answers ("5", "5.0", "5e0" all agree).
const RATIO_EPSILON: f64 = 1e-9;

/// Output force for the given input force and piston areas.
/// `None` when the formula is undefined (non-positive control area or non-finite input).
pub fn compute_output_force(input_force: f64, control_area: f64, actuator_area: f64) -> Option<f64> {
  let ratio = amplification_ratio(control_area, actuator_area)?;
  if !input_force.is_finite() {
    return None;
  }
  Some(input_force * ratio)
}

/// S2 / S1, undefined for non-positive S1.
pub fn amplification_ratio(control_area: f64, actuator_area: f64) -> Option<f64> {
  if !control_area.is_finite() || !actuator_area.is_finite() || control_area <= 0.0 {
    return None;
  }
  Some(actuator_area / control_area)
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForceInputs {
  /// F1 in Newtons.
  pub input_force: f64,
  /// S1 in cm².
  pub control_area: f64,
  /// S2 in cm².
  pub actuator_area: f64,
}

impl Default for ForceInputs {
  fn default() -> Self {
    Self { input_force: 10.0, control_area: 2.0, actuator_area: 10.0 }
  }
}

/// Live calculator state for the Pascal step.
#[derive(Clone, Debug, PartialEq)]
pub struct ForceSimulator {
  inputs: ForceInputs,
  output_force: f64,
  current: bool,
}

impl Default for ForceSimulator {
  fn default() -> Self { Self::new(ForceInputs::default()) }
}

impl ForceSimulator {
  pub fn new(inputs: ForceInputs) -> Self {
    let mut sim = Self { inputs, output_force: 0.0, current: false };
    sim.update(inputs);
    sim
  }

  /// Replace the inputs and recompute immediately.
  /// Returns false when the formula was undefined and the previous output was kept.
  pub fn update(&mut self, inputs: ForceInputs) -> bool {
    self.inputs = inputs;
    self.current = match compute_output_force(inputs.input_force, inputs.control_area, inputs.actuator_area) {
      Some(f2) => {
        self.output_force = f2;
        true
      }
      None => false,
    };
    self.current
  }

  /// False while the output is a kept value from earlier inputs.
  pub fn output_is_current(&self) -> bool { self.current }

  pub fn inputs(&self) -> ForceInputs { self.inputs }

  /// Full-precision F2.
  pub fn output_force(&self) -> f64 { self.output_force }

  /// F2 rounded to two decimals.
  pub fn display_output_force(&self) -> f64 { round_to(self.output_force, 2) }

  /// S2/S1 rounded to one decimal, if defined for the current inputs.
  pub fn display_ratio(&self) -> Option<f64> {
    amplification_ratio(self.inputs.control_area, self.inputs.actuator_area).map(|r| round_to(r, 1))
  }

  /// Bar heights (percent) for F1 and F2, each capped at 100.
  pub fn bar_shares(&self) -> (f64, f64) {
    let f1 = self.inputs.input_force;
    let f2 = self.display_output_force();
    let total = if f1 + f2 == 0.0 { 1.0 } else { f1 + f2 };
    ((f1 / total * 100.0).min(100.0), (f2 / total * 100.0).min(100.0))
  }
}

/// Area ratio the challenge expects.
pub fn expected_challenge_ratio() -> f64 {
  CHALLENGE_LOAD_GRAMS / CHALLENGE_EFFORT_GRAMS
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeResult {
  Correct,
  Incorrect,
}

impl ChallengeResult {
  pub fn feedback(self) -> &'static str {
    match self {
      ChallengeResult::Correct => "Chính xác! (5 lần)",
      ChallengeResult::Incorrect => "Sai rồi, hãy thử lại (Gợi ý: 500 / 100 = ?)",
    }
  }
}

/// Grade a free-text ratio answer. Unparsable text counts as incorrect.
pub fn check_challenge_answer(answer: &str) -> ChallengeResult {
  match answer.trim().parse::<f64>() {
    Ok(v) if (v - expected_challenge_ratio()).abs() <= RATIO_EPSILON => ChallengeResult::Correct,
    _ => ChallengeResult::Incorrect,
  }
}

/// Challenge answer box: editing the answer hides the previous result until re-checked.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChallengeState {
  answer: String,
  result: Option<ChallengeResult>,
}

impl ChallengeState {
  pub fn set_answer(&mut self, answer: impl Into<String>) {
    self.answer = answer.into();
    self.result = None;
  }

  pub fn check(&mut self) -> ChallengeResult {
    let r = check_challenge_answer(&self.answer);
    self.result = Some(r);
    r
  }

  pub fn answer(&self) -> &str { &self.answer }

  pub fn result(&self) -> Option<ChallengeResult> { self.result }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn textbook_example() {
    assert_eq!(compute_output_force(10.0, 2.0, 10.0), Some(50.0));
  }

  #[test]
  fn monotonic_in_both_areas() {
    let areas = [0.5, 1.0, 2.0, 3.5, 10.0, 42.0];
    for f1 in [1.0, 10.0, 250.0] {
      for s1 in areas {
        for w in areas.windows(2) {
          let lo = compute_output_force(f1, s1, w[0]).unwrap();
          let hi = compute_output_force(f1, s1, w[1]).unwrap();
          assert!(hi > lo, "increasing in actuator area");
        }
      }
      for s2 in areas {
        for w in areas.windows(2) {
          let small = compute_output_force(f1, w[0], s2).unwrap();
          let large = compute_output_force(f1, w[1], s2).unwrap();
          assert!(small > large, "decreasing in control area");
        }
      }
    }
  }

  #[test]
  fn undefined_for_non_positive_control_area() {
    assert_eq!(compute_output_force(10.0, 0.0, 10.0), None);
    assert_eq!(compute_output_force(10.0, -1.0, 10.0), None);
    assert_eq!(compute_output_force(f64::NAN, 2.0, 10.0), None);
    assert_eq!(amplification_ratio(0.0, 5.0), None);
  }

  #[test]
  fn simulator_keeps_last_valid_output() {
    let mut sim = ForceSimulator::default();
    assert_eq!(sim.display_output_force(), 50.0);
    assert_eq!(sim.display_ratio(), Some(5.0));

    assert!(!sim.update(ForceInputs { input_force: 10.0, control_area: 0.0, actuator_area: 10.0 }));
    assert!(!sim.output_is_current());
    assert_eq!(sim.display_output_force(), 50.0);
    assert_eq!(sim.display_ratio(), None);

    assert!(sim.update(ForceInputs { input_force: 10.0, control_area: 3.0, actuator_area: 10.0 }));
    assert!(sim.output_is_current());
    assert_eq!(sim.display_output_force(), 33.33);
    assert!((sim.output_force() - 100.0 / 3.0).abs() < 1e-12);
    assert_eq!(sim.display_ratio(), Some(3.3));
  }

  #[test]
  fn bar_shares_split_total() {
    let sim = ForceSimulator::default();
    let (a, b) = sim.bar_shares();
    assert!((a - 10.0 / 60.0 * 100.0).abs() < 1e-9);
    assert!((b - 50.0 / 60.0 * 100.0).abs() < 1e-9);

    let zero = ForceSimulator::new(ForceInputs { input_force: 0.0, control_area: 2.0, actuator_area: 10.0 });
    assert_eq!(zero.bar_shares(), (0.0, 0.0));
  }

  #[test]
  fn challenge_accepts_only_five() {
    assert_eq!(expected_challenge_ratio(), 5.0);
    assert_eq!(check_challenge_answer("5"), ChallengeResult::Correct);
    assert_eq!(check_challenge_answer(" 5.0 "), ChallengeResult::Correct);
    for wrong in ["4", "5.1", "0.2", "500", "-5", "abc", ""] {
      assert_eq!(check_challenge_answer(wrong), ChallengeResult::Incorrect, "{wrong}");
    }
  }

  #[test]
  fn editing_answer_hides_result() {
    let mut c = ChallengeState::default();
    c.set_answer("5");
    assert_eq!(c.check(), ChallengeResult::Correct);
    assert_eq!(c.result(), Some(ChallengeResult::Correct));
    c.set_answer("6");
    assert_eq!(c.result(), None);
    assert_eq!(c.check(), ChallengeResult::Incorrect);
  }
}
