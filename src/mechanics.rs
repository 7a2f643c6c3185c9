//! Answer keys for the Mechanics step: joint matching and material selection.
//!
//! Both exercises are static lookups. Nothing here mutates the keys; the
//! per-student state only records what was dropped or selected.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MechanicsError {
  #[error("unknown joint id: {0}")]
  UnknownJoint(String),
  #[error("unknown slot id: {0}")]
  UnknownSlot(String),
}

/// Joint types of the arm. Each also names its own description slot.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum JointKind {
  Rotate,
  Lift,
  Grip,
}

impl JointKind {
  pub const ALL: [JointKind; 3] = [JointKind::Rotate, JointKind::Lift, JointKind::Grip];

  pub fn id(self) -> &'static str {
    match self {
      JointKind::Rotate => "rotate",
      JointKind::Lift => "lift",
      JointKind::Grip => "grip",
    }
  }

  pub fn name(self) -> &'static str {
    match self {
      JointKind::Rotate => "Khớp Xoay (Base)",
      JointKind::Lift => "Khớp Nâng/Hạ (Arm)",
      JointKind::Grip => "Khớp Kẹp (Claw)",
    }
  }

  pub fn description(self) -> &'static str {
    match self {
      JointKind::Rotate => "Giúp cánh tay quay trái/phải quanh trục đế.",
      JointKind::Lift => "Giúp cánh tay di chuyển lên cao hoặc xuống thấp.",
      JointKind::Grip => "Dùng để nắm, giữ và thả vật thể.",
    }
  }

  pub fn slot_id(self) -> String { format!("{}-slot", self.id()) }

  pub fn from_id(id: &str) -> Option<Self> {
    Self::ALL.into_iter().find(|j| j.id() == id.trim())
  }

  /// Slots are addressed as `<joint>-slot`; the bare joint id is accepted too.
  pub fn from_slot(slot: &str) -> Option<Self> {
    let s = slot.trim();
    Self::from_id(s.strip_suffix("-slot").unwrap_or(s))
  }
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MatchMarker {
  Empty,
  Correct,
  Incorrect,
}

/// What the student dropped onto each description slot.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct JointMatchState {
  matches: BTreeMap<JointKind, JointKind>,
}

impl JointMatchState {
  /// Store `dragged_joint` on `target_slot`, replacing any earlier drop.
  pub fn record_match(&mut self, target_slot: &str, dragged_joint: &str) -> Result<(), MechanicsError> {
    let target = JointKind::from_slot(target_slot)
      .ok_or_else(|| MechanicsError::UnknownSlot(target_slot.to_string()))?;
    let dragged = JointKind::from_id(dragged_joint)
      .ok_or_else(|| MechanicsError::UnknownJoint(dragged_joint.to_string()))?;
    self.matches.insert(target, dragged);
    Ok(())
  }

  /// True iff the joint dropped on the slot is the slot's own joint.
  pub fn is_correct(&self, target_slot: &str) -> bool {
    JointKind::from_slot(target_slot)
      .map(|t| self.marker(t) == MatchMarker::Correct)
      .unwrap_or(false)
  }

  pub fn dropped(&self, slot: JointKind) -> Option<JointKind> {
    self.matches.get(&slot).copied()
  }

  pub fn marker(&self, slot: JointKind) -> MatchMarker {
    match self.matches.get(&slot) {
      None => MatchMarker::Empty,
      Some(d) if *d == slot => MatchMarker::Correct,
      Some(_) => MatchMarker::Incorrect,
    }
  }

  pub fn all_correct(&self) -> bool {
    JointKind::ALL.iter().all(|j| self.marker(*j) == MatchMarker::Correct)
  }
}

/// Selection criteria of the material exercise.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
  StructuralStiffness,
  LowestCost,
  EaseOfFabrication,
}

impl Criterion {
  pub const ALL: [Criterion; 3] = [Criterion::StructuralStiffness, Criterion::LowestCost, Criterion::EaseOfFabrication];

  pub fn label(self) -> &'static str {
    match self {
      Criterion::StructuralStiffness => "Độ cứng vững cao nhất",
      Criterion::LowestCost => "Chi phí thấp nhất (dễ kiếm)",
      Criterion::EaseOfFabrication => "Dễ gia công (cắt/dán) nhất",
    }
  }

  fn index(self) -> usize {
    match self {
      Criterion::StructuralStiffness => 0,
      Criterion::LowestCost => 1,
      Criterion::EaseOfFabrication => 2,
    }
  }
}

/// Candidate materials offered for each criterion.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum QuizMaterial {
  Cardboard,
  PopsicleSticks,
  Formex,
}

impl QuizMaterial {
  pub const ALL: [QuizMaterial; 3] = [QuizMaterial::Cardboard, QuizMaterial::PopsicleSticks, QuizMaterial::Formex];

  pub fn label(self) -> &'static str {
    match self {
      QuizMaterial::Cardboard => "Bìa Carton",
      QuizMaterial::PopsicleSticks => "Que kem",
      QuizMaterial::Formex => "Bìa Formex",
    }
  }

  fn index(self) -> usize {
    match self {
      QuizMaterial::Cardboard => 0,
      QuizMaterial::PopsicleSticks => 1,
      QuizMaterial::Formex => 2,
    }
  }
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
  Correct,
  Acceptable,
  Suboptimal,
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub struct MaterialJudgment {
  pub verdict: Verdict,
  pub explanation: &'static str,
}

const fn j(verdict: Verdict, explanation: &'static str) -> MaterialJudgment {
  MaterialJudgment { verdict, explanation }
}

// Rows: criterion. Columns: Cardboard, PopsicleSticks, Formex.
static MATERIAL_KEY: [[MaterialJudgment; 3]; 3] = [
  [
    j(Verdict::Correct, "Đúng (Bìa carton ghép nhiều lớp đủ cứng vững)"),
    j(Verdict::Suboptimal, "Chưa tối ưu (Que kem dễ gãy ở mối ghép)"),
    j(Verdict::Correct, "Đúng (Formex cứng và không thấm nước)"),
  ],
  [
    j(Verdict::Correct, "Đúng (Tận dụng vỏ hộp)"),
    j(Verdict::Acceptable, "Chấp nhận được (Que kem rẻ nhưng phải mua thêm)"),
    j(Verdict::Suboptimal, "Chưa tối ưu (Formex phải mua, giá cao hơn)"),
  ],
  [
    j(Verdict::Correct, "Đúng (Dùng kéo cắt được)"),
    j(Verdict::Suboptimal, "Khó hơn (Phải cắt và dán từng que)"),
    j(Verdict::Acceptable, "Chấp nhận được (Cần dao rọc giấy để cắt)"),
  ],
];

pub fn judge(criterion: Criterion, material: QuizMaterial) -> MaterialJudgment {
  MATERIAL_KEY[criterion.index()][material.index()]
}

/// Student answers plus which verdicts are currently revealed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MaterialQuiz {
  answers: BTreeMap<Criterion, QuizMaterial>,
  revealed: BTreeSet<Criterion>,
  checked: bool,
}

impl MaterialQuiz {
  /// Record an answer. Hides that criterion's verdict until the next check.
  pub fn select(&mut self, criterion: Criterion, material: QuizMaterial) {
    self.answers.insert(criterion, material);
    self.revealed.remove(&criterion);
  }

  /// Reveal verdicts for every answered criterion. Idempotent.
  pub fn check(&mut self) {
    self.revealed = self.answers.keys().copied().collect();
    self.checked = true;
  }

  pub fn answer(&self, criterion: Criterion) -> Option<QuizMaterial> {
    self.answers.get(&criterion).copied()
  }

  /// The judgment for a criterion, if it is answered and revealed.
  pub fn verdict(&self, criterion: Criterion) -> Option<MaterialJudgment> {
    if !self.revealed.contains(&criterion) {
      return None;
    }
    self.answer(criterion).map(|m| judge(criterion, m))
  }

  /// True once `check` has run, whatever was answered at the time.
  pub fn is_checked(&self) -> bool { self.checked }
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  #[test]
  fn wrong_joint_on_slot_is_incorrect() {
    let mut m = JointMatchState::default();
    m.record_match("rotate-slot", "lift").unwrap();
    assert!(!m.is_correct("rotate-slot"));
    assert_eq!(m.marker(JointKind::Rotate), MatchMarker::Incorrect);
  }

  #[test]
  fn own_joint_on_slot_is_correct_and_redrop_overwrites() {
    let mut m = JointMatchState::default();
    m.record_match("rotate-slot", "lift").unwrap();
    m.record_match("rotate-slot", "rotate").unwrap();
    assert!(m.is_correct("rotate-slot"));
    assert!(m.is_correct("rotate"));
    assert_eq!(m.dropped(JointKind::Rotate), Some(JointKind::Rotate));
    assert_eq!(m.marker(JointKind::Grip), MatchMarker::Empty);
    assert!(!m.all_correct());

    m.record_match("lift-slot", "lift").unwrap();
    m.record_match("grip-slot", "grip").unwrap();
    assert!(m.all_correct());
  }

  #[test]
  fn unknown_ids_are_rejected() {
    let mut m = JointMatchState::default();
    assert_eq!(m.record_match("elbow-slot", "lift"), Err(MechanicsError::UnknownSlot("elbow-slot".into())));
    assert_eq!(m.record_match("lift-slot", "elbow"), Err(MechanicsError::UnknownJoint("elbow".into())));
    assert!(!m.is_correct("elbow-slot"));
    assert_eq!(m, JointMatchState::default());
  }

  #[test]
  fn answer_key_classes() {
    use Criterion::*;
    use QuizMaterial::*;
    let expected = [
      (StructuralStiffness, [Verdict::Correct, Verdict::Suboptimal, Verdict::Correct]),
      (LowestCost, [Verdict::Correct, Verdict::Acceptable, Verdict::Suboptimal]),
      (EaseOfFabrication, [Verdict::Correct, Verdict::Suboptimal, Verdict::Acceptable]),
    ];
    for (criterion, row) in expected {
      let got: Vec<_> = [Cardboard, PopsicleSticks, Formex].iter().map(|m| judge(criterion, *m).verdict).collect();
      assert_eq!(got, row.to_vec(), "{criterion:?}");
    }
    assert_eq!(judge(LowestCost, Cardboard).verdict, Verdict::Correct);
    assert_ne!(judge(StructuralStiffness, PopsicleSticks).verdict, Verdict::Correct);
  }

  #[test]
  fn verdicts_only_show_after_check_and_hide_on_change() {
    let mut q = MaterialQuiz::default();
    q.select(Criterion::LowestCost, QuizMaterial::Cardboard);
    assert_eq!(q.verdict(Criterion::LowestCost), None);

    q.check();
    q.check();
    assert_eq!(q.verdict(Criterion::LowestCost).map(|j| j.verdict), Some(Verdict::Correct));
    assert_eq!(q.verdict(Criterion::StructuralStiffness), None);

    q.select(Criterion::LowestCost, QuizMaterial::Formex);
    assert_eq!(q.verdict(Criterion::LowestCost), None);
    q.check();
    assert_eq!(q.verdict(Criterion::LowestCost).map(|j| j.verdict), Some(Verdict::Suboptimal));
  }

  #[test]
  fn changing_one_answer_keeps_other_verdicts() {
    let mut q = MaterialQuiz::default();
    q.select(Criterion::LowestCost, QuizMaterial::Cardboard);
    q.select(Criterion::EaseOfFabrication, QuizMaterial::Formex);
    q.check();
    q.select(Criterion::LowestCost, QuizMaterial::PopsicleSticks);
    assert_eq!(q.verdict(Criterion::LowestCost), None);
    assert_eq!(q.verdict(Criterion::EaseOfFabrication).map(|j| j.verdict), Some(Verdict::Acceptable));
  }

  #[test]
  fn checked_flag_tracks_check_calls() {
    let mut q = MaterialQuiz::default();
    assert!(!q.is_checked());
    q.check();
    assert!(q.is_checked());

    q.select(Criterion::LowestCost, QuizMaterial::Cardboard);
    q.check();
    q.select(Criterion::LowestCost, QuizMaterial::Formex);
    assert_eq!(q.verdict(Criterion::LowestCost), None);
    assert!(q.is_checked());
  }
}
