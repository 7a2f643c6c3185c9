//! Domain models used by the backend: lesson steps, frame materials, joint counts,
//! and the design proposal itself.

use serde::{Deserialize, Serialize};

/// Which step of the lesson is the student currently on?
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LessonStep {
  #[default]
  Intro,
  PascalTheory,
  Mechanics,
  Design,
  Summary,
}

impl LessonStep {
  /// Step order as presented to the student.
  pub const ALL: [LessonStep; 5] = [
    LessonStep::Intro,
    LessonStep::PascalTheory,
    LessonStep::Mechanics,
    LessonStep::Design,
    LessonStep::Summary,
  ];

  /// Human-readable description of what the student is doing, handed to the assistant.
  pub fn context(self) -> &'static str {
    match self {
      LessonStep::PascalTheory => "Học sinh đang học về Nguyên lý Pascal và công thức F2/S2 = F1/S1.",
      LessonStep::Mechanics => "Học sinh đang tìm hiểu về các loại khớp (xoay, nâng, kẹp) và vật liệu chế tạo robot.",
      LessonStep::Design => "Học sinh đang điền phiếu đề xuất thiết kế robot thủy lực.",
      LessonStep::Intro | LessonStep::Summary => "Giới thiệu chung về dự án.",
    }
  }

  /// Label in the step menu. Intro and Summary are not menu entries.
  pub fn menu_label(self) -> Option<&'static str> {
    match self {
      LessonStep::PascalTheory => Some("1. Pascal"),
      LessonStep::Mechanics => Some("2. Cơ cấu"),
      LessonStep::Design => Some("3. Thiết kế"),
      LessonStep::Intro | LessonStep::Summary => None,
    }
  }
}

/// Main frame material chosen on the design form.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FrameMaterial {
  #[default]
  Cardboard,
  PopsicleSticks,
  Formex,
  Mixed,
}

impl FrameMaterial {
  pub fn label(self) -> &'static str {
    match self {
      FrameMaterial::Cardboard => "Bìa Carton cứng (Rẻ, dễ gia công)",
      FrameMaterial::PopsicleSticks => "Que kem (Khá cứng, thẩm mỹ)",
      FrameMaterial::Formex => "Bìa Formex (Cứng, không thấm nước)",
      FrameMaterial::Mixed => "Hỗn hợp (Kết hợp các loại)",
    }
  }

  /// Accepts both the API names and the short form values used by the lesson frontend.
  pub fn parse(s: &str) -> Option<Self> {
    match s.trim().to_lowercase().as_str() {
      "cardboard" | "bia" => Some(FrameMaterial::Cardboard),
      "popsicle_sticks" | "popsiclesticks" | "que" => Some(FrameMaterial::PopsicleSticks),
      "formex" => Some(FrameMaterial::Formex),
      "mixed" | "hon_hop" => Some(FrameMaterial::Mixed),
      _ => None,
    }
  }
}

/// Degrees of freedom of the arm. Only 2, 3 or 4 joints are offered.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "u8", into = "u8")]
pub enum JointCount {
  Two,
  #[default]
  Three,
  Four,
}

impl JointCount {
  pub fn get(self) -> u8 {
    match self {
      JointCount::Two => 2,
      JointCount::Three => 3,
      JointCount::Four => 4,
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      JointCount::Two => "2 Khớp (Nâng + Kẹp)",
      JointCount::Three => "3 Khớp (Xoay + Nâng + Kẹp)",
      JointCount::Four => "4 Khớp (Xoay + Vai + Khuỷu + Kẹp)",
    }
  }
}

impl TryFrom<u8> for JointCount {
  type Error = String;

  fn try_from(n: u8) -> Result<Self, Self::Error> {
    match n {
      2 => Ok(JointCount::Two),
      3 => Ok(JointCount::Three),
      4 => Ok(JointCount::Four),
      other => Err(format!("joint count must be 2, 3 or 4 (got {other})")),
    }
  }
}

impl From<JointCount> for u8 {
  fn from(j: JointCount) -> u8 { j.get() }
}

/// A submitted design proposal. Frozen by value once the form is accepted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignProposal {
  /// Control (input) piston diameter in millimeters.
  pub control_piston_diameter: f64,
  /// Actuator (output) piston diameter in millimeters.
  pub actuator_piston_diameter: f64,
  pub frame_material: FrameMaterial,
  pub joint_count: JointCount,
  #[serde(default)]
  pub notes: String,
}
