//! Lesson step controller: which step is active and the last submitted design.

use serde::Serialize;
use tracing::{debug, info};

use crate::domain::{DesignProposal, FrameMaterial, LessonStep};
use crate::util::escape_html;

pub const NO_NOTES: &str = "Không có ghi chú";

#[derive(Clone, Debug, Default, PartialEq)]
pub struct LessonController {
  current: LessonStep,
  proposal: Option<DesignProposal>,
}

impl LessonController {
  pub fn new() -> Self { Self::default() }

  pub fn current(&self) -> LessonStep { self.current }

  pub fn proposal(&self) -> Option<&DesignProposal> { self.proposal.as_ref() }

  /// Free navigation; any step may be reached from any step.
  pub fn go_to(&mut self, step: LessonStep) {
    debug!(target: "lesson", from = ?self.current, to = ?step, "Step transition");
    self.current = step;
  }

  /// Store a copy of the accepted proposal and move to the summary.
  pub fn submit_design(&mut self, proposal: DesignProposal) {
    info!(
      target: "lesson",
      control_mm = proposal.control_piston_diameter,
      actuator_mm = proposal.actuator_piston_diameter,
      material = ?proposal.frame_material,
      joints = proposal.joint_count.get(),
      "Design proposal submitted"
    );
    self.proposal = Some(proposal);
    self.current = LessonStep::Summary;
  }

  /// Back to Intro. The stored proposal is cleared so Summary never shows a previous run.
  pub fn restart(&mut self) {
    info!(target: "lesson", had_proposal = self.proposal.is_some(), "Lesson restarted");
    self.proposal = None;
    self.current = LessonStep::Intro;
  }

  pub fn context(&self) -> &'static str { self.current.context() }

  pub fn summary(&self) -> SummaryView {
    SummaryView::from_proposal(self.proposal.as_ref())
  }

  pub fn menu(&self) -> MenuView {
    MenuView {
      visible: self.current != LessonStep::Intro,
      entries: LessonStep::ALL
        .iter()
        .filter_map(|s| {
          s.menu_label().map(|label| MenuEntry { step: *s, label, active: *s == self.current })
        })
        .collect(),
    }
  }
}

/// Step menu shown in the header; hidden on the intro page.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct MenuView {
  pub visible: bool,
  pub entries: Vec<MenuEntry>,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct MenuEntry {
  pub step: LessonStep,
  pub label: &'static str,
  pub active: bool,
}

/// Summary page data. Every field is absent when nothing was submitted yet.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SummaryView {
  pub control_piston_diameter: Option<f64>,
  pub actuator_piston_diameter: Option<f64>,
  pub frame_material: Option<FrameMaterial>,
  pub frame_material_label: Option<&'static str>,
  pub joint_count: Option<u8>,
  pub joint_count_label: Option<&'static str>,
  pub notes: Option<String>,
  /// Notes as displayed, with the placeholder for empty notes.
  pub notes_display: String,
}

impl SummaryView {
  fn from_proposal(p: Option<&DesignProposal>) -> Self {
    match p {
      Some(p) => Self {
        control_piston_diameter: Some(p.control_piston_diameter),
        actuator_piston_diameter: Some(p.actuator_piston_diameter),
        frame_material: Some(p.frame_material),
        frame_material_label: Some(p.frame_material.label()),
        joint_count: Some(p.joint_count.get()),
        joint_count_label: Some(p.joint_count.label()),
        notes: Some(p.notes.clone()),
        notes_display: if p.notes.trim().is_empty() { NO_NOTES.to_string() } else { p.notes.clone() },
      },
      None => Self {
        control_piston_diameter: None,
        actuator_piston_diameter: None,
        frame_material: None,
        frame_material_label: None,
        joint_count: None,
        joint_count_label: None,
        notes: None,
        notes_display: NO_NOTES.to_string(),
      },
    }
  }
}

fn opt<T: ToString>(v: Option<T>) -> String {
  v.map(|x| x.to_string()).unwrap_or_default()
}

/// Printable summary sheet: no navigation chrome, content at full width.
pub fn render_printable(summary: &SummaryView) -> String {
  let force = format!(
    "{}mm (S1) &rarr; {}mm (S2)",
    opt(summary.control_piston_diameter),
    opt(summary.actuator_piston_diameter)
  );
  let material = summary.frame_material_label.unwrap_or("");
  format!(
    r#"<!DOCTYPE html>
<html lang="vi">
<head>
<meta charset="utf-8">
<title>Tổng hợp Thiết Kế</title>
<style>
body {{ font-family: sans-serif; margin: 0; padding: 2rem; }}
main {{ width: 100%; }}
.row {{ display: flex; justify-content: space-between; border-bottom: 1px solid #ccc; padding: .5rem 0; }}
@media print {{ nav, header, footer, button {{ display: none !important; }} body {{ padding: 0; }} }}
</style>
</head>
<body>
<main>
<h1>Tổng hợp Thiết Kế</h1>
<div class="row"><strong>Hệ thống lực:</strong><span>{force}</span></div>
<div class="row"><strong>Vật liệu khung:</strong><span>{material}</span></div>
<div class="row"><strong>Số khớp:</strong><span>{joints}</span></div>
<h2>Ghi chú:</h2>
<p><em>{notes}</em></p>
</main>
</body>
</html>
"#,
    force = force,
    material = escape_html(material),
    joints = escape_html(summary.joint_count_label.unwrap_or("")),
    notes = escape_html(&summary.notes_display),
  )
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::JointCount;
  use pretty_assertions::assert_eq;

  fn proposal() -> DesignProposal {
    DesignProposal {
      control_piston_diameter: 10.0,
      actuator_piston_diameter: 20.0,
      frame_material: FrameMaterial::Cardboard,
      joint_count: JointCount::Three,
      notes: String::new(),
    }
  }

  #[test]
  fn starts_at_intro_with_hidden_menu() {
    let c = LessonController::new();
    assert_eq!(c.current(), LessonStep::Intro);
    assert!(!c.menu().visible);
    assert!(c.proposal().is_none());
  }

  #[test]
  fn free_navigation_and_summary_without_submission() {
    let mut c = LessonController::new();
    c.go_to(LessonStep::Summary);
    assert_eq!(c.current(), LessonStep::Summary);
    let s = c.summary();
    assert_eq!(s.control_piston_diameter, None);
    assert_eq!(s.joint_count, None);
    assert_eq!(s.notes_display, NO_NOTES);

    c.go_to(LessonStep::Mechanics);
    let menu = c.menu();
    assert!(menu.visible);
    let active: Vec<_> = menu.entries.iter().filter(|e| e.active).map(|e| e.step).collect();
    assert_eq!(active, vec![LessonStep::Mechanics]);
  }

  #[test]
  fn submission_moves_to_summary_with_exact_values() {
    let mut c = LessonController::new();
    c.go_to(LessonStep::Design);
    c.submit_design(proposal());
    assert_eq!(c.current(), LessonStep::Summary);
    let s = c.summary();
    assert_eq!(s.control_piston_diameter, Some(10.0));
    assert_eq!(s.actuator_piston_diameter, Some(20.0));
    assert_eq!(s.frame_material, Some(FrameMaterial::Cardboard));
    assert_eq!(s.joint_count, Some(3));
    assert_eq!(s.notes.as_deref(), Some(""));
  }

  #[test]
  fn later_submission_supersedes_earlier_one() {
    let mut c = LessonController::new();
    c.submit_design(proposal());
    let mut second = proposal();
    second.joint_count = JointCount::Four;
    c.submit_design(second.clone());
    assert_eq!(c.proposal(), Some(&second));
  }

  #[test]
  fn restart_clears_stored_proposal() {
    let mut c = LessonController::new();
    c.submit_design(proposal());
    c.restart();
    assert_eq!(c.current(), LessonStep::Intro);
    c.go_to(LessonStep::Summary);
    assert_eq!(c.summary().control_piston_diameter, None);
  }

  #[test]
  fn printable_sheet_escapes_notes_and_hides_chrome() {
    let mut c = LessonController::new();
    let mut p = proposal();
    p.notes = "<script>x</script>".into();
    c.submit_design(p);
    let html = render_printable(&c.summary());
    assert!(html.contains("10mm (S1) &rarr; 20mm (S2)"));
    assert!(html.contains("3 Khớp (Xoay + Nâng + Kẹp)"));
    assert!(html.contains("&lt;script&gt;"));
    assert!(html.contains("@media print"));
    assert!(!html.contains("<script>"));
  }

  #[test]
  fn printable_sheet_without_proposal_shows_placeholder() {
    let html = render_printable(&LessonController::new().summary());
    assert!(html.contains(NO_NOTES));
  }
}
