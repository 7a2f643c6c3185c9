//! Design proposal form: raw inputs in, frozen `DesignProposal` out.

use serde::Deserialize;
use thiserror::Error;

use crate::domain::{DesignProposal, FrameMaterial, JointCount};

pub const MIN_DIAMETER_MM: f64 = 5.0;
pub const MAX_DIAMETER_MM: f64 = 50.0;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
  #[error("{field} is required")]
  Missing { field: &'static str },
  #[error("{field} must be a number (got '{value}')")]
  NotNumeric { field: &'static str, value: String },
  #[error("{field} must be between {min} and {max} mm (got {value})")]
  OutOfRange { field: &'static str, value: f64, min: f64, max: f64 },
  #[error("unknown frame material '{0}'")]
  UnknownMaterial(String),
  #[error("joint count must be 2, 3 or 4 (got '{0}')")]
  InvalidJointCount(String),
}

/// Form fields arrive either as JSON numbers or as the text of an input box.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RawField {
  Number(f64),
  Text(String),
}

impl RawField {
  fn text(&self) -> String {
    match self {
      RawField::Number(n) => n.to_string(),
      RawField::Text(s) => s.trim().to_string(),
    }
  }

  fn is_blank(&self) -> bool {
    matches!(self, RawField::Text(s) if s.trim().is_empty())
  }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDesignInput {
  #[serde(default)]
  pub control_piston_diameter: Option<RawField>,
  #[serde(default)]
  pub actuator_piston_diameter: Option<RawField>,
  #[serde(default)]
  pub frame_material: Option<String>,
  #[serde(default)]
  pub joint_count: Option<RawField>,
  #[serde(default)]
  pub notes: Option<String>,
}

/// Validate every field and build the proposal. All field errors are reported together.
pub fn validate_and_build(raw: &RawDesignInput) -> Result<DesignProposal, Vec<ValidationError>> {
  let mut errors = Vec::new();

  let control = diameter("controlPistonDiameter", raw.control_piston_diameter.as_ref())
    .map_err(|e| errors.push(e))
    .ok();
  let actuator = diameter("actuatorPistonDiameter", raw.actuator_piston_diameter.as_ref())
    .map_err(|e| errors.push(e))
    .ok();

  let frame_material = match raw.frame_material.as_deref().map(str::trim) {
    None | Some("") => Some(FrameMaterial::default()),
    Some(s) => match FrameMaterial::parse(s) {
      Some(m) => Some(m),
      None => {
        errors.push(ValidationError::UnknownMaterial(s.to_string()));
        None
      }
    },
  };

  let joint_count = match raw.joint_count.as_ref() {
    None => Some(JointCount::default()),
    Some(f) if f.is_blank() => Some(JointCount::default()),
    Some(f) => match parse_joint_count(f) {
      Some(j) => Some(j),
      None => {
        errors.push(ValidationError::InvalidJointCount(f.text()));
        None
      }
    },
  };

  match (control, actuator, frame_material, joint_count) {
    (Some(c), Some(a), Some(m), Some(j)) if errors.is_empty() => Ok(DesignProposal {
      control_piston_diameter: c,
      actuator_piston_diameter: a,
      frame_material: m,
      joint_count: j,
      notes: raw.notes.clone().unwrap_or_default(),
    }),
    _ => Err(errors),
  }
}

fn diameter(field: &'static str, raw: Option<&RawField>) -> Result<f64, ValidationError> {
  let value = match raw {
    None => return Err(ValidationError::Missing { field }),
    Some(f) if f.is_blank() => return Err(ValidationError::Missing { field }),
    Some(RawField::Number(n)) => *n,
    Some(RawField::Text(s)) => s
      .trim()
      .parse::<f64>()
      .map_err(|_| ValidationError::NotNumeric { field, value: s.trim().to_string() })?,
  };
  if !value.is_finite() || !(MIN_DIAMETER_MM..=MAX_DIAMETER_MM).contains(&value) {
    return Err(ValidationError::OutOfRange { field, value, min: MIN_DIAMETER_MM, max: MAX_DIAMETER_MM });
  }
  Ok(value)
}

fn parse_joint_count(f: &RawField) -> Option<JointCount> {
  let n = match f {
    RawField::Number(n) if n.fract() == 0.0 && (0.0..=255.0).contains(n) => *n as u8,
    RawField::Number(_) => return None,
    RawField::Text(s) => s.trim().parse::<u8>().ok()?,
  };
  JointCount::try_from(n).ok()
}
