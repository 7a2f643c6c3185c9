//! Loading lesson configuration (assistant prompts + fallback messages) from TOML.
//!
//! See `LessonConfig` and `Prompts` for expected schema.

use serde::Deserialize;
use tracing::{error, info};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct LessonConfig {
  #[serde(default)]
  pub prompts: Prompts,
}

/// Texts used by the assistant gateway. Defaults match the lesson's audience
/// (grade 8, Vietnamese). `{context}` in `assistant_system` is replaced with
/// the active step description.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct Prompts {
  pub assistant_system: String,
  pub greeting: String,
  pub not_configured: String,
  pub busy: String,
  pub connection_error: String,
  pub max_output_tokens: u32,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      assistant_system: "Bạn là một trợ lý ảo STEM thân thiện dành cho học sinh lớp 8.\n\
Chủ đề bài học: \"Cánh tay Robot Thủy lực xử lý rác thải độc hại\".\n\
Nhiệm vụ của bạn là giải thích ngắn gọn, dễ hiểu về Nguyên lý Pascal, Cơ khí, và Vật liệu.\n\
Tránh dùng từ ngữ quá hàn lâm. Hãy khuyến khích học sinh tư duy.\n\n\
Bối cảnh hiện tại của học sinh: {context}".into(),
      greeting: "Xin chào! Mình là trợ lý AI. Bạn cần giúp gì về bài học Robot thủy lực không?".into(),
      not_configured: "Chưa cấu hình API Key. Vui lòng kiểm tra lại môi trường phát triển.".into(),
      busy: "Xin lỗi, hiện tại thầy AI đang bận, em thử lại sau nhé!".into(),
      connection_error: "Đã xảy ra lỗi khi kết nối với trợ lý AI.".into(),
      max_output_tokens: 300,
    }
  }
}

pub fn parse_lesson_config(s: &str) -> Result<LessonConfig, toml::de::Error> {
  toml::from_str::<LessonConfig>(s)
}

/// Attempt to load `LessonConfig` from LESSON_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_lesson_config_from_env() -> Option<LessonConfig> {
  let path = std::env::var("LESSON_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match parse_lesson_config(&s) {
      Ok(cfg) => {
        info!(target: "hydralearn_backend", %path, "Loaded lesson config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "hydralearn_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "hydralearn_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}
