//! Assistant gateway: one question + one context label in, display text out.
//!
//! Every call is independent. No conversation history is sent; the chat
//! transcript lives in the client. Failures collapse into fixed messages.

use thiserror::Error;
use tracing::{debug, error, instrument, warn};

use crate::config::Prompts;
use crate::openai::{OpenAI, OpenAIError};
use crate::util::fill_template;

#[derive(Debug, Error)]
pub enum AssistantError {
  #[error("assistant is not configured (no API key)")]
  NotConfigured,
  #[error("assistant returned no text")]
  EmptyResponse,
  #[error(transparent)]
  Provider(#[from] OpenAIError),
}

#[derive(Clone)]
pub struct AssistantGateway {
  openai: Option<OpenAI>,
  prompts: Prompts,
}

impl AssistantGateway {
  pub fn new(openai: Option<OpenAI>, prompts: Prompts) -> Self {
    Self { openai, prompts }
  }

  pub fn is_configured(&self) -> bool { self.openai.is_some() }

  pub fn greeting(&self) -> &str { &self.prompts.greeting }

  pub fn describe(&self) -> Option<(&str, &str)> {
    self.openai.as_ref().map(|oa| (oa.base_url.as_str(), oa.model.as_str()))
  }

  /// Single completion call. Never retried.
  #[instrument(level = "info", skip(self, question, context), fields(question_len = question.len(), context_len = context.len()))]
  pub async fn try_ask(&self, question: &str, context: &str) -> Result<String, AssistantError> {
    let oa = self.openai.as_ref().ok_or(AssistantError::NotConfigured)?;
    let system = fill_template(&self.prompts.assistant_system, &[("context", context)]);
    let text = oa
      .chat_plain(&system, question, 0.7, Some(self.prompts.max_output_tokens))
      .await?;
    if text.trim().is_empty() {
      return Err(AssistantError::EmptyResponse);
    }
    Ok(text)
  }

  /// Display text for the chat window: the model's reply or one of the fixed fallbacks.
  pub async fn ask(&self, question: &str, context: &str) -> String {
    match self.try_ask(question, context).await {
      Ok(text) => {
        debug!(target: "assistant", text_len = text.len(), "Assistant reply");
        text
      }
      Err(AssistantError::NotConfigured) => {
        debug!(target: "assistant", "Assistant not configured; returning notice");
        self.prompts.not_configured.clone()
      }
      Err(AssistantError::EmptyResponse) => {
        warn!(target: "assistant", "Assistant returned empty text");
        self.prompts.busy.clone()
      }
      Err(e) => {
        error!(target: "assistant", error = %e, "Assistant call failed");
        self.prompts.connection_error.clone()
      }
    }
  }
}
