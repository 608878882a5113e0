//! Mock provider implementation for local runs and tests.

use super::{FinishReason, GenerationParams, ProviderError, ProviderResponse, TextProvider};
use async_trait::async_trait;
use std::sync::Mutex;

/// Mock text provider.
///
/// When enabled it answers with a canned reply (or echoes the prompt);
/// when disabled every call fails with `NotConfigured`. All prompts are
/// recorded so callers can inspect exactly what would have been sent.
pub struct MockTextProvider {
    enabled: bool,
    reply: Option<String>,
    prompts: Mutex<Vec<String>>,
}

impl MockTextProvider {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            reply: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Enabled provider that always answers with `reply`.
    pub fn with_reply(reply: impl Into<String>) -> Self {
        Self {
            reply: Some(reply.into()),
            ..Self::new(true)
        }
    }

    /// Prompts received so far, oldest first.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl TextProvider for MockTextProvider {
    async fn generate(
        &self,
        prompt: &str,
        _params: &GenerationParams,
    ) -> Result<ProviderResponse, ProviderError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }

        if !self.enabled {
            return Err(ProviderError::NotConfigured(
                "Mock text provider not enabled".to_string(),
            ));
        }

        let text = self
            .reply
            .clone()
            .unwrap_or_else(|| format!("Mock response for: {}", prompt));

        Ok(ProviderResponse {
            output_tokens: text.len() as i32 / 4,
            text,
            input_tokens: prompt.len() as i32 / 4,
            finish_reason: FinishReason::Complete,
        })
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        if self.enabled {
            Ok(())
        } else {
            Err(ProviderError::NotConfigured(
                "Mock text provider not enabled".to_string(),
            ))
        }
    }

    fn model(&self) -> &str {
        "mock"
    }
}
