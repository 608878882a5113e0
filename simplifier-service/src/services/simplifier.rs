//! Prompt construction and the single simplify operation.

use crate::services::metrics;
use crate::services::providers::{GenerationParams, ProviderError, TextProvider};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimplifyError {
    #[error("No text provided")]
    EmptyInput,

    #[error("Provider failed: {0}")]
    Provider(#[from] ProviderError),
}

/// First `max_chars` characters of `text`, never splitting a code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Wrap user text in the accessibility instructions sent to the model.
pub fn build_prompt(text: &str, max_chars: usize) -> String {
    format!(
        "Act as an accessibility assistant.\n\
         1. Summarize the following text in very simple English (bullet points).\n\
         2. Explain any difficult words.\n\
         \n\
         Text: {}",
        truncate_chars(text, max_chars)
    )
}

/// Relays text to a [`TextProvider`] and hands back its answer untouched.
#[derive(Clone)]
pub struct Simplifier {
    provider: Arc<dyn TextProvider>,
    params: GenerationParams,
    max_input_chars: usize,
}

impl Simplifier {
    pub fn new(provider: Arc<dyn TextProvider>, max_input_chars: usize) -> Self {
        Self {
            provider,
            params: GenerationParams::default(),
            max_input_chars,
        }
    }

    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    pub fn provider(&self) -> &Arc<dyn TextProvider> {
        &self.provider
    }

    #[tracing::instrument(skip(self, text), fields(model = %self.provider.model(), input_len = text.len()))]
    pub async fn simplify(&self, text: &str) -> Result<String, SimplifyError> {
        if text.is_empty() {
            return Err(SimplifyError::EmptyInput);
        }

        let prompt = build_prompt(text, self.max_input_chars);
        let model = self.provider.model();

        let start = Instant::now();
        let result = self.provider.generate(&prompt, &self.params).await;
        metrics::record_provider_latency(model, start.elapsed().as_secs_f64());

        match result {
            Ok(response) => {
                metrics::record_tokens(model, response.input_tokens, response.output_tokens);
                tracing::info!(
                    input_tokens = response.input_tokens,
                    output_tokens = response.output_tokens,
                    finish_reason = ?response.finish_reason,
                    "Text simplified"
                );
                Ok(response.text)
            }
            Err(e) => {
                metrics::record_provider_error(model, e.kind());
                Err(SimplifyError::Provider(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::providers::mock::MockTextProvider;

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let text = "é".repeat(10);
        let cut = truncate_chars(&text, 4);
        assert_eq!(cut, "éééé");
        assert_eq!(cut.len(), 8);
    }

    #[test]
    fn short_text_is_left_whole() {
        assert_eq!(truncate_chars("hello", 2000), "hello");
        assert_eq!(truncate_chars("hello", 5), "hello");
        assert_eq!(truncate_chars("hello", 0), "");
    }

    #[test]
    fn prompt_carries_both_instructions_and_text() {
        let prompt = build_prompt("The mitochondria is the powerhouse.", 2000);
        assert!(prompt.starts_with("Act as an accessibility assistant."));
        assert!(prompt.contains(
            "1. Summarize the following text in very simple English (bullet points)."
        ));
        assert!(prompt.contains("2. Explain any difficult words."));
        assert!(prompt.ends_with("Text: The mitochondria is the powerhouse."));
    }

    #[tokio::test]
    async fn empty_text_never_reaches_provider() {
        let provider = Arc::new(MockTextProvider::with_reply("unused"));
        let simplifier = Simplifier::new(provider.clone(), 2000);

        let err = simplifier.simplify("").await.unwrap_err();

        assert!(matches!(err, SimplifyError::EmptyInput));
        assert!(provider.prompts().is_empty());
    }

    #[tokio::test]
    async fn whitespace_is_forwarded() {
        let provider = Arc::new(MockTextProvider::with_reply("ok"));
        let simplifier = Simplifier::new(provider.clone(), 2000);

        assert_eq!(simplifier.simplify("   ").await.unwrap(), "ok");
        assert_eq!(provider.prompts().len(), 1);
    }

    #[tokio::test]
    async fn long_text_is_cut_before_prompting() {
        let provider = Arc::new(MockTextProvider::with_reply("ok"));
        let simplifier = Simplifier::new(provider.clone(), 2000);
        let text = format!("{}{}", "a".repeat(2000), "Q".repeat(500));

        simplifier.simplify(&text).await.unwrap();

        let prompts = provider.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].ends_with(&format!("Text: {}", "a".repeat(2000))));
        assert!(!prompts[0].contains('Q'));
    }

    #[tokio::test]
    async fn provider_reply_is_returned_verbatim() {
        let reply = "  - Cells make energy.\n- *Mitochondria*: a part of a cell.\n";
        let simplifier = Simplifier::new(Arc::new(MockTextProvider::with_reply(reply)), 2000);

        assert_eq!(simplifier.simplify("text").await.unwrap(), reply);
    }

    #[tokio::test]
    async fn provider_failure_is_typed() {
        let simplifier = Simplifier::new(Arc::new(MockTextProvider::new(false)), 2000);

        let err = simplifier.simplify("text").await.unwrap_err();

        assert!(matches!(
            err,
            SimplifyError::Provider(ProviderError::NotConfigured(_))
        ));
    }
}
