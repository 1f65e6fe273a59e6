//! Configuration for palm reading requests.
//!
//! All behaviour is controlled through [`ReadingConfig`], built via its
//! [`ReadingConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to share a config between the HTTP server and the CLI, and to log
//! it when diagnosing why two runs produced different readings.
//!
//! # Design choice: builder over constructor
//! Callers set only what they care about and rely on documented defaults for
//! the rest; adding a field never breaks an existing call site.

use crate::error::ReadingError;
use edgequake_llm::LLMProvider;
use std::fmt;
use std::sync::Arc;

/// Configuration for a palm reading.
///
/// Built via [`ReadingConfig::builder()`] or [`ReadingConfig::default()`].
///
/// # Example
/// ```rust
/// use lifelines::ReadingConfig;
///
/// let config = ReadingConfig::builder()
///     .model("gpt-4o-mini")
///     .temperature(0.7)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ReadingConfig {
    /// LLM model identifier, e.g. "gpt-4o-mini", "claude-sonnet-4-20250514".
    /// If None, uses the provider default.
    pub model: Option<String>,

    /// LLM provider name (e.g. "openai", "anthropic", "gemini").
    /// If None along with `provider`, the provider is auto-detected from the
    /// environment.
    pub provider_name: Option<String>,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Sampling temperature for the completion. Default: 0.7.
    ///
    /// A reading is creative writing, not transcription; 0.7 keeps the prose
    /// varied between submissions while the prompt's layout demands hold the
    /// structure steady.
    pub temperature: f32,

    /// Maximum tokens the model may generate. Default: 1500.
    ///
    /// Four analysis lines per hand plus the table and summary fit well under
    /// this; set it lower and the summary is the first thing to be cut off.
    pub max_tokens: usize,

    /// Custom system prompt. If None, uses
    /// [`crate::prompts::READING_SYSTEM_PROMPT`].
    ///
    /// Overriders must keep eliciting the anchor labels in
    /// [`crate::prompts`] or the parser will degrade every field to its
    /// placeholder.
    pub system_prompt: Option<String>,

    /// Per-inference-call wall-clock timeout in seconds. Default: 60.
    pub api_timeout_secs: u64,

    /// Download timeout for URL image inputs in seconds. Default: 30.
    pub download_timeout_secs: u64,

    /// Words per batch in the cosmetic reveal stream. Default: 3.
    pub reveal_batch_words: usize,

    /// Delay between reveal batches in milliseconds. Default: 50.
    pub reveal_delay_ms: u64,
}

impl Default for ReadingConfig {
    fn default() -> Self {
        Self {
            model: None,
            provider_name: None,
            provider: None,
            temperature: 0.7,
            max_tokens: 1500,
            system_prompt: None,
            api_timeout_secs: 60,
            download_timeout_secs: 30,
            reveal_batch_words: 3,
            reveal_delay_ms: 50,
        }
    }
}

impl fmt::Debug for ReadingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadingConfig")
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("system_prompt", &self.system_prompt.as_ref().map(|p| p.len()))
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field("reveal_batch_words", &self.reveal_batch_words)
            .field("reveal_delay_ms", &self.reveal_delay_ms)
            .finish()
    }
}

impl ReadingConfig {
    /// Create a new builder for `ReadingConfig`.
    pub fn builder() -> ReadingConfigBuilder {
        ReadingConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ReadingConfig`].
#[derive(Debug)]
pub struct ReadingConfigBuilder {
    config: ReadingConfig,
}

impl ReadingConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs.max(1);
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs.max(1);
        self
    }

    pub fn reveal_batch_words(mut self, n: usize) -> Self {
        self.config.reveal_batch_words = n.max(1);
        self
    }

    pub fn reveal_delay_ms(mut self, ms: u64) -> Self {
        self.config.reveal_delay_ms = ms;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ReadingConfig, ReadingError> {
        let c = &self.config;
        if c.max_tokens == 0 {
            return Err(ReadingError::InvalidConfig(
                "max_tokens must be ≥ 1".into(),
            ));
        }
        if let Some(ref prompt) = c.system_prompt {
            if prompt.trim().is_empty() {
                return Err(ReadingError::InvalidConfig(
                    "system_prompt override must not be empty".into(),
                ));
            }
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let c = ReadingConfig::default();
        assert_eq!(c.temperature, 0.7);
        assert_eq!(c.max_tokens, 1500);
        assert_eq!(c.api_timeout_secs, 60);
        assert_eq!(c.reveal_batch_words, 3);
        assert_eq!(c.reveal_delay_ms, 50);
    }

    #[test]
    fn temperature_is_clamped() {
        let c = ReadingConfig::builder().temperature(9.0).build().unwrap();
        assert_eq!(c.temperature, 2.0);
    }

    #[test]
    fn zero_max_tokens_rejected() {
        assert!(ReadingConfig::builder().max_tokens(0).build().is_err());
    }

    #[test]
    fn empty_prompt_override_rejected() {
        assert!(ReadingConfig::builder().system_prompt("  ").build().is_err());
    }
}
