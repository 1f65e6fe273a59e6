//! Top-level reading entry points.
//!
//! [`read_palms`] is the one-call API: validate the pair, encode, assemble
//! the request, make the single gateway call, parse. Each submission is
//! independent and owns all of its state; nothing is shared between requests
//! and nothing is persisted afterwards.

use crate::config::ReadingConfig;
use crate::error::{HandSide, ReadingError};
use crate::output::{PalmImage, ParsedReading, ReadingOutput};
use crate::pipeline::{encode, llm, parse, request};
use edgequake_llm::{LLMProvider, ProviderFactory};
use std::sync::Arc;
use tracing::{debug, info};

/// Generate a palm reading from a pair of palm images.
///
/// This is the primary entry point for the library.
///
/// # Arguments
/// * `left` — the left palm photograph
/// * `right` — the right palm photograph
/// * `config` — reading configuration
///
/// # Errors
/// Returns `Err(ReadingError)` for input validation failures (caught before
/// any network call) and for classified upstream failures. Section parsing
/// never fails; a structurally disobedient reply yields placeholder fields,
/// not an error.
pub async fn read_palms(
    left: PalmImage,
    right: PalmImage,
    config: &ReadingConfig,
) -> Result<ReadingOutput, ReadingError> {
    // ── Step 1: Validate ─────────────────────────────────────────────────
    if left.is_empty() {
        return Err(ReadingError::MissingImage {
            side: HandSide::Left,
        });
    }
    if right.is_empty() {
        return Err(ReadingError::MissingImage {
            side: HandSide::Right,
        });
    }
    info!(
        "Processing palm reading: left {} KB, right {} KB",
        left.bytes.len() / 1024,
        right.bytes.len() / 1024
    );

    // ── Step 2: Resolve provider ─────────────────────────────────────────
    let provider = resolve_provider(config)?;

    // ── Step 3: Encode ───────────────────────────────────────────────────
    let left_encoded = encode::encode_image(&left.bytes, &left.mime_type);
    let right_encoded = encode::encode_image(&right.bytes, &right.mime_type);

    // ── Step 4: Assemble request ─────────────────────────────────────────
    let messages = request::build_messages(left_encoded, right_encoded, config);

    // ── Step 5: One gateway call ─────────────────────────────────────────
    let (raw, stats) = llm::request_reading(&provider, messages, config).await?;
    debug!("Reading received: {} chars", raw.len());

    // ── Step 6: Parse ────────────────────────────────────────────────────
    let parsed = parse::parse_reading(&raw);

    Ok(ReadingOutput { raw, parsed, stats })
}

/// Synchronous wrapper around [`read_palms`].
///
/// Creates a temporary tokio runtime internally.
pub fn read_palms_sync(
    left: PalmImage,
    right: PalmImage,
    config: &ReadingConfig,
) -> Result<ReadingOutput, ReadingError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| ReadingError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(read_palms(left, right, config))
}

/// Parse raw reply text without making any network call.
///
/// Useful for re-rendering a reading the caller already holds.
pub fn parse_raw(raw: &str) -> ParsedReading {
    parse::parse_reading(raw)
}

// ── Provider resolution ──────────────────────────────────────────────────

/// Instantiate a named provider with the given model.
fn create_vision_provider(
    provider_name: &str,
    model: &str,
) -> Result<Arc<dyn LLMProvider>, ReadingError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        ReadingError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}

/// Resolve the LLM provider, from most-specific to least-specific.
///
/// The four-level fallback chain lets library users and CLI users each set
/// exactly as much or as little as they need:
///
/// 1. **Pre-built provider** (`config.provider`) — used as-is. Useful in
///    tests or when the caller needs custom middleware.
///
/// 2. **Named provider + model** (`config.provider_name`) — the factory
///    reads the corresponding API key from the environment.
///
/// 3. **Environment pair** (`LIFELINES_LLM_PROVIDER` + `LIFELINES_MODEL`) —
///    a deployment-level choice (systemd unit, container env, CI). Checked
///    before full auto-detection so the model choice is honoured even when
///    multiple API keys are present.
///
/// 4. **Full auto-detection** — prefer OpenAI when `OPENAI_API_KEY` is set
///    (the default model is an OpenAI one), otherwise let the factory scan
///    all known key variables and pick the first available provider.
pub(crate) fn resolve_provider(
    config: &ReadingConfig,
) -> Result<Arc<dyn LLMProvider>, ReadingError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    if let Some(ref name) = config.provider_name {
        let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);
        return create_vision_provider(name, model);
    }

    if let (Ok(prov), Ok(model)) = (
        std::env::var("LIFELINES_LLM_PROVIDER"),
        std::env::var("LIFELINES_MODEL"),
    ) {
        if !prov.is_empty() && !model.is_empty() {
            return create_vision_provider(&prov, &model);
        }
    }

    if let Ok(openai_key) = std::env::var("OPENAI_API_KEY") {
        if !openai_key.is_empty() {
            let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);
            return create_vision_provider("openai", model);
        }
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| ReadingError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                Set OPENAI_API_KEY, ANTHROPIC_API_KEY, or configure a provider.\n\
                Error: {}",
                e
            ),
        })?;

    Ok(llm_provider)
}

/// Model used when none is configured. A small vision-capable model is
/// plenty: the reading is short and the images are the whole input.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_left_image_fails_before_any_network_call() {
        let config = ReadingConfig::default();
        let err = read_palms(
            PalmImage::new(vec![], "image/png"),
            PalmImage::new(vec![1, 2, 3], "image/png"),
            &config,
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            ReadingError::MissingImage {
                side: HandSide::Left
            }
        ));
        assert_eq!(err.http_status(), 400);
    }

    #[tokio::test]
    async fn missing_right_image_fails_before_any_network_call() {
        let config = ReadingConfig::default();
        let err = read_palms(
            PalmImage::new(vec![1, 2, 3], "image/png"),
            PalmImage::new(vec![], "image/png"),
            &config,
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            ReadingError::MissingImage {
                side: HandSide::Right
            }
        ));
    }

    #[test]
    fn parse_raw_is_total() {
        let parsed = parse_raw("no structure at all");
        assert_eq!(parsed.comparison.len(), 4);
    }
}
