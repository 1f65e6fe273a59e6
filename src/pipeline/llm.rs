//! Inference gateway: send the assembled request, classify what comes back.
//!
//! One outbound call per submission, wrapped in a wall-clock timeout. No
//! retries happen here: a palm reading is interactive, the user is watching
//! a spinner, and the right response to a transient upstream failure is to
//! tell them — retry policy, if any, belongs to the caller.
//!
//! ## Failure classification
//!
//! The provider layer surfaces one opaque error per failed call. Its display
//! text carries the upstream status and error code, which is enough to sort
//! failures into the categories the HTTP layer maps to distinct statuses and
//! messages: rate limiting, quota exhaustion, content-policy rejection,
//! authentication, timeout, and an unclassified fallback. Keyword matching
//! on error text is inherently approximate; the fallback category exists so
//! an unmatched error still produces a sensible 500 rather than a panic or a
//! mislabel.

use crate::config::ReadingConfig;
use crate::error::ReadingError;
use crate::output::ReadingStats;
use crate::pipeline::request::build_options;
use edgequake_llm::{ChatMessage, LLMProvider};
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{timeout, Duration};
use tracing::{debug, warn};

/// Send the reading request and return the raw reply text with call stats.
pub async fn request_reading(
    provider: &Arc<dyn LLMProvider>,
    messages: Vec<ChatMessage>,
    config: &ReadingConfig,
) -> Result<(String, ReadingStats), ReadingError> {
    let options = build_options(config);
    let start = Instant::now();

    let call = provider.chat(&messages, Some(&options));
    let response = match timeout(Duration::from_secs(config.api_timeout_secs), call).await {
        Err(_) => {
            warn!(
                "Inference call exceeded {}s wall-clock budget",
                config.api_timeout_secs
            );
            return Err(ReadingError::ApiTimeout {
                detail: format!("exceeded {}s wall-clock budget", config.api_timeout_secs),
            });
        }
        Ok(Err(e)) => {
            let detail = format!("{}", e);
            warn!("Inference call failed: {}", detail);
            return Err(classify_provider_error(&detail));
        }
        Ok(Ok(response)) => response,
    };

    let duration = start.elapsed();
    debug!(
        "Reading received: {} input tokens, {} output tokens, {:?}",
        response.prompt_tokens, response.completion_tokens, duration
    );

    let stats = ReadingStats {
        input_tokens: response.prompt_tokens as u64,
        output_tokens: response.completion_tokens as u64,
        duration_ms: duration.as_millis() as u64,
    };

    Ok((response.content, stats))
}

/// Sort a provider error's display text into a user-facing category.
///
/// Checked most-specific first: quota errors often carry a 429 as well, and
/// content-filter errors a 400, so the code-level keywords must win over the
/// bare status numbers.
pub fn classify_provider_error(detail: &str) -> ReadingError {
    let lower = detail.to_ascii_lowercase();

    if lower.contains("insufficient_quota") || lower.contains("quota") {
        return ReadingError::QuotaExhausted {
            detail: detail.to_string(),
        };
    }
    if lower.contains("content_policy")
        || lower.contains("content_filter")
        || lower.contains("content policy")
    {
        return ReadingError::ContentPolicy {
            detail: detail.to_string(),
        };
    }
    if lower.contains("rate limit") || lower.contains("rate_limit") || lower.contains("429") {
        return ReadingError::RateLimited {
            detail: detail.to_string(),
        };
    }
    if lower.contains("401")
        || lower.contains("403")
        || lower.contains("unauthorized")
        || lower.contains("invalid api key")
        || lower.contains("authentication")
    {
        return ReadingError::AuthFailed {
            detail: detail.to_string(),
        };
    }
    if lower.contains("timed out") || lower.contains("timeout") {
        // The provider's own client timed out before our wall-clock did.
        return ReadingError::ApiTimeout {
            detail: detail.to_string(),
        };
    }

    ReadingError::LlmApiError {
        message: detail.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quota_wins_over_bare_429() {
        let e = classify_provider_error("HTTP 429: insufficient_quota for this account");
        assert!(matches!(e, ReadingError::QuotaExhausted { .. }));
    }

    #[test]
    fn content_filter_wins_over_bare_400() {
        let e = classify_provider_error("HTTP 400: content_policy_violation");
        assert!(matches!(e, ReadingError::ContentPolicy { .. }));
    }

    #[test]
    fn rate_limit_by_status() {
        let e = classify_provider_error("HTTP 429 Too Many Requests");
        assert!(matches!(e, ReadingError::RateLimited { .. }));
    }

    #[test]
    fn auth_by_status_and_by_phrase() {
        assert!(matches!(
            classify_provider_error("HTTP 401 Unauthorized"),
            ReadingError::AuthFailed { .. }
        ));
        assert!(matches!(
            classify_provider_error("Incorrect API key provided: invalid api key"),
            ReadingError::AuthFailed { .. }
        ));
    }

    #[test]
    fn provider_side_timeout_classifies_as_timeout() {
        let e = classify_provider_error("connection timed out after 30000ms");
        assert!(matches!(e, ReadingError::ApiTimeout { .. }));
    }

    #[test]
    fn unknown_error_falls_through() {
        let e = classify_provider_error("the backend caught fire");
        assert!(matches!(e, ReadingError::LlmApiError { .. }));
    }
}
