//! Error types for the lifelines library.
//!
//! A reading is atomic — one submission, one upstream call — so there is a
//! single fatal error enum rather than a fatal/partial split. The taxonomy
//! follows how failures are *surfaced*, not where they occur:
//!
//! * **Input errors** are caught before any network call is made.
//! * **Upstream errors** are the classified outcomes of the one provider
//!   call: rate limiting, quota exhaustion, content-policy rejection,
//!   authentication failure, timeout, and an unclassified fallback.
//! * Section parsing never produces an error at all — it degrades to
//!   placeholder text, because a partial reading is worth more to the user
//!   than a blocked render.
//!
//! [`ReadingError::http_status`] and [`ReadingError::user_message`] give the
//! HTTP layer its status code and its fixed user-facing message, keeping the
//! wire contract in one place next to the variants it describes.

use std::path::PathBuf;
use thiserror::Error;

/// Which palm an input error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandSide {
    Left,
    Right,
}

impl std::fmt::Display for HandSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HandSide::Left => write!(f, "left"),
            HandSide::Right => write!(f, "right"),
        }
    }
}

/// All errors returned by the lifelines library.
#[derive(Debug, Error)]
pub enum ReadingError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// A palm image field was absent or empty.
    #[error("Missing {side} palm image")]
    MissingImage { side: HandSide },

    /// Image file was not found at the given path.
    #[error("Image file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// The bytes are not a recognisable image format.
    #[error("Not a recognisable image: {detail}")]
    InvalidImage { detail: String },

    /// HTTP URL was syntactically valid but the download failed.
    #[error("Failed to download '{url}': {reason}")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'")]
    DownloadTimeout { url: String, secs: u64 },

    // ── Upstream errors ───────────────────────────────────────────────────
    /// The configured provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// Provider returned HTTP 429 or an equivalent rate-limit signal.
    #[error("Rate limit exceeded: {detail}")]
    RateLimited { detail: String },

    /// The account's API quota is exhausted.
    #[error("API quota exhausted: {detail}")]
    QuotaExhausted { detail: String },

    /// The provider rejected the images under its content policy.
    #[error("Content policy rejection: {detail}")]
    ContentPolicy { detail: String },

    /// Authentication failed (401/403) — the operator's key is wrong.
    #[error("Authentication error from provider: {detail}")]
    AuthFailed { detail: String },

    /// The inference call timed out — either against this crate's wall-clock
    /// budget or inside the provider's own client.
    #[error("Inference call timed out: {detail}")]
    ApiTimeout { detail: String },

    /// The provider returned an error that fits no known category.
    #[error("LLM API error: {message}")]
    LlmApiError { message: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ReadingError {
    /// HTTP status code the server responds with for this error.
    ///
    /// Auth failures map to 500, not 401: the credential is operator
    /// configuration, and a browser client cannot fix it by re-authenticating.
    pub fn http_status(&self) -> u16 {
        match self {
            ReadingError::MissingImage { .. }
            | ReadingError::FileNotFound { .. }
            | ReadingError::InvalidImage { .. } => 400,
            ReadingError::ContentPolicy { .. } => 400,
            ReadingError::ApiTimeout { .. } | ReadingError::DownloadTimeout { .. } => 408,
            ReadingError::RateLimited { .. } | ReadingError::QuotaExhausted { .. } => 429,
            ReadingError::ProviderNotConfigured { .. }
            | ReadingError::AuthFailed { .. }
            | ReadingError::DownloadFailed { .. }
            | ReadingError::LlmApiError { .. }
            | ReadingError::InvalidConfig(_)
            | ReadingError::Internal(_) => 500,
        }
    }

    /// Fixed user-facing message for the JSON error body.
    ///
    /// Kept separate from `Display`, which carries operator-facing detail
    /// that does not belong in a public response.
    pub fn user_message(&self) -> String {
        match self {
            ReadingError::MissingImage { .. } => {
                "Both left and right palm images are required".to_string()
            }
            ReadingError::FileNotFound { .. } | ReadingError::InvalidImage { .. } => {
                "One of the uploaded files is not a readable image. Please try different images."
                    .to_string()
            }
            ReadingError::RateLimited { .. } => {
                "Rate limit exceeded. Please try again in a few minutes.".to_string()
            }
            ReadingError::QuotaExhausted { .. } => {
                "API quota exceeded. Please try again later.".to_string()
            }
            ReadingError::ContentPolicy { .. } => {
                "The content violates the provider's policies. Please try different images."
                    .to_string()
            }
            ReadingError::AuthFailed { .. } | ReadingError::ProviderNotConfigured { .. } => {
                "API key error. Please contact support.".to_string()
            }
            ReadingError::ApiTimeout { .. } | ReadingError::DownloadTimeout { .. } => {
                "The request timed out. Please try again with smaller images.".to_string()
            }
            _ => {
                "An error occurred while generating your palm reading. Please try again."
                    .to_string()
            }
        }
    }
}
