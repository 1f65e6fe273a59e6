//! # lifelines
//!
//! Palm reading reports from palm photos using Vision Language Models.
//!
//! ## What this crate does
//!
//! A user submits photographs of their left and right palms; a vision model
//! is asked — with a fixed, carefully structured instruction — to produce a
//! palmistry reading; and the model's free-text reply is segmented back into
//! labeled sections for display. The model is only *prompted* to follow the
//! layout, so the parser is built to degrade gracefully: every extraction
//! point falls back to a fixed placeholder instead of failing, and a reading
//! page always renders complete.
//!
//! ## Pipeline Overview
//!
//! ```text
//! palm images
//!  │
//!  ├─ 1. Input    resolve local files or URLs, sniff media type
//!  ├─ 2. Encode   bytes → base64 attachments
//!  ├─ 3. Request  instruction prompt + both images, one chat request
//!  ├─ 4. Gateway  single VLM call, timeout + failure classification
//!  ├─ 5. Parse    anchor-label segmentation → structured reading
//!  └─ 6. Present  bind fragments into display slots
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use lifelines::{read_palms, resolve_image, ReadingConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Provider auto-detected from OPENAI_API_KEY / ANTHROPIC_API_KEY / GEMINI_API_KEY
//!     let config = ReadingConfig::default();
//!     let left = resolve_image("left.jpg", config.download_timeout_secs).await?;
//!     let right = resolve_image("right.jpg", config.download_timeout_secs).await?;
//!     let output = read_palms(left, right, &config).await?;
//!     println!("{}", output.parsed.summary);
//!     eprintln!("tokens: {} in / {} out",
//!         output.stats.input_tokens,
//!         output.stats.output_tokens);
//!     Ok(())
//! }
//! ```
//!
//! Or run the HTTP service: `lifelines serve --addr 0.0.0.0:3000`, then
//! `POST /api/palm-reading` with multipart fields `leftPalmImage` and
//! `rightPalmImage`.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `lifelines` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! lifelines = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod present;
pub mod prompts;
pub mod reading;
pub mod server;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ReadingConfig, ReadingConfigBuilder};
pub use error::{HandSide, ReadingError};
pub use output::{HandReading, PalmImage, ParsedReading, ReadingOutput, ReadingStats, TraitRecord};
pub use pipeline::input::resolve_image;
pub use present::{bind_reading, reveal_words, MarkdownSurface, ReadingSurface, Slot};
pub use reading::{parse_raw, read_palms, read_palms_sync};
pub use server::serve;
