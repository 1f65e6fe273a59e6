//! Pipeline stages for palm-pair-to-reading conversion.
//!
//! Each submodule implements exactly one transformation step. Keeping stages
//! separate makes each independently testable and lets us swap an
//! implementation (e.g. a different provider layer) without touching the
//! other stages.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ encode ──▶ request ──▶ llm ──▶ parse
//! (path/URL) (base64)  (messages)  (VLM)   (sections)
//! ```
//!
//! 1. [`input`]   — resolve a path or URL to in-memory bytes with a sniffed
//!    media type (CLI only; the HTTP endpoint receives bytes directly)
//! 2. [`encode`]  — base64-wrap each image for the multimodal request body
//! 3. [`request`] — assemble the instruction prompt and both images into one
//!    vision chat request
//! 4. [`llm`]     — the single provider call with timeout and failure
//!    classification; the only stage with network I/O
//! 5. [`parse`]   — anchor-label segmentation of the free-text reply into
//!    the fixed reading structure

pub mod encode;
pub mod input;
pub mod llm;
pub mod parse;
pub mod request;
