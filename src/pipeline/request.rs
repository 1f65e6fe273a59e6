//! Request assembly: instruction prompt + two encoded palms → chat messages.
//!
//! Intentionally thin — all prompt engineering lives in [`crate::prompts`]
//! so wording can change without touching message plumbing. The instruction
//! and the parser's anchor patterns are a matched pair; see the module docs
//! there.
//!
//! ## Message Layout
//!
//! 1. **System message** — the reading instruction (or a caller override)
//! 2. **User message** — a short fixed text plus both palm images as
//!    attachments, left hand first. Order matters: the prompt tells the
//!    model the first image is the left palm.

use crate::config::ReadingConfig;
use crate::pipeline::encode::EncodedImage;
use crate::prompts::{READING_SYSTEM_PROMPT, USER_TURN_TEXT};
use edgequake_llm::{ChatMessage, CompletionOptions};

/// Assemble the vision chat request. The encoded images are consumed here;
/// nothing downstream sees them again.
pub fn build_messages(
    left: EncodedImage,
    right: EncodedImage,
    config: &ReadingConfig,
) -> Vec<ChatMessage> {
    let system_prompt = config
        .system_prompt
        .as_deref()
        .unwrap_or(READING_SYSTEM_PROMPT);

    vec![
        ChatMessage::system(system_prompt),
        ChatMessage::user_with_images(
            USER_TURN_TEXT,
            vec![left.into_image_data(), right.into_image_data()],
        ),
    ]
}

/// Build `CompletionOptions` from the reading config.
pub fn build_options(config: &ReadingConfig) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(config.temperature),
        max_tokens: Some(config.max_tokens),
        ..Default::default()
    }
}
