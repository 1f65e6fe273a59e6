//! The reading instruction prompt and the anchor-label vocabulary.
//!
//! Centralising the prompt and the anchors here serves two purposes:
//!
//! 1. **Single source of truth** — the section parser recovers structure from
//!    the model's free-text reply by searching for these exact labels, so the
//!    prompt that asks for them and the patterns that look for them must
//!    change together. Keeping both in one module (and testing that the
//!    prompt contains every anchor) makes silent drift impossible.
//!
//! 2. **Testability** — unit tests can inspect the prompt directly without a
//!    live model call, making wording regressions easy to catch.
//!
//! Callers can override the instruction via
//! [`crate::config::ReadingConfig::system_prompt`]; anyone doing so takes on
//! the contract that the override still elicits the anchor labels below.

// ── Section anchors ──────────────────────────────────────────────────────
//
// Matched case-insensitively as literal substrings of the raw reply.

/// Opens the left-hand analysis section.
pub const SECTION_LEFT_HAND: &str = "LEFT HAND ANALYSIS";
/// Opens the right-hand analysis section.
pub const SECTION_RIGHT_HAND: &str = "RIGHT HAND ANALYSIS";
/// Opens the hand-comparison section.
pub const SECTION_COMPARISON: &str = "HAND COMPARISON";
/// Opens the closing summary section.
pub const SECTION_SUMMARY: &str = "SUMMARY";

// ── Line anchors (within a hand section) ─────────────────────────────────

pub const LINE_HEART: &str = "Heart Line";
pub const LINE_HEAD: &str = "Head Line";
pub const LINE_LIFE: &str = "Life Line";
pub const LINE_FATE: &str = "Fate Line";

/// Exact header row the prompt requests for the comparison table.
pub const COMPARISON_HEADER: &str = "| Trait | Left Hand (Inherent) | Right Hand (Developed) |";

/// Prompt revision tag. Bump whenever [`READING_SYSTEM_PROMPT`] wording
/// changes in a way that could move an anchor label.
pub const PROMPT_VERSION: &str = "v1";

/// Default system prompt sent with every reading request.
///
/// The layout it demands — four labeled lines per hand, a pipe table with an
/// exact header row, a labeled summary — is exactly what
/// [`crate::pipeline::parse`] extracts. The model is prompted, not
/// constrained, to follow it; the parser degrades to placeholders when it
/// does not.
pub const READING_SYSTEM_PROMPT: &str = r#"You are an expert palmist who can analyze palm lines and provide insightful readings. I'm sharing images of my left and right palms. Please analyze them and provide a detailed reading.

Please analyze the following key lines and features:
1. Heart Line (emotions, relationships)
2. Head Line (intellect, thinking style)
3. Life Line (vitality, life journey)
4. Fate Line (if visible, career path)

Structure your response in the following format:

LEFT HAND ANALYSIS:
- Heart Line: [analysis without any colons or bullet points at the beginning or end]
- Head Line: [analysis without any colons or bullet points at the beginning or end]
- Life Line: [analysis without any colons or bullet points at the beginning or end]
- Fate Line: [analysis without any colons or bullet points at the beginning or end]

RIGHT HAND ANALYSIS:
- Heart Line: [analysis without any colons or bullet points at the beginning or end]
- Head Line: [analysis without any colons or bullet points at the beginning or end]
- Life Line: [analysis without any colons or bullet points at the beginning or end]
- Fate Line: [analysis without any colons or bullet points at the beginning or end]

HAND COMPARISON:
Format the comparison as a clean, simple table with these exact palm lines and labels:

| Trait | Left Hand (Inherent) | Right Hand (Developed) |
| ----- | -------------------- | ---------------------- |
| Heart Line | [brief 2-4 word summary of left heart line] | [brief 2-4 word summary of right heart line] |
| Head Line | [brief 2-4 word summary of left head line] | [brief 2-4 word summary of right head line] |
| Life Line | [brief 2-4 word summary of left life line] | [brief 2-4 word summary of right life line] |
| Fate Line | [brief 2-4 word summary of left fate line] | [brief 2-4 word summary of right fate line] |

Keep each cell entry very concise - just 2-4 words that capture the essence of each line's reading. Do not use placeholder text.

SUMMARY:
[Provide a final summary and overall reading here. This should be a separate section, clearly labeled as SUMMARY.]

Important: Do not include any disclaimers about the accuracy of palm reading or that you're an AI. Just provide the reading as a professional palmist would. Do not include any colons at the beginning of analysis points or bullet points at the end of analysis points."#;

/// Fixed text of the user turn that carries the two images.
pub const USER_TURN_TEXT: &str = "Here are my palm images for reading:";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_contains_every_section_anchor() {
        for anchor in [
            SECTION_LEFT_HAND,
            SECTION_RIGHT_HAND,
            SECTION_COMPARISON,
            SECTION_SUMMARY,
        ] {
            assert!(
                READING_SYSTEM_PROMPT.contains(anchor),
                "prompt no longer elicits section anchor {anchor:?}"
            );
        }
    }

    #[test]
    fn prompt_contains_every_line_anchor() {
        for anchor in [LINE_HEART, LINE_HEAD, LINE_LIFE, LINE_FATE] {
            assert!(
                READING_SYSTEM_PROMPT.contains(anchor),
                "prompt no longer elicits line anchor {anchor:?}"
            );
        }
    }

    #[test]
    fn prompt_requests_the_exact_comparison_header() {
        assert!(READING_SYSTEM_PROMPT.contains(COMPARISON_HEADER));
    }
}
