//! Result types: the raw reply, the parsed reading, and per-call stats.

use serde::{Deserialize, Serialize};

/// One palm photograph as submitted: raw bytes plus declared media type.
#[derive(Debug, Clone)]
pub struct PalmImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl PalmImage {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// The four classic palm lines analysed per hand.
///
/// Every field is always populated: the parser substitutes a fixed
/// placeholder when a line could not be extracted, so display code never
/// branches on missing data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandReading {
    pub heart_line: String,
    pub head_line: String,
    pub life_line: String,
    pub fate_line: String,
}

/// One row of the hand-comparison table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitRecord {
    /// Trait name, e.g. "Heart Line".
    pub name: String,
    /// Short description for the left hand.
    pub left: String,
    /// Short description for the right hand.
    pub right: String,
}

/// The fully structured reading recovered from the model's free-text reply.
///
/// Always fully populated — see [`crate::pipeline::parse`] for the
/// placeholder contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedReading {
    pub left_hand: HandReading,
    pub right_hand: HandReading,
    pub comparison: Vec<TraitRecord>,
    pub summary: String,
}

/// Token and latency accounting for the one inference call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReadingStats {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub duration_ms: u64,
}

/// Complete result of a reading: the untouched model text, the structured
/// view, and the call stats.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadingOutput {
    /// The model's reply, verbatim. No internal structure is guaranteed.
    pub raw: String,
    pub parsed: ParsedReading,
    pub stats: ReadingStats,
}
