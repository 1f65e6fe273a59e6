//! Image encoding: raw bytes → base64 [`EncodedImage`].
//!
//! VLM APIs accept images as base64 data embedded in the JSON request body.
//! The encoding is deterministic and lossless; no size limit is enforced —
//! an oversized photo is passed through unmodified and left for the provider
//! to accept or reject. `detail: "high"` instructs GPT-4-class models to use
//! the full image tile budget; without it the fine structure of palm lines
//! is lost to a single low-resolution overview tile.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use edgequake_llm::ImageData;
use tracing::debug;

/// A transport-safe embedded image: media type plus base64 payload.
///
/// Derived once per submission and consumed by the request builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub mime_type: String,
    /// Base64 (standard alphabet, padded) encoding of the original bytes.
    pub payload: String,
}

impl EncodedImage {
    /// Render as an RFC 2397 data URI, the form browser clients and the
    /// OpenAI image_url content part both accept.
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.payload)
    }

    /// Convert into the provider attachment type, consuming self.
    pub fn into_image_data(self) -> ImageData {
        ImageData::new(self.payload, self.mime_type.as_str()).with_detail("high")
    }
}

/// Encode one palm image for the vision API.
pub fn encode_image(bytes: &[u8], mime_type: &str) -> EncodedImage {
    let payload = STANDARD.encode(bytes);
    if bytes.len() > 1024 * 1024 {
        debug!(
            "Large image: {} KB raw → {} bytes base64, passing through unmodified",
            bytes.len() / 1024,
            payload.len()
        );
    } else {
        debug!("Encoded image → {} bytes base64", payload.len());
    }

    EncodedImage {
        mime_type: mime_type.to_string(),
        payload,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_is_deterministic_and_lossless() {
        let bytes = b"\x89PNG\r\n\x1a\nfake-palm-pixels";
        let a = encode_image(bytes, "image/png");
        let b = encode_image(bytes, "image/png");
        assert_eq!(a, b);
        let decoded = STANDARD.decode(&a.payload).expect("valid base64");
        assert_eq!(decoded, bytes);
    }

    #[test]
    fn data_uri_embeds_the_media_type() {
        let enc = encode_image(b"abc", "image/jpeg");
        let uri = enc.to_data_uri();
        assert!(uri.starts_with("data:image/jpeg;base64,"));
        assert!(uri.ends_with(&enc.payload));
    }

    #[test]
    fn empty_input_encodes_to_empty_payload() {
        // Emptiness is rejected upstream by validation; the encoder itself
        // stays total.
        let enc = encode_image(b"", "image/png");
        assert!(enc.payload.is_empty());
    }
}
