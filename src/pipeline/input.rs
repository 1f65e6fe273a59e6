//! Input resolution: normalise a user-supplied path or URL to a [`PalmImage`].
//!
//! The HTTP endpoint receives image bytes directly from multipart fields;
//! this module serves the CLI, which accepts local files and HTTP(S) URLs.
//! Either way the media type is *sniffed from the magic bytes* rather than
//! trusted from a file extension — a `.jpg` that is actually a PNG would
//! otherwise be mislabelled inside the API request. Sniffing reads only the
//! header; the pixels are never decoded (no preprocessing happens anywhere
//! in this crate).

use crate::error::ReadingError;
use crate::output::PalmImage;
use std::path::PathBuf;
use tracing::{debug, info};

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Sniff the media type from the leading magic bytes.
///
/// Unknown or empty content is an input error, not a pass-through: a request
/// carrying bytes the vision API cannot decode would fail opaquely upstream.
pub fn sniff_mime_type(bytes: &[u8]) -> Result<String, ReadingError> {
    if bytes.is_empty() {
        return Err(ReadingError::InvalidImage {
            detail: "empty input".into(),
        });
    }
    let format = image::guess_format(bytes).map_err(|e| ReadingError::InvalidImage {
        detail: e.to_string(),
    })?;
    Ok(format.to_mime_type().to_string())
}

/// Resolve the input string to an in-memory palm image.
///
/// If the input is a URL, download it. If it is a local path, read it.
pub async fn resolve_image(input: &str, timeout_secs: u64) -> Result<PalmImage, ReadingError> {
    let bytes = if is_url(input) {
        download_url(input, timeout_secs).await?
    } else {
        read_local(input)?
    };
    let mime_type = sniff_mime_type(&bytes)?;
    debug!("Resolved image: {} bytes, {}", bytes.len(), mime_type);
    Ok(PalmImage::new(bytes, mime_type))
}

fn read_local(path_str: &str) -> Result<Vec<u8>, ReadingError> {
    let path = PathBuf::from(path_str);
    std::fs::read(&path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ReadingError::FileNotFound { path },
        _ => ReadingError::InvalidImage {
            detail: format!("{}: {}", path.display(), e),
        },
    })
}

async fn download_url(url: &str, timeout_secs: u64) -> Result<Vec<u8>, ReadingError> {
    info!("Downloading image from: {}", url);

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| ReadingError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            ReadingError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            ReadingError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    })?;

    if !response.status().is_success() {
        return Err(ReadingError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| ReadingError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    Ok(bytes.to_vec())
}
