//! Image payload preparation: media-type sniffing and content hashing.

use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

/// Image formats the extraction service accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
  Png,
  Jpeg,
  Gif,
}

impl MediaType {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Png => "image/png",
      Self::Jpeg => "image/jpeg",
      Self::Gif => "image/gif",
    }
  }
}

impl std::fmt::Display for MediaType {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Sniff the format from magic bytes. File names lie; the bytes do not.
fn sniff_media_type(bytes: &[u8]) -> Option<MediaType> {
  if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
    Some(MediaType::Png)
  } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
    Some(MediaType::Jpeg)
  } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
    Some(MediaType::Gif)
  } else {
    None
  }
}

/// A photographed reading, ready for submission.
///
/// `content_hash` is the SHA-256 hex digest of the bytes — the cache key
/// that lets a re-submitted image reuse the previous transmission.
#[derive(Debug, Clone)]
pub struct ImagePayload {
  pub bytes:        Vec<u8>,
  pub media_type:   MediaType,
  pub content_hash: String,
}

impl ImagePayload {
  pub fn new(bytes: Vec<u8>) -> Result<Self> {
    let media_type = sniff_media_type(&bytes).ok_or_else(|| {
      Error::UnsupportedImage(
        "not a PNG, JPEG, or GIF image".to_string(),
      )
    })?;
    let content_hash = hex::encode(Sha256::digest(&bytes));
    Ok(Self {
      bytes,
      media_type,
      content_hash,
    })
  }
}
