//! README content decoding.

use std::{error::Error, fmt};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::domain::RawReadme;
use crate::error::RepotierError;

/// Number of characters kept when falling back to raw README content.
pub const RAW_FALLBACK_CHARS: usize = 2000;

/// README content that could not be decoded as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadmeDecodeError(pub String);

impl fmt::Display for ReadmeDecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Error for ReadmeDecodeError {}

impl From<ReadmeDecodeError> for RepotierError {
    fn from(err: ReadmeDecodeError) -> Self {
        RepotierError::Decode(err.0)
    }
}

/// Decode README content according to its declared encoding.
///
/// Base64 payloads may contain line breaks, as the GitHub contents API wraps
/// them; all ASCII whitespace is removed before decoding.
pub fn decode_readme(raw: &RawReadme) -> Result<String, ReadmeDecodeError> {
    let is_base64 = raw
        .encoding
        .as_deref()
        .is_some_and(|encoding| encoding.eq_ignore_ascii_case("base64"));
    if !is_base64 {
        return Ok(raw.content.clone());
    }

    let compact: String = raw
        .content
        .chars()
        .filter(|ch| !ch.is_ascii_whitespace())
        .collect();
    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|err| ReadmeDecodeError(format!("invalid base64: {err}")))?;
    String::from_utf8(bytes)
        .map_err(|err| ReadmeDecodeError(format!("readme is not utf-8: {err}")))
}

/// README text for scoring, recovering from decode failures.
///
/// A missing README yields an empty string. When decoding fails the raw
/// content, truncated to [`RAW_FALLBACK_CHARS`], is used instead.
pub fn readme_text(raw: Option<&RawReadme>) -> String {
    let Some(raw) = raw else {
        return String::new();
    };
    match decode_readme(raw) {
        Ok(text) => text,
        Err(err) => {
            log::warn!("falling back to raw readme content: {err}");
            raw.content.chars().take(RAW_FALLBACK_CHARS).collect()
        }
    }
}
