//! `data:` URI handling for images passed around as base64 strings.
//!
//! Pickers and cameras hand images over as `data:image/png;base64,…`; the
//! compressor hands them back as `data:image/jpeg;base64,…`. A bare base64
//! payload (no `data:` prefix) is accepted on input as well.

use super::backend::CompressError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

const JPEG_PREFIX: &str = "data:image/jpeg;base64,";

/// A parsed base64 data URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri<'a> {
    /// Declared media type, if any (`image/png`). Informational only: the
    /// decoder sniffs the real format from the bytes.
    pub mime: Option<&'a str>,
    pub payload: &'a str,
}

impl<'a> DataUri<'a> {
    pub fn parse(input: &'a str) -> Result<Self, CompressError> {
        let input = input.trim();
        let Some(rest) = input.strip_prefix("data:") else {
            return Self::bare(input);
        };
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| CompressError::Decode("data URI has no ',' separator".into()))?;
        let mime = header
            .strip_suffix(";base64")
            .ok_or_else(|| CompressError::Decode("data URI is not base64-encoded".into()))?;
        if payload.is_empty() {
            return Err(CompressError::Decode("data URI payload is empty".into()));
        }
        Ok(Self {
            mime: Some(mime).filter(|m| !m.is_empty()),
            payload,
        })
    }

    fn bare(payload: &'a str) -> Result<Self, CompressError> {
        if payload.is_empty() {
            return Err(CompressError::Decode("image data is empty".into()));
        }
        Ok(Self {
            mime: None,
            payload,
        })
    }

    /// Raw bytes of the payload. Embedded whitespace is ignored.
    pub fn decode(&self) -> Result<Vec<u8>, CompressError> {
        let result = if self.payload.contains(char::is_whitespace) {
            let compact: String = self
                .payload
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect();
            STANDARD.decode(compact)
        } else {
            STANDARD.decode(self.payload)
        };
        result.map_err(|e| CompressError::Decode(format!("invalid base64 image data: {e}")))
    }
}

/// Wrap JPEG bytes as a `data:image/jpeg;base64,` URI.
pub fn encode_jpeg_data_uri(bytes: &[u8]) -> String {
    let mut uri = String::with_capacity(JPEG_PREFIX.len() + bytes.len().div_ceil(3) * 4);
    uri.push_str(JPEG_PREFIX);
    STANDARD.encode_string(bytes, &mut uri);
    uri
}

/// Approximate decoded size of a data URI's payload in bytes.
///
/// Drops everything up to the first `,`, then takes three bytes per four
/// characters less any `=` padding. Close enough for a budget check, not a
/// byte-exact count.
pub fn estimated_decoded_size(data_uri: &str) -> usize {
    let payload = data_uri
        .split_once(',')
        .map(|(_, payload)| payload)
        .unwrap_or(data_uri);
    let padding = payload.bytes().rev().take_while(|&b| b == b'=').count();
    (payload.len() * 3 / 4).saturating_sub(padding)
}
