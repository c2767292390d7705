//! XML and JSON body codecs.
//!
//! The format is always chosen by the caller. Decoding never falls back to a
//! zero value on malformed input; only [`decode_or_default`] tolerates an
//! empty body, for operations the API documents as bodiless.

use crate::error::{Error, Result};
use crate::request::ContentType;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Serialize `value` in the given format
pub fn encode<T: Serialize + ?Sized>(value: &T, content_type: ContentType) -> Result<Bytes> {
    match content_type {
        ContentType::Json => serde_json::to_vec(value)
            .map(Bytes::from)
            .map_err(|e| Error::Encode(format!("JSON: {e}"))),
        ContentType::Xml => quick_xml::se::to_string(value)
            .map(Bytes::from)
            .map_err(|e| Error::Encode(format!("XML: {e}"))),
    }
}

/// Deserialize `body` in the given format. An empty body is a decode error.
pub fn decode<T: DeserializeOwned>(body: &[u8], content_type: ContentType) -> Result<T> {
    if is_blank(body) {
        return Err(Error::Decode(format!(
            "expected a {} body, got an empty response",
            content_type.mime()
        )));
    }

    match content_type {
        ContentType::Json => serde_json::from_slice(body)
            .map_err(|e| Error::Decode(format!("invalid JSON body: {e}"))),
        ContentType::Xml => {
            let text = std::str::from_utf8(body)
                .map_err(|e| Error::Decode(format!("XML body is not UTF-8: {e}")))?;
            quick_xml::de::from_str(text)
                .map_err(|e| Error::Decode(format!("invalid XML body: {e}")))
        }
    }
}

/// Like [`decode`], but an empty body yields `T::default()`.
pub fn decode_or_default<T: DeserializeOwned + Default>(
    body: &[u8],
    content_type: ContentType,
) -> Result<T> {
    if is_blank(body) {
        return Ok(T::default());
    }
    decode(body, content_type)
}

fn is_blank(body: &[u8]) -> bool {
    body.iter().all(u8::is_ascii_whitespace)
}
