//! Fetched attachment records and their base64 content.

use std::io::{self, Cursor, Read};

use base64::engine::general_purpose::STANDARD;
use base64::read::DecoderReader;
use base64::Engine;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::AttachmentError;

/// Errors decoding an attachment's embedded content.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("Invalid base64 content: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Failed to read content: {0}")]
    Io(#[from] io::Error),
}

/// An attachment as returned by the backend, or as sent with a new errand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentRecord {
    #[serde(rename = "c3_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub content_type: String,
    /// File name.
    pub name: String,
    /// Base64 (standard alphabet) encoded payload.
    #[serde(rename = "content")]
    pub encoded_content: String,
    /// Content id for `cid:` references from HTML bodies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_id: Option<String>,
}

impl AttachmentRecord {
    /// Build a record from raw bytes, encoding them for the wire.
    pub fn from_bytes(name: impl Into<String>, content_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            id: None,
            content_type: content_type.into(),
            name: name.into(),
            encoded_content: STANDARD.encode(bytes),
            content_id: None,
        }
    }

    /// Build a record by draining `reader`.
    pub fn from_reader<R: Read>(
        name: impl Into<String>,
        content_type: impl Into<String>,
        mut reader: R,
    ) -> Result<Self, ContentError> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        Ok(Self::from_bytes(name, content_type, &buf))
    }

    /// Streaming reader over the decoded content.
    ///
    /// Invalid base64 surfaces as an `io::Error` from `read`.
    pub fn content_reader(&self) -> impl Read + '_ {
        DecoderReader::new(Cursor::new(self.encoded_content.as_bytes()), &STANDARD)
    }

    /// The full decoded content.
    pub fn content(&self) -> Result<Vec<u8>, ContentError> {
        Ok(STANDARD.decode(self.encoded_content.as_bytes())?)
    }
}

/// Body of a single-attachment GET.
///
/// The backend nests the record under `data.attributes.attachment`; a bare
/// top-level `attachment` is accepted too.
#[derive(Debug, Deserialize)]
struct FetchedDocument {
    #[serde(default)]
    data: Option<FetchedData>,
    #[serde(default)]
    attachment: Option<AttachmentRecord>,
}

#[derive(Debug, Deserialize)]
struct FetchedData {
    #[serde(default)]
    attributes: Option<FetchedAttributes>,
}

#[derive(Debug, Deserialize)]
struct FetchedAttributes {
    attachment: AttachmentRecord,
}

/// Decode a fetched response body into the attachment it wraps.
pub(crate) fn decode_fetched(descriptor_id: &str, body: &[u8]) -> Result<AttachmentRecord, AttachmentError> {
    let decode_error = |message: String| AttachmentError::Decode {
        id: descriptor_id.to_string(),
        message,
    };

    let doc: FetchedDocument =
        serde_json::from_slice(body).map_err(|e| decode_error(e.to_string()))?;

    doc.data
        .and_then(|d| d.attributes)
        .map(|a| a.attachment)
        .or(doc.attachment)
        .ok_or_else(|| decode_error("response carries no attachment object".to_string()))
}
