//! Input capture: file picker, drag-and-drop and clipboard paste all end up
//! as the same immutable [`ImagePayload`].

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::constants::capture::IMAGE_MIME_PREFIX;
use crate::error::SessionError;

/// Where a captured image came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureSource {
    File,
    Drop,
    Paste,
}

impl fmt::Display for CaptureSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CaptureSource::File => "file",
            CaptureSource::Drop => "drop",
            CaptureSource::Paste => "paste",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    #[default]
    Image,
    Text,
}

/// A captured chart image.
///
/// The bytes are shared, never mutated: a new capture replaces the whole
/// payload, so a request still holding the old one stays consistent.
#[derive(Clone, PartialEq, Eq)]
pub struct ImagePayload {
    mime_type: String,
    bytes: Arc<[u8]>,
}

impl ImagePayload {
    /// Accept `bytes` if `mime_type` declares an image and there is something to send
    pub fn new(mime_type: &str, bytes: impl Into<Arc<[u8]>>) -> Result<Self, SessionError> {
        let mime_type = normalize_mime(mime_type);
        if !mime_type.starts_with(IMAGE_MIME_PREFIX) {
            return Err(SessionError::InvalidInputType { mime_type });
        }
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(SessionError::InvalidInputType { mime_type });
        }
        Ok(Self { mime_type, bytes })
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.bytes)
    }

    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.to_base64())
    }

    /// True when both payloads point at the same captured buffer
    pub fn shares_buffer_with(&self, other: &ImagePayload) -> bool {
        Arc::ptr_eq(&self.bytes, &other.bytes)
    }
}

impl fmt::Debug for ImagePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImagePayload")
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Whether a declared MIME type names an image
pub fn is_image_mime(mime_type: &str) -> bool {
    normalize_mime(mime_type).starts_with(IMAGE_MIME_PREFIX)
}

// "Image/PNG; charset=binary" -> "image/png"
fn normalize_mime(mime_type: &str) -> String {
    mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}
