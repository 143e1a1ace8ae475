use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

const FALLBACK_MIME_TYPE: &str = "image/png";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "1:1")]
    Square,
}

impl AspectRatio {
    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
        }
    }
}

/// Raw image bytes with the MIME type the models should be told about.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl ImageData {
    /// Sniffs the MIME type from the magic bytes; unknown formats are sent as PNG.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        let mime_type = infer::get(&bytes)
            .filter(|kind| kind.mime_type().starts_with("image/"))
            .map(|kind| kind.mime_type().to_string())
            .unwrap_or_else(|| FALLBACK_MIME_TYPE.to_string());
        Self { bytes, mime_type }
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }
}

/// First image returned by the image model, still base64-encoded.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedImage {
    pub base64: String,
}

impl GeneratedImage {
    /// The frontend always receives a PNG data URI.
    pub fn to_data_uri(&self) -> String {
        format!("data:image/png;base64,{}", self.base64)
    }
}
